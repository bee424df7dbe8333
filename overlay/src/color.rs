//! CSS color parsing for the values stored on text layers and the zone.
//!
//! Supports `#rgb`, `#rgba`, `#rrggbb`, `#rrggbbaa`, `rgb()`/`rgba()`,
//! `hsl()`/`hsla()`, `transparent`, and a small set of named colors.

#[cfg(test)]
#[path = "color_test.rs"]
mod color_test;

/// An sRGB color with straight (non-premultiplied) alpha in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f64,
}

/// Fill used for a zone whose background color cannot be parsed.
pub const ZONE_FALLBACK: Rgba = Rgba::rgb(20, 20, 20);

pub const BLACK: Rgba = Rgba::rgb(0, 0, 0);
pub const WHITE: Rgba = Rgba::rgb(255, 255, 255);

impl Rgba {
    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    /// Same color with its alpha replaced.
    #[must_use]
    pub fn with_alpha(self, a: f64) -> Self {
        Self { a: a.max(0.0).min(1.0), ..self }
    }

    /// Whether drawing this color would produce no pixels.
    #[must_use]
    pub fn is_transparent(&self) -> bool {
        self.a <= 0.0
    }

    /// CSS `rgba()` form accepted by Canvas2d.
    #[must_use]
    pub fn to_css(&self) -> String {
        format!("rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
    }
}

/// Parse a CSS color string. Returns `None` for anything unrecognized.
#[must_use]
pub fn parse(input: &str) -> Option<Rgba> {
    let s = input.trim().to_ascii_lowercase();
    if let Some(hex) = s.strip_prefix('#') {
        return parse_hex(hex);
    }
    if let Some(args) = function_args(&s, "rgba").or_else(|| function_args(&s, "rgb")) {
        return parse_rgb_args(args);
    }
    if let Some(args) = function_args(&s, "hsla").or_else(|| function_args(&s, "hsl")) {
        return parse_hsl_args(args);
    }
    named(&s)
}

/// Parse `input`, or fall back to `fallback` when it is unrecognized.
#[must_use]
pub fn parse_or(input: &str, fallback: Rgba) -> Rgba {
    parse(input).unwrap_or(fallback)
}

/// Zone background: the parsed color with its alpha replaced by `opacity`.
#[must_use]
pub fn zone_fill(background: &str, opacity: f64) -> Rgba {
    parse_or(background, ZONE_FALLBACK).with_alpha(opacity)
}

fn function_args<'a>(s: &'a str, name: &str) -> Option<&'a str> {
    s.strip_prefix(name)?.trim_start().strip_prefix('(')?.strip_suffix(')')
}

fn parse_hex(hex: &str) -> Option<Rgba> {
    if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    let nibble = |i: usize| u8::from_str_radix(&hex[i..=i], 16).map(|v| v * 17);
    let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16);
    let color = match hex.len() {
        3 | 4 => {
            let (Ok(r), Ok(g), Ok(b)) = (nibble(0), nibble(1), nibble(2)) else {
                return None;
            };
            let a = if hex.len() == 4 { nibble(3).unwrap_or(255) } else { 255 };
            Rgba { r, g, b, a: f64::from(a) / 255.0 }
        }
        6 | 8 => {
            let (Ok(r), Ok(g), Ok(b)) = (byte(0), byte(2), byte(4)) else {
                return None;
            };
            let a = if hex.len() == 8 { byte(6).unwrap_or(255) } else { 255 };
            Rgba { r, g, b, a: f64::from(a) / 255.0 }
        }
        _ => return None,
    };
    Some(color)
}

/// Split on commas, whitespace, or the `/` alpha separator.
fn split_args(args: &str) -> Vec<&str> {
    args.split(|c: char| c == ',' || c == '/' || c.is_whitespace()).filter(|p| !p.is_empty()).collect()
}

fn number(part: &str) -> Option<f64> {
    match part.parse::<f64>() {
        Ok(v) if v.is_finite() => Some(v),
        _ => None,
    }
}

/// A channel given as `0..=255` or as a percentage.
fn channel(part: &str) -> Option<u8> {
    let value = match part.strip_suffix('%') {
        Some(pct) => number(pct)? / 100.0 * 255.0,
        None => number(part)?,
    };
    Some(to_byte(value))
}

/// An alpha given as `0..=1` or as a percentage.
fn alpha(part: &str) -> Option<f64> {
    let value = match part.strip_suffix('%') {
        Some(pct) => number(pct)? / 100.0,
        None => number(part)?,
    };
    Some(value.max(0.0).min(1.0))
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn to_byte(value: f64) -> u8 {
    value.round().max(0.0).min(255.0) as u8
}

fn parse_rgb_args(args: &str) -> Option<Rgba> {
    let parts = split_args(args);
    if parts.len() != 3 && parts.len() != 4 {
        return None;
    }
    let a = match parts.get(3) {
        Some(p) => alpha(p)?,
        None => 1.0,
    };
    Some(Rgba { r: channel(parts[0])?, g: channel(parts[1])?, b: channel(parts[2])?, a })
}

fn parse_hsl_args(args: &str) -> Option<Rgba> {
    let parts = split_args(args);
    if parts.len() != 3 && parts.len() != 4 {
        return None;
    }
    let h = number(parts[0].trim_end_matches("deg"))?.rem_euclid(360.0) / 360.0;
    let s = number(parts[1].strip_suffix('%')?)? / 100.0;
    let l = number(parts[2].strip_suffix('%')?)? / 100.0;
    let a = match parts.get(3) {
        Some(p) => alpha(p)?,
        None => 1.0,
    };
    let (s, l) = (s.max(0.0).min(1.0), l.max(0.0).min(1.0));
    let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
    let p = 2.0 * l - q;
    let r = hue_to_rgb(p, q, h + 1.0 / 3.0);
    let g = hue_to_rgb(p, q, h);
    let b = hue_to_rgb(p, q, h - 1.0 / 3.0);
    Some(Rgba { r: to_byte(r * 255.0), g: to_byte(g * 255.0), b: to_byte(b * 255.0), a })
}

fn hue_to_rgb(p: f64, q: f64, t: f64) -> f64 {
    let t = t.rem_euclid(1.0);
    if t < 1.0 / 6.0 {
        p + (q - p) * 6.0 * t
    } else if t < 0.5 {
        q
    } else if t < 2.0 / 3.0 {
        p + (q - p) * (2.0 / 3.0 - t) * 6.0
    } else {
        p
    }
}

fn named(s: &str) -> Option<Rgba> {
    let color = match s {
        "transparent" => Rgba { r: 0, g: 0, b: 0, a: 0.0 },
        "black" => BLACK,
        "white" => WHITE,
        "red" => Rgba::rgb(255, 0, 0),
        "green" => Rgba::rgb(0, 128, 0),
        "lime" => Rgba::rgb(0, 255, 0),
        "blue" => Rgba::rgb(0, 0, 255),
        "yellow" => Rgba::rgb(255, 255, 0),
        "orange" => Rgba::rgb(255, 165, 0),
        "purple" => Rgba::rgb(128, 0, 128),
        "gold" => Rgba::rgb(255, 215, 0),
        "gray" | "grey" => Rgba::rgb(128, 128, 128),
        "silver" => Rgba::rgb(192, 192, 192),
        "cyan" | "aqua" => Rgba::rgb(0, 255, 255),
        "magenta" | "fuchsia" => Rgba::rgb(255, 0, 255),
        _ => return None,
    };
    Some(color)
}
