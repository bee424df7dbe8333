//! RGBA backend: draws a [`Scene`] into an [`RgbaImage`] for export.
//!
//! Mirrors what [`crate::paint`] does with Canvas2d, pixel by pixel. Text is
//! rasterized with `fontdue` from the fonts loaded into a [`FontBook`]; glows
//! and shadows are Gaussian blurs of a coverage mask with sigma equal to half
//! the Canvas2d `shadowBlur`. Preview affordances are never drawn here.

#[cfg(test)]
#[path = "raster_test.rs"]
mod raster_test;

use std::collections::HashMap;

use fontdue::{Font, FontSettings};
use image::imageops::{self, FilterType};
use image::{ImageBuffer, Luma, RgbaImage};

use crate::color::Rgba;
use crate::coords::{Bounds, Size};
use crate::measure::{ApproxMeasure, TextExtent, TextMeasure};
use crate::render::{DrawItem, PassKind, Scene, TextItem, ZoneItem};

/// Single-channel coverage in `[0, 1]`.
pub type Mask = ImageBuffer<Luma<f32>, Vec<f32>>;

#[derive(Debug, thiserror::Error)]
pub enum RasterError {
    #[error("invalid font data for {family}: {reason}")]
    InvalidFont { family: String, reason: &'static str },
}

// =============================================================
// Fonts
// =============================================================

/// Loaded font faces keyed by family name, plus an optional fallback face.
#[derive(Default)]
pub struct FontBook {
    faces: HashMap<String, Font>,
    fallback: Option<Font>,
}

impl FontBook {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the bold face for `family`.
    ///
    /// # Errors
    ///
    /// Returns [`RasterError::InvalidFont`] if `bytes` is not a font `fontdue` can parse.
    pub fn load(&mut self, family: &str, bytes: &[u8]) -> Result<(), RasterError> {
        let font = parse_font(family, bytes)?;
        tracing::debug!(family, "loaded font face");
        self.faces.insert(family.to_ascii_lowercase(), font);
        Ok(())
    }

    /// Register the face used for families with no face of their own.
    ///
    /// # Errors
    ///
    /// Returns [`RasterError::InvalidFont`] if `bytes` is not a font `fontdue` can parse.
    pub fn set_fallback(&mut self, bytes: &[u8]) -> Result<(), RasterError> {
        self.fallback = Some(parse_font("fallback", bytes)?);
        Ok(())
    }

    /// Whether text set in `family` can be drawn.
    #[must_use]
    pub fn covers(&self, family: &str) -> bool {
        self.face(family).is_some()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.faces.is_empty() && self.fallback.is_none()
    }

    fn face(&self, family: &str) -> Option<&Font> {
        self.faces.get(&family.to_ascii_lowercase()).or(self.fallback.as_ref())
    }
}

fn parse_font(family: &str, bytes: &[u8]) -> Result<Font, RasterError> {
    Font::from_bytes(bytes, FontSettings::default())
        .map_err(|reason| RasterError::InvalidFont { family: family.to_owned(), reason })
}

impl TextMeasure for FontBook {
    fn measure(&self, text: &str, family: &str, font_px: f64) -> TextExtent {
        match self.face(family) {
            Some(font) => {
                #[allow(clippy::cast_possible_truncation)]
                let (_, width) = layout(font, text, font_px as f32);
                TextExtent { width: f64::from(width), height: font_px }
            }
            None => ApproxMeasure.measure(text, family, font_px),
        }
    }
}

/// Pen x for each glyph of a single line, and the line's advance width.
fn layout(font: &Font, text: &str, px: f32) -> (Vec<(char, f32)>, f32) {
    let mut pen = 0.0;
    let mut prev: Option<char> = None;
    let mut glyphs = Vec::with_capacity(text.len());
    for ch in text.chars() {
        if let Some(p) = prev {
            pen += font.horizontal_kern(p, ch, px).unwrap_or(0.0);
        }
        glyphs.push((ch, pen));
        pen += font.metrics(ch, px).advance_width;
        prev = Some(ch);
    }
    (glyphs, pen)
}

// =============================================================
// Scene
// =============================================================

/// Pixel dimensions of a scene, at least 1x1.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn pixel_size(size: Size) -> (u32, u32) {
    (size.width.round().max(1.0) as u32, size.height.round().max(1.0) as u32)
}

/// Draw `scene` into a new image of the scene's size.
///
/// `base` is stretched to the full surface. Logos are looked up by `src` in
/// `logos` and scaled with Lanczos3; unknown sources and text in families
/// `fonts` cannot cover are skipped.
#[must_use]
pub fn paint_scene(
    scene: &Scene,
    base: Option<&RgbaImage>,
    logos: &HashMap<String, RgbaImage>,
    fonts: &FontBook,
) -> RgbaImage {
    let (width, height) = pixel_size(scene.size);
    let mut out = RgbaImage::new(width, height);

    for item in &scene.items {
        match item {
            DrawItem::BaseImage { rect } => {
                if let Some(base) = base {
                    draw_image(&mut out, base, rect);
                }
            }
            DrawItem::Text(text) => match fonts.face(&text.family) {
                Some(font) => draw_text(&mut out, font, text),
                None => tracing::warn!(family = %text.family, "no font face; text skipped"),
            },
            DrawItem::Logo { src, rect, .. } => match logos.get(src) {
                Some(img) => draw_image(&mut out, img, rect),
                None => tracing::warn!(%src, "logo raster missing; skipped"),
            },
            DrawItem::Zone(zone) => draw_zone(&mut out, zone),
            DrawItem::Guide { .. } | DrawItem::SelectionOutline { .. } | DrawItem::Handle { .. } => {}
        }
    }
    out
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn draw_image(out: &mut RgbaImage, img: &RgbaImage, rect: &Bounds) {
    let w = rect.width().round();
    let h = rect.height().round();
    if w < 1.0 || h < 1.0 {
        return;
    }
    let (x, y) = (rect.left.round() as i64, rect.top.round() as i64);
    if img.dimensions() == (w as u32, h as u32) {
        imageops::overlay(out, img, x, y);
        return;
    }
    let scaled = imageops::resize(img, w as u32, h as u32, FilterType::Lanczos3);
    imageops::overlay(out, &scaled, x, y);
}

// =============================================================
// Compositing
// =============================================================

/// Source-over `color` at `coverage` onto the pixel at `(x, y)`.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn blend(out: &mut RgbaImage, x: i64, y: i64, color: Rgba, coverage: f64) {
    let sa = color.a * coverage.clamp(0.0, 1.0);
    if sa <= 0.0 {
        return;
    }
    let (Ok(x), Ok(y)) = (u32::try_from(x), u32::try_from(y)) else {
        return;
    };
    if x >= out.width() || y >= out.height() {
        return;
    }
    let px = out.get_pixel_mut(x, y);
    let [dr, dg, db, da] = px.0;
    let da = f64::from(da) / 255.0;
    let out_a = sa + da * (1.0 - sa);
    let mix = |s: u8, d: u8| {
        let v = (f64::from(s) * sa + f64::from(d) * da * (1.0 - sa)) / out_a;
        v.round().clamp(0.0, 255.0) as u8
    };
    *px = image::Rgba([mix(color.r, dr), mix(color.g, dg), mix(color.b, db), (out_a * 255.0).round() as u8]);
}

/// Composite `mask`, whose top-left sits at `origin`, in `color`.
fn composite(out: &mut RgbaImage, mask: &Mask, origin: (i64, i64), color: Rgba) {
    for (x, y, cov) in mask.enumerate_pixels() {
        if cov.0[0] > 0.0 {
            blend(out, origin.0 + i64::from(x), origin.1 + i64::from(y), color, f64::from(cov.0[0]));
        }
    }
}

/// Gaussian blur of a mask for a Canvas2d `shadowBlur` of `blur_px`.
#[allow(clippy::cast_possible_truncation)]
fn blur(mask: &Mask, blur_px: f64) -> Mask {
    if blur_px < 0.5 {
        return mask.clone();
    }
    imageops::blur(mask, (blur_px / 2.0) as f32)
}

/// Grow a mask by `radius` pixels: each pixel takes the max over a disk.
#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
pub fn dilate(mask: &Mask, radius: f64) -> Mask {
    let r = radius.ceil() as i64;
    if r <= 0 {
        return mask.clone();
    }
    let (w, h) = (i64::from(mask.width()), i64::from(mask.height()));
    let r2 = radius * radius;
    Mask::from_fn(mask.width(), mask.height(), |x, y| {
        let mut best = 0.0f32;
        for dy in -r..=r {
            for dx in -r..=r {
                if ((dx * dx + dy * dy) as f64) > r2 {
                    continue;
                }
                let (sx, sy) = (i64::from(x) + dx, i64::from(y) + dy);
                if sx < 0 || sy < 0 || sx >= w || sy >= h {
                    continue;
                }
                #[allow(clippy::cast_sign_loss)]
                let v = mask.get_pixel(sx as u32, sy as u32).0[0];
                best = best.max(v);
            }
        }
        Luma([best])
    })
}

// =============================================================
// Text
// =============================================================

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss, clippy::cast_possible_wrap)]
fn draw_text(out: &mut RgbaImage, font: &Font, item: &TextItem) {
    let px = item.font_px as f32;
    let (glyphs, width) = layout(font, &item.text, px);
    let (ascent, descent) = font
        .horizontal_line_metrics(px)
        .map_or((px * 0.8, -px * 0.2), |m| (m.ascent, m.descent));

    // Middle baseline: the ascent/descent box is centered on the layer center.
    let baseline = item.center.y + f64::from(ascent + descent) / 2.0;
    let left = item.center.x - f64::from(width) / 2.0;

    let margin = item
        .passes
        .iter()
        .map(|p| {
            let stroke = match p.kind {
                PassKind::Stroke { width_px } => width_px,
                PassKind::Fill => 0.0,
            };
            let shadow = p.shadow.map_or(0.0, |s| s.blur_px * 2.0 + s.offset_x.abs().max(s.offset_y.abs()));
            stroke + shadow
        })
        .fold(2.0, f64::max)
        .ceil();

    let origin_x = (left - margin).floor() as i64;
    let origin_y = (baseline - f64::from(ascent) - margin).floor() as i64;
    let mask_w = (f64::from(width) + margin * 2.0).ceil() as u32 + 2;
    let mask_h = (f64::from(ascent - descent) + margin * 2.0).ceil() as u32 + 2;
    let mut glyph_mask = Mask::new(mask_w.max(1), mask_h.max(1));

    for (ch, pen) in glyphs {
        let (metrics, bitmap) = font.rasterize(ch, px);
        let gx = (left + f64::from(pen)).round() as i64 + i64::from(metrics.xmin) - origin_x;
        let gy = baseline.round() as i64 - (metrics.height as i64 + i64::from(metrics.ymin)) - origin_y;
        for row in 0..metrics.height {
            for col in 0..metrics.width {
                let (mx, my) = (gx + col as i64, gy + row as i64);
                if mx < 0 || my < 0 || mx >= i64::from(glyph_mask.width()) || my >= i64::from(glyph_mask.height()) {
                    continue;
                }
                let cov = f32::from(bitmap[row * metrics.width + col]) / 255.0;
                let cell = glyph_mask.get_pixel_mut(mx as u32, my as u32);
                cell.0[0] = cell.0[0].max(cov);
            }
        }
    }

    for pass in &item.passes {
        let ink = match pass.kind {
            PassKind::Fill => glyph_mask.clone(),
            PassKind::Stroke { width_px } => dilate(&glyph_mask, width_px / 2.0),
        };
        if let Some(shadow) = pass.shadow {
            let soft = blur(&ink, shadow.blur_px);
            let shifted = (origin_x + shadow.offset_x.round() as i64, origin_y + shadow.offset_y.round() as i64);
            composite(out, &soft, shifted, shadow.color);
        }
        composite(out, &ink, (origin_x, origin_y), pass.color);
    }
}

// =============================================================
// Zone
// =============================================================

/// Anti-aliased coverage of a rounded rectangle at pixel center `(px, py)`.
#[must_use]
pub fn rounded_rect_coverage(rect: &Bounds, radius: f64, px: f64, py: f64) -> f64 {
    let c = rect.center();
    let (hw, hh) = (rect.width() / 2.0, rect.height() / 2.0);
    if hw <= 0.0 || hh <= 0.0 {
        return 0.0;
    }
    let radius = radius.max(0.0).min(hw).min(hh);
    let qx = (px - c.x).abs() - (hw - radius);
    let qy = (py - c.y).abs() - (hh - radius);
    let outside = qx.max(0.0).hypot(qy.max(0.0));
    let inside = qx.max(qy).min(0.0);
    (0.5 - (outside + inside - radius)).clamp(0.0, 1.0)
}

fn inset(rect: &Bounds, by: f64) -> Bounds {
    Bounds { left: rect.left + by, top: rect.top + by, right: rect.right - by, bottom: rect.bottom - by }
}

/// Pixel range `[lo, hi)` covering `lo_f..hi_f`, clipped to `[0, limit)`.
#[allow(clippy::cast_possible_truncation)]
fn span(lo_f: f64, hi_f: f64, limit: u32) -> (i64, i64) {
    let lo = (lo_f.floor() as i64).max(0);
    let hi = (hi_f.ceil() as i64).min(i64::from(limit));
    (lo, hi)
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
fn draw_zone(out: &mut RgbaImage, zone: &ZoneItem) {
    let r = &zone.rect;

    if let Some(glow) = zone.glow {
        let spread = inset(r, -glow.spread_px);
        let reach = (glow.blur_px * 2.0 + glow.spread_px).ceil() + 2.0;
        let origin_x = (r.left - reach).floor() as i64;
        let origin_y = (r.top - reach).floor() as i64;
        let w = (r.width() + reach * 2.0).ceil() as u32 + 1;
        let h = (r.height() + reach * 2.0).ceil() as u32 + 1;
        let radius = zone.radius_px + glow.spread_px;
        let solid = Mask::from_fn(w, h, |x, y| {
            let (cx, cy) = ((origin_x + i64::from(x)) as f64 + 0.5, (origin_y + i64::from(y)) as f64 + 0.5);
            Luma([rounded_rect_coverage(&spread, radius, cx, cy) as f32])
        });
        let mut soft = blur(&solid, glow.blur_px);
        for (x, y, cov) in soft.enumerate_pixels_mut() {
            let (cx, cy) = ((origin_x + i64::from(x)) as f64 + 0.5, (origin_y + i64::from(y)) as f64 + 0.5);
            let outside = 1.0 - rounded_rect_coverage(r, zone.radius_px, cx, cy);
            cov.0[0] *= outside as f32;
        }
        composite(out, &soft, (origin_x, origin_y), glow.color);
    }

    let (x0, x1) = span(r.left, r.right, out.width());
    let (y0, y1) = span(r.top, r.bottom, out.height());
    let border = zone.border.map(|(width, color)| (inset(r, width), (zone.radius_px - width).max(0.0), color));
    for y in y0..y1 {
        for x in x0..x1 {
            let (cx, cy) = (x as f64 + 0.5, y as f64 + 0.5);
            let cov = rounded_rect_coverage(r, zone.radius_px, cx, cy);
            if cov <= 0.0 {
                continue;
            }
            blend(out, x, y, zone.fill, cov);
            if let Some((inner, inner_radius, color)) = &border {
                let ring = cov - rounded_rect_coverage(inner, *inner_radius, cx, cy);
                blend(out, x, y, *color, ring);
            }
        }
    }
}
