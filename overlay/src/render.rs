//! Scene building: turns a layout snapshot into a backend-neutral draw list.
//!
//! [`build_scene`] is the single rendering function for both the interactive
//! preview and the native-resolution export. It is a pure function of the
//! snapshot, the target surface size, and the mode; the mode only decides
//! whether selection outlines, handles, and guides are appended. Every length
//! is derived from the surface size (percent of the frame, em of the font size,
//! or percent of the canvas height), so the same snapshot drawn at two sizes
//! differs only by a uniform scale.
//!
//! Backends: [`crate::paint`] draws a scene with Canvas2d for the preview and
//! [`crate::raster`] draws it into an RGBA image for export.

#[cfg(test)]
#[path = "render_test.rs"]
mod render_test;

use crate::color::{self, BLACK, Rgba, WHITE};
use crate::containment::logo_canvas_bounds;
use crate::coords::{Bounds, Point, Size, bounds_to_absolute, to_absolute, zone_to_canvas};
use crate::doc::{Container, ElementId, PartnerZone, Snapshot, TextEffect, TextLayer};
use crate::geometry::{font_px, logo_bounds, zone_bounds};
use crate::hit::{handle_points, has_handles, target_bounds_px};
use crate::input::{GuideFrame, UiState};
use crate::measure::TextMeasure;

/// Guide line color.
pub const GUIDE_COLOR: Rgba = Rgba { r: 0xA8, g: 0x55, b: 0xF7, a: 0.8 };

/// Selection outline and handle stroke color.
pub const SELECTION_COLOR: Rgba = Rgba { r: 0x3B, g: 0x82, b: 0xF6, a: 1.0 };

/// Whether interactive affordances are drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderMode {
    /// Editor surface: selection outline, handles, and active guides.
    Preview,
    /// Flattened output: content only.
    Export,
}

/// A blurred, optionally offset copy drawn beneath a text pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Shadow {
    pub color: Rgba,
    /// Canvas2d `shadowBlur`, in pixels.
    pub blur_px: f64,
    pub offset_x: f64,
    pub offset_y: f64,
}

/// How a text pass puts ink down.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PassKind {
    Fill,
    /// Stroke centered on the glyph outline with round joins.
    Stroke { width_px: f64 },
}

/// One drawing pass of a text layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextPass {
    pub kind: PassKind,
    pub color: Rgba,
    pub shadow: Option<Shadow>,
}

/// Drawing passes for a text effect, scaled to `font_px`.
///
/// Both backends draw text only through these passes, in order.
#[must_use]
pub fn text_passes(effect: TextEffect, color: Rgba, font_px: f64) -> Vec<TextPass> {
    let em = |v: f64| v * font_px;
    let glow = |c: Rgba, blur: f64| Some(Shadow { color: c, blur_px: em(blur), offset_x: 0.0, offset_y: 0.0 });
    let fill = |c: Rgba, shadow: Option<Shadow>| TextPass { kind: PassKind::Fill, color: c, shadow };
    match effect {
        TextEffect::None => vec![fill(color, glow(BLACK.with_alpha(0.5), 0.1))],
        TextEffect::Shadow => {
            let shadow = Shadow { color: BLACK, blur_px: em(0.05), offset_x: em(0.08), offset_y: em(0.08) };
            vec![fill(color, Some(shadow))]
        }
        TextEffect::Outline => vec![
            TextPass { kind: PassKind::Stroke { width_px: em(0.08) }, color: BLACK, shadow: None },
            fill(color, None),
        ],
        TextEffect::Neon => vec![
            fill(color, glow(color, 0.8)),
            fill(color, glow(color, 0.4)),
            fill(WHITE, glow(color, 0.1)),
        ],
    }
}

/// A text layer ready to draw, centered on `center`.
#[derive(Debug, Clone, PartialEq)]
pub struct TextItem {
    pub id: ElementId,
    pub text: String,
    pub center: Point,
    pub font_px: f64,
    pub family: String,
    pub passes: Vec<TextPass>,
}

/// Soft halo around the zone, drawn outside the box only.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Glow {
    pub color: Rgba,
    pub blur_px: f64,
    pub spread_px: f64,
}

/// The partner zone ready to draw.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoneItem {
    pub rect: Bounds,
    pub radius_px: f64,
    pub fill: Rgba,
    /// Border drawn inside the box edge: `(width_px, color)`.
    pub border: Option<(f64, Rgba)>,
    pub glow: Option<Glow>,
}

/// Orientation of a guide line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    /// A vertical line at some x.
    Vertical,
    /// A horizontal line at some y.
    Horizontal,
}

/// A single draw command, in surface pixels.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawItem {
    BaseImage { rect: Bounds },
    Text(TextItem),
    Logo { id: ElementId, src: String, rect: Bounds },
    Zone(ZoneItem),
    Guide { axis: Axis, position: f64, start: f64, end: f64 },
    SelectionOutline { rect: Bounds },
    Handle { center: Point },
}

/// Everything to draw on a surface, bottom first.
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub size: Size,
    pub items: Vec<DrawItem>,
}

impl Scene {
    /// Distinct logo sources referenced by the scene, in draw order.
    #[must_use]
    pub fn logo_sources(&self) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::new();
        for item in &self.items {
            if let DrawItem::Logo { src, .. } = item {
                if !out.contains(&src.as_str()) {
                    out.push(src);
                }
            }
        }
        out
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Build the draw list for `snapshot` on a surface of `surface` pixels.
///
/// Order: base image, text layers, canvas logos, zone, zone logos, then
/// (preview only) selection outline, handles, and guides. A degenerate
/// surface yields an empty scene.
#[must_use]
pub fn build_scene(
    snapshot: &Snapshot,
    surface: Size,
    mode: RenderMode,
    ui: Option<&UiState>,
    measure: &dyn TextMeasure,
) -> Scene {
    let mut items = Vec::new();
    if surface.is_degenerate() {
        return Scene { size: surface, items };
    }

    items.push(DrawItem::BaseImage { rect: Bounds { left: 0.0, top: 0.0, right: surface.width, bottom: surface.height } });

    for layer in snapshot.text_layers.iter().filter(|l| l.is_drawable()) {
        items.push(DrawItem::Text(text_item(layer, surface)));
    }

    for logo in snapshot.partner_logos.iter().filter(|l| l.is_visible && l.container == Container::Canvas) {
        let rect = bounds_to_absolute(surface, &logo_bounds(logo, surface));
        items.push(DrawItem::Logo { id: logo.id, src: logo.src.clone(), rect });
    }

    let zone = snapshot.partner_zone.as_ref().filter(|z| z.is_visible);
    if let Some(zone) = zone {
        items.push(DrawItem::Zone(zone_item(zone, surface)));
        for logo in snapshot.partner_logos.iter().filter(|l| l.is_visible && l.container == Container::Zone) {
            if let Some(pct) = logo_canvas_bounds(logo, Some(zone), surface) {
                items.push(DrawItem::Logo { id: logo.id, src: logo.src.clone(), rect: bounds_to_absolute(surface, &pct) });
            }
        }
    }

    if mode == RenderMode::Preview {
        if let Some(ui) = ui {
            push_affordances(&mut items, snapshot, surface, ui, measure);
        }
    }

    Scene { size: surface, items }
}

fn text_item(layer: &TextLayer, surface: Size) -> TextItem {
    let px = font_px(layer, surface);
    let color = color::parse_or(&layer.color, WHITE);
    TextItem {
        id: layer.id,
        text: layer.text.clone(),
        center: to_absolute(surface, Point::new(layer.x, layer.y)),
        font_px: px,
        family: layer.font_family.clone(),
        passes: text_passes(layer.effect, color, px),
    }
}

fn zone_item(zone: &PartnerZone, surface: Size) -> ZoneItem {
    let rect = bounds_to_absolute(surface, &zone_bounds(zone));
    let canvas_pct = |v: f64| v / 100.0 * surface.height;
    let radius_px = (rect.height() * zone.border_radius / 100.0).min(rect.width() / 2.0).min(rect.height() / 2.0);

    let border_color = color::parse_or(&zone.border_color, BLACK.with_alpha(0.0));
    let border_px = canvas_pct(zone.border_width);
    let border = (border_px > 0.0 && !border_color.is_transparent()).then_some((border_px, border_color));

    let glow_color = color::parse_or(&zone.shadow_color, BLACK.with_alpha(0.0));
    let glow = Glow { color: glow_color, blur_px: canvas_pct(zone.shadow_blur), spread_px: canvas_pct(zone.shadow_spread) };
    let glow = (!glow_color.is_transparent() && (glow.blur_px > 0.0 || glow.spread_px > 0.0)).then_some(glow);

    ZoneItem { rect, radius_px, fill: color::zone_fill(&zone.background_color, zone.opacity), border, glow }
}

fn push_affordances(items: &mut Vec<DrawItem>, snapshot: &Snapshot, surface: Size, ui: &UiState, measure: &dyn TextMeasure) {
    if let Some(target) = ui.selected {
        if let Some(rect) = target_bounds_px(target, snapshot, surface, measure) {
            items.push(DrawItem::SelectionOutline { rect });
            if has_handles(target) {
                items.extend(handle_points(&rect).into_iter().map(|(_, center)| DrawItem::Handle { center }));
            }
        }
    }

    let lines = ui.guides.lines;
    match ui.guides.frame {
        GuideFrame::Canvas => {
            if let Some(x) = lines.x {
                let position = surface.width * x / 100.0;
                items.push(DrawItem::Guide { axis: Axis::Vertical, position, start: 0.0, end: surface.height });
            }
            if let Some(y) = lines.y {
                let position = surface.height * y / 100.0;
                items.push(DrawItem::Guide { axis: Axis::Horizontal, position, start: 0.0, end: surface.width });
            }
        }
        GuideFrame::Zone => {
            let Some(zone) = snapshot.partner_zone.as_ref().filter(|z| z.is_visible) else {
                return;
            };
            let rect = zone.rect();
            let zone_px = bounds_to_absolute(surface, &rect.bounds());
            if let Some(x) = lines.x {
                let position = to_absolute(surface, zone_to_canvas(&rect, Point::new(x, 0.0))).x;
                items.push(DrawItem::Guide { axis: Axis::Vertical, position, start: zone_px.top, end: zone_px.bottom });
            }
            if let Some(y) = lines.y {
                let position = to_absolute(surface, zone_to_canvas(&rect, Point::new(0.0, y))).y;
                items.push(DrawItem::Guide { axis: Axis::Horizontal, position, start: zone_px.left, end: zone_px.right });
            }
        }
    }
}
