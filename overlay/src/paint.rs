//! Canvas2d backend: draws a [`Scene`] onto the preview surface.
//!
//! This module and [`crate::engine::Engine`] are the only places that touch
//! [`web_sys::CanvasRenderingContext2d`]. It receives a finished scene and
//! produces pixels; it does not mutate any application state.
//!
//! All fallible `Canvas2D` calls propagate errors via `Result<(), JsValue>`.

use std::collections::HashMap;
use std::f64::consts::PI;

use wasm_bindgen::JsValue;
use web_sys::{CanvasRenderingContext2d, CanvasWindingRule, HtmlImageElement};

use crate::consts::HANDLE_DRAW_RADIUS_PX;
use crate::coords::{Bounds, Point};
use crate::measure::{ApproxMeasure, TextExtent, TextMeasure};
use crate::render::{Axis, DrawItem, GUIDE_COLOR, PassKind, SELECTION_COLOR, Scene, Shadow, TextItem, ZoneItem};

/// Guide dash segment length in CSS pixels.
const GUIDE_DASH_PX: f64 = 4.0;

/// Selection outline width in CSS pixels.
const SELECTION_LINE_PX: f64 = 1.5;

/// CSS `font` shorthand for a text layer.
#[must_use]
pub fn font_css(family: &str, font_px: f64) -> String {
    format!("bold {font_px}px \"{family}\"")
}

/// Draw `scene` at device pixel ratio `dpr`.
///
/// `base` is drawn under everything when present. Logos whose `src` has no
/// decoded image in `images` are skipped.
///
/// # Errors
///
/// Returns `Err` if any `Canvas2D` call fails.
pub fn draw(
    ctx: &CanvasRenderingContext2d,
    scene: &Scene,
    base: Option<&HtmlImageElement>,
    images: &HashMap<String, HtmlImageElement>,
    dpr: f64,
) -> Result<(), JsValue> {
    ctx.set_transform(dpr, 0.0, 0.0, dpr, 0.0, 0.0)?;
    ctx.clear_rect(0.0, 0.0, scene.size.width, scene.size.height);

    for item in &scene.items {
        match item {
            DrawItem::BaseImage { rect } => {
                if let Some(img) = base {
                    draw_image(ctx, img, rect)?;
                }
            }
            DrawItem::Text(text) => draw_text(ctx, text)?,
            DrawItem::Logo { src, rect, .. } => match images.get(src) {
                Some(img) => draw_image(ctx, img, rect)?,
                None => tracing::trace!(%src, "logo image not loaded yet"),
            },
            DrawItem::Zone(zone) => draw_zone(ctx, zone)?,
            DrawItem::Guide { axis, position, start, end } => draw_guide(ctx, *axis, *position, *start, *end)?,
            DrawItem::SelectionOutline { rect } => {
                ctx.set_stroke_style_str(&SELECTION_COLOR.to_css());
                ctx.set_line_width(SELECTION_LINE_PX);
                ctx.stroke_rect(rect.left, rect.top, rect.width(), rect.height());
            }
            DrawItem::Handle { center } => draw_handle(ctx, *center)?,
        }
    }
    Ok(())
}

fn draw_image(ctx: &CanvasRenderingContext2d, img: &HtmlImageElement, rect: &Bounds) -> Result<(), JsValue> {
    ctx.draw_image_with_html_image_element_and_dw_and_dh(img, rect.left, rect.top, rect.width(), rect.height())
}

// =============================================================
// Text
// =============================================================

fn draw_text(ctx: &CanvasRenderingContext2d, item: &TextItem) -> Result<(), JsValue> {
    ctx.save();
    ctx.set_font(&font_css(&item.family, item.font_px));
    ctx.set_text_align("center");
    ctx.set_text_baseline("middle");
    for pass in &item.passes {
        set_shadow(ctx, pass.shadow);
        match pass.kind {
            PassKind::Fill => {
                ctx.set_fill_style_str(&pass.color.to_css());
                ctx.fill_text(&item.text, item.center.x, item.center.y)?;
            }
            PassKind::Stroke { width_px } => {
                ctx.set_stroke_style_str(&pass.color.to_css());
                ctx.set_line_width(width_px);
                ctx.set_line_join("round");
                ctx.stroke_text(&item.text, item.center.x, item.center.y)?;
            }
        }
    }
    ctx.restore();
    Ok(())
}

fn set_shadow(ctx: &CanvasRenderingContext2d, shadow: Option<Shadow>) {
    match shadow {
        Some(s) => {
            ctx.set_shadow_color(&s.color.to_css());
            ctx.set_shadow_blur(s.blur_px);
            ctx.set_shadow_offset_x(s.offset_x);
            ctx.set_shadow_offset_y(s.offset_y);
        }
        None => {
            ctx.set_shadow_color("transparent");
            ctx.set_shadow_blur(0.0);
            ctx.set_shadow_offset_x(0.0);
            ctx.set_shadow_offset_y(0.0);
        }
    }
}

// =============================================================
// Zone
// =============================================================

fn draw_zone(ctx: &CanvasRenderingContext2d, zone: &ZoneItem) -> Result<(), JsValue> {
    let r = &zone.rect;

    if let Some(glow) = zone.glow {
        // Clip to everything outside the box, then fill the spread box with a blur.
        ctx.save();
        ctx.begin_path();
        let reach = glow.blur_px * 4.0 + glow.spread_px;
        ctx.rect(r.left - reach, r.top - reach, r.width() + reach * 2.0, r.height() + reach * 2.0);
        rounded_rect_path(ctx, r, zone.radius_px)?;
        ctx.clip_with_canvas_winding_rule(CanvasWindingRule::Evenodd);

        let spread = Bounds {
            left: r.left - glow.spread_px,
            top: r.top - glow.spread_px,
            right: r.right + glow.spread_px,
            bottom: r.bottom + glow.spread_px,
        };
        ctx.begin_path();
        rounded_rect_path(ctx, &spread, zone.radius_px + glow.spread_px)?;
        ctx.set_shadow_color(&glow.color.to_css());
        ctx.set_shadow_blur(glow.blur_px);
        ctx.set_fill_style_str(&glow.color.to_css());
        ctx.fill();
        ctx.restore();
    }

    ctx.begin_path();
    rounded_rect_path(ctx, r, zone.radius_px)?;
    ctx.set_fill_style_str(&zone.fill.to_css());
    ctx.fill();

    if let Some((width, color)) = zone.border {
        // Inset by half the width so the border sits inside the box edge.
        let half = width / 2.0;
        let inner = Bounds { left: r.left + half, top: r.top + half, right: r.right - half, bottom: r.bottom - half };
        ctx.begin_path();
        rounded_rect_path(ctx, &inner, (zone.radius_px - half).max(0.0))?;
        ctx.set_stroke_style_str(&color.to_css());
        ctx.set_line_width(width);
        ctx.stroke();
    }
    Ok(())
}

/// Append a closed rounded rectangle to the current path.
fn rounded_rect_path(ctx: &CanvasRenderingContext2d, r: &Bounds, radius: f64) -> Result<(), JsValue> {
    let radius = radius.max(0.0).min(r.width() / 2.0).min(r.height() / 2.0);
    ctx.move_to(r.left + radius, r.top);
    ctx.arc_to(r.right, r.top, r.right, r.bottom, radius)?;
    ctx.arc_to(r.right, r.bottom, r.left, r.bottom, radius)?;
    ctx.arc_to(r.left, r.bottom, r.left, r.top, radius)?;
    ctx.arc_to(r.left, r.top, r.right, r.top, radius)?;
    ctx.close_path();
    Ok(())
}

// =============================================================
// Affordances
// =============================================================

fn draw_guide(ctx: &CanvasRenderingContext2d, axis: Axis, position: f64, start: f64, end: f64) -> Result<(), JsValue> {
    ctx.save();
    ctx.set_stroke_style_str(&GUIDE_COLOR.to_css());
    ctx.set_line_width(1.0);
    let dash_array = js_sys::Array::new();
    dash_array.push(&GUIDE_DASH_PX.into());
    dash_array.push(&GUIDE_DASH_PX.into());
    ctx.set_line_dash(&dash_array)?;

    ctx.begin_path();
    match axis {
        Axis::Vertical => {
            ctx.move_to(position, start);
            ctx.line_to(position, end);
        }
        Axis::Horizontal => {
            ctx.move_to(start, position);
            ctx.line_to(end, position);
        }
    }
    ctx.stroke();
    ctx.set_line_dash(&js_sys::Array::new())?;
    ctx.restore();
    Ok(())
}

fn draw_handle(ctx: &CanvasRenderingContext2d, center: Point) -> Result<(), JsValue> {
    ctx.begin_path();
    ctx.arc(center.x, center.y, HANDLE_DRAW_RADIUS_PX, 0.0, 2.0 * PI)?;
    ctx.set_fill_style_str("#fff");
    ctx.fill();
    ctx.set_stroke_style_str(&SELECTION_COLOR.to_css());
    ctx.set_line_width(SELECTION_LINE_PX);
    ctx.stroke();
    Ok(())
}

// =============================================================
// Measurement
// =============================================================

/// Text measurement through the browser's `measureText`.
pub struct CanvasMeasure {
    ctx: CanvasRenderingContext2d,
}

impl CanvasMeasure {
    #[must_use]
    pub fn new(ctx: CanvasRenderingContext2d) -> Self {
        Self { ctx }
    }
}

impl TextMeasure for CanvasMeasure {
    fn measure(&self, text: &str, family: &str, font_px: f64) -> TextExtent {
        self.ctx.save();
        self.ctx.set_font(&font_css(family, font_px));
        let metrics = self.ctx.measure_text(text);
        self.ctx.restore();
        match metrics {
            Ok(m) => TextExtent { width: m.width(), height: font_px },
            Err(err) => {
                tracing::warn!(?err, "measureText failed; using approximation");
                ApproxMeasure.measure(text, family, font_px)
            }
        }
    }
}
