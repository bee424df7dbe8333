//! Element bounds and clamping rules, all in percent of the element's frame.
//!
//! Positions are centers. Text extents come from a [`TextMeasure`]; logo
//! heights are derived from width, aspect ratio, and the container frame's
//! pixel proportions. Only the frame's aspect matters for the results here, so
//! clamping agrees between a small preview and a large export.

#[cfg(test)]
#[path = "geometry_test.rs"]
mod geometry_test;

use crate::consts::{
    LOGO_MAX_WIDTH_PCT, LOGO_MIN_WIDTH_PCT, TEXT_PADDING_EM, ZONE_MIN_HEIGHT_PCT, ZONE_MIN_WIDTH_PCT,
};
use crate::coords::{Bounds, Point, Size, zone_frame_size};
use crate::doc::{Container, PartnerLogo, PartnerZone, Snapshot, TextLayer};
use crate::measure::TextMeasure;

/// Clamp `v` into `[lo, hi]`; an empty range yields its midpoint.
#[must_use]
pub fn clamp_span(v: f64, lo: f64, hi: f64) -> f64 {
    if lo > hi {
        return (lo + hi) / 2.0;
    }
    v.max(lo).min(hi)
}

/// Clamp a center so a span of `half` on each side stays within `[0, 100]`.
#[must_use]
pub fn clamp_center(center: f64, half: f64) -> f64 {
    clamp_span(center, half, 100.0 - half)
}

// =============================================================
// Text
// =============================================================

/// Font size in pixels on a canvas of `canvas` pixels.
#[must_use]
pub fn font_px(layer: &TextLayer, canvas: Size) -> f64 {
    layer.font_size / 100.0 * canvas.height
}

/// Full width and height of a text box in canvas percent.
#[must_use]
pub fn text_size_pct(layer: &TextLayer, canvas: Size, measure: &dyn TextMeasure) -> (f64, f64) {
    if canvas.is_degenerate() {
        return (0.0, 0.0);
    }
    let px = font_px(layer, canvas);
    let extent = measure.measure(&layer.text, &layer.font_family, px);
    let width_px = extent.width + 2.0 * TEXT_PADDING_EM * px;
    (width_px / canvas.width * 100.0, extent.height / canvas.height * 100.0)
}

/// Text box bounds in canvas percent.
#[must_use]
pub fn text_bounds(layer: &TextLayer, canvas: Size, measure: &dyn TextMeasure) -> Bounds {
    let (w, h) = text_size_pct(layer, canvas, measure);
    Bounds::from_center(Point::new(layer.x, layer.y), w, h)
}

/// Keep a text layer's whole box inside the canvas.
pub fn clamp_text_layer(layer: &mut TextLayer, canvas: Size, measure: &dyn TextMeasure) {
    let (w, h) = text_size_pct(layer, canvas, measure);
    layer.x = clamp_center(layer.x, w / 2.0);
    layer.y = clamp_center(layer.y, h / 2.0);
}

// =============================================================
// Logos
// =============================================================

/// Derived logo height in percent of a container of `container` pixels.
#[must_use]
pub fn logo_height_pct(width_pct: f64, aspect_ratio: f64, container: Size) -> f64 {
    if container.is_degenerate() || aspect_ratio <= 0.0 {
        return 0.0;
    }
    width_pct * container.width / (aspect_ratio * container.height)
}

/// Widest a logo may be while its derived height still fits the container.
#[must_use]
pub fn max_logo_width_pct(aspect_ratio: f64, container: Size) -> f64 {
    if container.is_degenerate() {
        return LOGO_MAX_WIDTH_PCT;
    }
    (100.0 * aspect_ratio * container.height / container.width).min(LOGO_MAX_WIDTH_PCT)
}

/// Logo bounds in percent of its own container.
#[must_use]
pub fn logo_bounds(logo: &PartnerLogo, container: Size) -> Bounds {
    let h = logo_height_pct(logo.width, logo.aspect_ratio(), container);
    Bounds::from_center(Point::new(logo.x, logo.y), logo.width, h)
}

/// Clamp a logo's width and center inside its container.
pub fn clamp_logo(logo: &mut PartnerLogo, container: Size) {
    let max = max_logo_width_pct(logo.aspect_ratio(), container);
    logo.width = logo.width.min(max).max(LOGO_MIN_WIDTH_PCT);
    let h = logo_height_pct(logo.width, logo.aspect_ratio(), container);
    logo.x = clamp_center(logo.x, logo.width / 2.0);
    logo.y = clamp_center(logo.y, h / 2.0);
}

/// Pixel size of the frame a logo lives in, if that frame exists.
#[must_use]
pub fn container_size(container: Container, zone: Option<&PartnerZone>, canvas: Size) -> Option<Size> {
    match container {
        Container::Canvas => Some(canvas),
        Container::Zone => zone.map(|z| zone_frame_size(&z.rect(), canvas)),
    }
}

// =============================================================
// Zone
// =============================================================

/// Zone bounds in canvas percent.
#[must_use]
pub fn zone_bounds(zone: &PartnerZone) -> Bounds {
    zone.rect().bounds()
}

/// Keep the zone at a practical size and fully on the canvas.
pub fn clamp_zone(zone: &mut PartnerZone) {
    zone.width = clamp_span(zone.width, ZONE_MIN_WIDTH_PCT, 100.0);
    zone.height = clamp_span(zone.height, ZONE_MIN_HEIGHT_PCT, 100.0);
    zone.x = clamp_center(zone.x, zone.width / 2.0);
    zone.y = clamp_center(zone.y, zone.height / 2.0);
}

// =============================================================
// Whole layout
// =============================================================

/// Clamp every element of a restored layout for a canvas of `canvas` pixels.
///
/// The zone is clamped even on a degenerate canvas since its limits are pure
/// percentages. Zone logos are clamped in the zone frame. Logos whose frame
/// does not exist (zone logos without a zone) are left alone.
pub fn clamp_snapshot(snapshot: &mut Snapshot, canvas: Size, measure: &dyn TextMeasure) {
    if let Some(zone) = snapshot.partner_zone.as_mut() {
        clamp_zone(zone);
    }
    if canvas.is_degenerate() {
        return;
    }
    for layer in &mut snapshot.text_layers {
        clamp_text_layer(layer, canvas, measure);
    }
    for logo in &mut snapshot.partner_logos {
        let frame = container_size(logo.container, snapshot.partner_zone.as_ref(), canvas);
        if let Some(frame) = frame.filter(|f| !f.is_degenerate()) {
            clamp_logo(logo, frame);
        }
    }
}
