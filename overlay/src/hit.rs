//! Hit-testing in surface pixels.
//!
//! Order: the selected element's resize handles, zone logos, the zone body,
//! canvas logos, then text layers. Within each group the element drawn last
//! (topmost) wins. Hidden elements are never hit.

#[cfg(test)]
#[path = "hit_test.rs"]
mod hit_test;

use crate::consts::HANDLE_RADIUS_PX;
use crate::containment::{logo_canvas_bounds, zone_is_shown};
use crate::coords::{Bounds, Point, Size, bounds_to_absolute};
use crate::doc::{Container, Snapshot};
use crate::geometry::{text_bounds, zone_bounds};
use crate::input::{Handle, Target};
use crate::measure::TextMeasure;

/// Which part of an element was hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitPart {
    Body,
    Handle(Handle),
}

/// Result of a hit test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hit {
    pub target: Target,
    pub part: HitPart,
}

/// Whether a target exposes resize handles when selected.
#[must_use]
pub fn has_handles(target: Target) -> bool {
    matches!(target, Target::Logo(_) | Target::Zone)
}

/// Pixel bounds of a target on a surface of `surface` pixels, if it is shown.
#[must_use]
pub fn target_bounds_px(target: Target, doc: &Snapshot, surface: Size, measure: &dyn TextMeasure) -> Option<Bounds> {
    let pct = match target {
        Target::Text(id) => {
            let layer = doc.text_layer(&id).filter(|l| l.is_drawable())?;
            text_bounds(layer, surface, measure)
        }
        Target::Logo(id) => {
            let logo = doc.logo(&id).filter(|l| l.is_visible)?;
            logo_canvas_bounds(logo, doc.partner_zone.as_ref(), surface)?
        }
        Target::Zone => zone_bounds(doc.partner_zone.as_ref().filter(|z| z.is_visible)?),
    };
    Some(bounds_to_absolute(surface, &pct))
}

/// Pixel position of each resize handle on `bounds`.
#[must_use]
pub fn handle_points(bounds: &Bounds) -> [(Handle, Point); 8] {
    let c = bounds.center();
    let (hw, hh) = (bounds.width() / 2.0, bounds.height() / 2.0);
    Handle::ALL.map(|h| {
        let (ox, oy) = h.offset();
        (h, Point::new(c.x + ox * hw, c.y + oy * hh))
    })
}

/// Test which element (if any) is under `pt`, checking the selected element's handles first.
#[must_use]
pub fn hit_test(
    pt: Point,
    doc: &Snapshot,
    surface: Size,
    measure: &dyn TextMeasure,
    selected: Option<Target>,
) -> Option<Hit> {
    if surface.is_degenerate() {
        return None;
    }

    if let Some(target) = selected.filter(|t| has_handles(*t)) {
        if let Some(bounds) = target_bounds_px(target, doc, surface, measure) {
            for (handle, hp) in handle_points(&bounds) {
                if (pt.x - hp.x).hypot(pt.y - hp.y) <= HANDLE_RADIUS_PX {
                    return Some(Hit { target, part: HitPart::Handle(handle) });
                }
            }
        }
    }

    let body = |target: Target| {
        target_bounds_px(target, doc, surface, measure)
            .filter(|b| b.contains(pt))
            .map(|_| Hit { target, part: HitPart::Body })
    };

    if zone_is_shown(doc.partner_zone.as_ref()) {
        let mut zone_logos = doc.partner_logos.iter().rev().filter(|l| l.container == Container::Zone);
        if let Some(hit) = zone_logos.find_map(|l| body(Target::Logo(l.id))) {
            return Some(hit);
        }
        if let Some(hit) = body(Target::Zone) {
            return Some(hit);
        }
    }

    let mut canvas_logos = doc.partner_logos.iter().rev().filter(|l| l.container == Container::Canvas);
    if let Some(hit) = canvas_logos.find_map(|l| body(Target::Logo(l.id))) {
        return Some(hit);
    }

    doc.text_layers.iter().rev().find_map(|l| body(Target::Text(l.id)))
}
