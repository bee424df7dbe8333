//! Containment: which frame a logo lives in, and moving logos between frames.
//!
//! Reparenting keeps the logo where the user sees it. Its center is mapped
//! through the zone rectangle and its width rescaled by the zone's width share
//! of the canvas, then the result is clamped in the new frame.

#[cfg(test)]
#[path = "containment_test.rs"]
mod containment_test;

use crate::coords::{Bounds, Point, Size, canvas_to_zone, zone_bounds_to_canvas, zone_frame_size, zone_to_canvas};
use crate::doc::{Container, DocStore, ElementId, PartnerLogo, PartnerZone};
use crate::geometry::{clamp_logo, logo_bounds};

/// Partition logos into `(canvas, zone)` lists, keeping document order.
#[must_use]
pub fn split_logos(logos: &[PartnerLogo]) -> (Vec<&PartnerLogo>, Vec<&PartnerLogo>) {
    logos.iter().partition(|l| l.container == Container::Canvas)
}

/// Whether a zone-contained logo currently has a frame to render in.
#[must_use]
pub fn zone_is_shown(zone: Option<&PartnerZone>) -> bool {
    zone.is_some_and(|z| z.is_visible)
}

/// Logo bounds projected into canvas percent.
///
/// Returns `None` for a zone logo when the zone is missing or hidden.
#[must_use]
pub fn logo_canvas_bounds(logo: &PartnerLogo, zone: Option<&PartnerZone>, canvas: Size) -> Option<Bounds> {
    match logo.container {
        Container::Canvas => Some(logo_bounds(logo, canvas)),
        Container::Zone => {
            let zone = zone.filter(|z| z.is_visible)?;
            let rect = zone.rect();
            let local = logo_bounds(logo, zone_frame_size(&rect, canvas));
            Some(zone_bounds_to_canvas(&rect, &local))
        }
    }
}

/// Move a logo into `target`, recomputing its coordinates for the new frame.
///
/// Returns `false` without changing anything when the logo is unknown, it is
/// already in `target`, or there is no zone to move into or out of.
pub fn reparent_logo(doc: &mut DocStore, id: &ElementId, target: Container, canvas: Size) -> bool {
    let Some(rect) = doc.zone().map(PartnerZone::rect) else {
        return false;
    };
    if rect.width <= 0.0 || rect.height <= 0.0 {
        return false;
    }
    let Some(logo) = doc.logo_mut(id) else {
        return false;
    };
    if logo.container == target {
        return false;
    }

    let center = Point::new(logo.x, logo.y);
    let (moved, width) = match target {
        Container::Zone => (canvas_to_zone(&rect, center), logo.width * 100.0 / rect.width),
        Container::Canvas => (zone_to_canvas(&rect, center), logo.width * rect.width / 100.0),
    };
    logo.x = moved.x;
    logo.y = moved.y;
    logo.width = width;
    logo.container = target;

    let frame = match target {
        Container::Zone => zone_frame_size(&rect, canvas),
        Container::Canvas => canvas,
    };
    if !frame.is_degenerate() {
        clamp_logo(logo, frame);
    }
    tracing::debug!(%id, ?target, x = logo.x, y = logo.y, width = logo.width, "reparented logo");
    true
}
