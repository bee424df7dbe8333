//! Snap-to-guide alignment.
//!
//! [`snap`] is pure: it looks at the proposed bounds of the element being
//! dragged and the bounds of its siblings in the same frame, and returns the
//! correction that aligns the closest pair of points on each axis. Candidate
//! points are the element's near edge, center, and far edge. Guides are the
//! frame landmarks followed by every sibling's near edge, center, and far edge.

#[cfg(test)]
#[path = "snap_test.rs"]
mod snap_test;

use crate::consts::LANDMARKS_PCT;
use crate::coords::Bounds;

/// Guide lines that won on each axis, in percent of the frame.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Guides {
    /// Vertical guide line position (an x value).
    pub x: Option<f64>,
    /// Horizontal guide line position (a y value).
    pub y: Option<f64>,
}

impl Guides {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.x.is_none() && self.y.is_none()
    }
}

/// Correction to add to the proposed position, plus the guides that produced it.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SnapResult {
    pub dx: f64,
    pub dy: f64,
    pub guides: Guides,
}

/// Align `proposed` to the nearest guide on each axis.
///
/// A pair only wins if its distance is strictly below `threshold`; among
/// equal distances the first pair in iteration order (candidate outer, guide
/// inner) is kept.
#[must_use]
pub fn snap(proposed: &Bounds, siblings: &[Bounds], threshold: f64) -> SnapResult {
    let x_guides = guide_values(siblings, Bounds::x_points);
    let y_guides = guide_values(siblings, Bounds::y_points);

    let mut result = SnapResult::default();
    if let Some((delta, guide)) = best_pair(proposed.x_points(), &x_guides, threshold) {
        result.dx = delta;
        result.guides.x = Some(guide);
    }
    if let Some((delta, guide)) = best_pair(proposed.y_points(), &y_guides, threshold) {
        result.dy = delta;
        result.guides.y = Some(guide);
    }
    result
}

fn guide_values(siblings: &[Bounds], points: fn(&Bounds) -> [f64; 3]) -> Vec<f64> {
    let mut out = LANDMARKS_PCT.to_vec();
    out.extend(siblings.iter().flat_map(points));
    out
}

fn best_pair(candidates: [f64; 3], guides: &[f64], threshold: f64) -> Option<(f64, f64)> {
    let mut best: Option<(f64, f64)> = None;
    let mut best_dist = threshold;
    for candidate in candidates {
        for &guide in guides {
            let dist = (guide - candidate).abs();
            if dist < best_dist {
                best_dist = dist;
                best = Some((guide - candidate, guide));
            }
        }
    }
    best
}
