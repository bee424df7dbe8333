//! Coordinate model: pixel/percent conversion and canvas/zone frame nesting.
//!
//! Every stored position and size is a percentage of the frame its element
//! lives in. The canvas frame spans the whole base image; the zone frame spans
//! the partner-zone rectangle, whose own geometry is in canvas percent.
//! [`zone_to_canvas`] and [`canvas_to_zone`] are the only functions that
//! resolve that nesting.

#[cfg(test)]
#[path = "coords_test.rs"]
mod coords_test;

/// A point in either pixel or percent space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Pixel size of a drawing surface or frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    #[must_use]
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Whether this size cannot be used to convert percentages.
    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        !(self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0)
    }
}

/// Axis-aligned box given by its four edges.
///
/// Used in percent space by the snapping and clamping code and in pixel
/// space by the renderer and hit-testing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

impl Bounds {
    /// Box centered on `center` with the given full width and height.
    #[must_use]
    pub fn from_center(center: Point, width: f64, height: f64) -> Self {
        Self {
            left: center.x - width / 2.0,
            top: center.y - height / 2.0,
            right: center.x + width / 2.0,
            bottom: center.y + height / 2.0,
        }
    }

    #[must_use]
    pub fn width(&self) -> f64 {
        self.right - self.left
    }

    #[must_use]
    pub fn height(&self) -> f64 {
        self.bottom - self.top
    }

    #[must_use]
    pub fn center(&self) -> Point {
        Point::new((self.left + self.right) / 2.0, (self.top + self.bottom) / 2.0)
    }

    /// Inclusive containment test.
    #[must_use]
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.left && p.x <= self.right && p.y >= self.top && p.y <= self.bottom
    }

    /// Shift every edge by `(dx, dy)`.
    #[must_use]
    pub fn translate(&self, dx: f64, dy: f64) -> Self {
        Self { left: self.left + dx, top: self.top + dy, right: self.right + dx, bottom: self.bottom + dy }
    }

    /// The (near, center, far) triple on the horizontal axis.
    #[must_use]
    pub fn x_points(&self) -> [f64; 3] {
        [self.left, (self.left + self.right) / 2.0, self.right]
    }

    /// The (near, center, far) triple on the vertical axis.
    #[must_use]
    pub fn y_points(&self) -> [f64; 3] {
        [self.top, (self.top + self.bottom) / 2.0, self.bottom]
    }
}

/// Partner-zone rectangle in canvas percent, center-based.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoneRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl ZoneRect {
    /// Top-left corner in canvas percent.
    #[must_use]
    pub fn top_left(&self) -> Point {
        Point::new(self.x - self.width / 2.0, self.y - self.height / 2.0)
    }

    /// Edges in canvas percent.
    #[must_use]
    pub fn bounds(&self) -> Bounds {
        Bounds::from_center(Point::new(self.x, self.y), self.width, self.height)
    }
}

/// Convert a percentage point to pixels within a frame of `frame` pixels.
#[must_use]
pub fn to_absolute(frame: Size, pct: Point) -> Point {
    Point::new(frame.width * pct.x / 100.0, frame.height * pct.y / 100.0)
}

/// Convert a pixel point to percent of a frame of `frame` pixels.
///
/// A degenerate frame maps every point to the origin.
#[must_use]
pub fn to_percent(frame: Size, px: Point) -> Point {
    if frame.is_degenerate() {
        return Point::new(0.0, 0.0);
    }
    Point::new(px.x / frame.width * 100.0, px.y / frame.height * 100.0)
}

/// Convert a zone-relative point to canvas percent.
#[must_use]
pub fn zone_to_canvas(zone: &ZoneRect, p: Point) -> Point {
    let origin = zone.top_left();
    Point::new(origin.x + zone.width * (p.x / 100.0), origin.y + zone.height * (p.y / 100.0))
}

/// Convert a canvas-percent point to zone-relative percent.
#[must_use]
pub fn canvas_to_zone(zone: &ZoneRect, p: Point) -> Point {
    let origin = zone.top_left();
    let x = if zone.width > 0.0 { (p.x - origin.x) * 100.0 / zone.width } else { 0.0 };
    let y = if zone.height > 0.0 { (p.y - origin.y) * 100.0 / zone.height } else { 0.0 };
    Point::new(x, y)
}

/// Map zone-relative bounds into canvas percent.
#[must_use]
pub fn zone_bounds_to_canvas(zone: &ZoneRect, b: &Bounds) -> Bounds {
    let tl = zone_to_canvas(zone, Point::new(b.left, b.top));
    let br = zone_to_canvas(zone, Point::new(b.right, b.bottom));
    Bounds { left: tl.x, top: tl.y, right: br.x, bottom: br.y }
}

/// Pixel size of the zone frame on a canvas of `canvas` pixels.
#[must_use]
pub fn zone_frame_size(zone: &ZoneRect, canvas: Size) -> Size {
    Size::new(canvas.width * zone.width / 100.0, canvas.height * zone.height / 100.0)
}

/// Map percent bounds in a frame of `frame` pixels to pixel bounds.
#[must_use]
pub fn bounds_to_absolute(frame: Size, b: &Bounds) -> Bounds {
    let tl = to_absolute(frame, Point::new(b.left, b.top));
    let br = to_absolute(frame, Point::new(b.right, b.bottom));
    Bounds { left: tl.x, top: tl.y, right: br.x, bottom: br.y }
}
