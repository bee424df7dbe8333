//! Shared numeric constants for the overlay crate.

// ── Snapping ────────────────────────────────────────────────────

/// Snap distance in percent of the frame the element lives in.
pub const SNAP_THRESHOLD_PCT: f64 = 1.0;

/// Fixed alignment landmarks on each axis, in percent of the frame.
pub const LANDMARKS_PCT: [f64; 3] = [0.0, 50.0, 100.0];

// ── Hit-testing ─────────────────────────────────────────────────

/// Screen-space hit slop in pixels for resize handles.
pub const HANDLE_RADIUS_PX: f64 = 8.0;

/// Drawn radius of a resize handle in pixels.
pub const HANDLE_DRAW_RADIUS_PX: f64 = 5.0;

// ── Text ────────────────────────────────────────────────────────

/// Horizontal padding on each side of a text box, in em.
pub const TEXT_PADDING_EM: f64 = 0.2;

/// Font size limits in percent of canvas height.
pub const FONT_SIZE_MIN_PCT: f64 = 1.0;
pub const FONT_SIZE_MAX_PCT: f64 = 30.0;

// ── Partner zone ────────────────────────────────────────────────

/// Minimum zone width in percent of the canvas.
pub const ZONE_MIN_WIDTH_PCT: f64 = 10.0;

/// Minimum zone height in percent of the canvas.
pub const ZONE_MIN_HEIGHT_PCT: f64 = 5.0;

/// Corner rounding used when a stored zone has none, in percent of zone height.
pub const ZONE_DEFAULT_RADIUS_PCT: f64 = 10.0;

/// Upper bound for corner rounding, in percent of zone height.
pub const ZONE_MAX_RADIUS_PCT: f64 = 50.0;

// ── Partner logos ───────────────────────────────────────────────

/// Logo width limits in percent of the container frame.
pub const LOGO_MIN_WIDTH_PCT: f64 = 2.0;
pub const LOGO_MAX_WIDTH_PCT: f64 = 100.0;

/// Smallest width a resize gesture may produce, in surface pixels.
pub const LOGO_MIN_WIDTH_PX: f64 = 20.0;

/// Width given to a freshly added or reparented-without-room logo.
pub const LOGO_DEFAULT_WIDTH_PCT: f64 = 15.0;

// ── Formats ─────────────────────────────────────────────────────

/// Long edge of a format's native size, in pixels.
pub const FORMAT_LONG_EDGE_PX: u32 = 1024;
