//! Text measurement seam.
//!
//! Text bounding boxes come from real glyph metrics: the browser's Canvas2d
//! `measureText` in the preview ([`crate::paint::CanvasMeasure`]) and the
//! loaded font files during export ([`crate::raster::FontBook`]).
//! [`ApproxMeasure`] is a deterministic stand-in used before fonts are known
//! and in tests.

/// Measured extent of a single line of text, in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextExtent {
    pub width: f64,
    pub height: f64,
}

/// Measures a single line of bold text set in `family` at `font_px` pixels.
pub trait TextMeasure {
    fn measure(&self, text: &str, family: &str, font_px: f64) -> TextExtent;
}

/// Fixed-advance approximation: 0.6 em per character, 1 em line box.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApproxMeasure;

/// Advance per character, in em.
const APPROX_ADVANCE_EM: f64 = 0.6;

impl TextMeasure for ApproxMeasure {
    #[allow(clippy::cast_precision_loss)]
    fn measure(&self, text: &str, _family: &str, font_px: f64) -> TextExtent {
        let chars = text.chars().count() as f64;
        TextExtent { width: chars * APPROX_ADVANCE_EM * font_px, height: font_px }
    }
}
