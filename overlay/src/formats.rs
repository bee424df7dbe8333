//! Target aspect ratios the overlay can be exported at.

#[cfg(test)]
#[path = "formats_test.rs"]
mod formats_test;

use serde::{Deserialize, Serialize};

use crate::consts::FORMAT_LONG_EDGE_PX;

/// Output format of an exported overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Format {
    #[serde(rename = "1:1")]
    Square,
    #[serde(rename = "2:3")]
    Poster,
    #[serde(rename = "4:5")]
    Portrait,
    #[serde(rename = "16:9")]
    Landscape,
    #[serde(rename = "9:16")]
    Story,
    #[serde(rename = "3:1")]
    Banner,
}

impl Format {
    /// Every format, in menu order.
    pub const ALL: [Self; 6] = [Self::Square, Self::Poster, Self::Portrait, Self::Landscape, Self::Story, Self::Banner];

    /// Short ratio identifier such as `"16:9"`.
    #[must_use]
    pub fn id(self) -> &'static str {
        match self {
            Self::Square => "1:1",
            Self::Poster => "2:3",
            Self::Portrait => "4:5",
            Self::Landscape => "16:9",
            Self::Story => "9:16",
            Self::Banner => "3:1",
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Square => "Square",
            Self::Poster => "Poster",
            Self::Portrait => "Portrait",
            Self::Landscape => "Landscape",
            Self::Story => "Story",
            Self::Banner => "Banner",
        }
    }

    /// Width and height terms of the ratio.
    #[must_use]
    pub fn ratio_terms(self) -> (u32, u32) {
        match self {
            Self::Square => (1, 1),
            Self::Poster => (2, 3),
            Self::Portrait => (4, 5),
            Self::Landscape => (16, 9),
            Self::Story => (9, 16),
            Self::Banner => (3, 1),
        }
    }

    /// Width ÷ height.
    #[must_use]
    pub fn ratio(self) -> f64 {
        let (w, h) = self.ratio_terms();
        f64::from(w) / f64::from(h)
    }

    /// Native pixel size: the long edge is fixed and the short edge is rounded down.
    #[must_use]
    pub fn native_size(self) -> (u32, u32) {
        let (w, h) = self.ratio_terms();
        if w >= h {
            (FORMAT_LONG_EDGE_PX, FORMAT_LONG_EDGE_PX * h / w)
        } else {
            (FORMAT_LONG_EDGE_PX * w / h, FORMAT_LONG_EDGE_PX)
        }
    }

    /// Look up a format by its ratio identifier.
    #[must_use]
    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.id() == id.trim())
    }

    /// Whether an image of `width`×`height` matches this ratio within `tolerance`.
    #[must_use]
    pub fn matches(self, width: u32, height: u32, tolerance: f64) -> bool {
        if height == 0 {
            return false;
        }
        (f64::from(width) / f64::from(height) - self.ratio()).abs() <= tolerance * self.ratio()
    }
}
