//! Input model: targets, handles, modifier keys, mouse buttons, and the gesture state machine.
//!
//! `InputState` is the active gesture being tracked between pointer-down and
//! pointer-up. Each active variant carries the pointer anchor and a copy of the
//! element's geometry at gesture start, so every move recomputes the element
//! from the initial anchor rather than accumulating per-event deltas, and
//! `Escape` can restore the starting geometry exactly.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use crate::coords::{Point, Size};
use crate::doc::{ElementId, PartnerZone};
use crate::snap::Guides;

/// An element that can be selected, dragged, or resized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Text(ElementId),
    Logo(ElementId),
    Zone,
}

/// Which frame a dragged element lives in, and so which siblings it snaps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragKind {
    Text,
    CanvasLogo,
    ZoneLogo,
    Zone,
}

/// Frame an active guide is expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GuideFrame {
    #[default]
    Canvas,
    Zone,
}

/// Anchor position for resize handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handle {
    N,
    Ne,
    E,
    Se,
    S,
    Sw,
    W,
    Nw,
}

impl Handle {
    /// All handles, clockwise from north.
    pub const ALL: [Self; 8] = [Self::N, Self::Ne, Self::E, Self::Se, Self::S, Self::Sw, Self::W, Self::Nw];

    #[must_use]
    pub fn moves_east(self) -> bool {
        matches!(self, Self::Ne | Self::E | Self::Se)
    }

    #[must_use]
    pub fn moves_west(self) -> bool {
        matches!(self, Self::Nw | Self::W | Self::Sw)
    }

    #[must_use]
    pub fn moves_north(self) -> bool {
        matches!(self, Self::Nw | Self::N | Self::Ne)
    }

    #[must_use]
    pub fn moves_south(self) -> bool {
        matches!(self, Self::Sw | Self::S | Self::Se)
    }

    /// Unit offset of the handle from the box center, in half-extents.
    #[must_use]
    pub fn offset(self) -> (f64, f64) {
        let x = if self.moves_east() {
            1.0
        } else if self.moves_west() {
            -1.0
        } else {
            0.0
        };
        let y = if self.moves_south() {
            1.0
        } else if self.moves_north() {
            -1.0
        } else {
            0.0
        };
        (x, y)
    }

    /// CSS cursor shown while hovering or dragging this handle.
    #[must_use]
    pub fn cursor(self) -> &'static str {
        match self {
            Self::N | Self::S => "ns-resize",
            Self::E | Self::W => "ew-resize",
            Self::Ne | Self::Sw => "nesw-resize",
            Self::Nw | Self::Se => "nwse-resize",
        }
    }
}

/// Keyboard/mouse modifier keys held during an event.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Copy, Default)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    /// Alt / Option held: drag without snapping.
    pub alt: bool,
    pub meta: bool,
}

/// Mouse button identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    /// Left mouse button, touch, or pen contact.
    Primary,
    Middle,
    Secondary,
}

/// A keyboard key as reported by the browser (e.g. `"Delete"`, `"Escape"`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Key(pub String);

/// Guides shown while a drag is snapping.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ActiveGuides {
    pub frame: GuideFrame,
    pub lines: Guides,
}

/// Persistent UI state visible to the renderer.
#[derive(Debug, Clone, Default)]
pub struct UiState {
    /// The currently selected element, if any.
    pub selected: Option<Target>,
    /// Guides from the latest drag move; empty when idle.
    pub guides: ActiveGuides,
}

/// Geometry captured at the start of a resize.
#[derive(Debug, Clone, PartialEq)]
pub enum ResizeOrigin {
    Zone(PartnerZone),
    Logo {
        /// Width in percent of the container frame.
        width: f64,
        /// Center in percent of the container frame.
        center: Point,
    },
}

/// Internal state for the input state machine.
#[derive(Debug, Clone, Default)]
pub enum InputState {
    /// No gesture in progress; waiting for the next pointer-down.
    #[default]
    Idle,
    /// The user is moving an element across its frame.
    Dragging {
        target: Target,
        kind: DragKind,
        /// Surface-pixel position of the pointer at pointer-down.
        start: Point,
        /// Element center at pointer-down, in percent of its frame.
        origin: Point,
        /// Pixel size of the element's frame at pointer-down.
        frame: Size,
    },
    /// The user is resizing the zone or a logo by one of its eight handles.
    Resizing {
        target: Target,
        handle: Handle,
        /// Surface-pixel position of the pointer at pointer-down.
        start: Point,
        initial: ResizeOrigin,
        /// Pixel size of the element's frame at pointer-down.
        frame: Size,
    },
}

impl InputState {
    /// Whether a gesture is open.
    #[must_use]
    pub fn is_active(&self) -> bool {
        !matches!(self, Self::Idle)
    }

    /// The element the open gesture acts on.
    #[must_use]
    pub fn target(&self) -> Option<Target> {
        match self {
            Self::Idle => None,
            Self::Dragging { target, .. } | Self::Resizing { target, .. } => Some(*target),
        }
    }
}
