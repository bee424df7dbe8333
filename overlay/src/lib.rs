//! Layout engine for branded overlays on a generated base image.
//!
//! This crate compiles to WebAssembly for the browser editor and to a native
//! library for the exporter. It owns the full lifecycle of an overlay layout:
//! the percentage-based document model, translating raw pointer events into
//! drag/resize gestures with snap-to-guide alignment, moving logos between the
//! canvas and the partner zone, and drawing the same layout either into a
//! responsively sized preview surface or into a native-resolution raster.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | Top-level engine and testable [`engine::EngineCore`] |
//! | [`doc`] | Text layers, partner zone, partner logos, and the snapshot store |
//! | [`coords`] | Pixel/percent conversions and canvas/zone frame nesting |
//! | [`geometry`] | Element bounds and clamping rules |
//! | [`measure`] | Text measurement seam shared by the controller and renderers |
//! | [`snap`] | Snap-to-guide alignment (pure) |
//! | [`input`] | Input event types and the gesture state machine |
//! | [`hit`] | Hit-testing against elements and resize handles |
//! | [`containment`] | Reparenting logos between canvas and zone |
//! | [`render`] | Scene building for both preview and export |
//! | [`paint`] | Canvas2d backend for the preview surface |
//! | [`raster`] | RGBA backend for native-resolution export |
//! | [`export`] | Asset loading and the read-then-draw export pipeline |
//! | [`color`] | CSS color parsing |
//! | [`formats`] | Target aspect ratios and their native sizes |
//! | [`consts`] | Shared numeric constants (snap threshold, limits, defaults) |

pub mod color;
pub mod consts;
pub mod containment;
pub mod coords;
pub mod doc;
pub mod engine;
pub mod export;
pub mod formats;
pub mod geometry;
pub mod hit;
pub mod input;
pub mod measure;
pub mod paint;
pub mod raster;
pub mod render;
pub mod snap;
