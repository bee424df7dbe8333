use std::collections::HashMap;

use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, HtmlImageElement};

use crate::consts::{LOGO_MIN_WIDTH_PX, SNAP_THRESHOLD_PCT, ZONE_MIN_HEIGHT_PCT, ZONE_MIN_WIDTH_PCT};
use crate::containment::reparent_logo;
use crate::coords::{Bounds, Point, Size, zone_frame_size};
use crate::doc::{
    Container, DocStore, ElementId, LayoutError, LogoPatch, PartnerZone, Snapshot, TextLayerPatch, TitleTexts,
    ZonePatch,
};
use crate::geometry::{
    clamp_logo, clamp_snapshot, clamp_span, clamp_text_layer, clamp_zone, container_size, logo_bounds, text_bounds,
    zone_bounds,
};
use crate::hit::{Hit, HitPart, hit_test};
use crate::input::{
    ActiveGuides, Button, DragKind, GuideFrame, Handle, InputState, Key, Modifiers, ResizeOrigin, Target, UiState,
};
use crate::measure::{ApproxMeasure, TextMeasure};
use crate::paint::{self, CanvasMeasure};
use crate::render::{RenderMode, Scene, build_scene};
use crate::snap::snap;

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

/// Actions returned from input handlers for the host to process.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    TextLayerUpdated(ElementId),
    LogoUpdated(ElementId),
    ZoneUpdated,
    ElementDeleted(Target),
    SelectionChanged(Option<Target>),
    SetCursor(String),
    RenderNeeded,
}

/// Core engine state: all logic that doesn't depend on the canvas element.
///
/// Separated from `Engine` so it can be tested without WASM/browser dependencies.
pub struct EngineCore {
    pub doc: DocStore,
    pub ui: UiState,
    pub input: InputState,
    surface: Size,
    measure: Box<dyn TextMeasure>,
    exporting: bool,
}

impl Default for EngineCore {
    fn default() -> Self {
        Self {
            doc: DocStore::new(),
            ui: UiState::default(),
            input: InputState::default(),
            surface: Size::new(0.0, 0.0),
            measure: Box::new(ApproxMeasure),
            exporting: false,
        }
    }
}

impl EngineCore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Engine core measuring text with `measure`.
    #[must_use]
    pub fn with_measure(measure: Box<dyn TextMeasure>) -> Self {
        Self { measure, ..Self::default() }
    }

    // --- Data inputs ---

    /// Replace the layout with a restored snapshot and reset the session.
    pub fn load_snapshot(&mut self, mut snapshot: Snapshot) -> Vec<Action> {
        clamp_snapshot(&mut snapshot, self.surface, self.measure.as_ref());
        self.doc.load_snapshot(snapshot);
        self.input = InputState::Idle;
        self.ui = UiState::default();
        vec![Action::SelectionChanged(None), Action::RenderNeeded]
    }

    /// Report the preview surface size in CSS pixels.
    ///
    /// A degenerate size parks the engine: nothing renders and pointer input
    /// is ignored until a usable size arrives.
    pub fn set_surface_size(&mut self, width: f64, height: f64) -> Vec<Action> {
        self.surface = Size::new(width, height);
        if self.surface.is_degenerate() {
            tracing::warn!(width, height, "degenerate surface size");
            return vec![Action::RenderNeeded];
        }
        self.clamp_surface_dependent();
        vec![Action::RenderNeeded]
    }

    // --- Export lock ---

    /// Freeze the layout for export and hand out the snapshot to draw.
    ///
    /// An open gesture is committed as if the pointer were released.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::ExportPending`] if an export is already running.
    pub fn begin_export(&mut self) -> Result<Snapshot, LayoutError> {
        if self.exporting {
            return Err(LayoutError::ExportPending);
        }
        self.end_gesture();
        self.exporting = true;
        tracing::debug!("export started; layout locked");
        Ok(self.doc.snapshot().clone())
    }

    /// Release the export lock.
    pub fn end_export(&mut self) {
        self.exporting = false;
        tracing::debug!("export finished; layout unlocked");
    }

    #[must_use]
    pub fn is_exporting(&self) -> bool {
        self.exporting
    }

    // --- Direct edits ---

    /// Append a user text layer.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::ExportPending`] while an export is running.
    pub fn add_text_layer(&mut self) -> Result<ElementId, LayoutError> {
        if self.exporting {
            return Err(LayoutError::ExportPending);
        }
        let id = self.doc.add_custom_text_layer();
        self.clamp_text(&id);
        Ok(id)
    }

    /// Replace all text layers with the four defaults.
    pub fn initialize_text_layers(&mut self, texts: &TitleTexts) -> Vec<Action> {
        if self.exporting {
            return Vec::new();
        }
        self.doc.initialize_text_layers(texts);
        if matches!(self.ui.selected, Some(Target::Text(_))) {
            self.ui.selected = None;
        }
        self.clamp_surface_dependent();
        vec![Action::RenderNeeded]
    }

    /// Add a logo to the zone frame.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::ExportPending`] while an export is running, or
    /// [`LayoutError::InvalidAspectRatio`] for a bad aspect ratio.
    pub fn add_logo(&mut self, src: &str, name: &str, aspect_ratio: f64) -> Result<ElementId, LayoutError> {
        if self.exporting {
            return Err(LayoutError::ExportPending);
        }
        let id = self.doc.add_logo(src, name, aspect_ratio)?;
        self.clamp_logo_in_place(&id);
        Ok(id)
    }

    pub fn patch_text(&mut self, id: &ElementId, patch: &TextLayerPatch) -> Vec<Action> {
        if self.exporting || !self.doc.apply_text_patch(id, patch) {
            return Vec::new();
        }
        self.clamp_text(id);
        vec![Action::TextLayerUpdated(*id), Action::RenderNeeded]
    }

    /// Edit the zone. Zone logos keep their zone-relative coordinates.
    pub fn patch_zone(&mut self, patch: &ZonePatch) -> Vec<Action> {
        if self.exporting || !self.doc.apply_zone_patch(patch) {
            return Vec::new();
        }
        if let Some(zone) = self.doc.zone_mut() {
            clamp_zone(zone);
        }
        vec![Action::ZoneUpdated, Action::RenderNeeded]
    }

    pub fn patch_logo(&mut self, id: &ElementId, patch: &LogoPatch) -> Vec<Action> {
        if self.exporting || !self.doc.apply_logo_patch(id, patch) {
            return Vec::new();
        }
        self.clamp_logo_in_place(id);
        vec![Action::LogoUpdated(*id), Action::RenderNeeded]
    }

    pub fn set_all_text_visible(&mut self, visible: bool) -> Vec<Action> {
        if self.exporting {
            return Vec::new();
        }
        self.doc.set_all_text_visible(visible);
        vec![Action::RenderNeeded]
    }

    /// Create the default zone or flip its visibility.
    pub fn toggle_zone(&mut self) -> Vec<Action> {
        if self.exporting || self.input.is_active() {
            return Vec::new();
        }
        let visible = self.doc.toggle_zone();
        let mut actions = vec![Action::ZoneUpdated];
        if !visible && self.ui.selected.is_some_and(|t| self.is_hidden_with_zone(t)) {
            self.ui.selected = None;
            actions.push(Action::SelectionChanged(None));
        }
        actions.push(Action::RenderNeeded);
        actions
    }

    /// Move a logo between the canvas and the zone.
    pub fn reparent(&mut self, id: &ElementId, container: Container) -> Vec<Action> {
        if self.exporting || self.input.is_active() || self.surface.is_degenerate() {
            return Vec::new();
        }
        if !reparent_logo(&mut self.doc, id, container, self.surface) {
            return Vec::new();
        }
        vec![Action::LogoUpdated(*id), Action::RenderNeeded]
    }

    /// Delete a text layer or logo, or hide the zone.
    pub fn delete(&mut self, target: Target) -> Vec<Action> {
        if self.exporting || self.input.is_active() {
            return Vec::new();
        }
        let first = match target {
            Target::Text(id) => match self.doc.remove_text_layer(&id) {
                Some(_) => Action::ElementDeleted(target),
                None => return Vec::new(),
            },
            Target::Logo(id) => match self.doc.remove_logo(&id) {
                Some(_) => Action::ElementDeleted(target),
                None => return Vec::new(),
            },
            Target::Zone => match self.doc.zone_mut() {
                Some(zone) => {
                    zone.is_visible = false;
                    Action::ZoneUpdated
                }
                None => return Vec::new(),
            },
        };
        tracing::debug!(?target, "element deleted");
        let mut actions = vec![first];
        if self.ui.selected.is_some_and(|t| t == target || !self.exists(t) || self.is_hidden_with_zone(t)) {
            self.ui.selected = None;
            actions.push(Action::SelectionChanged(None));
        }
        actions.push(Action::RenderNeeded);
        actions
    }

    // --- Selection ---

    /// Change the highlighted element without starting a gesture.
    pub fn select(&mut self, target: Option<Target>) -> Vec<Action> {
        if self.input.is_active() || self.ui.selected == target {
            return Vec::new();
        }
        if target.is_some_and(|t| !self.exists(t)) {
            return Vec::new();
        }
        self.ui.selected = target;
        vec![Action::SelectionChanged(target), Action::RenderNeeded]
    }

    // --- Input events ---

    pub fn on_pointer_down(&mut self, pt: Point, button: Button, _modifiers: Modifiers) -> Vec<Action> {
        if self.exporting || self.surface.is_degenerate() || self.input.is_active() || button != Button::Primary {
            return Vec::new();
        }
        let hit = hit_test(pt, self.doc.snapshot(), self.surface, self.measure.as_ref(), self.ui.selected);
        let Some(Hit { target, part }) = hit else {
            if self.ui.selected.take().is_some() {
                return vec![Action::SelectionChanged(None), Action::RenderNeeded];
            }
            return Vec::new();
        };

        let started = match part {
            HitPart::Body => self.start_drag(target, pt),
            HitPart::Handle(handle) => self.start_resize(target, handle, pt),
        };
        let Some(cursor) = started else {
            return Vec::new();
        };

        let mut actions = Vec::new();
        if self.ui.selected != Some(target) {
            self.ui.selected = Some(target);
            actions.push(Action::SelectionChanged(Some(target)));
        }
        actions.push(Action::SetCursor(cursor.to_owned()));
        actions.push(Action::RenderNeeded);
        actions
    }

    pub fn on_pointer_move(&mut self, pt: Point, modifiers: Modifiers) -> Vec<Action> {
        if self.surface.is_degenerate() {
            return Vec::new();
        }
        match self.input.clone() {
            InputState::Idle => {
                let hit = hit_test(pt, self.doc.snapshot(), self.surface, self.measure.as_ref(), self.ui.selected);
                let cursor = match hit.map(|h| h.part) {
                    Some(HitPart::Handle(handle)) => handle.cursor(),
                    Some(HitPart::Body) => "move",
                    None => "default",
                };
                vec![Action::SetCursor(cursor.to_owned())]
            }
            InputState::Dragging { target, kind, start, origin, frame } => {
                if frame.is_degenerate() {
                    return Vec::new();
                }
                let proposed = Point::new(
                    origin.x + (pt.x - start.x) / frame.width * 100.0,
                    origin.y + (pt.y - start.y) / frame.height * 100.0,
                );
                self.drag_to(target, kind, proposed, !modifiers.alt)
            }
            InputState::Resizing { target, handle, start, initial, frame } => {
                let delta = Point::new(pt.x - start.x, pt.y - start.y);
                self.resize_to(target, handle, delta, &initial, frame)
            }
        }
    }

    pub fn on_pointer_up(&mut self, _pt: Point, _button: Button, _modifiers: Modifiers) -> Vec<Action> {
        if !self.end_gesture() {
            return Vec::new();
        }
        vec![Action::SetCursor("default".to_owned()), Action::RenderNeeded]
    }

    /// The host lost the pointer: close the gesture with its current geometry.
    pub fn on_pointer_cancel(&mut self) -> Vec<Action> {
        if !self.end_gesture() {
            return Vec::new();
        }
        vec![Action::SetCursor("default".to_owned()), Action::RenderNeeded]
    }

    pub fn on_key_down(&mut self, key: Key, _modifiers: Modifiers) -> Vec<Action> {
        match key.0.as_str() {
            "Escape" => {
                if self.input.is_active() {
                    self.revert_gesture()
                } else if self.ui.selected.take().is_some() {
                    vec![Action::SelectionChanged(None), Action::RenderNeeded]
                } else {
                    Vec::new()
                }
            }
            "Delete" | "Backspace" => match self.ui.selected {
                Some(target) => self.delete(target),
                None => Vec::new(),
            },
            _ => Vec::new(),
        }
    }

    // --- Queries ---

    /// The currently selected element, if any.
    #[must_use]
    pub fn selection(&self) -> Option<Target> {
        self.ui.selected
    }

    #[must_use]
    pub fn snapshot(&self) -> &Snapshot {
        self.doc.snapshot()
    }

    #[must_use]
    pub fn surface(&self) -> Size {
        self.surface
    }

    #[must_use]
    pub fn measure(&self) -> &dyn TextMeasure {
        self.measure.as_ref()
    }

    /// Preview scene for the current surface, including affordances.
    #[must_use]
    pub fn scene(&self) -> Scene {
        build_scene(self.doc.snapshot(), self.surface, RenderMode::Preview, Some(&self.ui), self.measure.as_ref())
    }

    // --- Gesture internals ---

    fn start_drag(&mut self, target: Target, pt: Point) -> Option<&'static str> {
        let (kind, origin, frame) = match target {
            Target::Text(id) => {
                let layer = self.doc.text_layer(&id)?;
                (DragKind::Text, Point::new(layer.x, layer.y), self.surface)
            }
            Target::Logo(id) => {
                let logo = self.doc.logo(&id)?;
                let frame = container_size(logo.container, self.doc.zone(), self.surface)?;
                let kind = match logo.container {
                    Container::Canvas => DragKind::CanvasLogo,
                    Container::Zone => DragKind::ZoneLogo,
                };
                (kind, Point::new(logo.x, logo.y), frame)
            }
            Target::Zone => {
                let zone = self.doc.zone()?;
                (DragKind::Zone, Point::new(zone.x, zone.y), self.surface)
            }
        };
        self.input = InputState::Dragging { target, kind, start: pt, origin, frame };
        self.ui.guides = ActiveGuides::default();
        tracing::debug!(?target, ?kind, "drag started");
        Some("move")
    }

    fn start_resize(&mut self, target: Target, handle: Handle, pt: Point) -> Option<&'static str> {
        let (initial, frame) = match target {
            Target::Zone => (ResizeOrigin::Zone(self.doc.zone()?.clone()), self.surface),
            Target::Logo(id) => {
                let logo = self.doc.logo(&id)?;
                let frame = container_size(logo.container, self.doc.zone(), self.surface)?;
                (ResizeOrigin::Logo { width: logo.width, center: Point::new(logo.x, logo.y) }, frame)
            }
            Target::Text(_) => return None,
        };
        self.input = InputState::Resizing { target, handle, start: pt, initial, frame };
        tracing::debug!(?target, ?handle, "resize started");
        Some(handle.cursor())
    }

    /// Close any open gesture. Returns whether one was open.
    fn end_gesture(&mut self) -> bool {
        let Some(target) = self.input.target() else {
            return false;
        };
        self.input = InputState::Idle;
        self.ui.guides = ActiveGuides::default();
        tracing::debug!(?target, "gesture ended");
        true
    }

    /// Restore the geometry captured at gesture start and close the gesture.
    fn revert_gesture(&mut self) -> Vec<Action> {
        let state = std::mem::take(&mut self.input);
        self.ui.guides = ActiveGuides::default();
        let updated = match state {
            InputState::Idle => return Vec::new(),
            InputState::Dragging { target, origin, .. } => {
                self.set_center(target, origin);
                target
            }
            InputState::Resizing { target, initial, .. } => {
                match (target, initial) {
                    (Target::Zone, ResizeOrigin::Zone(z0)) => {
                        if let Some(zone) = self.doc.zone_mut() {
                            zone.x = z0.x;
                            zone.y = z0.y;
                            zone.width = z0.width;
                            zone.height = z0.height;
                        }
                    }
                    (Target::Logo(id), ResizeOrigin::Logo { width, center }) => {
                        if let Some(logo) = self.doc.logo_mut(&id) {
                            logo.width = width;
                            logo.x = center.x;
                            logo.y = center.y;
                        }
                    }
                    _ => {}
                }
                target
            }
        };
        tracing::debug!(target = ?updated, "gesture reverted");
        vec![update_action(updated), Action::SetCursor("default".to_owned()), Action::RenderNeeded]
    }

    fn set_center(&mut self, target: Target, center: Point) {
        match target {
            Target::Text(id) => {
                if let Some(layer) = self.doc.text_layer_mut(&id) {
                    layer.x = center.x;
                    layer.y = center.y;
                }
            }
            Target::Logo(id) => {
                if let Some(logo) = self.doc.logo_mut(&id) {
                    logo.x = center.x;
                    logo.y = center.y;
                }
            }
            Target::Zone => {
                if let Some(zone) = self.doc.zone_mut() {
                    zone.x = center.x;
                    zone.y = center.y;
                }
            }
        }
    }

    /// Move the dragged element: clamp, snap, clamp, commit.
    fn drag_to(&mut self, target: Target, kind: DragKind, proposed: Point, snapping: bool) -> Vec<Action> {
        let (siblings, guide_frame) = match kind {
            DragKind::ZoneLogo => (self.zone_siblings(target), GuideFrame::Zone),
            DragKind::Text | DragKind::CanvasLogo | DragKind::Zone => (self.canvas_siblings(target), GuideFrame::Canvas),
        };
        let surface = self.surface;
        let measure = self.measure.as_ref();
        let mut guides = ActiveGuides { frame: guide_frame, ..ActiveGuides::default() };

        match target {
            Target::Text(id) => {
                let Some(mut layer) = self.doc.text_layer(&id).cloned() else {
                    return Vec::new();
                };
                layer.x = proposed.x;
                layer.y = proposed.y;
                clamp_text_layer(&mut layer, surface, measure);
                if snapping {
                    let result = snap(&text_bounds(&layer, surface, measure), &siblings, SNAP_THRESHOLD_PCT);
                    layer.x += result.dx;
                    layer.y += result.dy;
                    clamp_text_layer(&mut layer, surface, measure);
                    guides.lines = result.guides;
                }
                if let Some(slot) = self.doc.text_layer_mut(&id) {
                    *slot = layer;
                }
            }
            Target::Logo(id) => {
                let Some(mut logo) = self.doc.logo(&id).cloned() else {
                    return Vec::new();
                };
                let Some(frame) = container_size(logo.container, self.doc.zone(), surface) else {
                    return Vec::new();
                };
                logo.x = proposed.x;
                logo.y = proposed.y;
                clamp_logo(&mut logo, frame);
                if snapping {
                    let result = snap(&logo_bounds(&logo, frame), &siblings, SNAP_THRESHOLD_PCT);
                    logo.x += result.dx;
                    logo.y += result.dy;
                    clamp_logo(&mut logo, frame);
                    guides.lines = result.guides;
                }
                if let Some(slot) = self.doc.logo_mut(&id) {
                    *slot = logo;
                }
            }
            Target::Zone => {
                let Some(mut zone) = self.doc.zone().cloned() else {
                    return Vec::new();
                };
                zone.x = proposed.x;
                zone.y = proposed.y;
                clamp_zone(&mut zone);
                if snapping {
                    let result = snap(&zone_bounds(&zone), &siblings, SNAP_THRESHOLD_PCT);
                    zone.x += result.dx;
                    zone.y += result.dy;
                    clamp_zone(&mut zone);
                    guides.lines = result.guides;
                }
                if let Some(slot) = self.doc.zone_mut() {
                    *slot = zone;
                }
            }
        }
        self.ui.guides = guides;
        vec![update_action(target), Action::RenderNeeded]
    }

    fn resize_to(
        &mut self,
        target: Target,
        handle: Handle,
        delta_px: Point,
        initial: &ResizeOrigin,
        frame: Size,
    ) -> Vec<Action> {
        if frame.is_degenerate() {
            return Vec::new();
        }
        match (target, initial) {
            (Target::Zone, ResizeOrigin::Zone(z0)) => {
                let dx = delta_px.x / frame.width * 100.0;
                let dy = delta_px.y / frame.height * 100.0;
                let Some(zone) = self.doc.zone_mut() else {
                    return Vec::new();
                };
                resize_zone(zone, z0, handle, dx, dy);
            }
            (Target::Logo(id), ResizeOrigin::Logo { width, center }) => {
                let Some(logo) = self.doc.logo_mut(&id) else {
                    return Vec::new();
                };
                let delta_w_px = if handle.moves_east() {
                    delta_px.x
                } else if handle.moves_west() {
                    -delta_px.x
                } else if handle.moves_south() {
                    delta_px.y * logo.aspect_ratio()
                } else {
                    -delta_px.y * logo.aspect_ratio()
                };
                let width_px = (width / 100.0 * frame.width + delta_w_px).max(LOGO_MIN_WIDTH_PX);
                logo.width = width_px / frame.width * 100.0;
                logo.x = center.x;
                logo.y = center.y;
                clamp_logo(logo, frame);
            }
            _ => return Vec::new(),
        }
        vec![update_action(target), Action::RenderNeeded]
    }

    /// Sibling bounds for canvas-frame targets: text, canvas logos, and the zone.
    fn canvas_siblings(&self, exclude: Target) -> Vec<Bounds> {
        let surface = self.surface;
        let measure = self.measure.as_ref();
        let mut out = Vec::new();
        for layer in self.doc.text_layers().iter().filter(|l| l.is_drawable()) {
            if exclude != Target::Text(layer.id) {
                out.push(text_bounds(layer, surface, measure));
            }
        }
        for logo in self.doc.logos().iter().filter(|l| l.is_visible && l.container == Container::Canvas) {
            if exclude != Target::Logo(logo.id) {
                out.push(logo_bounds(logo, surface));
            }
        }
        if let Some(zone) = self.doc.zone().filter(|z| z.is_visible) {
            if exclude != Target::Zone {
                out.push(zone_bounds(zone));
            }
        }
        out
    }

    /// Sibling bounds for a zone logo: the other visible zone logos, in zone percent.
    fn zone_siblings(&self, exclude: Target) -> Vec<Bounds> {
        let Some(zone) = self.doc.zone() else {
            return Vec::new();
        };
        let frame = zone_frame_size(&zone.rect(), self.surface);
        self.doc
            .logos()
            .iter()
            .filter(|l| l.is_visible && l.container == Container::Zone && exclude != Target::Logo(l.id))
            .map(|l| logo_bounds(l, frame))
            .collect()
    }

    // --- Clamping ---

    /// Re-clamp everything whose extent depends on the surface aspect.
    ///
    /// Zone logos are included: the zone frame's pixel aspect follows the
    /// surface, and with it their derived heights.
    fn clamp_surface_dependent(&mut self) {
        let surface = self.surface;
        if let Some(zone) = self.doc.zone_mut() {
            clamp_zone(zone);
        }
        if surface.is_degenerate() {
            return;
        }
        let measure = self.measure.as_ref();
        for layer in self.doc.text_layers_mut() {
            clamp_text_layer(layer, surface, measure);
        }
        let zone_frame = self.doc.zone().map(|z| zone_frame_size(&z.rect(), surface));
        for logo in self.doc.logos_mut() {
            let frame = match logo.container {
                Container::Canvas => Some(surface),
                Container::Zone => zone_frame,
            };
            if let Some(frame) = frame.filter(|f| !f.is_degenerate()) {
                clamp_logo(logo, frame);
            }
        }
    }

    fn clamp_text(&mut self, id: &ElementId) {
        let surface = self.surface;
        if surface.is_degenerate() {
            return;
        }
        let measure = self.measure.as_ref();
        if let Some(layer) = self.doc.text_layer_mut(id) {
            clamp_text_layer(layer, surface, measure);
        }
    }

    fn clamp_logo_in_place(&mut self, id: &ElementId) {
        let Some(container) = self.doc.logo(id).map(|l| l.container) else {
            return;
        };
        let Some(frame) = container_size(container, self.doc.zone(), self.surface) else {
            return;
        };
        if frame.is_degenerate() {
            return;
        }
        if let Some(logo) = self.doc.logo_mut(id) {
            clamp_logo(logo, frame);
        }
    }

    fn exists(&self, target: Target) -> bool {
        match target {
            Target::Text(id) => self.doc.text_layer(&id).is_some(),
            Target::Logo(id) => self.doc.logo(&id).is_some(),
            Target::Zone => self.doc.zone().is_some(),
        }
    }

    /// Whether `target` is invisible because the zone is hidden.
    fn is_hidden_with_zone(&self, target: Target) -> bool {
        if self.doc.zone().is_some_and(|z| z.is_visible) {
            return false;
        }
        match target {
            Target::Zone => true,
            Target::Logo(id) => self.doc.logo(&id).is_some_and(|l| l.container == Container::Zone),
            Target::Text(_) => false,
        }
    }
}

fn update_action(target: Target) -> Action {
    match target {
        Target::Text(id) => Action::TextLayerUpdated(id),
        Target::Logo(id) => Action::LogoUpdated(id),
        Target::Zone => Action::ZoneUpdated,
    }
}

/// Apply a handle drag of `(dx, dy)` canvas percent to the zone captured as `z0`.
///
/// East and south grow around the fixed center; west and north move that edge
/// while the opposite edge stays put.
fn resize_zone(zone: &mut PartnerZone, z0: &PartnerZone, handle: Handle, dx: f64, dy: f64) {
    let b0 = zone_bounds(z0);
    if handle.moves_east() {
        zone.width = z0.width + dx;
        zone.x = z0.x;
    } else if handle.moves_west() {
        zone.width = clamp_span(z0.width - dx, ZONE_MIN_WIDTH_PCT, b0.right);
        zone.x = b0.right - zone.width / 2.0;
    }
    if handle.moves_south() {
        zone.height = z0.height + dy;
        zone.y = z0.y;
    } else if handle.moves_north() {
        zone.height = clamp_span(z0.height - dy, ZONE_MIN_HEIGHT_PCT, b0.bottom);
        zone.y = b0.bottom - zone.height / 2.0;
    }
    clamp_zone(zone);
}

/// The full engine. Wraps `EngineCore` and owns the browser canvas element.
pub struct Engine {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    base: Option<HtmlImageElement>,
    images: HashMap<String, HtmlImageElement>,
    dpr: f64,
    pub core: EngineCore,
}

impl Engine {
    /// Create a new engine bound to the given canvas element.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the canvas has no 2d context.
    pub fn new(canvas: HtmlCanvasElement) -> Result<Self, JsValue> {
        let ctx = canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("canvas has no 2d context"))?
            .dyn_into::<CanvasRenderingContext2d>()?;
        let core = EngineCore::with_measure(Box::new(CanvasMeasure::new(ctx.clone())));
        Ok(Self { canvas, ctx, base: None, images: HashMap::new(), dpr: 1.0, core })
    }

    // --- Images ---

    /// Set the decoded base image drawn beneath the overlay.
    pub fn set_base_image(&mut self, image: HtmlImageElement) {
        self.base = Some(image);
    }

    /// Register a decoded logo raster under its `src`.
    pub fn register_image(&mut self, src: impl Into<String>, image: HtmlImageElement) {
        self.images.insert(src.into(), image);
    }

    // --- Surface ---

    /// Update the surface size in CSS pixels and the device pixel ratio.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn set_surface_size(&mut self, width_css: f64, height_css: f64, dpr: f64) -> Vec<Action> {
        self.dpr = if dpr.is_finite() && dpr > 0.0 { dpr } else { 1.0 };
        self.canvas.set_width((width_css.max(0.0) * self.dpr).round() as u32);
        self.canvas.set_height((height_css.max(0.0) * self.dpr).round() as u32);
        self.core.set_surface_size(width_css, height_css)
    }

    // --- Delegated data inputs ---

    pub fn load_snapshot(&mut self, snapshot: Snapshot) -> Vec<Action> {
        self.core.load_snapshot(snapshot)
    }

    pub fn select(&mut self, target: Option<Target>) -> Vec<Action> {
        self.core.select(target)
    }

    pub fn reparent(&mut self, id: &ElementId, container: Container) -> Vec<Action> {
        self.core.reparent(id, container)
    }

    // --- Input events ---

    pub fn on_pointer_down(&mut self, pt: Point, button: Button, modifiers: Modifiers) -> Vec<Action> {
        self.core.on_pointer_down(pt, button, modifiers)
    }

    pub fn on_pointer_move(&mut self, pt: Point, modifiers: Modifiers) -> Vec<Action> {
        self.core.on_pointer_move(pt, modifiers)
    }

    pub fn on_pointer_up(&mut self, pt: Point, button: Button, modifiers: Modifiers) -> Vec<Action> {
        self.core.on_pointer_up(pt, button, modifiers)
    }

    pub fn on_pointer_cancel(&mut self) -> Vec<Action> {
        self.core.on_pointer_cancel()
    }

    pub fn on_key_down(&mut self, key: Key, modifiers: Modifiers) -> Vec<Action> {
        self.core.on_key_down(key, modifiers)
    }

    // --- Render ---

    /// Draw the current state to the canvas.
    ///
    /// # Errors
    ///
    /// Returns `Err` if any `Canvas2D` call fails.
    pub fn render(&self) -> Result<(), JsValue> {
        let scene = self.core.scene();
        paint::draw(&self.ctx, &scene, self.base.as_ref(), &self.images, self.dpr)
    }

    // --- Delegated queries ---

    #[must_use]
    pub fn selection(&self) -> Option<Target> {
        self.core.selection()
    }

    #[must_use]
    pub fn snapshot(&self) -> &Snapshot {
        self.core.snapshot()
    }
}
