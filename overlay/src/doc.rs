//! Document model: text layers, the partner zone, partner logos, and the store.
//!
//! This module defines the plain serializable records that make up an overlay
//! layout (`TextLayer`, `PartnerZone`, `PartnerLogo`), the `Snapshot` that
//! groups them as the editor's entire durable state, sparse-update types for
//! direct field edits (`TextLayerPatch`, `ZonePatch`, `LogoPatch`), and the
//! runtime store that owns the live layout (`DocStore`).
//!
//! Nothing here knows about pixels. Clamping that depends on the surface
//! aspect or on text metrics lives in [`crate::geometry`] and is applied by the
//! engine after every mutation.

#[cfg(test)]
#[path = "doc_test.rs"]
mod doc_test;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::consts::{
    FONT_SIZE_MAX_PCT, FONT_SIZE_MIN_PCT, LOGO_DEFAULT_WIDTH_PCT, ZONE_DEFAULT_RADIUS_PCT, ZONE_MAX_RADIUS_PCT,
};
use crate::coords::ZoneRect;

/// Unique identifier for a text layer or logo.
pub type ElementId = Uuid;

/// Error returned by fallible store operations.
#[derive(Debug, thiserror::Error)]
pub enum LayoutError {
    /// A logo's intrinsic aspect ratio must be finite and positive.
    #[error("invalid logo aspect ratio: {0}")]
    InvalidAspectRatio(f64),
    /// The layout is locked while an export reads it.
    #[error("layout is locked while an export is pending")]
    ExportPending,
}

/// Semantic role of a text layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TextRole {
    /// Main event title.
    #[serde(alias = "eventName")]
    Title,
    /// Baseline or slogan under the title.
    #[serde(alias = "baseline")]
    Subtitle,
    /// Free text such as a location or a date.
    #[serde(alias = "eventLocation", alias = "eventDate")]
    FreeText,
    /// Layer added by the user.
    Custom,
}

/// Readability effect applied to a text layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextEffect {
    /// Faint halo only.
    #[default]
    None,
    /// Hard drop shadow.
    Shadow,
    /// Dark outline around the glyphs.
    Outline,
    /// Colored glow with a bright core.
    Neon,
}

/// A floating text label on the canvas frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextLayer {
    pub id: ElementId,
    pub text: String,
    /// Center x in percent of the canvas width.
    pub x: f64,
    /// Center y in percent of the canvas height.
    pub y: f64,
    /// Font size in percent of the canvas height.
    pub font_size: f64,
    pub font_family: String,
    /// CSS color string.
    pub color: String,
    pub is_visible: bool,
    #[serde(rename = "type", alias = "role")]
    pub role: TextRole,
    #[serde(default)]
    pub effect: TextEffect,
}

impl TextLayer {
    /// Whether the layer produces any pixels.
    #[must_use]
    pub fn is_drawable(&self) -> bool {
        self.is_visible && !self.text.trim().is_empty()
    }
}

fn default_radius() -> f64 {
    ZONE_DEFAULT_RADIUS_PCT
}

fn default_transparent() -> String {
    "transparent".to_owned()
}

fn default_zone_fill() -> String {
    "#141414".to_owned()
}

fn default_opacity() -> f64 {
    0.1
}

fn default_true() -> bool {
    true
}

/// The optional rectangular area reserved for partner logos.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartnerZone {
    /// Center x in percent of the canvas width.
    pub x: f64,
    /// Center y in percent of the canvas height.
    pub y: f64,
    /// Width in percent of the canvas width.
    pub width: f64,
    /// Height in percent of the canvas height.
    pub height: f64,
    /// Background opacity in `[0, 1]`.
    #[serde(default = "default_opacity")]
    pub opacity: f64,
    #[serde(default = "default_true")]
    pub is_visible: bool,
    #[serde(default = "default_zone_fill")]
    pub background_color: String,
    /// Corner rounding in percent of the zone height.
    #[serde(default = "default_radius")]
    pub border_radius: f64,
    /// Border width in percent of the canvas height.
    #[serde(default)]
    pub border_width: f64,
    #[serde(default = "default_transparent")]
    pub border_color: String,
    /// Glow blur in percent of the canvas height.
    #[serde(default)]
    pub shadow_blur: f64,
    #[serde(default = "default_transparent")]
    pub shadow_color: String,
    /// Glow spread in percent of the canvas height.
    #[serde(default)]
    pub shadow_spread: f64,
}

impl Default for PartnerZone {
    fn default() -> Self {
        Self {
            x: 50.0,
            y: 85.0,
            width: 80.0,
            height: 15.0,
            opacity: 0.4,
            is_visible: true,
            background_color: "#FFFFFF".to_owned(),
            border_radius: ZONE_DEFAULT_RADIUS_PCT,
            border_width: 0.15,
            border_color: "#FFFFFF".to_owned(),
            shadow_blur: 1.0,
            shadow_color: "#4A4A4A".to_owned(),
            shadow_spread: 0.3,
        }
    }
}

impl PartnerZone {
    /// Geometry as a canvas-percent rectangle.
    #[must_use]
    pub fn rect(&self) -> ZoneRect {
        ZoneRect { x: self.x, y: self.y, width: self.width, height: self.height }
    }
}

/// Which frame a logo's coordinates are expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Container {
    /// Free placement on the canvas frame.
    Canvas,
    /// Placement inside the partner zone's frame.
    #[default]
    Zone,
}

/// A partner logo raster placed in the canvas or zone frame.
///
/// Height is never stored; it is derived from `width`, the aspect ratio, and
/// the container frame's pixel proportions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartnerLogo {
    pub id: ElementId,
    /// Opaque raster reference (data URL or asset path).
    pub src: String,
    pub name: String,
    /// Center x in percent of the container frame.
    pub x: f64,
    /// Center y in percent of the container frame.
    pub y: f64,
    /// Width in percent of the container frame.
    pub width: f64,
    aspect_ratio: f64,
    pub is_visible: bool,
    #[serde(default)]
    pub container: Container,
}

impl PartnerLogo {
    /// Create a logo centered in the zone frame at the default width.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::InvalidAspectRatio`] unless `aspect_ratio` is
    /// finite and positive.
    pub fn new(src: impl Into<String>, name: impl Into<String>, aspect_ratio: f64) -> Result<Self, LayoutError> {
        if !is_valid_aspect(aspect_ratio) {
            return Err(LayoutError::InvalidAspectRatio(aspect_ratio));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            src: src.into(),
            name: name.into(),
            x: 50.0,
            y: 50.0,
            width: LOGO_DEFAULT_WIDTH_PCT,
            aspect_ratio,
            is_visible: true,
            container: Container::Zone,
        })
    }

    /// Intrinsic width ÷ height, fixed at creation.
    #[must_use]
    pub fn aspect_ratio(&self) -> f64 {
        self.aspect_ratio
    }
}

fn is_valid_aspect(aspect: f64) -> bool {
    aspect.is_finite() && aspect > 0.0
}

/// The entire durable state of the editor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    #[serde(default)]
    pub text_layers: Vec<TextLayer>,
    #[serde(default)]
    pub partner_zone: Option<PartnerZone>,
    #[serde(default)]
    pub partner_logos: Vec<PartnerLogo>,
}

impl Snapshot {
    #[must_use]
    pub fn text_layer(&self, id: &ElementId) -> Option<&TextLayer> {
        self.text_layers.iter().find(|l| l.id == *id)
    }

    #[must_use]
    pub fn logo(&self, id: &ElementId) -> Option<&PartnerLogo> {
        self.partner_logos.iter().find(|l| l.id == *id)
    }
}

/// Sparse update for a text layer. Only present fields are applied.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextLayerPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_visible: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub effect: Option<TextEffect>,
}

/// Sparse update for the partner zone. Only present fields are applied.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZonePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_visible: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border_radius: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border_width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shadow_blur: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shadow_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shadow_spread: Option<f64>,
}

/// Sparse update for a logo. There is deliberately no height or aspect field.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogoPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_visible: Option<bool>,
}

/// Texts used to seed the four default layers.
#[derive(Debug, Clone)]
pub struct TitleTexts {
    pub title: String,
    pub subtitle: String,
    pub free_text_1: String,
    pub free_text_2: String,
}

impl Default for TitleTexts {
    fn default() -> Self {
        Self {
            title: "Main title".to_owned(),
            subtitle: "Subtitle / Slogan".to_owned(),
            free_text_1: "Free text 1".to_owned(),
            free_text_2: "Free text 2".to_owned(),
        }
    }
}

/// In-memory owner of the live layout.
#[derive(Debug, Default)]
pub struct DocStore {
    state: Snapshot,
}

impl DocStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole layout with a restored snapshot.
    ///
    /// Logos whose aspect ratio is not finite and positive are dropped.
    pub fn load_snapshot(&mut self, mut snapshot: Snapshot) {
        snapshot.partner_logos.retain(|logo| {
            let keep = is_valid_aspect(logo.aspect_ratio);
            if !keep {
                tracing::warn!(id = %logo.id, aspect = logo.aspect_ratio, "dropping logo with invalid aspect ratio");
            }
            keep
        });
        self.state = snapshot;
    }

    /// Read-only view of the current layout.
    #[must_use]
    pub fn snapshot(&self) -> &Snapshot {
        &self.state
    }

    // --- Text layers ---

    #[must_use]
    pub fn text_layers(&self) -> &[TextLayer] {
        &self.state.text_layers
    }

    #[must_use]
    pub fn text_layer(&self, id: &ElementId) -> Option<&TextLayer> {
        self.state.text_layer(id)
    }

    pub fn text_layer_mut(&mut self, id: &ElementId) -> Option<&mut TextLayer> {
        self.state.text_layers.iter_mut().find(|l| l.id == *id)
    }

    pub fn text_layers_mut(&mut self) -> &mut [TextLayer] {
        &mut self.state.text_layers
    }

    /// Append a layer, drawn above the existing ones.
    pub fn insert_text_layer(&mut self, layer: TextLayer) {
        self.state.text_layers.push(layer);
    }

    /// Append a user layer named `"Text N"`, numbered after the defaults.
    pub fn add_custom_text_layer(&mut self) -> ElementId {
        let customs = self.state.text_layers.iter().filter(|l| l.role == TextRole::Custom).count();
        let layer = TextLayer {
            id: Uuid::new_v4(),
            text: format!("Text {}", customs + 3),
            x: 50.0,
            y: 50.0,
            font_size: 4.0,
            font_family: "Inter".to_owned(),
            color: "#FFFFFF".to_owned(),
            is_visible: true,
            role: TextRole::Custom,
            effect: TextEffect::Shadow,
        };
        let id = layer.id;
        self.state.text_layers.push(layer);
        id
    }

    /// Replace all text layers with the title/subtitle/free-text defaults.
    pub fn initialize_text_layers(&mut self, texts: &TitleTexts) {
        let make = |text: &str, y: f64, font_size: f64, family: &str, color: &str, role, effect| TextLayer {
            id: Uuid::new_v4(),
            text: text.to_owned(),
            x: 50.0,
            y,
            font_size,
            font_family: family.to_owned(),
            color: color.to_owned(),
            is_visible: true,
            role,
            effect,
        };
        self.state.text_layers = vec![
            make(&texts.title, 15.0, 6.5, "Orbitron", "#FFFFFF", TextRole::Title, TextEffect::None),
            make(&texts.subtitle, 25.0, 4.0, "Inter", "#CCCCCC", TextRole::Subtitle, TextEffect::Shadow),
            make(&texts.free_text_1, 70.0, 3.5, "Inter", "#FFFFFF", TextRole::FreeText, TextEffect::Shadow),
            make(&texts.free_text_2, 75.0, 3.5, "Inter", "#FFFFFF", TextRole::FreeText, TextEffect::Shadow),
        ];
    }

    /// Remove a text layer by id, returning it if it was present.
    pub fn remove_text_layer(&mut self, id: &ElementId) -> Option<TextLayer> {
        let idx = self.state.text_layers.iter().position(|l| l.id == *id)?;
        Some(self.state.text_layers.remove(idx))
    }

    /// Apply a sparse edit. Returns false if the layer doesn't exist.
    pub fn apply_text_patch(&mut self, id: &ElementId, patch: &TextLayerPatch) -> bool {
        let Some(layer) = self.text_layer_mut(id) else {
            return false;
        };
        if let Some(ref text) = patch.text {
            layer.text.clone_from(text);
        }
        if let Some(x) = patch.x {
            layer.x = x;
        }
        if let Some(y) = patch.y {
            layer.y = y;
        }
        if let Some(size) = patch.font_size {
            layer.font_size = size.max(FONT_SIZE_MIN_PCT).min(FONT_SIZE_MAX_PCT);
        }
        if let Some(ref family) = patch.font_family {
            layer.font_family.clone_from(family);
        }
        if let Some(ref color) = patch.color {
            layer.color.clone_from(color);
        }
        if let Some(visible) = patch.is_visible {
            layer.is_visible = visible;
        }
        if let Some(effect) = patch.effect {
            layer.effect = effect;
        }
        true
    }

    /// Show or hide every text layer at once.
    pub fn set_all_text_visible(&mut self, visible: bool) {
        for layer in &mut self.state.text_layers {
            layer.is_visible = visible;
        }
    }

    // --- Partner zone ---

    #[must_use]
    pub fn zone(&self) -> Option<&PartnerZone> {
        self.state.partner_zone.as_ref()
    }

    pub fn zone_mut(&mut self) -> Option<&mut PartnerZone> {
        self.state.partner_zone.as_mut()
    }

    /// Create the default zone, or flip the visibility of the existing one.
    /// Returns the resulting visibility.
    pub fn toggle_zone(&mut self) -> bool {
        match self.state.partner_zone.as_mut() {
            Some(zone) => {
                zone.is_visible = !zone.is_visible;
                zone.is_visible
            }
            None => {
                self.state.partner_zone = Some(PartnerZone::default());
                true
            }
        }
    }

    /// Apply a sparse edit. Returns false if there is no zone.
    pub fn apply_zone_patch(&mut self, patch: &ZonePatch) -> bool {
        let Some(zone) = self.state.partner_zone.as_mut() else {
            return false;
        };
        if let Some(x) = patch.x {
            zone.x = x;
        }
        if let Some(y) = patch.y {
            zone.y = y;
        }
        if let Some(w) = patch.width {
            zone.width = w;
        }
        if let Some(h) = patch.height {
            zone.height = h;
        }
        if let Some(o) = patch.opacity {
            zone.opacity = o.max(0.0).min(1.0);
        }
        if let Some(v) = patch.is_visible {
            zone.is_visible = v;
        }
        if let Some(ref c) = patch.background_color {
            zone.background_color.clone_from(c);
        }
        if let Some(r) = patch.border_radius {
            zone.border_radius = r.max(0.0).min(ZONE_MAX_RADIUS_PCT);
        }
        if let Some(w) = patch.border_width {
            zone.border_width = w.max(0.0);
        }
        if let Some(ref c) = patch.border_color {
            zone.border_color.clone_from(c);
        }
        if let Some(b) = patch.shadow_blur {
            zone.shadow_blur = b.max(0.0);
        }
        if let Some(ref c) = patch.shadow_color {
            zone.shadow_color.clone_from(c);
        }
        if let Some(s) = patch.shadow_spread {
            zone.shadow_spread = s.max(0.0);
        }
        true
    }

    // --- Partner logos ---

    #[must_use]
    pub fn logos(&self) -> &[PartnerLogo] {
        &self.state.partner_logos
    }

    #[must_use]
    pub fn logo(&self, id: &ElementId) -> Option<&PartnerLogo> {
        self.state.logo(id)
    }

    pub fn logo_mut(&mut self, id: &ElementId) -> Option<&mut PartnerLogo> {
        self.state.partner_logos.iter_mut().find(|l| l.id == *id)
    }

    pub fn logos_mut(&mut self) -> &mut [PartnerLogo] {
        &mut self.state.partner_logos
    }

    /// Add a freshly uploaded logo to the zone frame.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::InvalidAspectRatio`] for a non-finite or
    /// non-positive aspect ratio.
    pub fn add_logo(&mut self, src: &str, name: &str, aspect_ratio: f64) -> Result<ElementId, LayoutError> {
        let logo = PartnerLogo::new(src, name, aspect_ratio)?;
        let id = logo.id;
        self.state.partner_logos.push(logo);
        Ok(id)
    }

    /// Remove a logo by id, returning it if it was present.
    pub fn remove_logo(&mut self, id: &ElementId) -> Option<PartnerLogo> {
        let idx = self.state.partner_logos.iter().position(|l| l.id == *id)?;
        Some(self.state.partner_logos.remove(idx))
    }

    /// Apply a sparse edit. Returns false if the logo doesn't exist.
    pub fn apply_logo_patch(&mut self, id: &ElementId, patch: &LogoPatch) -> bool {
        let Some(logo) = self.logo_mut(id) else {
            return false;
        };
        if let Some(ref name) = patch.name {
            logo.name.clone_from(name);
        }
        if let Some(x) = patch.x {
            logo.x = x;
        }
        if let Some(y) = patch.y {
            logo.y = y;
        }
        if let Some(w) = patch.width {
            logo.width = w;
        }
        if let Some(v) = patch.is_visible {
            logo.is_visible = v;
        }
        true
    }
}
