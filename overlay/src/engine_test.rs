#![allow(clippy::float_cmp)]

use uuid::Uuid;

use super::*;
use crate::doc::{PartnerLogo, TextEffect, TextLayer, TextRole};

// =============================================================
// Helpers
// =============================================================

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

fn text_layer(text: &str, x: f64, y: f64) -> TextLayer {
    TextLayer {
        id: Uuid::new_v4(),
        text: text.to_owned(),
        x,
        y,
        font_size: 5.0,
        font_family: "Inter".to_owned(),
        color: "#FFFFFF".to_owned(),
        is_visible: true,
        role: TextRole::Custom,
        effect: TextEffect::None,
    }
}

/// A core on a 1000x1000 surface.
fn core() -> EngineCore {
    let mut core = EngineCore::new();
    core.set_surface_size(1000.0, 1000.0);
    core
}

fn add_text(core: &mut EngineCore, text: &str, x: f64, y: f64) -> Uuid {
    let layer = text_layer(text, x, y);
    let id = layer.id;
    core.doc.insert_text_layer(layer);
    id
}

/// A 2:1 canvas logo 20% wide centered at (50, 50): px 400..600 x 450..550.
fn add_canvas_logo(core: &mut EngineCore) -> Uuid {
    let id = core.add_logo("a.png", "a", 2.0).unwrap();
    let logo = core.doc.logo_mut(&id).unwrap();
    logo.container = Container::Canvas;
    logo.width = 20.0;
    id
}

/// Default zone (px 100..900 x 775..925) holding a 2:1 logo at its center.
fn core_with_zone_logo() -> (EngineCore, Uuid) {
    let mut core = core();
    core.toggle_zone();
    let id = core.add_logo("z.png", "z", 2.0).unwrap();
    (core, id)
}

fn down(core: &mut EngineCore, x: f64, y: f64) -> Vec<Action> {
    core.on_pointer_down(Point::new(x, y), Button::Primary, Modifiers::default())
}

fn drag_to(core: &mut EngineCore, x: f64, y: f64) -> Vec<Action> {
    core.on_pointer_move(Point::new(x, y), Modifiers::default())
}

fn up(core: &mut EngineCore, x: f64, y: f64) -> Vec<Action> {
    core.on_pointer_up(Point::new(x, y), Button::Primary, Modifiers::default())
}

fn key(core: &mut EngineCore, name: &str) -> Vec<Action> {
    core.on_key_down(Key(name.to_owned()), Modifiers::default())
}

// =============================================================
// Surface
// =============================================================

#[test]
fn degenerate_surface_ignores_pointer() {
    let mut core = EngineCore::new();
    add_text(&mut core, "Hi", 50.0, 50.0);
    assert!(down(&mut core, 0.0, 0.0).is_empty());
    assert!(!core.input.is_active());
    assert!(core.scene().is_empty());
}

#[test]
fn surface_resize_reclamps_text() {
    let mut core = EngineCore::new();
    let layer = text_layer("Hi", 99.0, 50.0);
    let id = layer.id;
    core.load_snapshot(Snapshot { text_layers: vec![layer], ..Snapshot::default() });
    // Unknown surface: nothing to clamp against yet.
    assert_eq!(core.doc.text_layer(&id).unwrap().x, 99.0);
    core.set_surface_size(1000.0, 1000.0);
    // "Hi" at 50px is 80px wide: 8% of the canvas.
    assert!(approx(core.doc.text_layer(&id).unwrap().x, 96.0));
}

#[test]
fn surface_resize_clamps_zone_restored_before_measure() {
    let mut core = EngineCore::new();
    let mut logo = PartnerLogo::new("z.png", "z", 2.0).unwrap();
    logo.x = 200.0;
    let id = logo.id;
    let zone = PartnerZone { x: 95.0, width: 300.0, ..PartnerZone::default() };
    core.load_snapshot(Snapshot { partner_zone: Some(zone), partner_logos: vec![logo], ..Snapshot::default() });

    // The zone's limits need no surface.
    let zone = core.doc.zone().unwrap();
    assert_eq!(zone.width, 100.0);
    assert_eq!(zone.x, 50.0);

    core.set_surface_size(1000.0, 1000.0);
    let frame = container_size(Container::Zone, core.doc.zone(), core.surface()).unwrap();
    let b = logo_bounds(core.doc.logo(&id).unwrap(), frame);
    assert!(b.left >= -1e-9 && b.right <= 100.0 + 1e-9, "{b:?}");
    assert!(b.top >= -1e-9 && b.bottom <= 100.0 + 1e-9, "{b:?}");
}

#[test]
fn load_snapshot_resets_session() {
    let mut core = core();
    let id = add_text(&mut core, "Hi", 50.0, 50.0);
    down(&mut core, 500.0, 500.0);
    assert!(core.input.is_active());
    let actions = core.load_snapshot(Snapshot::default());
    assert!(actions.contains(&Action::SelectionChanged(None)));
    assert!(!core.input.is_active());
    assert!(core.selection().is_none());
    assert!(core.doc.text_layer(&id).is_none());
}

// =============================================================
// Selection
// =============================================================

#[test]
fn pointer_down_on_text_selects_and_drags() {
    let mut core = core();
    let id = add_text(&mut core, "Hi", 50.0, 50.0);
    let actions = down(&mut core, 500.0, 500.0);
    assert_eq!(actions[0], Action::SelectionChanged(Some(Target::Text(id))));
    assert!(actions.contains(&Action::SetCursor("move".into())));
    assert!(matches!(core.input, InputState::Dragging { kind: DragKind::Text, .. }));
}

#[test]
fn pointer_down_on_empty_clears_selection() {
    let mut core = core();
    let id = add_text(&mut core, "Hi", 50.0, 50.0);
    core.select(Some(Target::Text(id)));
    let actions = down(&mut core, 100.0, 100.0);
    assert_eq!(actions, vec![Action::SelectionChanged(None), Action::RenderNeeded]);
    assert!(!core.input.is_active());
}

#[test]
fn secondary_button_is_ignored() {
    let mut core = core();
    add_text(&mut core, "Hi", 50.0, 50.0);
    let actions = core.on_pointer_down(Point::new(500.0, 500.0), Button::Secondary, Modifiers::default());
    assert!(actions.is_empty());
    assert!(core.selection().is_none());
}

#[test]
fn select_unknown_target_is_refused() {
    let mut core = core();
    assert!(core.select(Some(Target::Text(Uuid::new_v4()))).is_empty());
    assert!(core.select(Some(Target::Zone)).is_empty());
    assert!(core.selection().is_none());
}

#[test]
fn escape_when_idle_deselects() {
    let mut core = core();
    let id = add_text(&mut core, "Hi", 50.0, 50.0);
    core.select(Some(Target::Text(id)));
    let actions = key(&mut core, "Escape");
    assert!(actions.contains(&Action::SelectionChanged(None)));
    assert!(key(&mut core, "Escape").is_empty());
}

// =============================================================
// Drag + snap
// =============================================================

#[test]
fn text_drag_snaps_to_sibling_center() {
    let mut core = core();
    let id = add_text(&mut core, "Hi", 50.0, 50.0);
    add_text(&mut core, "Hi", 51.5, 20.0);

    down(&mut core, 500.0, 500.0);
    drag_to(&mut core, 520.0, 500.0);

    // Proposed x is 52; the box edges sit 0.5 from the sibling's edges and center.
    let layer = core.doc.text_layer(&id).unwrap();
    assert!(approx(layer.x, 51.5));
    assert!(approx(layer.y, 50.0));
    assert_eq!(core.ui.guides.frame, GuideFrame::Canvas);
    assert_eq!(core.ui.guides.lines.y, Some(50.0));
    assert!(core.ui.guides.lines.x.is_some());
}

#[test]
fn alt_drag_skips_snapping() {
    let mut core = core();
    let id = add_text(&mut core, "Hi", 50.0, 50.0);
    add_text(&mut core, "Hi", 51.5, 20.0);

    down(&mut core, 500.0, 500.0);
    let alt = Modifiers { alt: true, ..Modifiers::default() };
    core.on_pointer_move(Point::new(520.0, 500.0), alt);

    assert!(approx(core.doc.text_layer(&id).unwrap().x, 52.0));
    assert!(core.ui.guides.lines.is_empty());
}

#[test]
fn drag_far_away_stays_in_canvas() {
    let mut core = core();
    let id = add_canvas_logo(&mut core);
    down(&mut core, 500.0, 500.0);
    drag_to(&mut core, 2000.0, -800.0);

    let logo = core.doc.logo(&id).unwrap();
    assert!(approx(logo.x, 90.0));
    assert!(approx(logo.y, 5.0));
    assert!(approx(logo.width, 20.0));
}

/// Drag ticks overshooting every edge, in pixels on the 1000x1000 surface.
const OVERSHOOT_TICKS: [(f64, f64); 6] =
    [(5000.0, 500.0), (-5000.0, -5000.0), (500.0, 5000.0), (-300.0, 2000.0), (3000.0, -100.0), (510.0, 490.0)];

fn assert_text_inside(core: &EngineCore, id: &Uuid) {
    let layer = core.doc.text_layer(id).unwrap();
    let b = text_bounds(layer, core.surface(), core.measure());
    assert!(b.top >= -1e-9 && b.bottom <= 100.0 + 1e-9, "{b:?}");
    if b.width() <= 100.0 {
        assert!(b.left >= -1e-9 && b.right <= 100.0 + 1e-9, "{b:?}");
    } else {
        assert!(approx(layer.x, 50.0), "x = {}", layer.x);
    }
}

#[test]
fn text_drag_never_leaves_canvas() {
    for alt in [false, true] {
        let mut core = core();
        add_text(&mut core, "Sib", 20.0, 30.0);
        let id = add_text(&mut core, "Hi", 50.0, 50.0);
        down(&mut core, 500.0, 500.0);
        for (x, y) in OVERSHOOT_TICKS {
            core.on_pointer_move(Point::new(x, y), Modifiers { alt, ..Modifiers::default() });
            assert_text_inside(&core, &id);
        }
    }
}

#[test]
fn text_wider_than_canvas_stays_centered_while_dragged() {
    for alt in [false, true] {
        let mut core = core();
        // 40 chars at 50px: 1220px wide on a 1000px canvas.
        let id = add_text(&mut core, &"W".repeat(40), 50.0, 50.0);
        down(&mut core, 500.0, 500.0);
        assert!(core.input.is_active());
        for (x, y) in OVERSHOOT_TICKS {
            core.on_pointer_move(Point::new(x, y), Modifiers { alt, ..Modifiers::default() });
            assert_text_inside(&core, &id);
        }
    }
}

#[test]
fn zone_logo_drag_moves_in_zone_frame() {
    let (mut core, id) = core_with_zone_logo();
    down(&mut core, 500.0, 850.0);
    assert!(matches!(core.input, InputState::Dragging { kind: DragKind::ZoneLogo, .. }));

    // 80px across an 800px-wide zone is 10% of the zone.
    drag_to(&mut core, 580.0, 850.0);
    let logo = core.doc.logo(&id).unwrap();
    assert!(approx(logo.x, 60.0));
    assert!(approx(logo.y, 50.0));
    assert_eq!(logo.container, Container::Zone);
    assert_eq!(core.ui.guides.frame, GuideFrame::Zone);
}

#[test]
fn dragging_zone_carries_its_logos() {
    let (mut core, id) = core_with_zone_logo();
    down(&mut core, 200.0, 850.0);
    drag_to(&mut core, 200.0, 700.0);

    let zone = core.doc.zone().unwrap();
    assert!(approx(zone.y, 70.0));
    let logo = core.doc.logo(&id).unwrap();
    assert_eq!((logo.x, logo.y), (50.0, 50.0));
}

#[test]
fn pointer_up_clears_guides_and_keeps_position() {
    let mut core = core();
    let id = add_text(&mut core, "Hi", 50.0, 50.0);
    add_text(&mut core, "Hi", 51.5, 20.0);
    down(&mut core, 500.0, 500.0);
    drag_to(&mut core, 520.0, 500.0);

    let actions = up(&mut core, 520.0, 500.0);
    assert!(actions.contains(&Action::RenderNeeded));
    assert!(!core.input.is_active());
    assert!(core.ui.guides.lines.is_empty());
    assert!(approx(core.doc.text_layer(&id).unwrap().x, 51.5));
    assert_eq!(core.selection(), Some(Target::Text(id)));
}

#[test]
fn escape_reverts_drag() {
    let mut core = core();
    let id = add_text(&mut core, "Hi", 50.0, 50.0);
    down(&mut core, 500.0, 500.0);
    drag_to(&mut core, 700.0, 300.0);
    assert!(!approx(core.doc.text_layer(&id).unwrap().x, 50.0));

    let actions = key(&mut core, "Escape");
    assert_eq!(actions[0], Action::TextLayerUpdated(id));
    let layer = core.doc.text_layer(&id).unwrap();
    assert_eq!((layer.x, layer.y), (50.0, 50.0));
    assert!(!core.input.is_active());
    assert_eq!(core.selection(), Some(Target::Text(id)));
}

#[test]
fn cancel_commits_current_geometry() {
    let mut core = core();
    let id = add_text(&mut core, "Hi", 50.0, 50.0);
    down(&mut core, 500.0, 500.0);
    drag_to(&mut core, 500.0, 300.0);
    core.on_pointer_cancel();
    assert!(approx(core.doc.text_layer(&id).unwrap().y, 30.0));
    assert!(core.on_pointer_cancel().is_empty());
}

#[test]
fn second_pointer_down_during_gesture_is_ignored() {
    let mut core = core();
    add_text(&mut core, "Hi", 50.0, 50.0);
    down(&mut core, 500.0, 500.0);
    assert!(down(&mut core, 500.0, 500.0).is_empty());
}

// =============================================================
// Resize
// =============================================================

#[test]
fn zone_west_handle_moves_left_edge_only() {
    let (mut core, id) = core_with_zone_logo();
    core.select(Some(Target::Zone));
    down(&mut core, 100.0, 850.0);
    assert!(matches!(core.input, InputState::Resizing { handle: Handle::W, .. }));

    drag_to(&mut core, 200.0, 850.0);
    let zone = core.doc.zone().unwrap();
    assert!(approx(zone.width, 70.0));
    assert!(approx(zone.x, 55.0));
    assert!(approx(zone.x + zone.width / 2.0, 90.0));

    let logo = core.doc.logo(&id).unwrap();
    assert_eq!((logo.x, logo.y, logo.width), (50.0, 50.0, 15.0));
}

#[test]
fn zone_east_handle_grows_around_center() {
    let (mut core, _) = core_with_zone_logo();
    core.select(Some(Target::Zone));
    down(&mut core, 900.0, 850.0);
    drag_to(&mut core, 950.0, 850.0);
    let zone = core.doc.zone().unwrap();
    assert!(approx(zone.width, 85.0));
    assert!(approx(zone.x, 50.0));
}

#[test]
fn zone_west_handle_respects_minimum() {
    let (mut core, _) = core_with_zone_logo();
    core.select(Some(Target::Zone));
    down(&mut core, 100.0, 850.0);
    drag_to(&mut core, 1000.0, 850.0);
    let zone = core.doc.zone().unwrap();
    assert!(approx(zone.width, 10.0));
    assert!(approx(zone.x, 85.0));
}

#[test]
fn logo_east_handle_widens_and_keeps_aspect() {
    let mut core = core();
    let id = add_canvas_logo(&mut core);
    core.select(Some(Target::Logo(id)));
    down(&mut core, 600.0, 500.0);
    drag_to(&mut core, 650.0, 500.0);

    let logo = core.doc.logo(&id).unwrap();
    assert!(approx(logo.width, 25.0));
    assert_eq!((logo.x, logo.y), (50.0, 50.0));
    let b = crate::geometry::logo_bounds(logo, core.surface());
    assert!(approx(b.width() / b.height(), 2.0));
}

#[test]
fn logo_north_handle_scales_by_aspect() {
    let mut core = core();
    let id = add_canvas_logo(&mut core);
    core.select(Some(Target::Logo(id)));
    down(&mut core, 500.0, 450.0);
    drag_to(&mut core, 500.0, 400.0);
    // 50px up on a 2:1 logo adds 100px of width.
    assert!(approx(core.doc.logo(&id).unwrap().width, 30.0));
}

#[test]
fn logo_resize_has_pixel_floor() {
    let mut core = core();
    let id = add_canvas_logo(&mut core);
    core.select(Some(Target::Logo(id)));
    down(&mut core, 600.0, 500.0);
    drag_to(&mut core, 0.0, 500.0);
    assert!(approx(core.doc.logo(&id).unwrap().width, 2.0));
}

#[test]
fn escape_reverts_zone_resize() {
    let (mut core, _) = core_with_zone_logo();
    core.select(Some(Target::Zone));
    down(&mut core, 100.0, 850.0);
    drag_to(&mut core, 300.0, 850.0);
    key(&mut core, "Escape");
    let zone = core.doc.zone().unwrap();
    assert_eq!((zone.x, zone.width), (50.0, 80.0));
}

#[test]
fn hover_reports_handle_cursor() {
    let (mut core, _) = core_with_zone_logo();
    core.select(Some(Target::Zone));
    let actions = drag_to(&mut core, 100.0, 850.0);
    assert_eq!(actions, vec![Action::SetCursor("ew-resize".into())]);
    let actions = drag_to(&mut core, 500.0, 100.0);
    assert_eq!(actions, vec![Action::SetCursor("default".into())]);
}

// =============================================================
// Structure
// =============================================================

#[test]
fn reparent_keeps_visual_placement() {
    let (mut core, id) = core_with_zone_logo();
    let actions = core.reparent(&id, Container::Canvas);
    assert_eq!(actions[0], Action::LogoUpdated(id));
    let logo = core.doc.logo(&id).unwrap();
    assert_eq!(logo.container, Container::Canvas);
    assert!(approx(logo.x, 50.0));
    assert!(approx(logo.y, 85.0));
    assert!(approx(logo.width, 12.0));

    assert!(core.reparent(&id, Container::Canvas).is_empty());
}

#[test]
fn delete_key_removes_selected_text() {
    let mut core = core();
    let id = add_text(&mut core, "Hi", 50.0, 50.0);
    core.select(Some(Target::Text(id)));
    let actions = key(&mut core, "Delete");
    assert_eq!(actions[0], Action::ElementDeleted(Target::Text(id)));
    assert!(actions.contains(&Action::SelectionChanged(None)));
    assert!(core.doc.text_layer(&id).is_none());
}

#[test]
fn delete_key_hides_zone() {
    let (mut core, _) = core_with_zone_logo();
    core.select(Some(Target::Zone));
    let actions = key(&mut core, "Backspace");
    assert_eq!(actions[0], Action::ZoneUpdated);
    assert!(!core.doc.zone().unwrap().is_visible);
    assert!(core.selection().is_none());
}

#[test]
fn hiding_zone_drops_zone_logo_selection() {
    let (mut core, id) = core_with_zone_logo();
    core.select(Some(Target::Logo(id)));
    let actions = core.toggle_zone();
    assert!(actions.contains(&Action::SelectionChanged(None)));
    assert!(core.selection().is_none());
}

#[test]
fn patches_are_clamped() {
    let (mut core, id) = core_with_zone_logo();
    core.patch_logo(&id, &LogoPatch { x: Some(150.0), ..LogoPatch::default() });
    let logo = core.doc.logo(&id).unwrap();
    assert!(approx(logo.x, 100.0 - logo.width / 2.0));

    core.patch_zone(&ZonePatch { width: Some(3.0), ..ZonePatch::default() });
    assert_eq!(core.doc.zone().unwrap().width, 10.0);

    assert!(core.patch_text(&Uuid::new_v4(), &TextLayerPatch::default()).is_empty());
}

#[test]
fn added_text_layers_are_numbered() {
    let mut core = core();
    core.initialize_text_layers(&TitleTexts {
        title: "Title".into(),
        subtitle: "Sub".into(),
        free_text_1: "A".into(),
        free_text_2: "B".into(),
    });
    let id = core.add_text_layer().unwrap();
    assert_eq!(core.doc.text_layer(&id).unwrap().text, "Text 3");
    assert_eq!(core.doc.text_layers().len(), 5);
}

// =============================================================
// Export lock
// =============================================================

#[test]
fn export_lock_blocks_edits() {
    let mut core = core();
    let id = add_text(&mut core, "Hi", 50.0, 50.0);
    let snapshot = core.begin_export().unwrap();
    assert_eq!(snapshot.text_layers.len(), 1);
    assert!(core.is_exporting());

    assert!(matches!(core.begin_export(), Err(LayoutError::ExportPending)));
    assert!(matches!(core.add_logo("a.png", "a", 1.0), Err(LayoutError::ExportPending)));
    assert!(core.patch_text(&id, &TextLayerPatch { x: Some(10.0), ..TextLayerPatch::default() }).is_empty());
    assert!(down(&mut core, 500.0, 500.0).is_empty());

    core.end_export();
    assert!(!core.is_exporting());
    assert!(!down(&mut core, 500.0, 500.0).is_empty());
}

#[test]
fn begin_export_commits_open_gesture() {
    let mut core = core();
    let id = add_text(&mut core, "Hi", 50.0, 50.0);
    down(&mut core, 500.0, 500.0);
    drag_to(&mut core, 500.0, 300.0);
    let snapshot = core.begin_export().unwrap();
    assert!(!core.input.is_active());
    assert!(approx(snapshot.text_layer(&id).unwrap().y, 30.0));
}

// =============================================================
// Scene
// =============================================================

#[test]
fn preview_scene_shows_selection() {
    let mut core = core();
    let id = add_canvas_logo(&mut core);
    core.select(Some(Target::Logo(id)));
    let scene = core.scene();
    let handles = scene.items.iter().filter(|i| matches!(i, crate::render::DrawItem::Handle { .. })).count();
    assert_eq!(handles, 8);
}
