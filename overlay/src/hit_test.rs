use uuid::Uuid;

use super::*;
use crate::doc::{DocStore, TextEffect, TextLayer, TextRole};
use crate::measure::ApproxMeasure;

fn surface() -> Size {
    Size::new(1000.0, 1000.0)
}

fn add_text(doc: &mut DocStore, text: &str, x: f64, y: f64) -> Uuid {
    let layer = TextLayer {
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
    };
    let id = layer.id;
    doc.insert_text_layer(layer);
    id
}

/// Default zone (px 100..900 x 775..925) with a 2:1 logo at its center (px 440..560 x 820..880).
fn doc_with_zone_logo() -> (DocStore, Uuid) {
    let mut doc = DocStore::new();
    doc.toggle_zone();
    let id = doc.add_logo("a.png", "a", 2.0).unwrap();
    (doc, id)
}

fn hit(doc: &DocStore, x: f64, y: f64, selected: Option<Target>) -> Option<Hit> {
    hit_test(Point::new(x, y), doc.snapshot(), surface(), &ApproxMeasure, selected)
}

// =============================================================
// HitPart / handles
// =============================================================

#[test]
fn hit_part_equality() {
    assert_eq!(HitPart::Body, HitPart::Body);
    assert_eq!(HitPart::Handle(Handle::N), HitPart::Handle(Handle::N));
    assert_ne!(HitPart::Handle(Handle::N), HitPart::Handle(Handle::S));
    assert_ne!(HitPart::Body, HitPart::Handle(Handle::E));
}

#[test]
fn only_zone_and_logos_have_handles() {
    assert!(has_handles(Target::Zone));
    assert!(has_handles(Target::Logo(Uuid::new_v4())));
    assert!(!has_handles(Target::Text(Uuid::new_v4())));
}

#[test]
fn handle_points_sit_on_edges() {
    let b = Bounds { left: 0.0, top: 0.0, right: 100.0, bottom: 50.0 };
    let points = handle_points(&b);
    assert_eq!(points[0], (Handle::N, Point::new(50.0, 0.0)));
    assert_eq!(points[3], (Handle::Se, Point::new(100.0, 50.0)));
    assert_eq!(points[6], (Handle::W, Point::new(0.0, 25.0)));
}

// =============================================================
// Ordering
// =============================================================

#[test]
fn zone_logo_beats_zone() {
    let (doc, id) = doc_with_zone_logo();
    assert_eq!(hit(&doc, 500.0, 850.0, None), Some(Hit { target: Target::Logo(id), part: HitPart::Body }));
    assert_eq!(hit(&doc, 200.0, 850.0, None), Some(Hit { target: Target::Zone, part: HitPart::Body }));
}

#[test]
fn zone_beats_canvas_logo_beneath() {
    let (mut doc, _) = doc_with_zone_logo();
    let canvas_logo = doc.add_logo("b.png", "b", 1.0).unwrap();
    {
        let logo = doc.logo_mut(&canvas_logo).unwrap();
        logo.container = Container::Canvas;
        logo.x = 20.0;
        logo.y = 80.0;
    }
    assert_eq!(hit(&doc, 200.0, 850.0, None).map(|h| h.target), Some(Target::Zone));
    // Above the zone the canvas logo is reachable.
    assert_eq!(hit(&doc, 200.0, 750.0, None).map(|h| h.target), Some(Target::Logo(canvas_logo)));
}

#[test]
fn canvas_logo_beats_text() {
    let mut doc = DocStore::new();
    let text = add_text(&mut doc, "Hello", 50.0, 50.0);
    let logo = doc.add_logo("b.png", "b", 1.0).unwrap();
    doc.logo_mut(&logo).unwrap().container = Container::Canvas;
    assert_eq!(hit(&doc, 500.0, 500.0, None).map(|h| h.target), Some(Target::Logo(logo)));
    doc.logo_mut(&logo).unwrap().is_visible = false;
    assert_eq!(hit(&doc, 500.0, 500.0, None).map(|h| h.target), Some(Target::Text(text)));
}

#[test]
fn topmost_text_wins() {
    let mut doc = DocStore::new();
    add_text(&mut doc, "Under", 50.0, 50.0);
    let top = add_text(&mut doc, "Over", 50.0, 50.0);
    assert_eq!(hit(&doc, 500.0, 500.0, None).map(|h| h.target), Some(Target::Text(top)));
}

#[test]
fn hidden_and_blank_text_are_skipped() {
    let mut doc = DocStore::new();
    let id = add_text(&mut doc, "   ", 50.0, 50.0);
    assert!(hit(&doc, 500.0, 500.0, None).is_none());
    doc.text_layer_mut(&id).unwrap().text = "Hi".into();
    doc.text_layer_mut(&id).unwrap().is_visible = false;
    assert!(hit(&doc, 500.0, 500.0, None).is_none());
}

#[test]
fn hidden_zone_hides_its_logos() {
    let (mut doc, _) = doc_with_zone_logo();
    doc.toggle_zone();
    assert!(hit(&doc, 500.0, 850.0, None).is_none());
}

#[test]
fn empty_space_is_none() {
    let (doc, _) = doc_with_zone_logo();
    assert!(hit(&doc, 500.0, 300.0, None).is_none());
}

#[test]
fn degenerate_surface_hits_nothing() {
    let (doc, _) = doc_with_zone_logo();
    assert!(hit_test(Point::new(0.0, 0.0), doc.snapshot(), Size::new(0.0, 0.0), &ApproxMeasure, None).is_none());
}

// =============================================================
// Handles
// =============================================================

#[test]
fn selected_zone_exposes_handles() {
    let (doc, _) = doc_with_zone_logo();
    let h = hit(&doc, 103.0, 852.0, Some(Target::Zone));
    assert_eq!(h, Some(Hit { target: Target::Zone, part: HitPart::Handle(Handle::W) }));
    let h = hit(&doc, 103.0, 852.0, None);
    assert_eq!(h, Some(Hit { target: Target::Zone, part: HitPart::Body }));
}

#[test]
fn selected_logo_handle_beats_zone_body() {
    let (doc, id) = doc_with_zone_logo();
    let h = hit(&doc, 565.0, 885.0, Some(Target::Logo(id)));
    assert_eq!(h, Some(Hit { target: Target::Logo(id), part: HitPart::Handle(Handle::Se) }));
}

#[test]
fn handle_slop_is_limited() {
    let (doc, _) = doc_with_zone_logo();
    let h = hit(&doc, 100.0, 830.0, Some(Target::Zone));
    assert_eq!(h.map(|h| h.part), Some(HitPart::Body));
}
