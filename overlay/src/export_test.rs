use super::*;
use crate::doc::{Container, DocStore, TextEffect, TextLayer, TextRole};

fn png(w: u32, h: u32, px: [u8; 4]) -> Vec<u8> {
    encode_png(&RgbaImage::from_pixel(w, h, image::Rgba(px))).unwrap()
}

fn data_url(bytes: &[u8]) -> String {
    format!("data:image/png;base64,{}", STANDARD.encode(bytes))
}

// =============================================================
// Data URLs
// =============================================================

#[test]
fn data_url_round_trips_payload() {
    let url = data_url(b"hello");
    assert!(is_data_url(&url));
    assert_eq!(decode_data_url(&url).unwrap(), b"hello");
}

#[test]
fn data_url_without_base64_is_malformed() {
    let err = decode_data_url("data:text/plain,hello").unwrap_err();
    assert!(matches!(err, ExportError::MalformedDataUrl(_)));
    let err = decode_data_url("data:image/png;base64").unwrap_err();
    assert!(matches!(err, ExportError::MalformedDataUrl(_)));
}

#[test]
fn data_url_with_bad_payload_fails() {
    let err = decode_data_url("data:image/png;base64,@@@").unwrap_err();
    assert!(matches!(err, ExportError::Base64 { .. }));
}

#[test]
fn data_url_source_rejects_paths() {
    let err = DataUrlSource.load("logos/acme.png").unwrap_err();
    assert!(matches!(err, ExportError::Unsupported(ref s) if s == "logos/acme.png"));
}

#[test]
fn long_sources_are_shortened_in_errors() {
    let src = format!("data:image/png;base64,{}", "A".repeat(500));
    let err = decode_raster(&src, b"junk").unwrap_err();
    let ExportError::Decode { src: shown, .. } = err else {
        panic!("expected decode error");
    };
    assert!(shown.chars().count() <= 65);
}

// =============================================================
// Pipeline
// =============================================================

#[test]
fn export_uses_native_size_of_base() {
    let out = export(&Snapshot::default(), &png(40, 20, [0, 0, 255, 255]), &DataUrlSource, &FontBook::new()).unwrap();
    assert_eq!(out.dimensions(), (40, 20));
    assert_eq!(out.get_pixel(5, 5).0, [0, 0, 255, 255]);
}

#[test]
fn export_draws_zone_logo_at_native_scale() {
    let mut doc = DocStore::new();
    doc.toggle_zone();
    let id = doc.add_logo(&data_url(&png(4, 2, [255, 0, 0, 255])), "red", 2.0).unwrap();
    let zone = doc.zone_mut().unwrap();
    zone.opacity = 0.0;
    zone.border_width = 0.0;
    zone.shadow_blur = 0.0;
    zone.shadow_spread = 0.0;
    assert_eq!(doc.logo(&id).unwrap().container, Container::Zone);

    let out = export(doc.snapshot(), &png(1000, 1000, [0, 0, 0, 255]), &DataUrlSource, &FontBook::new()).unwrap();
    // Zone px 100..900 x 775..925; logo 120x60 centered at (500, 850).
    let logo_px = out.get_pixel(500, 850).0;
    assert!(logo_px[0] > 250 && logo_px[1] < 5 && logo_px[3] == 255);
    assert_eq!(out.get_pixel(500, 700).0, [0, 0, 0, 255]);
}

#[test]
fn export_fails_whole_on_bad_logo() {
    let mut doc = DocStore::new();
    doc.toggle_zone();
    doc.add_logo(&data_url(b"not an image"), "bad", 1.0).unwrap();
    let err = export(doc.snapshot(), &png(10, 10, [0, 0, 0, 255]), &DataUrlSource, &FontBook::new()).unwrap_err();
    assert!(matches!(err, ExportError::Decode { .. }));
}

#[test]
fn export_fails_on_bad_base() {
    let err = export(&Snapshot::default(), b"nope", &DataUrlSource, &FontBook::new()).unwrap_err();
    assert!(matches!(err, ExportError::Decode { ref src, .. } if src == BASE_IMAGE_SRC));
}

#[test]
fn hidden_zone_logos_are_not_loaded() {
    let mut doc = DocStore::new();
    doc.toggle_zone();
    doc.add_logo("logos/missing.png", "m", 1.0).unwrap();
    doc.toggle_zone();
    let out = export(doc.snapshot(), &png(10, 10, [0, 0, 0, 255]), &DataUrlSource, &FontBook::new());
    assert!(out.is_ok());
}

#[test]
fn visible_text_needs_a_font() {
    let mut doc = DocStore::new();
    doc.insert_text_layer(TextLayer {
        id: uuid::Uuid::new_v4(),
        text: "Hello".into(),
        x: 50.0,
        y: 50.0,
        font_size: 5.0,
        font_family: "Orbitron".into(),
        color: "#FFFFFF".into(),
        is_visible: true,
        role: TextRole::Title,
        effect: TextEffect::Neon,
    });
    let err = export(doc.snapshot(), &png(10, 10, [0, 0, 0, 255]), &DataUrlSource, &FontBook::new()).unwrap_err();
    assert!(matches!(err, ExportError::MissingFont(ref f) if f == "Orbitron"));

    doc.set_all_text_visible(false);
    assert!(export(doc.snapshot(), &png(10, 10, [0, 0, 0, 255]), &DataUrlSource, &FontBook::new()).is_ok());
}

#[test]
fn png_encoding_decodes_back() {
    let img = RgbaImage::from_pixel(3, 2, image::Rgba([1, 2, 3, 255]));
    let bytes = encode_png(&img).unwrap();
    assert_eq!(decode_raster("x", &bytes).unwrap(), img);
}
