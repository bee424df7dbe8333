//! Export pipeline: resolve every raster, then draw at native resolution.
//!
//! The base image's pixel size is the export size. All logo sources the
//! export scene references are loaded and decoded before anything is drawn,
//! so a single bad asset fails the whole export with no partial output.

#[cfg(test)]
#[path = "export_test.rs"]
mod export_test;

use std::collections::HashMap;
use std::io::Cursor;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use image::{ImageFormat, RgbaImage};

use crate::coords::Size;
use crate::doc::Snapshot;
use crate::raster::{FontBook, paint_scene};
use crate::render::{DrawItem, RenderMode, build_scene};

/// Label used for the base image in errors and logs.
pub const BASE_IMAGE_SRC: &str = "<base image>";

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("unsupported asset reference: {0}")]
    Unsupported(String),

    #[error("malformed data url: {0}")]
    MalformedDataUrl(String),

    #[error("invalid base64 in {src}: {source}")]
    Base64 {
        src: String,
        #[source]
        source: base64::DecodeError,
    },

    #[error("failed to read {src}: {source}")]
    Io {
        src: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode {src}: {source}")]
    Decode {
        src: String,
        #[source]
        source: image::ImageError,
    },

    #[error("no font face for family {0}")]
    MissingFont(String),

    #[error("failed to encode png: {0}")]
    Encode(#[source] image::ImageError),
}

/// Resolves a logo `src` to its encoded bytes.
pub trait AssetSource {
    /// # Errors
    ///
    /// Returns an [`ExportError`] if `src` cannot be resolved or read.
    fn load(&self, src: &str) -> Result<Vec<u8>, ExportError>;
}

/// Resolves `data:` URLs only.
#[derive(Debug, Clone, Copy, Default)]
pub struct DataUrlSource;

impl AssetSource for DataUrlSource {
    fn load(&self, src: &str) -> Result<Vec<u8>, ExportError> {
        if is_data_url(src) {
            decode_data_url(src)
        } else {
            Err(ExportError::Unsupported(truncate(src)))
        }
    }
}

#[must_use]
pub fn is_data_url(src: &str) -> bool {
    src.starts_with("data:")
}

/// Decode a base64 `data:` URL into its payload bytes.
///
/// # Errors
///
/// Returns [`ExportError::MalformedDataUrl`] if the URL has no payload or is
/// not base64-encoded, or [`ExportError::Base64`] if the payload is invalid.
pub fn decode_data_url(url: &str) -> Result<Vec<u8>, ExportError> {
    let rest = url.strip_prefix("data:").ok_or_else(|| ExportError::MalformedDataUrl(truncate(url)))?;
    let (meta, payload) = rest.split_once(',').ok_or_else(|| ExportError::MalformedDataUrl(truncate(url)))?;
    if !meta.split(';').any(|part| part.eq_ignore_ascii_case("base64")) {
        return Err(ExportError::MalformedDataUrl(truncate(url)));
    }
    STANDARD.decode(payload.trim()).map_err(|source| ExportError::Base64 { src: truncate(url), source })
}

/// Short form of a possibly huge `src` for errors and logs.
fn truncate(src: &str) -> String {
    const MAX: usize = 64;
    match src.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}…", &src[..idx]),
        None => src.to_owned(),
    }
}

/// Decode encoded raster bytes into RGBA.
///
/// # Errors
///
/// Returns [`ExportError::Decode`] naming `src` if the bytes are not a supported image.
pub fn decode_raster(src: &str, bytes: &[u8]) -> Result<RgbaImage, ExportError> {
    image::load_from_memory(bytes)
        .map(|img| img.to_rgba8())
        .map_err(|source| ExportError::Decode { src: truncate(src), source })
}

/// Flatten `snapshot` over the base image at the base image's native size.
///
/// # Errors
///
/// Returns the first [`ExportError`] hit while decoding the base image,
/// loading or decoding a logo, or finding a font face for visible text.
pub fn export(
    snapshot: &Snapshot,
    base_bytes: &[u8],
    assets: &dyn AssetSource,
    fonts: &FontBook,
) -> Result<RgbaImage, ExportError> {
    let base = decode_raster(BASE_IMAGE_SRC, base_bytes)?;
    let (width, height) = base.dimensions();
    tracing::debug!(width, height, "export: base image decoded");

    let scene = build_scene(snapshot, Size::new(f64::from(width), f64::from(height)), RenderMode::Export, None, fonts);

    let mut logos = HashMap::new();
    for src in scene.logo_sources() {
        let bytes = assets.load(src)?;
        logos.insert(src.to_owned(), decode_raster(src, &bytes)?);
    }
    tracing::debug!(count = logos.len(), "export: logos decoded");

    for item in &scene.items {
        if let DrawItem::Text(text) = item {
            if !fonts.covers(&text.family) {
                return Err(ExportError::MissingFont(text.family.clone()));
            }
        }
    }

    let out = paint_scene(&scene, Some(&base), &logos, fonts);
    tracing::debug!(items = scene.items.len(), "export: scene painted");
    Ok(out)
}

/// Encode an image as PNG bytes.
///
/// # Errors
///
/// Returns [`ExportError::Encode`] if the encoder fails.
pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>, ExportError> {
    let mut buf = Cursor::new(Vec::new());
    image.write_to(&mut buf, ImageFormat::Png).map_err(ExportError::Encode)?;
    Ok(buf.into_inner())
}
