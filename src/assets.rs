//! Filesystem asset source for logo rasters.

#[cfg(test)]
#[path = "assets_test.rs"]
mod assets_test;

use std::fs;
use std::path::{Component, Path, PathBuf};

use overlay::export::{AssetSource, ExportError, decode_data_url, is_data_url};

/// Resolves `data:` URLs inline and plain paths against a root directory.
#[derive(Debug, Clone)]
pub struct FsAssetSource {
    root: PathBuf,
}

impl FsAssetSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Path a non-data `src` refers to.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::Unsupported`] for remote URLs and for paths that
    /// climb out of the root with `..`.
    pub fn resolve(&self, src: &str) -> Result<PathBuf, ExportError> {
        if src.contains("://") {
            return Err(ExportError::Unsupported(src.to_owned()));
        }
        let path = Path::new(src);
        if path.components().any(|c| c == Component::ParentDir) {
            return Err(ExportError::Unsupported(src.to_owned()));
        }
        Ok(if path.is_absolute() { path.to_owned() } else { self.root.join(path) })
    }
}

impl AssetSource for FsAssetSource {
    fn load(&self, src: &str) -> Result<Vec<u8>, ExportError> {
        if is_data_url(src) {
            return decode_data_url(src);
        }
        let path = self.resolve(src)?;
        tracing::debug!(path = %path.display(), "reading logo asset");
        fs::read(&path).map_err(|source| ExportError::Io { src: src.to_owned(), source })
    }
}
