//! Exporter configuration: asset and font locations.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use clap::Args;
use overlay::raster::FontBook;

use crate::CliError;

/// File extensions recognized as font files.
const FONT_EXTENSIONS: [&str; 2] = ["ttf", "otf"];

#[derive(Args, Debug, Clone)]
pub struct Config {
    /// Directory that relative logo paths in a snapshot resolve against.
    #[arg(long, global = true, env = "COBRAND_ASSET_ROOT", default_value = ".")]
    pub asset_root: PathBuf,

    /// Directory of font files named after their family, e.g. `Orbitron-Bold.ttf`.
    #[arg(long, global = true, env = "COBRAND_FONT_DIR")]
    pub font_dir: Option<PathBuf>,

    /// Font used for any family with no file in the font directory.
    #[arg(long, global = true, env = "COBRAND_FALLBACK_FONT")]
    pub fallback_font: Option<PathBuf>,
}

/// Family name and boldness from a font file stem.
///
/// `Orbitron-Bold` → `("Orbitron", true)`, `Inter-Regular` → `("Inter", false)`,
/// `Inter` → `("Inter", false)`.
#[must_use]
pub fn family_from_stem(stem: &str) -> (String, bool) {
    match stem.rsplit_once('-') {
        Some((family, style)) if !family.is_empty() => {
            let bold = style.to_ascii_lowercase().contains("bold");
            (family.to_owned(), bold)
        }
        _ => (stem.to_owned(), false),
    }
}

fn is_font_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| FONT_EXTENSIONS.iter().any(|f| e.eq_ignore_ascii_case(f)))
}

/// One file per family from `dir`, preferring bold faces.
///
/// # Errors
///
/// Returns [`CliError::Read`] if the directory cannot be listed.
pub fn discover_fonts(dir: &Path) -> Result<BTreeMap<String, PathBuf>, CliError> {
    let entries = fs::read_dir(dir).map_err(|source| CliError::Read { path: dir.to_owned(), source })?;
    let mut paths: Vec<PathBuf> = entries.flatten().map(|e| e.path()).filter(|p| is_font_file(p)).collect();
    paths.sort();

    let mut picked: BTreeMap<String, (bool, PathBuf)> = BTreeMap::new();
    for path in paths {
        let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        let (family, bold) = family_from_stem(stem);
        match picked.get(&family) {
            Some((true, _)) => {}
            Some((false, _)) if !bold => {}
            _ => {
                picked.insert(family, (bold, path));
            }
        }
    }
    Ok(picked.into_iter().map(|(family, (_, path))| (family, path)).collect())
}

/// Load every configured font into a [`FontBook`].
///
/// # Errors
///
/// Returns [`CliError::Read`] for unreadable files and [`CliError::Font`] for
/// files that are not fonts.
pub fn load_fonts(config: &Config) -> Result<FontBook, CliError> {
    let mut book = FontBook::new();
    if let Some(dir) = &config.font_dir {
        for (family, path) in discover_fonts(dir)? {
            let bytes = read(&path)?;
            book.load(&family, &bytes)?;
        }
    }
    if let Some(path) = &config.fallback_font {
        book.set_fallback(&read(path)?)?;
    }
    if book.is_empty() {
        tracing::warn!("no fonts configured; text is measured approximately and cannot be exported");
    }
    Ok(book)
}

/// Read a whole file, naming it on failure.
///
/// # Errors
///
/// Returns [`CliError::Read`] with the offending path.
pub fn read(path: &Path) -> Result<Vec<u8>, CliError> {
    fs::read(path).map_err(|source| CliError::Read { path: path.to_owned(), source })
}
