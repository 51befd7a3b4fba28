//! File system utilities for bundling.
//!
//! Provides atomic output and asset directory discovery with path-aware
//! error reporting.

use crate::bundler::error::{ErrorExt, Result};
use std::{
    fs::File,
    path::{Path, PathBuf},
};

/// Writes a file by staging it in the destination directory and renaming it
/// into place once `write` succeeds.
///
/// If `write` fails, the staged file is removed and `path` is left untouched.
pub fn write_atomically<F>(path: &Path, write: F) -> Result<()>
where
    F: FnOnce(&mut File) -> Result<()>,
{
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    std::fs::create_dir_all(&dir).fs_context("creating output directory", &dir)?;

    let mut staged = tempfile::Builder::new()
        .prefix(".pkpass-")
        .suffix(".tmp")
        .tempfile_in(&dir)
        .fs_context("creating staging file in", &dir)?;

    write(staged.as_file_mut())?;
    staged
        .as_file()
        .sync_all()
        .fs_context("flushing staged file", staged.path())?;
    staged
        .persist(path)
        .map_err(|e| e.error)
        .fs_context("moving archive into place at", path)?;
    Ok(())
}

/// Lists the regular, non-hidden files directly inside `dir`, sorted by name.
///
/// Returns `(file name, path)` pairs. Subdirectories are skipped.
pub fn list_asset_files(dir: &Path) -> Result<Vec<(String, PathBuf)>> {
    let mut assets = Vec::new();
    for entry in std::fs::read_dir(dir).fs_context("reading asset directory", dir)? {
        let entry = entry.fs_context("reading asset directory", dir)?;
        let path = entry.path();
        let file_type = entry.file_type().fs_context("inspecting", &path)?;
        if !file_type.is_file() {
            log::debug!("Skipping non-file asset entry {}", path.display());
            continue;
        }
        let Some(name) = entry.file_name().to_str().map(String::from) else {
            log::warn!("Skipping asset with non-UTF-8 name: {}", path.display());
            continue;
        };
        if name.starts_with('.') {
            continue;
        }
        assets.push((name, path));
    }
    assets.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(assets)
}
