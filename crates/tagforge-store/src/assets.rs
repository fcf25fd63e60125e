use crate::StoreError;
use serde::Serialize;
use std::collections::HashMap;
use std::fs;
use std::path::{Component, Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// A file inside an image source tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssetFile {
    /// Path relative to the source root, always `/`-separated.
    pub relative: String,
    pub source: PathBuf,
}

/// Recursively list every file under `src`, sorted by path.
///
/// A missing `src` yields an empty list.
pub fn list_tree(src: &Path) -> Result<Vec<AssetFile>, StoreError> {
    if !src.is_dir() {
        return Ok(Vec::new());
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(src).follow_links(true).sort_by_file_name() {
        let entry = entry.map_err(|e| StoreError::Walk {
            path: e.path().unwrap_or(src).display().to_string(),
            reason: e.to_string(),
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        let rel = entry
            .path()
            .strip_prefix(src)
            .map_err(|e| StoreError::Io(std::io::Error::other(format!("path strip: {e}"))))?;
        files.push(AssetFile {
            relative: portable_path(rel),
            source: entry.path().to_path_buf(),
        });
    }
    Ok(files)
}

/// Copy every file under `src` to the same relative path under `dest_root`.
///
/// Existing destination files are overwritten. A missing `src` is a no-op.
pub fn copy_tree(src: &Path, dest_root: &Path) -> Result<Vec<AssetFile>, StoreError> {
    if !src.is_dir() {
        debug!("image source {} does not exist, skipping", src.display());
        return Ok(Vec::new());
    }

    let files = list_tree(src)?;
    for file in &files {
        let dest = dest_root.join(&file.relative);
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::copy(&file.source, &dest)?;
    }
    debug!(
        "copied {} file(s) from {} to {}",
        files.len(),
        src.display(),
        dest_root.display()
    );
    Ok(files)
}

/// Tracks which source tree owns each destination path during one build.
#[derive(Debug, Default)]
pub struct AssetLedger {
    owners: HashMap<String, PathBuf>,
}

impl AssetLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim `file.relative` for `root`.
    ///
    /// Returns the previous owner when a different source tree already
    /// claimed the same destination path.
    pub fn claim(&mut self, root: &Path, file: &AssetFile) -> Option<PathBuf> {
        match self.owners.insert(file.relative.clone(), root.to_path_buf()) {
            Some(previous) if previous != root => Some(previous),
            _ => None,
        }
    }
}

fn portable_path(rel: &Path) -> String {
    rel.components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}
