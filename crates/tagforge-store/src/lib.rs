//! Canonical serialization, content-addressed artifacts, and asset publishing for tagforge.
//!
//! This crate provides the output layer: `to_canonical_bytes` for key-order
//! independent JSON, `ArtifactWriter` for digest-named artifacts and their
//! "latest" aliases, `DistLayout` for the distribution directory structure,
//! `copy_tree`/`AssetLedger` for consolidating image trees, and
//! `BuildManifest` for the `lastupdated.json` record.

pub mod artifacts;
pub mod assets;
pub mod canonical;
pub mod layout;
pub mod manifest;

pub use artifacts::{ArtifactWriter, PublishedArtifact};
pub use assets::{copy_tree, list_tree, AssetFile, AssetLedger};
pub use canonical::to_canonical_bytes;
pub use layout::{ArtifactKind, DistLayout, MANIFEST_FILE};
pub use manifest::BuildManifest;

use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;
use thiserror::Error;

/// Fsync a directory to ensure that a preceding `rename()` is durable.
///
/// POSIX does not guarantee a rename survives a crash until the parent
/// directory itself has been synced.
pub(crate) fn fsync_dir(dir: &Path) -> Result<(), std::io::Error> {
    let f = std::fs::File::open(dir)?;
    f.sync_all()
}

/// Write `data` to `dest` through a temporary sibling and an atomic rename.
///
/// Readers of `dest` observe either the previous content or the new content,
/// never a partial write.
pub(crate) fn write_atomic(dest: &Path, data: &[u8]) -> Result<(), StoreError> {
    let dir = dest
        .parent()
        .ok_or_else(|| StoreError::Io(std::io::Error::other("destination has no parent")))?;
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(data)?;
    tmp.as_file().sync_all()?;
    tmp.persist(dest).map_err(|e| StoreError::Io(e.error))?;
    fsync_dir(dir)?;
    Ok(())
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("circular structure detected at {path}")]
    CircularStructure { path: String },
    #[error("failed to walk '{path}': {reason}")]
    Walk { path: String, reason: String },
}
