use crate::layout::{ArtifactKind, DistLayout};
use crate::{write_atomic, StoreError};
use serde::Serialize;
use std::path::PathBuf;
use tagforge_schema::Digest;
use tracing::debug;

/// A content-addressed artifact written by [`ArtifactWriter::publish`].
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct PublishedArtifact {
    pub kind: ArtifactKind,
    pub digest: Digest,
    pub versioned_path: PathBuf,
    pub alias_path: PathBuf,
    pub size: usize,
}

/// Writes canonical bytes as a digest-named artifact plus its "latest" alias.
///
/// Both files are written through a temporary sibling and an atomic rename,
/// so a reader of the distribution root never sees a partial file.
pub struct ArtifactWriter {
    layout: DistLayout,
    stem: String,
}

impl ArtifactWriter {
    pub fn new(layout: DistLayout, stem: impl Into<String>) -> Self {
        Self {
            layout,
            stem: stem.into(),
        }
    }

    /// Publish `bytes` as the `kind` artifact and return its digest and paths.
    ///
    /// The versioned file is skipped when it already exists, since its name
    /// pins its content. The alias is always rewritten.
    pub fn publish(&self, kind: ArtifactKind, bytes: &[u8]) -> Result<PublishedArtifact, StoreError> {
        let digest = Digest::of(bytes);
        let versioned_path = self.layout.versioned_path(&self.stem, kind, &digest);
        let alias_path = self.layout.alias_path(&self.stem, kind);

        if versioned_path.exists() {
            debug!("{kind} artifact {} already published", digest.short());
        } else {
            write_atomic(&versioned_path, bytes)?;
            debug!("wrote {}", versioned_path.display());
        }
        write_atomic(&alias_path, bytes)?;
        debug!("updated alias {}", alias_path.display());

        Ok(PublishedArtifact {
            kind,
            digest,
            versioned_path,
            alias_path,
            size: bytes.len(),
        })
    }
}
