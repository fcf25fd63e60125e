use crate::StoreError;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tagforge_schema::{Digest, IMAGES_ROOT};

/// Fixed name of the build manifest, overwritten on every run.
pub const MANIFEST_FILE: &str = "lastupdated.json";

/// The two distributions produced by each build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactKind {
    Full,
    Lite,
}

impl ArtifactKind {
    /// Base name shared by the versioned file and the alias, e.g. `tags.lite`.
    fn base_name(self, stem: &str) -> String {
        match self {
            ArtifactKind::Full => stem.to_owned(),
            ArtifactKind::Lite => format!("{stem}.lite"),
        }
    }
}

impl std::fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ArtifactKind::Full => write!(f, "full"),
            ArtifactKind::Lite => write!(f, "lite"),
        }
    }
}

/// Directory layout of a distribution root.
///
/// Holds the content-addressed artifacts, their aliases, the build manifest,
/// and the consolidated `images/` tree. Directories are created on
/// [`initialize`](Self::initialize).
#[derive(Debug, Clone)]
pub struct DistLayout {
    root: PathBuf,
}

impl DistLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[inline]
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[inline]
    pub fn images_dir(&self) -> PathBuf {
        self.root.join(IMAGES_ROOT)
    }

    #[inline]
    pub fn manifest_path(&self) -> PathBuf {
        self.root.join(MANIFEST_FILE)
    }

    /// `<stem>.<digest>.json` or `<stem>.lite.<digest>.json`.
    pub fn versioned_path(&self, stem: &str, kind: ArtifactKind, digest: &Digest) -> PathBuf {
        self.root
            .join(format!("{}.{digest}.json", kind.base_name(stem)))
    }

    /// `<stem>.json` or `<stem>.lite.json`.
    pub fn alias_path(&self, stem: &str, kind: ArtifactKind) -> PathBuf {
        self.root.join(format!("{}.json", kind.base_name(stem)))
    }

    pub fn initialize(&self) -> Result<(), StoreError> {
        fs::create_dir_all(&self.root)?;
        fs::create_dir_all(self.images_dir())?;
        Ok(())
    }
}
