//! Build pipeline for tagforge catalogs.
//!
//! This crate ties the schema and store layers together into the `Pipeline`:
//! it loads the base catalog of each namespace, aggregates community patch
//! fragments, merges and validates record identities, normalizes image
//! references, consolidates image assets, and publishes the full and lite
//! content-addressed artifacts along with the build manifest.

pub mod config;
pub mod merge;
pub mod patches;
pub mod pipeline;
pub mod source;

pub use config::{BaseShape, PipelineConfig, SourceConfig, CONFIG_FILE};
pub use merge::{merge_namespace, RawEntry};
pub use patches::{aggregate_patches, PatchSet};
pub use pipeline::{BuildReport, Pipeline};
pub use source::{load_base, BaseCatalog};
pub use tagforge_store::StoreError;

use std::path::Path;
use tagforge_schema::{IdentityKey, Namespace};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("malformed base catalog '{path}': {reason}")]
    MalformedBase { path: String, reason: String },
    #[error("malformed patch '{path}': {reason}")]
    MalformedPatch { path: String, reason: String },
    #[error("invalid JSON in '{path}': {source}")]
    InvalidJson {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("duplicate {namespace} record ({key}): {second} collides with {first}")]
    DuplicateRecord {
        namespace: Namespace,
        key: IdentityKey,
        first: String,
        second: String,
    },
    #[error("image collision at images/{relative}: {current} would overwrite {previous}")]
    AssetCollision {
        relative: String,
        previous: String,
        current: String,
    },
    #[error("cannot read input tree '{path}': {reason}")]
    UnreadableInput { path: String, reason: String },
    #[error("config error: {0}")]
    Config(String),
    #[error("failed to read '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("store error: {0}")]
    Store(#[from] StoreError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CoreError {
    /// Whether the error comes from the build inputs (catalogs, patches,
    /// config) rather than from writing the distribution.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            CoreError::MalformedBase { .. }
                | CoreError::MalformedPatch { .. }
                | CoreError::InvalidJson { .. }
                | CoreError::DuplicateRecord { .. }
                | CoreError::AssetCollision { .. }
                | CoreError::UnreadableInput { .. }
                | CoreError::Config(_)
                | CoreError::Read { .. }
        )
    }
}

/// Read a JSON document, naming the file in any error.
pub(crate) fn read_json(path: &Path) -> Result<serde_json::Value, CoreError> {
    let content = std::fs::read_to_string(path).map_err(|source| CoreError::Read {
        path: path.display().to_string(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| CoreError::InvalidJson {
        path: path.display().to_string(),
        source,
    })
}

/// Short description of a JSON value's type, for error messages.
pub(crate) fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}
