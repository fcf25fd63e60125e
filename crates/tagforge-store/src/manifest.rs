use crate::layout::DistLayout;
use crate::{write_atomic, StoreError};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use tagforge_schema::Digest;

/// Digests of the latest full and lite artifacts plus the build time.
///
/// Written to `lastupdated.json` on every build; no history is kept.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BuildManifest {
    pub full: Digest,
    pub lite: Digest,
    /// ISO-8601 UTC timestamp with millisecond precision.
    pub last_updated: String,
}

impl BuildManifest {
    pub fn new(full: Digest, lite: Digest, built_at: DateTime<Utc>) -> Self {
        Self {
            full,
            lite,
            last_updated: built_at.to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }

    pub fn write(&self, layout: &DistLayout) -> Result<(), StoreError> {
        let content = serde_json::to_string_pretty(self)?;
        write_atomic(&layout.manifest_path(), content.as_bytes())
    }

    pub fn read(layout: &DistLayout) -> Result<Self, StoreError> {
        let content = fs::read_to_string(layout.manifest_path())?;
        Ok(serde_json::from_str(&content)?)
    }
}
