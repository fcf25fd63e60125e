use crate::record::RawRecord;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// One of the two independent record domains in a catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Namespace {
    Amiibo,
    Skylanders,
}

/// The `type` tag carried by a single record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    Amiibo,
    Skylander,
}

impl Namespace {
    /// Key used for this namespace in keyed base files and in the output envelope.
    pub fn key(self) -> &'static str {
        match self {
            Namespace::Amiibo => "amiibo",
            Namespace::Skylanders => "skylanders",
        }
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl RecordKind {
    pub fn tag(self) -> &'static str {
        match self {
            RecordKind::Amiibo => "amiibo",
            RecordKind::Skylander => "skylander",
        }
    }
}

const SKYLANDER_NUMERIC_FIELDS: [&str; 3] = ["figureId", "variant", "sig"];

/// Decide which namespace a patch entry belongs to.
///
/// Precedence is fixed: an explicit `type` tag (case-insensitive) wins, then
/// the presence of any numeric skylander field, then amiibo as the fallback.
pub fn classify(raw: &RawRecord) -> Namespace {
    if let Some(Value::String(tag)) = raw.get("type") {
        if tag.eq_ignore_ascii_case(RecordKind::Skylander.tag()) {
            return Namespace::Skylanders;
        }
        if tag.eq_ignore_ascii_case(RecordKind::Amiibo.tag()) {
            return Namespace::Amiibo;
        }
    }

    let has_numeric_figure_field = SKYLANDER_NUMERIC_FIELDS
        .iter()
        .any(|field| raw.get(*field).is_some_and(Value::is_number));
    if has_numeric_figure_field {
        Namespace::Skylanders
    } else {
        Namespace::Amiibo
    }
}
