use crate::config::BaseShape;
use crate::merge::RawEntry;
use crate::{json_kind, read_json, CoreError};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tagforge_schema::Namespace;
use tracing::debug;

/// Base records of one namespace as loaded from disk.
#[derive(Debug, Clone)]
pub struct BaseCatalog {
    pub namespace: Namespace,
    pub path: PathBuf,
    /// Shape actually found in the file: `Array` or `Keyed`, never `Auto`.
    pub shape: BaseShape,
    pub entries: Vec<RawEntry>,
}

/// Load the base catalog of `namespace` from `path`.
///
/// `expected` restricts the accepted top-level shape; `Auto` accepts both a
/// bare array and an object with the records under the namespace key.
pub fn load_base(
    namespace: Namespace,
    path: &Path,
    expected: BaseShape,
) -> Result<BaseCatalog, CoreError> {
    let malformed = |reason: String| CoreError::MalformedBase {
        path: path.display().to_string(),
        reason,
    };
    let key = namespace.key();

    let (shape, items) = match (read_json(path)?, expected) {
        (Value::Array(items), BaseShape::Auto | BaseShape::Array) => (BaseShape::Array, items),
        (Value::Object(mut map), BaseShape::Auto | BaseShape::Keyed) => match map.remove(key) {
            Some(Value::Array(items)) => (BaseShape::Keyed, items),
            Some(other) => {
                return Err(malformed(format!(
                    "\"{key}\" must be an array, found {}",
                    json_kind(&other)
                )))
            }
            None => return Err(malformed(format!("missing \"{key}\" array"))),
        },
        (other, BaseShape::Array) => {
            return Err(malformed(format!(
                "expected an array, found {}",
                json_kind(&other)
            )))
        }
        (other, BaseShape::Keyed) => {
            return Err(malformed(format!(
                "expected an object with a \"{key}\" array, found {}",
                json_kind(&other)
            )))
        }
        (other, BaseShape::Auto) => {
            return Err(malformed(format!(
                "expected an array or an object with a \"{key}\" array, found {}",
                json_kind(&other)
            )))
        }
    };

    let mut entries = Vec::with_capacity(items.len());
    for (index, item) in items.into_iter().enumerate() {
        let fields = match item {
            Value::Object(fields) => fields,
            other => {
                return Err(malformed(format!(
                    "entry {index} is {}, expected an object",
                    json_kind(&other)
                )))
            }
        };
        entries.push(RawEntry {
            origin: path.to_path_buf(),
            index,
            fields,
        });
    }

    debug!(
        "loaded {} {namespace} base record(s) from {}",
        entries.len(),
        path.display()
    );
    Ok(BaseCatalog {
        namespace,
        path: path.to_path_buf(),
        shape,
        entries,
    })
}
