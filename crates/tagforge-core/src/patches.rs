use crate::merge::RawEntry;
use crate::{json_kind, read_json, CoreError};
use serde_json::Value;
use std::collections::HashSet;
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};
use tagforge_schema::{classify, Namespace, IMAGES_ROOT};
use tracing::debug;
use walkdir::WalkDir;

/// Everything contributed by the patch tree, in discovery order.
#[derive(Debug, Default)]
pub struct PatchSet {
    pub amiibo: Vec<RawEntry>,
    pub skylanders: Vec<RawEntry>,
    /// Absolute paths of every `images/` directory under the patch root.
    pub image_dirs: Vec<PathBuf>,
    /// Patch files that were read.
    pub files: Vec<PathBuf>,
}

impl PatchSet {
    /// Move the entries of `namespace` out of the set.
    pub fn take(&mut self, namespace: Namespace) -> Vec<RawEntry> {
        match namespace {
            Namespace::Amiibo => std::mem::take(&mut self.amiibo),
            Namespace::Skylanders => std::mem::take(&mut self.skylanders),
        }
    }

    fn push(&mut self, entry: RawEntry) {
        match classify(&entry.fields) {
            Namespace::Amiibo => self.amiibo.push(entry),
            Namespace::Skylanders => self.skylanders.push(entry),
        }
    }
}

/// Read every patch fragment under `root` and classify its entries.
///
/// The tree is walked depth-first with entries sorted by file name, so the
/// result is stable across runs. Symbolic links are followed. A missing
/// `root` yields an empty set.
pub fn aggregate_patches(root: &Path) -> Result<PatchSet, CoreError> {
    let mut set = PatchSet::default();
    if !root.is_dir() {
        debug!("no patch directory at {}", root.display());
        return Ok(set);
    }

    let root = fs::canonicalize(root).map_err(|source| CoreError::Read {
        path: root.display().to_string(),
        source,
    })?;
    let mut seen_image_dirs = HashSet::new();

    for entry in WalkDir::new(&root).follow_links(true).sort_by_file_name() {
        let entry = entry.map_err(|e| CoreError::UnreadableInput {
            path: e.path().unwrap_or(&root).display().to_string(),
            reason: e.to_string(),
        })?;
        let path = entry.path();

        if entry.file_type().is_dir() {
            if entry.depth() > 0
                && entry.file_name() == OsStr::new(IMAGES_ROOT)
                && seen_image_dirs.insert(path.to_path_buf())
            {
                debug!("found patch image directory {}", path.display());
                set.image_dirs.push(path.to_path_buf());
            }
            continue;
        }

        if entry.file_type().is_file() && has_json_extension(path) {
            read_patch(path, &mut set)?;
        }
    }

    debug!(
        "aggregated {} patch file(s): {} amiibo, {} skylander entries, {} image dir(s)",
        set.files.len(),
        set.amiibo.len(),
        set.skylanders.len(),
        set.image_dirs.len()
    );
    Ok(set)
}

fn has_json_extension(path: &Path) -> bool {
    path.extension()
        .and_then(OsStr::to_str)
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}

fn read_patch(path: &Path, set: &mut PatchSet) -> Result<(), CoreError> {
    let malformed = |reason: String| CoreError::MalformedPatch {
        path: path.display().to_string(),
        reason,
    };

    let items = match read_json(path)? {
        Value::Array(items) => items,
        other => {
            return Err(malformed(format!(
                "expected a JSON array, found {}",
                json_kind(&other)
            )))
        }
    };

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
        set.push(RawEntry {
            origin: path.to_path_buf(),
            index,
            fields,
        });
    }
    set.files.push(path.to_path_buf());
    Ok(())
}
