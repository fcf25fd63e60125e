use crate::CoreError;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::path::PathBuf;
use tagforge_schema::{IdentityKey, RawRecord, TagRecord};

/// A raw record together with where it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct RawEntry {
    pub origin: PathBuf,
    pub index: usize,
    pub fields: RawRecord,
}

impl RawEntry {
    /// `<file>#<index>`, used to point at a record in error messages.
    pub fn location(&self) -> String {
        format!("{}#{}", self.origin.display(), self.index)
    }
}

/// Merge base and patch entries into the typed catalog of one namespace.
///
/// Defaults are applied as each entry is converted, base entries come first,
/// and order is otherwise preserved. The first identity key seen twice fails
/// the merge with [`CoreError::DuplicateRecord`].
pub fn merge_namespace<R: TagRecord>(
    base: Vec<RawEntry>,
    patches: Vec<RawEntry>,
) -> Result<Vec<R>, CoreError> {
    let mut seen: HashMap<IdentityKey, String> = HashMap::new();
    let mut records = Vec::with_capacity(base.len() + patches.len());

    for entry in base.into_iter().chain(patches) {
        let location = entry.location();
        let record = R::from_raw(entry.fields);
        if let Some(key) = record.identity() {
            match seen.entry(key) {
                Entry::Occupied(existing) => {
                    return Err(CoreError::DuplicateRecord {
                        namespace: R::NAMESPACE,
                        key: existing.key().clone(),
                        first: existing.get().clone(),
                        second: location,
                    });
                }
                Entry::Vacant(slot) => {
                    slot.insert(location);
                }
            }
        }
        records.push(record);
    }

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};
    use tagforge_schema::{AmiiboRecord, Namespace, SkylanderRecord};

    fn entry(origin: &str, index: usize, value: Value) -> RawEntry {
        let Value::Object(fields) = value else {
            panic!("expected object");
        };
        RawEntry {
            origin: PathBuf::from(origin),
            index,
            fields,
        }
    }

    #[test]
    fn base_entries_come_before_patches() {
        let base = vec![entry("amiibo.json", 0, json!({"head": "04", "tail": "A"}))];
        let patches = vec![
            entry("p/1.json", 0, json!({"head": "05", "tail": "B"})),
            entry("p/2.json", 0, json!({"head": "06", "tail": "C"})),
        ];
        let merged: Vec<AmiiboRecord> = merge_namespace(base, patches).unwrap();
        let heads: Vec<&str> = merged.iter().map(|r| r.head.as_str()).collect();
        assert_eq!(heads, vec!["04", "05", "06"]);
    }

    #[test]
    fn duplicate_head_tail_fails() {
        let record = json!({"head": "04", "tail": "0102030405060708", "name": "Mario"});
        let base = vec![entry("amiibo.json", 0, record.clone())];
        let patches = vec![entry("p/dup.json", 3, record)];

        let err = merge_namespace::<AmiiboRecord>(base, patches).unwrap_err();
        match err {
            CoreError::DuplicateRecord {
                namespace,
                key,
                first,
                second,
            } => {
                assert_eq!(namespace, Namespace::Amiibo);
                assert_eq!(
                    key,
                    IdentityKey::HeadTail {
                        head: "04".to_owned(),
                        tail: "0102030405060708".to_owned()
                    }
                );
                assert_eq!(first, "amiibo.json#0");
                assert_eq!(second, "p/dup.json#3");
            }
            other => panic!("expected DuplicateRecord, got {other}"),
        }
    }

    #[test]
    fn empty_head_tail_pairs_are_exempt() {
        let base = vec![
            entry("amiibo.json", 0, json!({"head": "", "tail": "", "name": "A"})),
            entry("amiibo.json", 1, json!({"head": "", "tail": "", "name": "B"})),
        ];
        let merged: Vec<AmiiboRecord> = merge_namespace(base, Vec::new()).unwrap();
        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn duplicate_skylander_sig_fails() {
        let base = vec![entry("sky.json", 0, json!({"figureId": 1, "sig": 42}))];
        let patches = vec![entry("p.json", 0, json!({"figureId": 2, "sig": 42}))];
        let err = merge_namespace::<SkylanderRecord>(base, patches).unwrap_err();
        assert!(matches!(
            err,
            CoreError::DuplicateRecord {
                namespace: Namespace::Skylanders,
                ..
            }
        ));
    }

    #[test]
    fn skylanders_without_sig_use_figure_and_variant() {
        let base = vec![
            entry("sky.json", 0, json!({"figureId": 1200, "variant": 0})),
            entry("sky.json", 1, json!({"figureId": 1200, "variant": 1})),
        ];
        let ok: Vec<SkylanderRecord> = merge_namespace(base.clone(), Vec::new()).unwrap();
        assert_eq!(ok.len(), 2);

        let patches = vec![entry("p.json", 0, json!({"figureId": 1200, "variant": 1}))];
        assert!(merge_namespace::<SkylanderRecord>(base, patches).is_err());
    }

    #[test]
    fn distinct_signatures_above_i64_do_not_collide() {
        let base = vec![
            entry("s.json", 0, json!({"sig": 9_223_372_036_854_775_808_u64})),
            entry("s.json", 1, json!({"sig": u64::MAX})),
        ];
        let merged: Vec<SkylanderRecord> = merge_namespace(base, Vec::new()).unwrap();
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[1].sig, Some(u64::MAX.into()));
    }

    #[test]
    fn equal_large_signatures_still_collide() {
        let base = vec![entry("s.json", 0, json!({"sig": u64::MAX}))];
        let patches = vec![entry("p.json", 0, json!({"sig": u64::MAX}))];
        let err = merge_namespace::<SkylanderRecord>(base, patches).unwrap_err();
        assert!(err.to_string().contains("sig=18446744073709551615"));
    }

    #[test]
    fn sig_keys_do_not_collide_with_figure_keys() {
        let base = vec![
            entry("sky.json", 0, json!({"figureId": 0, "variant": 0})),
            entry("sky.json", 1, json!({"sig": 0})),
        ];
        let merged: Vec<SkylanderRecord> = merge_namespace(base, Vec::new()).unwrap();
        assert_eq!(merged.len(), 2);
    }
}
