//! Record model, namespace classification, identity keys, and image paths for tagforge.
//!
//! This crate defines the schema layer: the typed record variants for each
//! namespace (`AmiiboRecord`, `SkylanderRecord`) with their defaults and lite
//! projections, the total `classify` function used to route patch entries, the
//! per-namespace `IdentityKey` used for duplicate detection, and the
//! `normalize_image_path` rule that keeps published image references stable.

pub mod identity;
pub mod image;
pub mod namespace;
pub mod record;
pub mod types;

pub use identity::IdentityKey;
pub use image::{normalize_image_path, IMAGES_ROOT};
pub use namespace::{classify, Namespace, RecordKind};
pub use record::{AmiiboLite, AmiiboRecord, RawRecord, SkylanderLite, SkylanderRecord, TagRecord};
pub use types::{Digest, ShortDigest};
