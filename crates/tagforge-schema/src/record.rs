use crate::identity::IdentityKey;
use crate::image::normalize_image_path;
use crate::namespace::{Namespace, RecordKind};
use serde::{Serialize, Serializer};
use serde_json::{Map, Number, Value};

/// A record as it appears in a source file, before defaults are applied.
pub type RawRecord = Map<String, Value>;

/// Behaviour shared by the typed record of each namespace.
///
/// Raw source objects are converted with [`from_raw`](Self::from_raw), which
/// resolves every declared field to its default so downstream stages never
/// see an absent field.
pub trait TagRecord: Serialize + Sized {
    const NAMESPACE: Namespace;

    /// Reduced projection published in the lite artifact.
    type Lite: Serialize;

    fn from_raw(raw: RawRecord) -> Self;

    /// Identity key for duplicate detection, or `None` when the record is
    /// exempt (it has no identity yet).
    fn identity(&self) -> Option<IdentityKey>;

    fn image(&self) -> &str;

    fn set_image(&mut self, image: String);

    fn lite(&self) -> Self::Lite;

    fn normalize_image(&mut self) {
        let normalized = normalize_image_path(self.image());
        self.set_image(normalized);
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AmiiboRecord {
    #[serde(rename = "type")]
    pub kind: RecordKind,
    pub amiibo_series: String,
    pub character: String,
    pub game_series: String,
    pub head: String,
    pub tail: String,
    pub name: String,
    pub image: String,
    /// Source fields this variant does not declare, published untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SkylanderRecord {
    #[serde(rename = "type")]
    pub kind: RecordKind,
    pub game_series: String,
    pub figure_id: Number,
    pub variant: Number,
    /// `None` when the source had no numeric `sig`; published as `0`.
    #[serde(serialize_with = "serialize_or_zero")]
    pub sig: Option<Number>,
    pub name: String,
    pub image: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AmiiboLite {
    pub name: String,
    pub head: String,
    pub tail: String,
    pub amiibo_series: String,
    pub image: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SkylanderLite {
    pub name: String,
    pub figure_id: Number,
    pub variant: Number,
    pub sig: Number,
    pub image: String,
}

impl TagRecord for AmiiboRecord {
    const NAMESPACE: Namespace = Namespace::Amiibo;
    type Lite = AmiiboLite;

    fn from_raw(mut raw: RawRecord) -> Self {
        raw.remove("type");
        Self {
            kind: RecordKind::Amiibo,
            amiibo_series: take_string(&mut raw, "amiiboSeries"),
            character: take_string(&mut raw, "character"),
            game_series: take_string(&mut raw, "gameSeries"),
            head: take_string(&mut raw, "head"),
            tail: take_string(&mut raw, "tail"),
            name: take_string(&mut raw, "name"),
            image: take_string(&mut raw, "image"),
            extra: raw,
        }
    }

    fn identity(&self) -> Option<IdentityKey> {
        if self.head.is_empty() && self.tail.is_empty() {
            return None;
        }
        Some(IdentityKey::HeadTail {
            head: self.head.clone(),
            tail: self.tail.clone(),
        })
    }

    fn image(&self) -> &str {
        &self.image
    }

    fn set_image(&mut self, image: String) {
        self.image = image;
    }

    fn lite(&self) -> AmiiboLite {
        AmiiboLite {
            name: self.name.clone(),
            head: self.head.clone(),
            tail: self.tail.clone(),
            amiibo_series: self.amiibo_series.clone(),
            image: self.image.clone(),
        }
    }
}

impl TagRecord for SkylanderRecord {
    const NAMESPACE: Namespace = Namespace::Skylanders;
    type Lite = SkylanderLite;

    fn from_raw(mut raw: RawRecord) -> Self {
        raw.remove("type");
        Self {
            kind: RecordKind::Skylander,
            game_series: take_string(&mut raw, "gameSeries"),
            figure_id: take_int(&mut raw, "figureId").unwrap_or_else(zero),
            variant: take_int(&mut raw, "variant").unwrap_or_else(zero),
            sig: take_int(&mut raw, "sig"),
            name: take_string(&mut raw, "name"),
            image: take_string(&mut raw, "image"),
            extra: raw,
        }
    }

    fn identity(&self) -> Option<IdentityKey> {
        Some(match &self.sig {
            Some(sig) => IdentityKey::Sig { sig: sig.clone() },
            None => IdentityKey::Figure {
                figure_id: self.figure_id.clone(),
                variant: self.variant.clone(),
            },
        })
    }

    fn image(&self) -> &str {
        &self.image
    }

    fn set_image(&mut self, image: String) {
        self.image = image;
    }

    fn lite(&self) -> SkylanderLite {
        SkylanderLite {
            name: self.name.clone(),
            figure_id: self.figure_id.clone(),
            variant: self.variant.clone(),
            sig: self.sig.clone().unwrap_or_else(zero),
            image: self.image.clone(),
        }
    }
}

fn take_string(raw: &mut RawRecord, key: &str) -> String {
    match raw.remove(key) {
        Some(Value::String(s)) => s,
        _ => String::new(),
    }
}

fn zero() -> Number {
    Number::from(0)
}

// Integers are kept exactly, whatever their magnitude. Non-integral numbers
// truncate toward zero; anything else counts as absent.
fn take_int(raw: &mut RawRecord, key: &str) -> Option<Number> {
    match raw.remove(key) {
        Some(Value::Number(n)) => Some(truncate(n)),
        _ => None,
    }
}

fn truncate(n: Number) -> Number {
    if n.is_i64() || n.is_u64() {
        return n;
    }
    let Some(whole) = n.as_f64().map(f64::trunc) else {
        return n;
    };
    if whole >= i64::MIN as f64 && whole < i64::MAX as f64 {
        Number::from(whole as i64)
    } else if whole >= 0.0 && whole < u64::MAX as f64 {
        Number::from(whole as u64)
    } else {
        Number::from_f64(whole).unwrap_or(n)
    }
}

#[allow(clippy::ref_option)]
fn serialize_or_zero<S: Serializer>(value: &Option<Number>, serializer: S) -> Result<S::Ok, S::Error> {
    match value {
        Some(n) => n.serialize(serializer),
        None => serializer.serialize_i64(0),
    }
}
