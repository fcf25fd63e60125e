use serde::Serialize;
use serde_json::Number;
use std::fmt;

/// Field combination used to detect duplicate records within a namespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum IdentityKey {
    /// Amiibo `(head, tail)` pair.
    HeadTail { head: String, tail: String },
    /// Skylander signature, used whenever the source carried a numeric `sig`.
    Sig { sig: Number },
    /// Skylander `(figureId, variant)` pair, used when no `sig` was given.
    Figure { figure_id: Number, variant: Number },
}

impl fmt::Display for IdentityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdentityKey::HeadTail { head, tail } => write!(f, "head={head} tail={tail}"),
            IdentityKey::Sig { sig } => write!(f, "sig={sig}"),
            IdentityKey::Figure { figure_id, variant } => {
                write!(f, "figureId={figure_id} variant={variant}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_every_key_part() {
        let key = IdentityKey::HeadTail {
            head: "04".to_owned(),
            tail: "0102030405060708".to_owned(),
        };
        assert_eq!(key.to_string(), "head=04 tail=0102030405060708");
        assert_eq!(
            IdentityKey::Figure {
                figure_id: 1200.into(),
                variant: 3.into()
            }
            .to_string(),
            "figureId=1200 variant=3"
        );
    }

    #[test]
    fn sig_and_figure_keys_never_collide() {
        assert_ne!(
            IdentityKey::Sig { sig: 0.into() },
            IdentityKey::Figure {
                figure_id: 0.into(),
                variant: 0.into()
            }
        );
    }

    #[test]
    fn large_signatures_display_exactly() {
        let key = IdentityKey::Sig {
            sig: Number::from(u64::MAX),
        };
        assert_eq!(key.to_string(), "sig=18446744073709551615");
    }
}
