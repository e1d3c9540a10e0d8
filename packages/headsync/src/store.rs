use std::fmt::Display;

use crate::AttributeKind;

/// The identity of one synchronized node in the head.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum HeadKey {
    /// The `<title>` element
    Title,

    /// A `<meta>` element matched by `[attribute=key]`
    Meta { attribute: AttributeKind, key: String },

    /// The `<link rel="canonical">` element
    Canonical,

    /// A JSON-LD `<script>` tagged with a page marker
    StructuredData(String),
}

impl HeadKey {
    pub fn meta(attribute: AttributeKind, key: impl Into<String>) -> Self {
        HeadKey::Meta {
            attribute,
            key: key.into(),
        }
    }

    pub fn structured_data(marker: impl Into<String>) -> Self {
        HeadKey::StructuredData(marker.into())
    }

    pub fn is_structured_data(&self) -> bool {
        matches!(self, HeadKey::StructuredData(_))
    }
}

impl Display for HeadKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HeadKey::Title => write!(f, "title"),
            HeadKey::Meta { attribute, key } => write!(f, "meta[{attribute}={key:?}]"),
            HeadKey::Canonical => write!(f, "link[rel=canonical]"),
            HeadKey::StructuredData(marker) => {
                write!(f, "script[{}={marker:?}]", crate::MARKER_ATTRIBUTE)
            }
        }
    }
}

/// A document head the synchronizer can read and mutate.
///
/// The value of a key is the title text, the meta `content`, the canonical `href`, or the script's
/// JSON text. Stores are shared as `Rc<dyn HeadStore>`, so mutation goes through `&self`.
///
/// A store never fails: backends that talk to a real document log and skip operations the
/// document rejects.
pub trait HeadStore {
    /// The nodes the synchronizer manages, in document order.
    ///
    /// Unmanaged nodes, like a `<meta charset>` from the page template, are not listed.
    fn entries(&self) -> Vec<(HeadKey, String)>;

    /// Set the node for `key` to `value`, creating it if it does not exist.
    ///
    /// After the call exactly one node matches `key` and it is managed.
    fn upsert(&self, key: &HeadKey, value: &str);

    /// Remove every node matching `key`. Returns whether anything was removed.
    fn remove(&self, key: &HeadKey) -> bool;

    /// The number of nodes currently matching `key`, managed or not.
    fn count(&self, key: &HeadKey) -> usize;
}
