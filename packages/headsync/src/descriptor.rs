use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::HeadKey;

/// The attribute a `<meta>` element is keyed by.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttributeKind {
    /// `<meta name="description">`, `<meta name="twitter:card">`
    Name,
    /// `<meta property="og:title">`
    Property,
}

impl AttributeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttributeKind::Name => "name",
            AttributeKind::Property => "property",
        }
    }
}

impl std::fmt::Display for AttributeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One `<meta>` element of a page.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TagSpec {
    pub attribute: AttributeKind,
    pub key: String,
    pub content: String,
}

impl TagSpec {
    /// A `<meta name=key content=content>` tag
    pub fn name(key: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            attribute: AttributeKind::Name,
            key: key.into(),
            content: content.into(),
        }
    }

    /// A `<meta property=key content=content>` tag
    pub fn property(key: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            attribute: AttributeKind::Property,
            key: key.into(),
            content: content.into(),
        }
    }

    pub fn head_key(&self) -> HeadKey {
        HeadKey::meta(self.attribute, self.key.clone())
    }
}

/// The head a single page wants: built fresh on every activation and applied as a whole.
///
/// Anything a previous page set that is not mentioned here is removed when the descriptor is
/// synchronized, so a descriptor must always carry every field the page cares about.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MetadataDescriptor {
    /// The exact document title.
    pub title: String,

    /// Meta tags in the order they should be created.
    pub tags: Vec<TagSpec>,

    /// The absolute URL of the canonical link. Empty means the page has no canonical link.
    pub canonical_url: String,

    /// JSON-LD payloads. More than one payload is merged into a single `@graph`.
    pub structured_data: Vec<Value>,
}

impl MetadataDescriptor {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn with_tag(mut self, tag: TagSpec) -> Self {
        self.tags.push(tag);
        self
    }

    pub fn with_name(self, key: impl Into<String>, content: impl Into<String>) -> Self {
        self.with_tag(TagSpec::name(key, content))
    }

    pub fn with_property(self, key: impl Into<String>, content: impl Into<String>) -> Self {
        self.with_tag(TagSpec::property(key, content))
    }

    pub fn with_canonical(mut self, url: impl Into<String>) -> Self {
        self.canonical_url = url.into();
        self
    }

    pub fn with_structured_data(mut self, payload: Value) -> Self {
        self.structured_data.push(payload);
        self
    }

    /// The title, meta and canonical entries this descriptor asks for.
    ///
    /// Tags that share a key collapse into one entry: the last content wins and the entry keeps the
    /// position of the first occurrence. Structured data is not part of the result.
    pub fn entries(&self) -> Vec<(HeadKey, String)> {
        let mut entries = Vec::with_capacity(self.tags.len() + 2);
        entries.push((HeadKey::Title, self.title.clone()));

        let mut positions: FxHashMap<HeadKey, usize> = FxHashMap::default();
        for tag in &self.tags {
            let key = tag.head_key();
            match positions.get(&key) {
                Some(&idx) => entries[idx].1 = tag.content.clone(),
                None => {
                    positions.insert(key.clone(), entries.len());
                    entries.push((key, tag.content.clone()));
                }
            }
        }

        if !self.canonical_url.is_empty() {
            entries.push((HeadKey::Canonical, self.canonical_url.clone()));
        }

        entries
    }
}
