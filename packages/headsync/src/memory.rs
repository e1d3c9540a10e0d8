//! An in-memory document head.
//!
//! Used as the store in tests and on the server, where the head is collected during rendering and
//! written out with [`crate::render::render_head`].

use std::cell::RefCell;

use crate::{AttributeKind, HeadKey, HeadStore};

/// A node in a [`MemoryHead`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HeadNode {
    Title(String),
    Meta {
        attribute: AttributeKind,
        key: String,
        content: String,
    },
    /// `<meta charset>` from the page template
    Charset(String),
    Link {
        rel: String,
        href: String,
    },
    Script {
        marker: Option<String>,
        json: String,
    },
}

impl HeadNode {
    /// The synchronizer key this node answers to, if any.
    pub fn key(&self) -> Option<HeadKey> {
        match self {
            HeadNode::Title(_) => Some(HeadKey::Title),
            HeadNode::Meta { attribute, key, .. } => Some(HeadKey::meta(*attribute, key.clone())),
            HeadNode::Link { rel, .. } if is_canonical(rel) => Some(HeadKey::Canonical),
            HeadNode::Script {
                marker: Some(marker),
                ..
            } => Some(HeadKey::StructuredData(marker.clone())),
            _ => None,
        }
    }

    fn matches(&self, key: &HeadKey) -> bool {
        match (self, key) {
            (HeadNode::Title(_), HeadKey::Title) => true,
            (
                HeadNode::Meta {
                    attribute, key: k, ..
                },
                HeadKey::Meta {
                    attribute: a,
                    key: wanted,
                },
            ) => attribute == a && k == wanted,
            (HeadNode::Link { rel, .. }, HeadKey::Canonical) => is_canonical(rel),
            (
                HeadNode::Script {
                    marker: Some(marker),
                    ..
                },
                HeadKey::StructuredData(wanted),
            ) => marker == wanted,
            _ => false,
        }
    }

    fn value(&self) -> &str {
        match self {
            HeadNode::Title(text) => text,
            HeadNode::Meta { content, .. } => content,
            HeadNode::Charset(charset) => charset,
            HeadNode::Link { href, .. } => href,
            HeadNode::Script { json, .. } => json,
        }
    }

    fn set_value(&mut self, value: &str) {
        let slot = match self {
            HeadNode::Title(text) => text,
            HeadNode::Meta { content, .. } => content,
            HeadNode::Charset(charset) => charset,
            HeadNode::Link { href, .. } => href,
            HeadNode::Script { json, .. } => json,
        };
        value.clone_into(slot);
    }

    fn from_key(key: &HeadKey, value: &str) -> Self {
        match key {
            HeadKey::Title => HeadNode::Title(value.to_string()),
            HeadKey::Meta { attribute, key } => HeadNode::Meta {
                attribute: *attribute,
                key: key.clone(),
                content: value.to_string(),
            },
            HeadKey::Canonical => HeadNode::Link {
                rel: "canonical".to_string(),
                href: value.to_string(),
            },
            HeadKey::StructuredData(marker) => HeadNode::Script {
                marker: Some(marker.clone()),
                json: value.to_string(),
            },
        }
    }
}

fn is_canonical(rel: &str) -> bool {
    rel.split_ascii_whitespace()
        .any(|token| token.eq_ignore_ascii_case("canonical"))
}

#[derive(Clone, Debug)]
struct Slot {
    node: HeadNode,
    managed: bool,
}

/// A document head held in memory.
#[derive(Default, Debug)]
pub struct MemoryHead {
    nodes: RefCell<Vec<Slot>>,
}

impl MemoryHead {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an unmanaged node, as if it came with the page template.
    pub fn seed(&self, node: HeadNode) {
        self.nodes.borrow_mut().push(Slot {
            node,
            managed: false,
        });
    }

    /// All nodes in document order.
    pub fn nodes(&self) -> Vec<HeadNode> {
        self.nodes
            .borrow()
            .iter()
            .map(|slot| slot.node.clone())
            .collect()
    }

    /// All nodes in document order, with whether the synchronizer manages them.
    pub fn nodes_with_ownership(&self) -> Vec<(HeadNode, bool)> {
        self.nodes
            .borrow()
            .iter()
            .map(|slot| (slot.node.clone(), slot.managed))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.nodes.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.borrow().is_empty()
    }

    pub fn title(&self) -> Option<String> {
        self.value_of(&HeadKey::Title)
    }

    pub fn meta_content(&self, attribute: AttributeKind, key: &str) -> Option<String> {
        self.value_of(&HeadKey::meta(attribute, key))
    }

    pub fn canonical(&self) -> Option<String> {
        self.value_of(&HeadKey::Canonical)
    }

    /// The JSON text of the structured-data script tagged `marker`.
    pub fn script(&self, marker: &str) -> Option<String> {
        self.value_of(&HeadKey::structured_data(marker))
    }

    fn value_of(&self, key: &HeadKey) -> Option<String> {
        self.nodes
            .borrow()
            .iter()
            .find(|slot| slot.node.matches(key))
            .map(|slot| slot.node.value().to_string())
    }
}

impl HeadStore for MemoryHead {
    fn entries(&self) -> Vec<(HeadKey, String)> {
        self.nodes
            .borrow()
            .iter()
            .filter(|slot| slot.managed)
            .filter_map(|slot| Some((slot.node.key()?, slot.node.value().to_string())))
            .collect()
    }

    fn upsert(&self, key: &HeadKey, value: &str) {
        let mut nodes = self.nodes.borrow_mut();

        let Some(first) = nodes.iter().position(|slot| slot.node.matches(key)) else {
            let slot = Slot {
                node: HeadNode::from_key(key, value),
                managed: true,
            };
            // the title goes right after the charset declaration
            match key {
                HeadKey::Title => {
                    let at = nodes
                        .iter()
                        .take_while(|slot| matches!(slot.node, HeadNode::Charset(_)))
                        .count();
                    nodes.insert(at, slot);
                }
                _ => nodes.push(slot),
            }
            return;
        };

        nodes[first].node.set_value(value);
        nodes[first].managed = true;

        // collapse any duplicates that were already in the document
        let mut idx = 0;
        nodes.retain(|slot| {
            let keep = idx <= first || !slot.node.matches(key);
            idx += 1;
            keep
        });
    }

    fn remove(&self, key: &HeadKey) -> bool {
        let mut nodes = self.nodes.borrow_mut();
        let before = nodes.len();
        nodes.retain(|slot| !slot.node.matches(key));
        nodes.len() != before
    }

    fn count(&self, key: &HeadKey) -> usize {
        self.nodes
            .borrow()
            .iter()
            .filter(|slot| slot.node.matches(key))
            .count()
    }
}
