//! schema.org nodes for the structured data of a page.
//!
//! Each node serializes with its `@type` and an optional `@id`. Nodes point at each other with
//! [`NodeRef`]s so a page's payloads can be merged into one `@graph`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A `{ "@id": ... }` reference to another node in the graph.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeRef {
    #[serde(rename = "@id")]
    pub id: String,
}

impl NodeRef {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "@type", rename = "WebPage", rename_all = "camelCase")]
pub struct WebPage {
    #[serde(rename = "@id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub url: String,
    pub name: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_part_of: Option<NodeRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub about: Option<NodeRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub main_entity: Option<NodeRef>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "@type", rename = "WebSite")]
pub struct WebSite {
    #[serde(rename = "@id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub url: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publisher: Option<NodeRef>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "@type", rename = "Person", rename_all = "camelCase")]
pub struct Person {
    #[serde(rename = "@id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_title: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub same_as: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "@type", rename = "Service", rename_all = "camelCase")]
pub struct Service {
    #[serde(rename = "@id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    pub description: String,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub area_served: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<NodeRef>,
}

/// One question of an FAQ accordion, as the page renders it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaqEntry {
    pub question: String,
    pub answer: String,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "@type", rename = "FAQPage", rename_all = "camelCase")]
pub struct FaqPage {
    #[serde(rename = "@id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub main_entity: Vec<Question>,
}

impl FaqPage {
    pub fn from_entries(id: Option<String>, entries: &[FaqEntry]) -> Self {
        Self {
            id,
            main_entity: entries.iter().map(Question::from).collect(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "@type", rename = "Question", rename_all = "camelCase")]
pub struct Question {
    pub name: String,
    pub accepted_answer: Answer,
}

impl From<&FaqEntry> for Question {
    fn from(entry: &FaqEntry) -> Self {
        Self {
            name: entry.question.clone(),
            accepted_answer: Answer {
                text: entry.answer.clone(),
            },
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "@type", rename = "Answer")]
pub struct Answer {
    pub text: String,
}

/// Turn a node into a JSON-LD payload.
///
/// The node types in this module always serialize; a custom node that fails is logged and
/// becomes `null`, which the merge step skips.
pub fn to_payload(node: &impl Serialize) -> Value {
    serde_json::to_value(node).unwrap_or_else(|err| {
        tracing::warn!("dropping structured data node that failed to serialize: {err}");
        Value::Null
    })
}
