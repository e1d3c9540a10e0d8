//! Merging and serializing JSON-LD payloads.

use serde_json::{Map, Value};

/// The `@context` of every structured-data block.
pub const SCHEMA_CONTEXT: &str = "https://schema.org";

/// Merge the payloads of one page into a single JSON-LD document.
///
/// - no payloads: `None`, the page has no structured data
/// - one object: the object itself, with `@context` added if it has none
/// - several payloads, or a bare array: `{ "@context": ..., "@graph": [...] }`
///
/// Nested `@graph` documents are flattened into the outer graph and per-node `@context` keys are
/// dropped. `null` payloads are skipped.
pub fn merge_payloads(payloads: &[Value]) -> Option<Value> {
    let payloads: Vec<&Value> = payloads.iter().filter(|value| !value.is_null()).collect();

    match payloads.as_slice() {
        [] => None,
        [Value::Object(single)] if !single.contains_key("@graph") => {
            let mut single = single.clone();
            if !single.contains_key("@context") {
                single.insert("@context".to_string(), Value::from(SCHEMA_CONTEXT));
            }
            Some(Value::Object(single))
        }
        many => {
            let mut graph = Vec::new();
            for payload in many {
                collect_nodes(payload, &mut graph);
            }
            if graph.is_empty() {
                return None;
            }

            let mut document = Map::new();
            document.insert("@context".to_string(), Value::from(SCHEMA_CONTEXT));
            document.insert("@graph".to_string(), Value::Array(graph));
            Some(Value::Object(document))
        }
    }
}

fn collect_nodes(payload: &Value, graph: &mut Vec<Value>) {
    match payload {
        Value::Array(items) => {
            for item in items {
                collect_nodes(item, graph);
            }
        }
        Value::Object(object) => match object.get("@graph") {
            Some(nested) => collect_nodes(nested, graph),
            None => {
                let mut node = object.clone();
                node.remove("@context");
                graph.push(Value::Object(node));
            }
        },
        Value::Null => {}
        other => graph.push(other.clone()),
    }
}

/// Serialize a JSON-LD document for the body of a `<script>` element.
///
/// `</` is written as `<\/` so the text can never close the element early. Both spellings parse
/// to the same JSON string.
pub fn to_script_text(document: &Value) -> String {
    document.to_string().replace("</", "<\\/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn nothing_to_merge() {
        assert_eq!(merge_payloads(&[]), None);
        assert_eq!(merge_payloads(&[Value::Null]), None);
    }

    #[test]
    fn single_payload_gets_a_context() {
        let merged = merge_payloads(&[json!({ "@type": "FAQPage", "mainEntity": [] })]);
        assert_eq!(
            merged,
            Some(json!({
                "@context": "https://schema.org",
                "@type": "FAQPage",
                "mainEntity": []
            }))
        );
    }

    #[test]
    fn single_payload_keeps_its_own_context() {
        let payload = json!({ "@context": "https://schema.org/", "@type": "Person" });
        assert_eq!(merge_payloads(&[payload.clone()]), Some(payload));
    }

    #[test]
    fn several_payloads_become_a_graph() {
        let merged = merge_payloads(&[
            json!({ "@context": "https://schema.org", "@type": "WebPage", "@id": "#page" }),
            json!({ "@type": "Service", "@id": "#service" }),
            json!({ "@graph": [{ "@type": "Person" }, { "@type": "WebSite" }] }),
        ]);

        assert_eq!(
            merged,
            Some(json!({
                "@context": "https://schema.org",
                "@graph": [
                    { "@type": "WebPage", "@id": "#page" },
                    { "@type": "Service", "@id": "#service" },
                    { "@type": "Person" },
                    { "@type": "WebSite" }
                ]
            }))
        );
    }

    #[test]
    fn script_text_cannot_close_the_element() {
        let document = json!({ "name": "</script><script>alert(1)</script>" });
        let text = to_script_text(&document);

        assert!(!text.contains("</"));
        let parsed: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed, document);
    }
}
