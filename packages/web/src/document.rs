use std::rc::Rc;

use headsync::{
    AttributeKind, HeadKey, HeadStore, JSON_LD_TYPE, MANAGED_ATTRIBUTE, MARKER_ATTRIBUTE,
};
use wasm_bindgen::JsValue;
use web_sys::{Document, Element, HtmlHeadElement};

/// The head of the browser's document.
///
/// Elements are found by walking the children of `<head>` and comparing attributes, never by
/// building a CSS selector out of a meta key, so any key is matched literally.
pub struct WebHead {
    document: Document,
    head: HtmlHeadElement,
}

impl WebHead {
    /// The head of the current window's document
    pub fn get() -> Option<Rc<dyn HeadStore>> {
        let document = web_sys::window()?.document()?;
        let head: Rc<dyn HeadStore> = Rc::new(Self::new(document)?);
        Some(head)
    }

    /// Wrap a document. Returns `None` if it has no `<head>`.
    pub fn new(document: Document) -> Option<Self> {
        let head = document.head()?;
        Some(Self { document, head })
    }

    fn children(&self) -> Vec<Element> {
        let children = self.head.children();
        (0..children.length())
            .filter_map(|idx| children.item(idx))
            .collect()
    }

    fn matching(&self, key: &HeadKey) -> Vec<Element> {
        self.children()
            .into_iter()
            .filter(|element| matches_key(element, key))
            .collect()
    }

    fn write(&self, element: &Element, key: &HeadKey, value: &str) {
        match key {
            HeadKey::Title | HeadKey::StructuredData(_) => element.set_text_content(Some(value)),
            HeadKey::Meta { .. } => {
                log_err(element.set_attribute("content", value), "set meta content");
            }
            HeadKey::Canonical => {
                log_err(element.set_attribute("href", value), "set canonical href");
            }
        }
        log_err(
            element.set_attribute(MANAGED_ATTRIBUTE, ""),
            "mark head element as managed",
        );
    }

    fn create(&self, key: &HeadKey, value: &str) {
        let tag = match key {
            HeadKey::Title => "title",
            HeadKey::Meta { .. } => "meta",
            HeadKey::Canonical => "link",
            HeadKey::StructuredData(_) => "script",
        };
        let Some(element) = log_err(self.document.create_element(tag), "create head element")
        else {
            return;
        };

        let identity = match key {
            HeadKey::Title => Ok(()),
            HeadKey::Meta { attribute, key } => element.set_attribute(attribute.as_str(), key),
            HeadKey::Canonical => element.set_attribute("rel", "canonical"),
            HeadKey::StructuredData(marker) => element
                .set_attribute("type", JSON_LD_TYPE)
                .and_then(|_| element.set_attribute(MARKER_ATTRIBUTE, marker)),
        };
        if log_err(identity, "identify head element").is_none() {
            return;
        }

        self.write(&element, key, value);
        log_err(self.head.append_child(&element), "append to head");
    }
}

impl HeadStore for WebHead {
    fn entries(&self) -> Vec<(HeadKey, String)> {
        let mut entries = Vec::new();

        let title = self.document.title();
        if !title.is_empty() {
            entries.push((HeadKey::Title, title));
        }

        entries.extend(
            self.children()
                .iter()
                .filter(|element| element.has_attribute(MANAGED_ATTRIBUTE))
                .filter_map(entry_of),
        );
        entries
    }

    fn upsert(&self, key: &HeadKey, value: &str) {
        if let HeadKey::Title = key {
            // creates the <title> if the document has none
            self.document.set_title(value);
            return;
        }

        let mut found = self.matching(key).into_iter();
        match found.next() {
            Some(element) => {
                self.write(&element, key, value);
                for duplicate in found {
                    duplicate.remove();
                }
            }
            None => self.create(key, value),
        }
    }

    fn remove(&self, key: &HeadKey) -> bool {
        let found = self.matching(key);
        for element in &found {
            element.remove();
        }
        !found.is_empty()
    }

    fn count(&self, key: &HeadKey) -> usize {
        self.matching(key).len()
    }
}

fn tag_is(element: &Element, name: &str) -> bool {
    element.tag_name().eq_ignore_ascii_case(name)
}

fn is_canonical(element: &Element) -> bool {
    tag_is(element, "link")
        && element.get_attribute("rel").is_some_and(|rel| {
            rel.split_ascii_whitespace()
                .any(|token| token.eq_ignore_ascii_case("canonical"))
        })
}

fn matches_key(element: &Element, key: &HeadKey) -> bool {
    match key {
        HeadKey::Title => tag_is(element, "title"),
        HeadKey::Meta { attribute, key } => {
            tag_is(element, "meta")
                && element.get_attribute(attribute.as_str()).as_deref() == Some(key.as_str())
        }
        HeadKey::Canonical => is_canonical(element),
        HeadKey::StructuredData(marker) => {
            tag_is(element, "script")
                && element.get_attribute(MARKER_ATTRIBUTE).as_deref() == Some(marker.as_str())
        }
    }
}

fn entry_of(element: &Element) -> Option<(HeadKey, String)> {
    if tag_is(element, "meta") {
        let content = element.get_attribute("content").unwrap_or_default();
        if let Some(name) = element.get_attribute("name") {
            return Some((HeadKey::meta(AttributeKind::Name, name), content));
        }
        let property = element.get_attribute("property")?;
        return Some((HeadKey::meta(AttributeKind::Property, property), content));
    }

    if is_canonical(element) {
        return Some((
            HeadKey::Canonical,
            element.get_attribute("href").unwrap_or_default(),
        ));
    }

    if tag_is(element, "script") {
        let marker = element.get_attribute(MARKER_ATTRIBUTE)?;
        return Some((
            HeadKey::StructuredData(marker),
            element.text_content().unwrap_or_default(),
        ));
    }

    None
}

fn log_err<T>(result: Result<T, JsValue>, action: &str) -> Option<T> {
    result
        .map_err(|err| tracing::warn!("failed to {action}: {err:?}"))
        .ok()
}
