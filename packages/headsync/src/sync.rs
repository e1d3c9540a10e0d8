use std::rc::Rc;

use rustc_hash::FxHashSet;
use serde_json::Value;

use crate::{
    jsonld, reconcile, AttributeKind, HeadKey, HeadStore, MetadataDescriptor, Reconciliation,
};

/// Brings a document head in line with the page that is currently active.
///
/// A synchronizer without a store is "detached": there is no document to write to (a headless
/// test, a renderer without a head) and every operation does nothing. Head metadata is an
/// enhancement, so a missing document is never an error.
#[derive(Clone, Default)]
pub struct HeadSynchronizer {
    store: Option<Rc<dyn HeadStore>>,
}

impl HeadSynchronizer {
    pub fn new(store: Rc<dyn HeadStore>) -> Self {
        Self { store: Some(store) }
    }

    /// A synchronizer with no document behind it.
    pub fn detached() -> Self {
        Self { store: None }
    }

    pub fn is_attached(&self) -> bool {
        self.store.is_some()
    }

    /// Set the document title.
    pub fn apply_title(&self, title: &str) {
        if let Some(store) = &self.store {
            store.upsert(&HeadKey::Title, title);
        }
    }

    /// Create or update the `<meta>` element matching `[attribute=key]`.
    ///
    /// The key is not validated. Calling this repeatedly with the same key never adds a node.
    pub fn upsert_meta_tag(&self, attribute: AttributeKind, key: &str, content: &str) {
        if let Some(store) = &self.store {
            store.upsert(&HeadKey::meta(attribute, key), content);
        }
    }

    /// Create or update the one `<link rel="canonical">`. The URL is written as given.
    pub fn upsert_canonical_link(&self, url: &str) {
        if let Some(store) = &self.store {
            store.upsert(&HeadKey::Canonical, url);
        }
    }

    /// Replace the structured-data script tagged `marker` with the merged `payloads`.
    ///
    /// Scripts of other markers are not touched. An empty payload list removes the script.
    pub fn replace_structured_data(&self, marker: &str, payloads: &[Value]) {
        let Some(store) = &self.store else {
            return;
        };

        let key = HeadKey::structured_data(marker);
        match jsonld::merge_payloads(payloads) {
            Some(document) => {
                tracing::trace!("replacing structured data for {marker:?}");
                store.upsert(&key, &jsonld::to_script_text(&document));
            }
            None => {
                store.remove(&key);
            }
        }
    }

    /// Remove the structured-data script tagged `marker`. Returns whether there was one.
    pub fn remove_structured_data(&self, marker: &str) -> bool {
        match &self.store {
            Some(store) => store.remove(&HeadKey::structured_data(marker)),
            None => false,
        }
    }

    /// Make the title, meta tags and canonical link exactly match `descriptor`.
    ///
    /// Managed meta tags and canonical links the descriptor does not mention are removed, so
    /// nothing from a previously active page survives. Structured data is left alone; see
    /// [`Self::activate`].
    ///
    /// An entry that already has the right value is still rewritten when the document holds more
    /// than one node for its key, which collapses copies inserted since the last run.
    pub fn synchronize(&self, descriptor: &MetadataDescriptor) -> Reconciliation {
        let Some(store) = &self.store else {
            return Reconciliation::default();
        };

        let mut plan = reconcile(&store.entries(), descriptor);
        let planned: FxHashSet<HeadKey> = plan
            .to_create
            .iter()
            .chain(plan.to_update.iter())
            .map(|(key, _)| key.clone())
            .collect();
        for (key, value) in descriptor.entries() {
            if !planned.contains(&key) && store.count(&key) > 1 {
                plan.unchanged = plan.unchanged.saturating_sub(1);
                plan.to_update.push((key, value));
            }
        }
        tracing::debug!(
            create = plan.to_create.len(),
            update = plan.to_update.len(),
            remove = plan.to_remove.len(),
            unchanged = plan.unchanged,
            "synchronizing head for {:?}",
            descriptor.title
        );

        for (key, value) in plan.to_create.iter().chain(plan.to_update.iter()) {
            tracing::trace!("upsert {key}");
            store.upsert(key, value);
        }
        for key in &plan.to_remove {
            tracing::trace!("remove {key}");
            store.remove(key);
        }

        plan
    }

    /// Activate a page: synchronize its descriptor and insert its structured data under `marker`.
    ///
    /// The returned handle is the page's lifetime. Disposing or dropping it removes the page's
    /// structured data, while the title, meta tags and canonical link stay for the next page to
    /// overwrite.
    ///
    /// Two live handles must not share a marker: releasing either one removes the script.
    pub fn activate(&self, marker: impl Into<String>, descriptor: &MetadataDescriptor) -> PageHead {
        let marker = marker.into();
        let reconciliation = self.synchronize(descriptor);
        self.replace_structured_data(&marker, &descriptor.structured_data);

        PageHead {
            store: self.store.clone(),
            marker,
            reconciliation,
        }
    }
}

/// The head-side lifetime of an active page, returned by [`HeadSynchronizer::activate`].
#[must_use = "dropping the handle immediately removes the page's structured data"]
pub struct PageHead {
    store: Option<Rc<dyn HeadStore>>,
    marker: String,
    reconciliation: Reconciliation,
}

impl PageHead {
    pub fn marker(&self) -> &str {
        &self.marker
    }

    /// The plan that was applied when the page activated
    pub fn reconciliation(&self) -> &Reconciliation {
        &self.reconciliation
    }

    /// Whether the handle still owns structured data in a document
    pub fn is_active(&self) -> bool {
        self.store.is_some()
    }

    /// Deactivate the page now. Returns whether a structured-data script was removed.
    pub fn dispose(mut self) -> bool {
        self.release()
    }

    fn release(&mut self) -> bool {
        let Some(store) = self.store.take() else {
            return false;
        };
        tracing::trace!("releasing structured data for {:?}", self.marker);
        store.remove(&HeadKey::structured_data(self.marker.as_str()))
    }
}

impl Drop for PageHead {
    fn drop(&mut self) {
        self.release();
    }
}

impl std::fmt::Debug for PageHead {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageHead")
            .field("marker", &self.marker)
            .field("active", &self.is_active())
            .finish()
    }
}
