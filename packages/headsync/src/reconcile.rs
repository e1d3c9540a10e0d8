use rustc_hash::{FxHashMap, FxHashSet};

use crate::{HeadKey, MetadataDescriptor};

/// The mutations that bring a head from its current entries to a descriptor.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Reconciliation {
    /// Entries the head does not have yet, in descriptor order
    pub to_create: Vec<(HeadKey, String)>,

    /// Entries the head has with a different value, in descriptor order
    pub to_update: Vec<(HeadKey, String)>,

    /// Managed entries the descriptor no longer mentions, in document order
    pub to_remove: Vec<HeadKey>,

    /// How many entries already had the desired value
    pub unchanged: usize,
}

impl Reconciliation {
    /// Whether applying this plan would leave the head untouched.
    pub fn is_noop(&self) -> bool {
        self.to_create.is_empty() && self.to_update.is_empty() && self.to_remove.is_empty()
    }
}

/// Diff the managed entries of a head against the entries a descriptor asks for.
///
/// Structured data is owned by the page that inserted it and is never part of the plan. The title
/// is never removed, only created or updated.
pub fn reconcile(existing: &[(HeadKey, String)], desired: &MetadataDescriptor) -> Reconciliation {
    let current: FxHashMap<&HeadKey, &str> = existing
        .iter()
        .filter(|(key, _)| !key.is_structured_data())
        .map(|(key, value)| (key, value.as_str()))
        .collect();

    let wanted = desired.entries();
    let wanted_keys: FxHashSet<&HeadKey> = wanted.iter().map(|(key, _)| key).collect();

    let mut plan = Reconciliation::default();

    for (key, value) in &wanted {
        match current.get(key) {
            None => plan.to_create.push((key.clone(), value.clone())),
            Some(present) if *present == value.as_str() => plan.unchanged += 1,
            Some(_) => plan.to_update.push((key.clone(), value.clone())),
        }
    }

    let mut seen = FxHashSet::default();
    for (key, _) in existing {
        if matches!(key, HeadKey::Title | HeadKey::StructuredData(_)) {
            continue;
        }
        if !wanted_keys.contains(key) && seen.insert(key) {
            plan.to_remove.push(key.clone());
        }
    }

    plan
}
