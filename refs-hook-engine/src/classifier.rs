//! Partition of one delivery's ref changes by change kind.

use std::collections::BTreeMap;

use tracing::info;

use crate::event::{ChangeKind, RefChange, RefsChangedEvent};

/// Changes of one delivery grouped by kind, delivery order kept per kind.
///
/// Never holds an `Unknown` key or an empty bucket.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassifiedChanges {
    buckets: BTreeMap<ChangeKind, Vec<RefChange>>,
}

impl ClassifiedChanges {
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn get(&self, kind: ChangeKind) -> Option<&[RefChange]> {
        self.buckets.get(&kind).map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (ChangeKind, &[RefChange])> {
        self.buckets.iter().map(|(k, v)| (*k, v.as_slice()))
    }
}

impl IntoIterator for ClassifiedChanges {
    type Item = (ChangeKind, Vec<RefChange>);
    type IntoIter = std::collections::btree_map::IntoIter<ChangeKind, Vec<RefChange>>;

    fn into_iter(self) -> Self::IntoIter {
        self.buckets.into_iter()
    }
}

/// Groups the event's changes into created / updated / removed buckets.
///
/// Changes whose raw type is not `ADD`, `UPDATE` or `DELETE` are logged and
/// dropped.
pub fn classify_changes(event: &RefsChangedEvent) -> ClassifiedChanges {
    let mut buckets: BTreeMap<ChangeKind, Vec<RefChange>> = BTreeMap::new();

    for change in &event.changes {
        if change.kind == ChangeKind::Unknown {
            info!(
                change_type = %change.change_type,
                ref_id = %change.ref_id,
                "Unknown change event type received from Bitbucket Server"
            );
            continue;
        }
        buckets.entry(change.kind).or_default().push(change.clone());
    }

    ClassifiedChanges { buckets }
}
