use std::collections::{BTreeMap, HashMap};

use parking_lot::Mutex;

use crate::alias::AliasTable;
use crate::types::{PersonIdentity, WorkItem};

/// Shared accumulator mapping canonical identity to assigned work items.
///
/// Safe for arbitrary concurrent `record` calls from fetch branches; one lock
/// guards the whole map, which is plenty since every append sits behind a
/// network round-trip. Insertion order per key is branch completion order and
/// carries no meaning.
#[derive(Debug, Default)]
pub struct Assignments {
    inner: Mutex<HashMap<PersonIdentity, Vec<WorkItem>>>,
}

impl Assignments {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `item` under `identity`, creating the entry if absent.
    pub fn record(&self, identity: impl Into<PersonIdentity>, item: WorkItem) {
        self.inner.lock().entry(identity.into()).or_default().push(item);
    }

    /// Resolve `raw_login` through the alias table and record under the
    /// canonical identity.
    pub fn record_as(&self, aliases: &AliasTable, raw_login: &str, item: WorkItem) {
        self.record(aliases.resolve(raw_login).to_string(), item);
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    /// Number of distinct identities recorded so far.
    pub fn identity_count(&self) -> usize {
        self.inner.lock().len()
    }

    /// Consume the accumulator into an immutable, identity-sorted mapping.
    /// Called once, after every traversal has joined.
    pub fn into_sorted(self) -> BTreeMap<PersonIdentity, Vec<WorkItem>> {
        self.inner.into_inner().into_iter().collect()
    }
}
