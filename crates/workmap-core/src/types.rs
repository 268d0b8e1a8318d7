use std::collections::BTreeMap;

use serde::Serialize;

use crate::error::WorkmapError;

/// Canonical login name after alias resolution, used as the aggregation key.
pub type PersonIdentity = String;

/// One assignable unit of work, as reported by a tracker.
///
/// `group` is the enclosing repository or project name; `title` and `url`
/// identify the item itself. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkItem {
    pub group: String,
    pub title: String,
    pub url: String,
}

impl WorkItem {
    pub fn new(
        group: impl Into<String>,
        title: impl Into<String>,
        url: impl Into<String>,
    ) -> Self {
        Self {
            group: group.into(),
            title: title.into(),
            url: url.into(),
        }
    }
}

/// A fetch failure confined to one traversal branch (one repository's issue
/// list, one story's owner list). Sibling branches keep going; the failure is
/// reported alongside the finished mapping instead of aborting the run.
#[derive(Debug)]
pub struct BranchFailure {
    /// Human-readable branch description, e.g. `repository acme/widgets`.
    pub scope: String,
    pub error: WorkmapError,
}

impl BranchFailure {
    pub fn new(scope: impl Into<String>, error: WorkmapError) -> Self {
        Self {
            scope: scope.into(),
            error,
        }
    }
}

/// The finished output of one aggregation run: the identity-sorted mapping
/// plus whatever branch failures were isolated along the way.
#[derive(Debug, Default)]
pub struct RunSummary {
    pub assignments: BTreeMap<PersonIdentity, Vec<WorkItem>>,
    pub failures: Vec<BranchFailure>,
}

impl RunSummary {
    pub fn item_count(&self) -> usize {
        self.assignments.values().map(Vec::len).sum()
    }
}
