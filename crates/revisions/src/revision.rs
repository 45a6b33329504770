//! Revision ids and tracked-change records

use chrono::{DateTime, Utc};
use doc_model::DocumentTree;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for a tracked change
///
/// The container attribute carries the bare number; records and reports
/// show it as `rev_<n>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RevisionId(u64);

impl RevisionId {
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    /// Numeric value written to the document
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for RevisionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rev_{}", self.0)
    }
}

/// One tracked change produced by a suggestion
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackedChangeRecord {
    pub id: RevisionId,
    pub author: String,
    pub date: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inserted_text: Option<String>,
}

impl TrackedChangeRecord {
    pub fn deletion(id: RevisionId, author: impl Into<String>, date: DateTime<Utc>, text: impl Into<String>) -> Self {
        Self {
            id,
            author: author.into(),
            date,
            deleted_text: Some(text.into()),
            inserted_text: None,
        }
    }

    pub fn insertion(id: RevisionId, author: impl Into<String>, date: DateTime<Utc>, text: impl Into<String>) -> Self {
        Self {
            id,
            author: author.into(),
            date,
            deleted_text: None,
            inserted_text: Some(text.into()),
        }
    }
}

// =============================================================================
// Revision counter
// =============================================================================

/// Monotonic revision id source owned by one editing session
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevisionCounter {
    last: u64,
}

impl RevisionCounter {
    /// Counter whose first id is 1
    pub fn new() -> Self {
        Self::default()
    }

    /// Counter whose first id is `start + 1`
    pub fn seeded(start: u64) -> Self {
        Self { last: start }
    }

    /// Counter that continues after every revision id already in the tree
    pub fn from_tree(tree: &DocumentTree) -> Self {
        let last = tree
            .nodes
            .groups
            .values()
            .filter_map(|group| group.revision_id())
            .max()
            .unwrap_or(0);
        Self::seeded(last)
    }

    /// Last id handed out (or the seed when none has been)
    pub fn last(&self) -> u64 {
        self.last
    }

    pub fn next(&mut self) -> RevisionId {
        self.last += 1;
        RevisionId(self.last)
    }
}
