//! Suggestion insertion
//!
//! Replaces a located span with a tracked deletion of the original content
//! followed by a tracked insertion of the replacement. The deletion keeps
//! every original run with its own formatting; the insertion takes the
//! formatting of the run the span started in.

use crate::{enable_tracking, RevisionCounter, RevisionError, Result, TrackedChangeRecord};
use chrono::{DateTime, Utc};
use doc_model::{DocumentTree, GroupKind, InlineGroup, NodeId, RevisionMark, Run, RunContent};
use edit_engine::{check_reachable, materialize_range, InsertionPoint, SearchResult};
use serde::{Deserialize, Serialize};

// =============================================================================
// Apply Suggestion Command
// =============================================================================

/// Propose replacing a located span with new text
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplySuggestion {
    pub author: String,
    pub date: DateTime<Utc>,
    /// Text proposed in place of the span
    pub replacement: String,
}

/// Records and nodes produced by one suggestion
#[derive(Debug, Clone)]
pub struct SuggestionOutcome {
    pub deletion: Option<TrackedChangeRecord>,
    pub insertion: Option<TrackedChangeRecord>,
    /// Groups inserted into the tree, in document order
    pub groups: Vec<NodeId>,
    /// Nodes removed outright while clearing the span
    pub removed: usize,
}

impl SuggestionOutcome {
    /// Revision ids assigned by this suggestion, deletion first
    pub fn revision_ids(&self) -> Vec<String> {
        self.deletion
            .iter()
            .chain(self.insertion.iter())
            .map(|record| record.id.to_string())
            .collect()
    }
}

impl ApplySuggestion {
    pub fn new(author: impl Into<String>, date: DateTime<Utc>, replacement: impl Into<String>) -> Self {
        Self {
            author: author.into(),
            date,
            replacement: replacement.into(),
        }
    }

    /// Swap the span for a deletion/insertion pair.
    ///
    /// Tracking is switched on first. An empty span yields only the
    /// insertion, an empty replacement only the deletion.
    pub fn apply(
        &self,
        tree: &mut DocumentTree,
        target: &SearchResult,
        counter: &mut RevisionCounter,
    ) -> Result<SuggestionOutcome> {
        if target.matched_text.is_empty() && self.replacement.is_empty() {
            return Err(RevisionError::InvalidOperation(
                "suggestion has neither original nor replacement text".into(),
            ));
        }

        check_reachable(tree, target.start.run, target.end.run)?;
        enable_tracking(tree);
        let range = materialize_range(tree, &target.start, &target.end)?;
        let mut slot = range.insertion;
        let mut outcome = SuggestionOutcome {
            deletion: None,
            insertion: None,
            groups: Vec::new(),
            removed: range.removed,
        };

        if !range.taken.is_empty() {
            let id = counter.next();
            let runs = range.taken.iter().map(as_deleted).collect();
            let group = self.insert_group(tree, slot, GroupKind::Deletion(self.mark(id.value())), runs)?;
            outcome.groups.push(group);
            outcome.deletion = Some(TrackedChangeRecord::deletion(
                id,
                &self.author,
                self.date,
                &target.matched_text,
            ));
            slot.index += 1;
        }

        if !self.replacement.is_empty() {
            let id = counter.next();
            let run = Run::with_content(range.formatting.clone(), vec![RunContent::Text(self.replacement.clone())]);
            let group = self.insert_group(tree, slot, GroupKind::Insertion(self.mark(id.value())), vec![run])?;
            outcome.groups.push(group);
            outcome.insertion = Some(TrackedChangeRecord::insertion(
                id,
                &self.author,
                self.date,
                &self.replacement,
            ));
        }

        tracing::debug!(
            "Suggested {:?} -> {:?} ({} nodes cleared)",
            target.matched_text,
            self.replacement,
            outcome.removed
        );
        Ok(outcome)
    }

    fn mark(&self, id: u64) -> RevisionMark {
        RevisionMark {
            id,
            author: self.author.clone(),
            date: self.date,
        }
    }

    fn insert_group(
        &self,
        tree: &mut DocumentTree,
        slot: InsertionPoint,
        kind: GroupKind,
        runs: Vec<Run>,
    ) -> Result<NodeId> {
        let group = tree.insert_group(InlineGroup::new(kind), slot.parent, Some(slot.index))?;
        for run in runs {
            tree.insert_run(run, group, None)?;
        }
        Ok(group)
    }
}

/// The same run with its visible text turned into deleted text
fn as_deleted(run: &Run) -> Run {
    let content = run
        .content
        .iter()
        .map(|leaf| match leaf {
            RunContent::Text(text) => RunContent::DeletedText(text.clone()),
            other => other.clone(),
        })
        .collect();
    run.fragment(content)
}
