//! Orchestrator
//!
//! Applies a change list in input order against one tree. Every change is
//! located on the tree as left by the previous one, so the position index is
//! rebuilt per change. The first failing change aborts the rest; changes
//! already applied stay in the tree, and nothing is saved.

use crate::{AnnotateError, Change, ChangeKind, Result, ReviewSession, ReviewerConfig};
use doc_model::DocumentTree;
use edit_engine::{locate, MatchTier};
use serde::Serialize;
use std::fmt;
use std::path::Path;
use store::DocxPackage;

// =============================================================================
// Apply Report
// =============================================================================

/// Outcome of one applied change
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppliedChange {
    /// 1-based position in the change list
    pub index: usize,
    pub kind: ChangeKind,
    /// Resolution strategy that anchored the change
    pub tier: MatchTier,
    pub matched_text: String,
    /// Comment id, or the revision ids of the suggestion
    pub ids: Vec<String>,
}

impl fmt::Display for AppliedChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "#{} {} [{}] {:?} -> {}",
            self.index,
            self.kind,
            self.tier,
            self.matched_text,
            self.ids.join(", ")
        )
    }
}

/// Everything a batch did, in change order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ApplyReport {
    pub applied: Vec<AppliedChange>,
}

impl ApplyReport {
    pub fn len(&self) -> usize {
        self.applied.len()
    }

    pub fn is_empty(&self) -> bool {
        self.applied.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &AppliedChange> {
        self.applied.iter()
    }
}

// =============================================================================
// Applying changes
// =============================================================================

/// Apply one change. `index` is its 1-based position, used for reporting.
pub fn apply_change(
    tree: &mut DocumentTree,
    session: &mut ReviewSession,
    change: &Change,
    index: usize,
) -> Result<AppliedChange> {
    change.validate()?;

    let target = locate(tree, &change.position)?;
    if target.is_inverted() {
        return Err(AnnotateError::InvertedRange {
            start: target.start_offset,
            end: target.end_offset,
        });
    }

    let ids = match change.kind {
        ChangeKind::Comment => {
            let inserted = session.comment(&change.text).apply(tree, &target)?;
            vec![inserted.comment_id]
        }
        ChangeKind::Suggestion => {
            let command = session.suggestion(&change.text);
            command.apply(tree, &target, session.revisions_mut())?.revision_ids()
        }
    };

    tracing::info!(
        "Applied change {} ({}) on {:?} via {} match: {}",
        index,
        change.kind,
        target.matched_text,
        target.tier,
        ids.join(", ")
    );

    Ok(AppliedChange {
        index,
        kind: change.kind,
        tier: target.tier,
        matched_text: target.matched_text,
        ids,
    })
}

/// Apply `changes` in order, stopping at the first failure
pub fn apply_changes(
    tree: &mut DocumentTree,
    changes: &[Change],
    session: &mut ReviewSession,
) -> Result<ApplyReport> {
    let mut report = ApplyReport::default();
    for (i, change) in changes.iter().enumerate() {
        let index = i + 1;
        let applied = apply_change(tree, session, change, index).map_err(|e| e.in_change(index))?;
        report.applied.push(applied);
    }
    Ok(report)
}

/// Open `input`, apply `changes`, and save the result to `output`.
///
/// The document is written once, after every change has been applied; a
/// failure anywhere leaves `output` as it was.
pub fn process_document(
    input: &Path,
    changes: &[Change],
    output: &Path,
    config: &ReviewerConfig,
) -> Result<ApplyReport> {
    if input.as_os_str().is_empty() {
        return Err(AnnotateError::InvalidInput("document path is empty".into()));
    }
    if output.as_os_str().is_empty() {
        return Err(AnnotateError::InvalidInput("output path is empty".into()));
    }

    let mut package = DocxPackage::open(input)?;
    let mut session = ReviewSession::new(config, package.tree());
    let report = apply_changes(package.tree_mut(), changes, &mut session)?;

    package
        .save(output)
        .map_err(|source| AnnotateError::PersistenceFailure {
            path: output.to_path_buf(),
            source,
        })?;
    tracing::info!(
        "Applied {} change(s) to {}, saved to {}",
        report.len(),
        input.display(),
        output.display()
    );
    Ok(report)
}
