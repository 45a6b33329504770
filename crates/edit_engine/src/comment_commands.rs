//! Comment insertion
//!
//! Anchors a comment on a located span: a range-start marker before the
//! span, a range-end marker after it and a reference run right after the
//! end marker. The span's own content is left as it was.

use crate::{isolate_range, Result, SearchResult};
use chrono::{DateTime, Utc};
use doc_model::{
    CommentMarker, CommentRecord, DocumentTree, NodeId, Run, RunContent, RunProperties,
};
use serde::{Deserialize, Serialize};

/// Character style applied to the reference run
pub const COMMENT_REFERENCE_STYLE: &str = "CommentReference";

// =============================================================================
// Add Comment Command
// =============================================================================

/// Add a comment to a located span
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddComment {
    /// Author of the comment
    pub author: String,
    /// Author initials, if known
    pub initials: Option<String>,
    /// Timestamp stamped on the record
    pub date: Option<DateTime<Utc>>,
    /// Content of the comment
    pub content: String,
}

/// Nodes created for one comment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentInsertion {
    pub comment_id: String,
    pub start_marker: NodeId,
    pub end_marker: NodeId,
    pub reference_run: NodeId,
}

impl AddComment {
    /// Create a new add comment command
    pub fn new(author: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            author: author.into(),
            initials: None,
            date: None,
            content: content.into(),
        }
    }

    pub fn with_initials(mut self, initials: Option<String>) -> Self {
        self.initials = initials;
        self
    }

    pub fn with_date(mut self, date: DateTime<Utc>) -> Self {
        self.date = Some(date);
        self
    }

    /// Insert the markers around `target` and record the comment.
    ///
    /// The id is one more than the largest id in the document's comment
    /// table, so ids keep increasing across calls on the same tree.
    pub fn apply(&self, tree: &mut DocumentTree, target: &SearchResult) -> Result<CommentInsertion> {
        let range = isolate_range(tree, &target.start, &target.end)?;
        let comment_id = tree.comments.next_id();

        let end_marker = tree.insert_marker(
            CommentMarker::range_end(&comment_id),
            range.end.parent,
            Some(range.end.index),
        )?;
        let reference = Run::with_content(
            RunProperties::with_style(COMMENT_REFERENCE_STYLE),
            vec![RunContent::CommentReference(comment_id.clone())],
        );
        let reference_run = tree.insert_run(reference, range.end.parent, Some(range.end.index + 1))?;
        let start_marker = tree.insert_marker(
            CommentMarker::range_start(&comment_id),
            range.start.parent,
            Some(range.start.index),
        )?;

        tree.comments.push(
            CommentRecord::new(comment_id.clone(), &self.author, self.date, &self.content)
                .with_initials(self.initials.clone()),
        );
        tracing::debug!("Anchored comment {} on {:?}", comment_id, target.matched_text);

        Ok(CommentInsertion {
            comment_id,
            start_marker,
            end_marker,
            reference_run,
        })
    }
}
