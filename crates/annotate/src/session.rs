//! Per-run review session
//!
//! Owns the state shared by every change of one run: the author stamp, the
//! session timestamp and the revision counter. Comment ids need no state of
//! their own since they derive from the document's comment table.

use crate::ReviewerConfig;
use chrono::{DateTime, SubsecRound, Utc};
use doc_model::DocumentTree;
use edit_engine::AddComment;
use revisions::{ApplySuggestion, RevisionCounter};

#[derive(Debug, Clone)]
pub struct ReviewSession {
    author: String,
    initials: Option<String>,
    timestamp: DateTime<Utc>,
    revisions: RevisionCounter,
}

impl ReviewSession {
    /// Start a session on `tree`.
    ///
    /// Revision ids continue after the largest one already in the tree.
    pub fn new(config: &ReviewerConfig, tree: &DocumentTree) -> Self {
        let timestamp = config.date.unwrap_or_else(|| Utc::now().trunc_subsecs(0));
        let revisions = RevisionCounter::from_tree(tree);
        tracing::debug!(
            "Review session for {} at {}, revisions after {}",
            config.author,
            timestamp,
            revisions.last()
        );
        Self {
            author: config.author.clone(),
            initials: config.initials.clone(),
            timestamp,
            revisions,
        }
    }

    pub fn author(&self) -> &str {
        &self.author
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn revisions(&self) -> &RevisionCounter {
        &self.revisions
    }

    pub fn revisions_mut(&mut self) -> &mut RevisionCounter {
        &mut self.revisions
    }

    /// Comment command stamped with this session's author and time
    pub fn comment(&self, body: &str) -> AddComment {
        AddComment::new(&self.author, body)
            .with_initials(self.initials.clone())
            .with_date(self.timestamp)
    }

    /// Suggestion command stamped with this session's author and time
    pub fn suggestion(&self, replacement: &str) -> ApplySuggestion {
        ApplySuggestion::new(&self.author, self.timestamp, replacement)
    }
}
