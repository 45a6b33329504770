//! Document-level tracking switch

use doc_model::DocumentTree;
use serde::{Deserialize, Serialize};

/// Whether a document records edits as tracked changes
///
/// Once enabled it stays enabled for the rest of the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum TrackingState {
    #[default]
    Untracked,
    TrackingEnabled,
}

impl TrackingState {
    /// Current state of a document
    pub fn of(tree: &DocumentTree) -> Self {
        if tree.settings().track_revisions {
            TrackingState::TrackingEnabled
        } else {
            TrackingState::Untracked
        }
    }

    pub fn is_enabled(&self) -> bool {
        matches!(self, TrackingState::TrackingEnabled)
    }
}

/// Turn tracking on; a no-op when it already is
pub fn enable_tracking(tree: &mut DocumentTree) -> TrackingState {
    if !tree.settings().track_revisions {
        tree.settings_mut().track_revisions = true;
        tracing::debug!("Enabled revision tracking");
    }
    TrackingState::TrackingEnabled
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enable_is_idempotent() {
        let mut tree = DocumentTree::new();
        assert_eq!(TrackingState::of(&tree), TrackingState::Untracked);
        assert_eq!(enable_tracking(&mut tree), TrackingState::TrackingEnabled);
        assert_eq!(enable_tracking(&mut tree), TrackingState::TrackingEnabled);
        assert!(TrackingState::of(&tree).is_enabled());
    }
}
