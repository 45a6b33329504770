//! Document root node and document-level settings

use crate::{ContainerNode, Node, NodeId, NodeType};
use serde::{Deserialize, Serialize};

/// Document-level settings the model cares about
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentSettings {
    /// Whether edits are recorded as tracked changes
    pub track_revisions: bool,
}

/// The root document node
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    id: NodeId,
    /// IDs of top-level body children (paragraphs, tables, opaque blocks)
    body_children: Vec<NodeId>,
    pub settings: DocumentSettings,
    /// Version counter for tracking changes
    version: u64,
}

impl Document {
    /// Create a new empty document
    pub fn new() -> Self {
        Self {
            id: NodeId::new(),
            body_children: Vec::new(),
            settings: DocumentSettings::default(),
            version: 0,
        }
    }

    /// Get the document version
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Increment version after a change
    pub fn increment_version(&mut self) {
        self.version += 1;
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Node for Document {
    fn id(&self) -> NodeId {
        self.id
    }

    fn node_type(&self) -> NodeType {
        NodeType::Document
    }

    fn children(&self) -> &[NodeId] {
        &self.body_children
    }

    fn parent(&self) -> Option<NodeId> {
        None // Document is the root
    }

    fn set_parent(&mut self, _parent: Option<NodeId>) {
        // Document cannot have a parent
    }
}

impl ContainerNode for Document {
    fn children_mut(&mut self) -> &mut Vec<NodeId> {
        &mut self.body_children
    }
}
