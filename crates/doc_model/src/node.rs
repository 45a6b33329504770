//! Core node trait and types

use crate::NodeId;
use serde::{Deserialize, Serialize};

/// Enumeration of all node types stored in the document arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeType {
    Document,
    Paragraph,
    Run,
    Table,
    TableRow,
    TableCell,
    /// `commentRangeStart` / `commentRangeEnd`
    CommentMarker,
    /// Inline wrapper around runs (hyperlink, tracked insertion/deletion, ...)
    InlineGroup,
    /// Element the model does not interpret, kept verbatim
    Opaque,
}

impl NodeType {
    /// Whether a node of this type may hold `child` directly
    pub fn accepts(self, child: NodeType) -> bool {
        use NodeType::*;
        match self {
            Document | TableCell => matches!(child, Paragraph | Table | Opaque),
            Table => matches!(child, TableRow | Opaque),
            TableRow => matches!(child, TableCell | Opaque),
            Paragraph | InlineGroup => matches!(child, Run | InlineGroup | CommentMarker | Opaque),
            Run | CommentMarker | Opaque => false,
        }
    }

    /// Block-level containers whose children are paragraphs and tables
    pub fn is_block_container(self) -> bool {
        matches!(self, NodeType::Document | NodeType::TableCell)
    }
}

/// Common interface for all document nodes
pub trait Node: std::fmt::Debug {
    /// Get the unique ID of this node
    fn id(&self) -> NodeId;

    /// Get the type of this node
    fn node_type(&self) -> NodeType;

    /// Get the ID of the parent node (None for root or detached nodes)
    fn parent(&self) -> Option<NodeId>;

    /// Set the parent node ID
    fn set_parent(&mut self, parent: Option<NodeId>);

    /// Get the IDs of child nodes
    fn children(&self) -> &[NodeId] {
        &[]
    }
}

/// Node that owns an ordered list of children
pub trait ContainerNode: Node {
    /// Mutable access to the child list
    fn children_mut(&mut self) -> &mut Vec<NodeId>;

    /// Add a child at the end
    fn add_child(&mut self, child_id: NodeId) {
        self.children_mut().push(child_id);
    }

    /// Insert a child at a specific index
    fn insert_child(&mut self, index: usize, child_id: NodeId) {
        self.children_mut().insert(index, child_id);
    }

    /// Remove a child by ID
    fn remove_child(&mut self, child_id: NodeId) -> bool {
        let children = self.children_mut();
        if let Some(pos) = children.iter().position(|&id| id == child_id) {
            children.remove(pos);
            true
        } else {
            false
        }
    }
}
