//! Table nodes: Table, TableRow, TableCell
//!
//! Property blocks (`w:tblPr`, `w:tblGrid`, `w:trPr`, `w:tcPr`) are kept as
//! opaque children in their original position, so the containers below only
//! track structure.

use crate::{ContainerNode, Node, NodeId, NodeType};
use serde::{Deserialize, Serialize};

/// A table node - container for rows
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Table {
    id: NodeId,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl Table {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Node for Table {
    fn id(&self) -> NodeId {
        self.id
    }

    fn node_type(&self) -> NodeType {
        NodeType::Table
    }

    fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    fn set_parent(&mut self, parent: Option<NodeId>) {
        self.parent = parent;
    }

    fn children(&self) -> &[NodeId] {
        &self.children
    }
}

impl ContainerNode for Table {
    fn children_mut(&mut self) -> &mut Vec<NodeId> {
        &mut self.children
    }
}

/// A table row - container for cells
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TableRow {
    id: NodeId,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    /// Attributes of the row element
    #[serde(default)]
    pub attributes: Vec<(String, String)>,
}

impl TableRow {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Node for TableRow {
    fn id(&self) -> NodeId {
        self.id
    }

    fn node_type(&self) -> NodeType {
        NodeType::TableRow
    }

    fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    fn set_parent(&mut self, parent: Option<NodeId>) {
        self.parent = parent;
    }

    fn children(&self) -> &[NodeId] {
        &self.children
    }
}

impl ContainerNode for TableRow {
    fn children_mut(&mut self) -> &mut Vec<NodeId> {
        &mut self.children
    }
}

/// A table cell - block container holding paragraphs and nested tables
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TableCell {
    id: NodeId,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl TableCell {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Node for TableCell {
    fn id(&self) -> NodeId {
        self.id
    }

    fn node_type(&self) -> NodeType {
        NodeType::TableCell
    }

    fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    fn set_parent(&mut self, parent: Option<NodeId>) {
        self.parent = parent;
    }

    fn children(&self) -> &[NodeId] {
        &self.children
    }
}

impl ContainerNode for TableCell {
    fn children_mut(&mut self) -> &mut Vec<NodeId> {
        &mut self.children
    }
}
