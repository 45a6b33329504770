//! Paragraph node - a block of inline content

use crate::{ContainerNode, Node, NodeId, NodeType};
use serde::{Deserialize, Serialize};

/// A paragraph
///
/// Children are runs, inline groups, comment markers and opaque inline
/// elements, in document order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Paragraph {
    id: NodeId,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    /// Paragraph property block (`w:pPr`) as read
    pub properties_xml: Option<String>,
    /// Attributes of the paragraph element (rsids, paraId, ...)
    #[serde(default)]
    pub attributes: Vec<(String, String)>,
}

impl Paragraph {
    /// Create a new empty paragraph
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a paragraph with a property block
    pub fn with_properties(properties_xml: impl Into<String>) -> Self {
        Self {
            properties_xml: Some(properties_xml.into()),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}

impl Node for Paragraph {
    fn id(&self) -> NodeId {
        self.id
    }

    fn node_type(&self) -> NodeType {
        NodeType::Paragraph
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

impl ContainerNode for Paragraph {
    fn children_mut(&mut self) -> &mut Vec<NodeId> {
        &mut self.children
    }
}
