//! Inline markup nodes: comment range markers, inline groups and opaque elements

use crate::{ContainerNode, Node, NodeId, NodeType};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// =============================================================================
// Comment range markers
// =============================================================================

/// Which end of a commented range a marker delimits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MarkerKind {
    RangeStart,
    RangeEnd,
}

/// `commentRangeStart` / `commentRangeEnd`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentMarker {
    id: NodeId,
    parent: Option<NodeId>,
    pub kind: MarkerKind,
    /// Id of the comment record this marker belongs to
    pub comment_id: String,
}

impl CommentMarker {
    pub fn new(kind: MarkerKind, comment_id: impl Into<String>) -> Self {
        Self {
            id: NodeId::new(),
            parent: None,
            kind,
            comment_id: comment_id.into(),
        }
    }

    pub fn range_start(comment_id: impl Into<String>) -> Self {
        Self::new(MarkerKind::RangeStart, comment_id)
    }

    pub fn range_end(comment_id: impl Into<String>) -> Self {
        Self::new(MarkerKind::RangeEnd, comment_id)
    }
}

impl Node for CommentMarker {
    fn id(&self) -> NodeId {
        self.id
    }

    fn node_type(&self) -> NodeType {
        NodeType::CommentMarker
    }

    fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    fn set_parent(&mut self, parent: Option<NodeId>) {
        self.parent = parent;
    }
}

// =============================================================================
// Inline groups
// =============================================================================

/// Start tag of a wrapper element as read: qualified name plus attributes
/// with their values still escaped
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementTag {
    pub name: String,
    pub attributes: Vec<(String, String)>,
}

impl ElementTag {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
        }
    }

    /// Local part of the element name
    pub fn local_name(&self) -> &str {
        self.name.rsplit(':').next().unwrap_or(&self.name)
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Author stamp of a tracked change produced in this session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevisionMark {
    /// Numeric revision id, unique within the document
    pub id: u64,
    pub author: String,
    pub date: DateTime<Utc>,
}

/// What an inline group stands for
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GroupKind {
    /// Tracked insertion created by this session
    Insertion(RevisionMark),
    /// Tracked deletion created by this session
    Deletion(RevisionMark),
    /// Wrapper read from the document (hyperlink, existing revision, ...)
    Element(ElementTag),
}

/// Inline wrapper around runs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InlineGroup {
    id: NodeId,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    pub kind: GroupKind,
}

impl InlineGroup {
    pub fn new(kind: GroupKind) -> Self {
        Self {
            id: NodeId::new(),
            parent: None,
            children: Vec::new(),
            kind,
        }
    }

    /// Numeric id when the group is a tracked change, new or pre-existing
    pub fn revision_id(&self) -> Option<u64> {
        match &self.kind {
            GroupKind::Insertion(mark) | GroupKind::Deletion(mark) => Some(mark.id),
            GroupKind::Element(tag) => match tag.local_name() {
                "ins" | "del" | "moveFrom" | "moveTo" => {
                    tag.attribute("w:id").and_then(|v| v.parse().ok())
                }
                _ => None,
            },
        }
    }

    pub fn is_insertion(&self) -> bool {
        match &self.kind {
            GroupKind::Insertion(_) => true,
            GroupKind::Element(tag) => tag.local_name() == "ins",
            GroupKind::Deletion(_) => false,
        }
    }

    pub fn is_deletion(&self) -> bool {
        match &self.kind {
            GroupKind::Deletion(_) => true,
            GroupKind::Element(tag) => tag.local_name() == "del",
            GroupKind::Insertion(_) => false,
        }
    }
}

impl Node for InlineGroup {
    fn id(&self) -> NodeId {
        self.id
    }

    fn node_type(&self) -> NodeType {
        NodeType::InlineGroup
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

impl ContainerNode for InlineGroup {
    fn children_mut(&mut self) -> &mut Vec<NodeId> {
        &mut self.children
    }
}

// =============================================================================
// Opaque content
// =============================================================================

/// Element kept verbatim at its position (bookmarks, drawings, section
/// properties, table property blocks, ...)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpaqueNode {
    id: NodeId,
    parent: Option<NodeId>,
    pub xml: String,
}

impl OpaqueNode {
    pub fn new(xml: impl Into<String>) -> Self {
        Self {
            id: NodeId::new(),
            parent: None,
            xml: xml.into(),
        }
    }
}

impl Node for OpaqueNode {
    fn id(&self) -> NodeId {
        self.id
    }

    fn node_type(&self) -> NodeType {
        NodeType::Opaque
    }

    fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    fn set_parent(&mut self, parent: Option<NodeId>) {
        self.parent = parent;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_revision_id_of_loaded_wrapper() {
        let mut tag = ElementTag::new("w:moveTo");
        tag.attributes.push(("w:id".into(), "17".into()));
        tag.attributes.push(("w:author".into(), "A".into()));
        let group = InlineGroup::new(GroupKind::Element(tag));
        assert_eq!(group.revision_id(), Some(17));
        assert!(!group.is_insertion());

        let link = InlineGroup::new(GroupKind::Element(ElementTag::new("w:hyperlink")));
        assert_eq!(link.revision_id(), None);
    }

    #[test]
    fn test_revision_id_of_new_mark() {
        let mark = RevisionMark {
            id: 4,
            author: "Reviewer".into(),
            date: Utc::now(),
        };
        let group = InlineGroup::new(GroupKind::Deletion(mark));
        assert_eq!(group.revision_id(), Some(4));
        assert!(group.is_deletion());
    }
}
