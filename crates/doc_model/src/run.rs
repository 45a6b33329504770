//! Text run node - an ordered sequence of leaf content sharing one formatting descriptor

use crate::{Node, NodeId, NodeType, RunProperties};
use serde::{Deserialize, Serialize};

/// Smallest content unit inside a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunContent {
    /// Visible text (`w:t`)
    Text(String),
    /// Text removed by a tracked deletion (`w:delText`)
    DeletedText(String),
    /// Tab character (`w:tab`)
    Tab,
    /// Line, page or column break (`w:br`), with its break type if any
    Break(Option<String>),
    /// Anchor of a comment (`w:commentReference`)
    CommentReference(String),
    /// Any other run child, kept verbatim
    Opaque(String),
}

impl RunContent {
    /// Width of the leaf for addressing purposes. Text leaves span their
    /// characters, every other leaf spans a single slot.
    pub fn span_len(&self) -> usize {
        match self {
            RunContent::Text(t) | RunContent::DeletedText(t) => t.chars().count(),
            _ => 1,
        }
    }

    /// Visible text carried by this leaf
    pub fn text(&self) -> Option<&str> {
        match self {
            RunContent::Text(t) => Some(t),
            _ => None,
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self, RunContent::Text(_))
    }

    /// Cut `[start, end)` out of the leaf. Non-text leaves are either kept
    /// whole or dropped.
    pub fn slice(&self, start: usize, end: usize) -> Option<RunContent> {
        if start >= end {
            return None;
        }
        match self {
            RunContent::Text(t) => Some(RunContent::Text(char_slice(t, start, end))),
            RunContent::DeletedText(t) => Some(RunContent::DeletedText(char_slice(t, start, end))),
            other => (start == 0).then(|| other.clone()),
        }
    }
}

fn char_slice(text: &str, start: usize, end: usize) -> String {
    text.chars().skip(start).take(end - start).collect()
}

/// Point between two leaf slots of a run.
///
/// `leaf_offset` counts characters for text leaves and is 0 or 1 for every
/// other leaf.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct LeafPoint {
    pub leaf_index: usize,
    pub leaf_offset: usize,
}

impl LeafPoint {
    pub fn new(leaf_index: usize, leaf_offset: usize) -> Self {
        Self {
            leaf_index,
            leaf_offset,
        }
    }
}

/// A text run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Run {
    id: NodeId,
    parent: Option<NodeId>,
    /// Formatting descriptor, shared verbatim by every fragment split off this run
    pub properties: RunProperties,
    /// Leaf content in document order
    pub content: Vec<RunContent>,
    /// Attributes of the run element other than its content (rsids and the like)
    #[serde(default)]
    pub attributes: Vec<(String, String)>,
}

impl Run {
    /// Create an empty run
    pub fn new() -> Self {
        Self::with_content(RunProperties::default(), Vec::new())
    }

    /// Create a run holding a single text leaf
    pub fn with_text(text: impl Into<String>) -> Self {
        Self::with_content(RunProperties::default(), vec![RunContent::Text(text.into())])
    }

    pub fn with_content(properties: RunProperties, content: Vec<RunContent>) -> Self {
        Self {
            id: NodeId::new(),
            parent: None,
            properties,
            content,
            attributes: Vec::new(),
        }
    }

    /// New detached run with the same formatting and attributes but other content
    pub fn fragment(&self, content: Vec<RunContent>) -> Self {
        let mut run = Self::with_content(self.properties.clone(), content);
        run.attributes = self.attributes.clone();
        run
    }

    /// Concatenated visible text
    pub fn text(&self) -> String {
        self.content.iter().filter_map(RunContent::text).collect()
    }

    /// Concatenated deleted text
    pub fn deleted_text(&self) -> String {
        self.content
            .iter()
            .filter_map(|c| match c {
                RunContent::DeletedText(t) => Some(t.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Number of visible characters
    pub fn char_len(&self) -> usize {
        self.content
            .iter()
            .filter_map(RunContent::text)
            .map(|t| t.chars().count())
            .sum()
    }

    pub fn start_point(&self) -> LeafPoint {
        LeafPoint::new(0, 0)
    }

    pub fn end_point(&self) -> LeafPoint {
        match self.content.last() {
            Some(last) => LeafPoint::new(self.content.len() - 1, last.span_len()),
            None => LeafPoint::new(0, 0),
        }
    }

    /// Translate an offset in visible characters into a leaf point. The
    /// point lands inside the text leaf holding that character; an offset
    /// equal to the visible length lands after the last text character.
    pub fn leaf_point_at(&self, run_offset: usize) -> Option<LeafPoint> {
        let mut remaining = run_offset;
        let mut last_text = None;
        for (index, leaf) in self.content.iter().enumerate() {
            if let Some(text) = leaf.text() {
                let len = text.chars().count();
                if remaining < len {
                    return Some(LeafPoint::new(index, remaining));
                }
                remaining -= len;
                last_text = Some(LeafPoint::new(index, len));
            }
        }
        if remaining == 0 {
            Some(last_text.unwrap_or_else(|| LeafPoint::new(0, 0)))
        } else {
            None
        }
    }

    /// Leaves between two points, with partial text leaves cut. An empty
    /// leaf belongs to the range when its start point does.
    pub fn slice(&self, from: LeafPoint, to: LeafPoint) -> Vec<RunContent> {
        let mut pieces = Vec::new();
        if from > to {
            return pieces;
        }
        for (index, leaf) in self.content.iter().enumerate() {
            if index < from.leaf_index || index > to.leaf_index {
                continue;
            }
            let span = leaf.span_len();
            if span == 0 {
                let at = LeafPoint::new(index, 0);
                if from <= at && at < to {
                    pieces.push(leaf.clone());
                }
                continue;
            }
            let start = if index == from.leaf_index { from.leaf_offset.min(span) } else { 0 };
            let end = if index == to.leaf_index { to.leaf_offset.min(span) } else { span };
            if let Some(piece) = leaf.slice(start, end) {
                pieces.push(piece);
            }
        }
        pieces
    }

    /// Split into the content before and after `point`. Either side is
    /// `None` when it would hold no leaves.
    pub fn split_content(&self, point: LeafPoint) -> (Option<Vec<RunContent>>, Option<Vec<RunContent>>) {
        let mut before = Vec::new();
        let mut after = Vec::new();
        for (index, leaf) in self.content.iter().enumerate() {
            let span = leaf.span_len();
            if index < point.leaf_index {
                before.push(leaf.clone());
            } else if index > point.leaf_index {
                after.push(leaf.clone());
            } else if span == 0 {
                after.push(leaf.clone());
            } else {
                let offset = point.leaf_offset.min(span);
                if let Some(piece) = leaf.slice(0, offset) {
                    before.push(piece);
                }
                if let Some(piece) = leaf.slice(offset, span) {
                    after.push(piece);
                }
            }
        }
        (
            (!before.is_empty()).then_some(before),
            (!after.is_empty()).then_some(after),
        )
    }

    /// Split into detached fragments that inherit this run's formatting
    pub fn split(&self, point: LeafPoint) -> (Option<Run>, Option<Run>) {
        let (before, after) = self.split_content(point);
        (
            before.map(|content| self.fragment(content)),
            after.map(|content| self.fragment(content)),
        )
    }

    /// Whether the run only anchors a comment and carries no document text
    pub fn is_reference_only(&self) -> bool {
        !self.content.is_empty()
            && self
                .content
                .iter()
                .all(|c| matches!(c, RunContent::CommentReference(_)))
    }
}

impl Default for Run {
    fn default() -> Self {
        Self::new()
    }
}

impl Node for Run {
    fn id(&self) -> NodeId {
        self.id
    }

    fn node_type(&self) -> NodeType {
        NodeType::Run
    }

    fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    fn set_parent(&mut self, parent: Option<NodeId>) {
        self.parent = parent;
    }
}
