//! Position mapper
//!
//! Flattens the visible text of a tree into one logical character stream and
//! keeps, for every character, the leaf it came from. Offsets are character
//! indices, never byte offsets. The index is a snapshot: any mutation of the
//! tree makes it stale (see [`PositionIndex::is_current`]).

use doc_model::{DocumentTree, Node, NodeId, NodeType, RunContent};
use serde::{Deserialize, Serialize};

/// Where one character of the logical stream lives in the tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexEntry {
    /// Offset in the logical stream
    pub logical_offset: usize,
    /// Owning run
    pub run: NodeId,
    /// Leaf inside the run
    pub leaf_index: usize,
    /// Character offset inside the leaf
    pub leaf_offset: usize,
    /// Character offset among the run's visible text
    pub run_offset: usize,
    /// Enclosing paragraph
    pub paragraph: NodeId,
}

/// A text leaf visited by the mapper, including empty ones
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeafSpan {
    pub run: NodeId,
    pub leaf_index: usize,
    pub paragraph: NodeId,
    /// Offset of the leaf's first character in the logical stream
    pub start: usize,
    /// Length in characters
    pub len: usize,
    /// Whether the leaf holds only whitespace (or nothing)
    pub blank: bool,
}

/// Logical stream plus the offset index
#[derive(Debug, Clone)]
pub struct PositionIndex {
    text: String,
    chars: Vec<char>,
    entries: Vec<IndexEntry>,
    leaves: Vec<LeafSpan>,
    version: u64,
}

impl PositionIndex {
    /// Walk the tree in document order and index every `Text` leaf
    pub fn build(tree: &DocumentTree) -> Self {
        let mut index = Self {
            text: String::new(),
            chars: Vec::new(),
            entries: Vec::new(),
            leaves: Vec::new(),
            version: tree.version(),
        };
        index.visit(tree, tree.root_id(), None);
        tracing::debug!(
            "Indexed {} characters across {} text leaves",
            index.chars.len(),
            index.leaves.len()
        );
        index
    }

    fn visit(&mut self, tree: &DocumentTree, id: NodeId, paragraph: Option<NodeId>) {
        match tree.node_type(id) {
            Some(NodeType::Paragraph) => {
                for &child in tree.children_of(id) {
                    self.visit(tree, child, Some(id));
                }
            }
            Some(NodeType::Run) => {
                if let Some(paragraph) = paragraph {
                    self.visit_run(tree, id, paragraph);
                }
            }
            Some(NodeType::CommentMarker) | Some(NodeType::Opaque) | None => {}
            Some(_) => {
                for &child in tree.children_of(id) {
                    self.visit(tree, child, paragraph);
                }
            }
        }
    }

    fn visit_run(&mut self, tree: &DocumentTree, run_id: NodeId, paragraph: NodeId) {
        let Some(run) = tree.get_run(run_id) else {
            return;
        };
        let mut run_offset = 0;
        for (leaf_index, leaf) in run.content.iter().enumerate() {
            let RunContent::Text(text) = leaf else {
                continue;
            };
            let start = self.chars.len();
            let mut len = 0;
            for (leaf_offset, ch) in text.chars().enumerate() {
                self.entries.push(IndexEntry {
                    logical_offset: self.chars.len(),
                    run: run.id(),
                    leaf_index,
                    leaf_offset,
                    run_offset,
                    paragraph,
                });
                self.chars.push(ch);
                run_offset += 1;
                len += 1;
            }
            self.text.push_str(text);
            self.leaves.push(LeafSpan {
                run: run.id(),
                leaf_index,
                paragraph,
                start,
                len,
                blank: text.chars().all(char::is_whitespace),
            });
        }
    }

    /// The logical stream
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn chars(&self) -> &[char] {
        &self.chars
    }

    /// Length in characters
    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    /// Index entry of the character at `offset`
    pub fn entry(&self, offset: usize) -> Option<&IndexEntry> {
        self.entries.get(offset)
    }

    pub fn entries(&self) -> &[IndexEntry] {
        &self.entries
    }

    /// Visited text leaves in document order
    pub fn leaves(&self) -> &[LeafSpan] {
        &self.leaves
    }

    /// Characters in `[start, end)`
    pub fn slice(&self, start: usize, end: usize) -> String {
        let end = end.min(self.chars.len());
        if start >= end {
            return String::new();
        }
        self.chars[start..end].iter().collect()
    }

    /// Whether the tree is unchanged since the index was built
    pub fn is_current(&self, tree: &DocumentTree) -> bool {
        self.version == tree.version()
    }
}
