//! Document tree operations and storage

use crate::{
    CommentMarker, CommentStore, ContainerNode, DocModelError, Document, DocumentSettings,
    InlineGroup, Node, NodeId, NodeType, OpaqueNode, Paragraph, Result, Run, Table, TableCell,
    TableRow,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Storage for different node types
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NodeStorage {
    pub paragraphs: HashMap<NodeId, Paragraph>,
    pub runs: HashMap<NodeId, Run>,
    pub tables: HashMap<NodeId, Table>,
    pub table_rows: HashMap<NodeId, TableRow>,
    pub table_cells: HashMap<NodeId, TableCell>,
    pub markers: HashMap<NodeId, CommentMarker>,
    pub groups: HashMap<NodeId, InlineGroup>,
    pub opaque: HashMap<NodeId, OpaqueNode>,
}

/// The complete document tree structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentTree {
    /// The root document
    pub document: Document,
    /// Storage for all nodes
    pub nodes: NodeStorage,
    /// Comment side table
    #[serde(default)]
    pub comments: CommentStore,
}

impl DocumentTree {
    /// Create a new tree with an empty body
    pub fn new() -> Self {
        Self {
            document: Document::new(),
            nodes: NodeStorage::default(),
            comments: CommentStore::default(),
        }
    }

    /// Create a document tree with a single empty paragraph
    pub fn with_empty_paragraph() -> Self {
        let mut tree = Self::new();
        let mut para = Paragraph::new();
        let para_id = para.id();
        para.set_parent(Some(tree.root_id()));
        tree.nodes.paragraphs.insert(para_id, para);
        tree.document.add_child(para_id);
        tree
    }

    /// Get the root document ID
    pub fn root_id(&self) -> NodeId {
        self.document.id()
    }

    /// Snapshot counter, bumped by every structural mutation
    pub fn version(&self) -> u64 {
        self.document.version()
    }

    pub fn settings(&self) -> &DocumentSettings {
        &self.document.settings
    }

    pub fn settings_mut(&mut self) -> &mut DocumentSettings {
        &mut self.document.settings
    }

    // =========================================================================
    // Lookup
    // =========================================================================

    pub fn get_paragraph(&self, id: NodeId) -> Option<&Paragraph> {
        self.nodes.paragraphs.get(&id)
    }

    pub fn get_paragraph_mut(&mut self, id: NodeId) -> Option<&mut Paragraph> {
        self.nodes.paragraphs.get_mut(&id)
    }

    pub fn get_run(&self, id: NodeId) -> Option<&Run> {
        self.nodes.runs.get(&id)
    }

    pub fn get_run_mut(&mut self, id: NodeId) -> Option<&mut Run> {
        self.nodes.runs.get_mut(&id)
    }

    pub fn get_table(&self, id: NodeId) -> Option<&Table> {
        self.nodes.tables.get(&id)
    }

    pub fn get_table_row(&self, id: NodeId) -> Option<&TableRow> {
        self.nodes.table_rows.get(&id)
    }

    pub fn get_table_cell(&self, id: NodeId) -> Option<&TableCell> {
        self.nodes.table_cells.get(&id)
    }

    pub fn get_marker(&self, id: NodeId) -> Option<&CommentMarker> {
        self.nodes.markers.get(&id)
    }

    pub fn get_group(&self, id: NodeId) -> Option<&InlineGroup> {
        self.nodes.groups.get(&id)
    }

    pub fn get_opaque(&self, id: NodeId) -> Option<&OpaqueNode> {
        self.nodes.opaque.get(&id)
    }

    /// Get the type of a node
    pub fn node_type(&self, id: NodeId) -> Option<NodeType> {
        if id == self.document.id() {
            Some(NodeType::Document)
        } else if self.nodes.paragraphs.contains_key(&id) {
            Some(NodeType::Paragraph)
        } else if self.nodes.runs.contains_key(&id) {
            Some(NodeType::Run)
        } else if self.nodes.tables.contains_key(&id) {
            Some(NodeType::Table)
        } else if self.nodes.table_rows.contains_key(&id) {
            Some(NodeType::TableRow)
        } else if self.nodes.table_cells.contains_key(&id) {
            Some(NodeType::TableCell)
        } else if self.nodes.markers.contains_key(&id) {
            Some(NodeType::CommentMarker)
        } else if self.nodes.groups.contains_key(&id) {
            Some(NodeType::InlineGroup)
        } else if self.nodes.opaque.contains_key(&id) {
            Some(NodeType::Opaque)
        } else {
            None
        }
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.node_type(id).is_some()
    }

    /// Get any node through the common trait
    pub fn node(&self, id: NodeId) -> Option<&dyn Node> {
        match self.node_type(id)? {
            NodeType::Document => Some(&self.document as &dyn Node),
            NodeType::Paragraph => self.nodes.paragraphs.get(&id).map(|n| n as &dyn Node),
            NodeType::Run => self.nodes.runs.get(&id).map(|n| n as &dyn Node),
            NodeType::Table => self.nodes.tables.get(&id).map(|n| n as &dyn Node),
            NodeType::TableRow => self.nodes.table_rows.get(&id).map(|n| n as &dyn Node),
            NodeType::TableCell => self.nodes.table_cells.get(&id).map(|n| n as &dyn Node),
            NodeType::CommentMarker => self.nodes.markers.get(&id).map(|n| n as &dyn Node),
            NodeType::InlineGroup => self.nodes.groups.get(&id).map(|n| n as &dyn Node),
            NodeType::Opaque => self.nodes.opaque.get(&id).map(|n| n as &dyn Node),
        }
    }

    fn container_mut(&mut self, id: NodeId) -> Option<&mut dyn ContainerNode> {
        match self.node_type(id)? {
            NodeType::Document => Some(&mut self.document as &mut dyn ContainerNode),
            NodeType::Paragraph => self
                .nodes
                .paragraphs
                .get_mut(&id)
                .map(|n| n as &mut dyn ContainerNode),
            NodeType::Table => self.nodes.tables.get_mut(&id).map(|n| n as &mut dyn ContainerNode),
            NodeType::TableRow => self
                .nodes
                .table_rows
                .get_mut(&id)
                .map(|n| n as &mut dyn ContainerNode),
            NodeType::TableCell => self
                .nodes
                .table_cells
                .get_mut(&id)
                .map(|n| n as &mut dyn ContainerNode),
            NodeType::InlineGroup => self.nodes.groups.get_mut(&id).map(|n| n as &mut dyn ContainerNode),
            NodeType::Run | NodeType::CommentMarker | NodeType::Opaque => None,
        }
    }

    /// Parent of a node (None for the root or unknown ids)
    pub fn parent_of(&self, id: NodeId) -> Option<NodeId> {
        self.node(id)?.parent()
    }

    /// Children of a node in document order (empty for leaves and unknown ids)
    pub fn children_of(&self, id: NodeId) -> &[NodeId] {
        self.node(id).map(|n| n.children()).unwrap_or(&[])
    }

    /// Position of a node among its siblings
    pub fn child_index(&self, id: NodeId) -> Option<usize> {
        let parent = self.parent_of(id)?;
        self.children_of(parent).iter().position(|&c| c == id)
    }

    /// Nearest enclosing paragraph, or the node itself if it is one
    pub fn paragraph_of(&self, id: NodeId) -> Option<NodeId> {
        let mut current = id;
        loop {
            if self.nodes.paragraphs.contains_key(&current) {
                return Some(current);
            }
            current = self.parent_of(current)?;
        }
    }

    /// Chain of ancestors from the node's parent up to the root
    pub fn ancestors(&self, id: NodeId) -> Vec<NodeId> {
        let mut chain = Vec::new();
        let mut current = id;
        while let Some(parent) = self.parent_of(current) {
            chain.push(parent);
            current = parent;
        }
        chain
    }

    // =========================================================================
    // Mutation
    // =========================================================================

    /// Link `child_id` into `parent_id` after checking the containment rules
    fn attach(
        &mut self,
        parent_id: NodeId,
        child_id: NodeId,
        child_type: NodeType,
        index: Option<usize>,
    ) -> Result<()> {
        let parent_type = self
            .node_type(parent_id)
            .ok_or(DocModelError::NodeNotFound(parent_id))?;
        if !parent_type.accepts(child_type) {
            return Err(DocModelError::InvalidChild {
                parent: parent_type,
                child: child_type,
            });
        }
        let len = self.children_of(parent_id).len();
        let index = index.unwrap_or(len);
        if index > len {
            return Err(DocModelError::InvalidPosition {
                node_id: parent_id,
                offset: index,
            });
        }
        let container = self
            .container_mut(parent_id)
            .ok_or(DocModelError::NodeNotFound(parent_id))?;
        container.insert_child(index, child_id);
        self.document.increment_version();
        Ok(())
    }

    /// Insert a paragraph into the body or a table cell
    pub fn insert_paragraph(&mut self, mut para: Paragraph, parent_id: NodeId, index: Option<usize>) -> Result<NodeId> {
        let para_id = para.id();
        self.attach(parent_id, para_id, NodeType::Paragraph, index)?;
        para.set_parent(Some(parent_id));
        self.nodes.paragraphs.insert(para_id, para);
        Ok(para_id)
    }

    /// Insert a table into the body or a table cell
    pub fn insert_table(&mut self, mut table: Table, parent_id: NodeId, index: Option<usize>) -> Result<NodeId> {
        let table_id = table.id();
        self.attach(parent_id, table_id, NodeType::Table, index)?;
        table.set_parent(Some(parent_id));
        self.nodes.tables.insert(table_id, table);
        Ok(table_id)
    }

    /// Insert a row into a table
    pub fn insert_table_row(&mut self, mut row: TableRow, table_id: NodeId, index: Option<usize>) -> Result<NodeId> {
        let row_id = row.id();
        self.attach(table_id, row_id, NodeType::TableRow, index)?;
        row.set_parent(Some(table_id));
        self.nodes.table_rows.insert(row_id, row);
        Ok(row_id)
    }

    /// Insert a cell into a row
    pub fn insert_table_cell(&mut self, mut cell: TableCell, row_id: NodeId, index: Option<usize>) -> Result<NodeId> {
        let cell_id = cell.id();
        self.attach(row_id, cell_id, NodeType::TableCell, index)?;
        cell.set_parent(Some(row_id));
        self.nodes.table_cells.insert(cell_id, cell);
        Ok(cell_id)
    }

    /// Insert a run into a paragraph or inline group
    pub fn insert_run(&mut self, mut run: Run, parent_id: NodeId, index: Option<usize>) -> Result<NodeId> {
        let run_id = run.id();
        self.attach(parent_id, run_id, NodeType::Run, index)?;
        run.set_parent(Some(parent_id));
        self.nodes.runs.insert(run_id, run);
        Ok(run_id)
    }

    /// Insert a comment range marker into a paragraph or inline group
    pub fn insert_marker(&mut self, mut marker: CommentMarker, parent_id: NodeId, index: Option<usize>) -> Result<NodeId> {
        let marker_id = marker.id();
        self.attach(parent_id, marker_id, NodeType::CommentMarker, index)?;
        marker.set_parent(Some(parent_id));
        self.nodes.markers.insert(marker_id, marker);
        Ok(marker_id)
    }

    /// Insert an inline group into a paragraph or another group
    pub fn insert_group(&mut self, mut group: InlineGroup, parent_id: NodeId, index: Option<usize>) -> Result<NodeId> {
        let group_id = group.id();
        self.attach(parent_id, group_id, NodeType::InlineGroup, index)?;
        group.set_parent(Some(parent_id));
        self.nodes.groups.insert(group_id, group);
        Ok(group_id)
    }

    /// Insert an opaque node into any container
    pub fn insert_opaque(&mut self, mut node: OpaqueNode, parent_id: NodeId, index: Option<usize>) -> Result<NodeId> {
        let node_id = node.id();
        self.attach(parent_id, node_id, NodeType::Opaque, index)?;
        node.set_parent(Some(parent_id));
        self.nodes.opaque.insert(node_id, node);
        Ok(node_id)
    }

    /// Remove a node and everything below it
    pub fn remove_node(&mut self, id: NodeId) -> Result<()> {
        if id == self.document.id() {
            return Err(DocModelError::InvalidOperation(
                "the document root cannot be removed".into(),
            ));
        }
        if !self.contains(id) {
            return Err(DocModelError::NodeNotFound(id));
        }
        if let Some(parent_id) = self.parent_of(id) {
            if let Some(parent) = self.container_mut(parent_id) {
                parent.remove_child(id);
            }
        }
        self.drop_subtree(id);
        self.document.increment_version();
        Ok(())
    }

    /// Remove a run from its parent and hand it back detached
    pub fn detach_run(&mut self, run_id: NodeId) -> Result<Run> {
        let parent_id = self
            .get_run(run_id)
            .ok_or(DocModelError::NodeNotFound(run_id))?
            .parent();
        if let Some(parent_id) = parent_id {
            if let Some(parent) = self.container_mut(parent_id) {
                parent.remove_child(run_id);
            }
        }
        let mut run = self
            .nodes
            .runs
            .remove(&run_id)
            .ok_or(DocModelError::NodeNotFound(run_id))?;
        run.set_parent(None);
        self.document.increment_version();
        Ok(run)
    }

    fn drop_subtree(&mut self, id: NodeId) {
        let children = self.children_of(id).to_vec();
        for child in children {
            self.drop_subtree(child);
        }
        match self.node_type(id) {
            Some(NodeType::Paragraph) => {
                self.nodes.paragraphs.remove(&id);
            }
            Some(NodeType::Run) => {
                self.nodes.runs.remove(&id);
            }
            Some(NodeType::Table) => {
                self.nodes.tables.remove(&id);
            }
            Some(NodeType::TableRow) => {
                self.nodes.table_rows.remove(&id);
            }
            Some(NodeType::TableCell) => {
                self.nodes.table_cells.remove(&id);
            }
            Some(NodeType::CommentMarker) => {
                self.nodes.markers.remove(&id);
            }
            Some(NodeType::InlineGroup) => {
                self.nodes.groups.remove(&id);
            }
            Some(NodeType::Opaque) => {
                self.nodes.opaque.remove(&id);
            }
            Some(NodeType::Document) | None => {}
        }
    }

    // =========================================================================
    // Traversal
    // =========================================================================

    /// All nodes below `id` in document order (pre-order, `id` excluded)
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        self.collect_descendants(id, &mut out);
        out
    }

    fn collect_descendants(&self, id: NodeId, out: &mut Vec<NodeId>) {
        for &child in self.children_of(id) {
            out.push(child);
            self.collect_descendants(child, out);
        }
    }

    /// Every paragraph in document order, including those inside tables
    pub fn paragraphs_in_order(&self) -> Vec<NodeId> {
        self.descendants(self.root_id())
            .into_iter()
            .filter(|id| self.nodes.paragraphs.contains_key(id))
            .collect()
    }

    /// First paragraph in document order
    pub fn first_paragraph(&self) -> Option<NodeId> {
        self.descendants(self.root_id())
            .into_iter()
            .find(|id| self.nodes.paragraphs.contains_key(id))
    }

    /// Runs below `id` in document order
    pub fn runs_in(&self, id: NodeId) -> Vec<NodeId> {
        self.descendants(id)
            .into_iter()
            .filter(|id| self.nodes.runs.contains_key(id))
            .collect()
    }

    /// Visible text of the whole document, without separators
    pub fn text_content(&self) -> String {
        self.runs_in(self.root_id())
            .into_iter()
            .filter_map(|id| self.get_run(id))
            .map(Run::text)
            .collect()
    }
}

impl Default for DocumentTree {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ElementTag, GroupKind};

    fn two_paragraphs() -> (DocumentTree, NodeId, NodeId) {
        let mut tree = DocumentTree::new();
        let root = tree.root_id();
        let p1 = tree.insert_paragraph(Paragraph::new(), root, None).unwrap();
        let p2 = tree.insert_paragraph(Paragraph::new(), root, None).unwrap();
        tree.insert_run(Run::with_text("Hello "), p1, None).unwrap();
        tree.insert_run(Run::with_text("world"), p1, None).unwrap();
        tree.insert_run(Run::with_text("again"), p2, None).unwrap();
        (tree, p1, p2)
    }

    #[test]
    fn test_insert_and_text_content() {
        let (tree, p1, _) = two_paragraphs();
        assert_eq!(tree.text_content(), "Hello worldagain");
        assert_eq!(tree.children_of(p1).len(), 2);
        assert_eq!(tree.paragraphs_in_order().len(), 2);
    }

    #[test]
    fn test_insert_at_index() {
        let (mut tree, p1, _) = two_paragraphs();
        let id = tree.insert_run(Run::with_text(">"), p1, Some(0)).unwrap();
        assert_eq!(tree.child_index(id), Some(0));
        assert_eq!(tree.text_content(), ">Hello worldagain");
    }

    #[test]
    fn test_containment_is_enforced() {
        let (mut tree, p1, _) = two_paragraphs();
        let root = tree.root_id();
        let err = tree.insert_run(Run::with_text("x"), root, None).unwrap_err();
        assert!(matches!(err, DocModelError::InvalidChild { .. }));
        let err = tree.insert_paragraph(Paragraph::new(), p1, None).unwrap_err();
        assert!(matches!(err, DocModelError::InvalidChild { .. }));
        let err = tree.insert_run(Run::new(), p1, Some(9)).unwrap_err();
        assert!(matches!(err, DocModelError::InvalidPosition { .. }));
    }

    #[test]
    fn test_remove_paragraph_drops_runs() {
        let (mut tree, p1, _) = two_paragraphs();
        let runs = tree.runs_in(p1);
        let before = tree.version();
        tree.remove_node(p1).unwrap();
        assert!(tree.version() > before);
        assert!(runs.iter().all(|r| !tree.contains(*r)));
        assert_eq!(tree.text_content(), "again");
        assert!(tree.remove_node(tree.root_id()).is_err());
    }

    #[test]
    fn test_detach_run() {
        let (mut tree, p1, _) = two_paragraphs();
        let first = tree.children_of(p1)[0];
        let run = tree.detach_run(first).unwrap();
        assert_eq!(run.text(), "Hello ");
        assert_eq!(run.parent(), None);
        assert_eq!(tree.children_of(p1).len(), 1);
    }

    #[test]
    fn test_paragraph_of_run_inside_group() {
        let (mut tree, p1, _) = two_paragraphs();
        let group = tree
            .insert_group(InlineGroup::new(GroupKind::Element(ElementTag::new("w:hyperlink"))), p1, None)
            .unwrap();
        let run = tree.insert_run(Run::with_text("link"), group, None).unwrap();
        assert_eq!(tree.paragraph_of(run), Some(p1));
        assert_eq!(tree.ancestors(run), vec![group, p1, tree.root_id()]);
        assert_eq!(tree.text_content(), "Hello worldlinkagain");
    }

    #[test]
    fn test_first_paragraph_inside_table() {
        let mut tree = DocumentTree::new();
        let root = tree.root_id();
        let table = tree.insert_table(Table::new(), root, None).unwrap();
        tree.insert_opaque(OpaqueNode::new("<w:tblPr/>"), table, None).unwrap();
        let row = tree.insert_table_row(TableRow::new(), table, None).unwrap();
        let cell = tree.insert_table_cell(TableCell::new(), row, None).unwrap();
        let para = tree.insert_paragraph(Paragraph::new(), cell, None).unwrap();
        assert_eq!(tree.first_paragraph(), Some(para));
        assert_eq!(tree.paragraph_of(para), Some(para));
    }
}
