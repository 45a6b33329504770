//! Tree splicer
//!
//! Splits runs at resolved coordinates and exposes insertion points around a
//! matched span. Coordinates are re-checked against the live tree before
//! anything is mutated.

use crate::{EditError, Result, RunCoordinate};
use doc_model::{DocumentTree, LeafPoint, NodeId, NodeType, Paragraph, Run, RunContent, RunProperties};

/// Slot between two children of a container
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InsertionPoint {
    pub parent: NodeId,
    pub index: usize,
}

impl InsertionPoint {
    pub fn new(parent: NodeId, index: usize) -> Self {
        Self { parent, index }
    }
}

/// Result of splitting one run
#[derive(Debug, Clone)]
pub struct SplitOutcome {
    /// Fragment holding the content before the cut
    pub before: Option<NodeId>,
    /// Fragment holding the content after the cut
    pub after: Option<NodeId>,
    /// Slot between the two fragments
    pub boundary: InsertionPoint,
}

/// Insertion points just before and just after a matched span
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IsolatedRange {
    pub start: InsertionPoint,
    pub end: InsertionPoint,
}

/// A matched span after its content has been taken out of the tree
#[derive(Debug, Clone)]
pub struct MaterializedRange {
    /// Where replacement content goes
    pub insertion: InsertionPoint,
    /// Formatting of the run the span started in
    pub formatting: RunProperties,
    /// Content taken out of the span in document order, one run per
    /// original run with that run's own formatting
    pub taken: Vec<Run>,
    /// Number of nodes removed outright
    pub removed: usize,
}

fn locate_run(tree: &DocumentTree, run_id: NodeId) -> Result<(NodeId, usize)> {
    let parent = tree.parent_of(run_id).ok_or(EditError::Detached(run_id))?;
    let index = tree.child_index(run_id).ok_or(EditError::Detached(run_id))?;
    Ok((parent, index))
}

fn check_point(tree: &DocumentTree, run_id: NodeId, point: LeafPoint) -> Result<()> {
    let run = tree
        .get_run(run_id)
        .ok_or(doc_model::DocModelError::NodeNotFound(run_id))?;
    if point > run.end_point() {
        return Err(EditError::InvalidCoordinate(format!(
            "point {}:{} is past the end of run {}",
            point.leaf_index, point.leaf_offset, run_id
        )));
    }
    Ok(())
}

/// Split a run at `point`.
///
/// The fragments replace the run in place and inherit its formatting. A cut
/// at either edge of the run leaves it untouched.
pub fn split_run(tree: &mut DocumentTree, run_id: NodeId, point: LeafPoint) -> Result<SplitOutcome> {
    check_point(tree, run_id, point)?;
    let (parent, index) = locate_run(tree, run_id)?;

    let (before, after) = match tree.get_run(run_id) {
        Some(run) => run.split_content(point),
        None => return Err(EditError::Detached(run_id)),
    };
    match (before.is_some(), after.is_some()) {
        (false, _) => {
            return Ok(SplitOutcome {
                before: None,
                after: Some(run_id),
                boundary: InsertionPoint::new(parent, index),
            })
        }
        (true, false) => {
            return Ok(SplitOutcome {
                before: Some(run_id),
                after: None,
                boundary: InsertionPoint::new(parent, index + 1),
            })
        }
        (true, true) => {}
    }

    let run = tree.detach_run(run_id)?;
    let (before, after) = run.split(point);
    let mut at = index;
    let before = match before {
        Some(fragment) => {
            let id = tree.insert_run(fragment, parent, Some(at))?;
            at += 1;
            Some(id)
        }
        None => None,
    };
    let boundary = InsertionPoint::new(parent, at);
    let after = match after {
        Some(fragment) => Some(tree.insert_run(fragment, parent, Some(at))?),
        None => None,
    };
    tracing::debug!(
        "Split run {} at {}:{}",
        run_id,
        point.leaf_index,
        point.leaf_offset
    );
    Ok(SplitOutcome {
        before,
        after,
        boundary,
    })
}

/// Cut the runs at both ends of a span so that the span starts and ends on
/// child boundaries. Nothing is removed.
pub fn isolate_range(
    tree: &mut DocumentTree,
    start: &RunCoordinate,
    end: &RunCoordinate,
) -> Result<IsolatedRange> {
    check_point(tree, start.run, start.point)?;
    check_point(tree, end.run, end.point)?;

    if start.run == end.run {
        return isolate_within_run(tree, start, end);
    }

    let end_split = split_run(tree, end.run, end.point)?;
    let (start_parent, _) = locate_run(tree, start.run)?;
    let len_before = tree.children_of(start_parent).len();
    let start_split = split_run(tree, start.run, start.point)?;

    let mut end_boundary = end_split.boundary;
    if start_parent == end_boundary.parent {
        let len_after = tree.children_of(start_parent).len();
        end_boundary.index = end_boundary.index + len_after - len_before;
    }
    Ok(IsolatedRange {
        start: start_split.boundary,
        end: end_boundary,
    })
}

fn isolate_within_run(
    tree: &mut DocumentTree,
    start: &RunCoordinate,
    end: &RunCoordinate,
) -> Result<IsolatedRange> {
    if start.point > end.point {
        return Err(EditError::InvalidCoordinate(format!(
            "range start lies after its end in run {}",
            start.run
        )));
    }
    let (parent, index) = locate_run(tree, start.run)?;
    let run = tree
        .get_run(start.run)
        .ok_or(EditError::Detached(start.run))?;
    let (before, _) = run.split_content(start.point);
    let middle = run.slice(start.point, end.point);
    let (_, after) = run.split_content(end.point);

    if before.is_none() && after.is_none() {
        return Ok(IsolatedRange {
            start: InsertionPoint::new(parent, index),
            end: InsertionPoint::new(parent, index + 1),
        });
    }

    let run = tree.detach_run(start.run)?;
    let mut at = index;
    if let Some(content) = before {
        tree.insert_run(run.fragment(content), parent, Some(at))?;
        at += 1;
    }
    let range_start = InsertionPoint::new(parent, at);
    if !middle.is_empty() {
        tree.insert_run(run.fragment(middle), parent, Some(at))?;
        at += 1;
    }
    let range_end = InsertionPoint::new(parent, at);
    if let Some(content) = after {
        tree.insert_run(run.fragment(content), parent, Some(at))?;
    }
    tracing::debug!("Isolated span inside run {}", start.run);
    Ok(IsolatedRange {
        start: range_start,
        end: range_end,
    })
}

/// Start and end paragraphs must be the same, or siblings in one container
/// with the start first.
pub fn check_reachable(tree: &DocumentTree, start_run: NodeId, end_run: NodeId) -> Result<()> {
    let start_para = tree.paragraph_of(start_run).ok_or(EditError::Detached(start_run))?;
    let end_para = tree.paragraph_of(end_run).ok_or(EditError::Detached(end_run))?;
    if start_para == end_para {
        return Ok(());
    }
    if tree.parent_of(start_para) != tree.parent_of(end_para) {
        return Err(EditError::UnreachableRange(
            "start and end paragraphs are in different containers".into(),
        ));
    }
    let start_index = tree.child_index(start_para).ok_or(EditError::Detached(start_para))?;
    let end_index = tree.child_index(end_para).ok_or(EditError::Detached(end_para))?;
    if start_index >= end_index {
        return Err(EditError::UnreachableRange(
            "end paragraph precedes start paragraph".into(),
        ));
    }
    Ok(())
}

/// Take a span out of the tree, leaving a single insertion point.
///
/// Reachability is checked before anything is touched. Content strictly
/// inside the span is removed and handed back in [`MaterializedRange::taken`],
/// except for nodes that carry no document text (comment markers, opaque
/// elements, comment references, deleted text), which stay where they are.
pub fn materialize_range(
    tree: &mut DocumentTree,
    start: &RunCoordinate,
    end: &RunCoordinate,
) -> Result<MaterializedRange> {
    check_reachable(tree, start.run, end.run)?;
    let formatting = tree
        .get_run(start.run)
        .map(|run| run.properties.clone())
        .ok_or(EditError::Detached(start.run))?;

    let range = isolate_range(tree, start, end)?;
    let inside = nodes_between(tree, range.start, range.end)?;
    let taken = take_content(tree, &inside);
    let mut removed = 0;
    for id in inside {
        removed += prune(tree, id)?;
    }
    tracing::debug!("Removed {} nodes from matched span", removed);
    Ok(MaterializedRange {
        insertion: range.start,
        formatting,
        taken,
        removed,
    })
}

/// Copies of the runs under `nodes` holding only the leaves that pruning drops
fn take_content(tree: &DocumentTree, nodes: &[NodeId]) -> Vec<Run> {
    nodes
        .iter()
        .flat_map(|&id| std::iter::once(id).chain(tree.descendants(id)))
        .filter_map(|id| tree.get_run(id))
        .filter_map(|run| {
            let content: Vec<RunContent> = run
                .content
                .iter()
                .filter(|leaf| !is_kept_leaf(leaf) && !matches!(leaf, RunContent::Text(t) if t.is_empty()))
                .cloned()
                .collect();
            (!content.is_empty()).then(|| run.fragment(content))
        })
        .collect()
}

/// Top-most nodes lying strictly between two insertion points, in document order
fn nodes_between(tree: &DocumentTree, start: InsertionPoint, end: InsertionPoint) -> Result<Vec<NodeId>> {
    let mut start_chain = vec![start.parent];
    start_chain.extend(tree.ancestors(start.parent));
    let mut end_chain = vec![end.parent];
    end_chain.extend(tree.ancestors(end.parent));
    let common = start_chain
        .iter()
        .copied()
        .find(|id| end_chain.contains(id))
        .ok_or_else(|| EditError::UnreachableRange("range ends share no container".into()))?;

    let mut out = Vec::new();

    let mut container = start.parent;
    let mut from = start.index;
    while container != common {
        out.extend(tree.children_of(container).iter().skip(from).copied());
        from = tree.child_index(container).ok_or(EditError::Detached(container))? + 1;
        container = tree.parent_of(container).ok_or(EditError::Detached(container))?;
    }

    let mut end_levels = Vec::new();
    let mut container = end.parent;
    let mut to = end.index;
    while container != common {
        end_levels.push(tree.children_of(container).iter().take(to).copied().collect::<Vec<_>>());
        to = tree.child_index(container).ok_or(EditError::Detached(container))?;
        container = tree.parent_of(container).ok_or(EditError::Detached(container))?;
    }

    if from < to {
        out.extend(tree.children_of(common)[from..to].iter().copied());
    }
    for level in end_levels.into_iter().rev() {
        out.extend(level);
    }
    Ok(out)
}

/// Leaves that survive the removal of the run holding them
fn is_kept_leaf(leaf: &RunContent) -> bool {
    matches!(
        leaf,
        RunContent::DeletedText(_) | RunContent::CommentReference(_) | RunContent::Opaque(_)
    )
}

fn is_kept_node(tree: &DocumentTree, id: NodeId) -> bool {
    match tree.node_type(id) {
        Some(NodeType::CommentMarker) => true,
        Some(NodeType::Opaque) => !matches!(
            tree.parent_of(id).and_then(|p| tree.node_type(p)),
            Some(NodeType::Table) | Some(NodeType::TableRow)
        ),
        Some(NodeType::Run) => tree
            .get_run(id)
            .is_some_and(|run| run.content.iter().any(is_kept_leaf)),
        _ => false,
    }
}

fn has_kept_content(tree: &DocumentTree, id: NodeId) -> bool {
    tree.descendants(id).into_iter().any(|d| is_kept_node(tree, d))
}

/// Remove the text-bearing content of a node. Returns how many nodes were
/// removed outright.
fn prune(tree: &mut DocumentTree, id: NodeId) -> Result<usize> {
    let Some(node_type) = tree.node_type(id) else {
        return Ok(0);
    };
    match node_type {
        NodeType::Run => {
            let kept: Vec<RunContent> = match tree.get_run(id) {
                Some(run) => run.content.iter().filter(|c| is_kept_leaf(c)).cloned().collect(),
                None => return Ok(0),
            };
            if kept.is_empty() {
                tree.remove_node(id)?;
                Ok(1)
            } else {
                if let Some(run) = tree.get_run_mut(id) {
                    run.content = kept;
                }
                Ok(0)
            }
        }
        NodeType::CommentMarker | NodeType::Opaque | NodeType::Document => Ok(0),
        NodeType::Paragraph | NodeType::InlineGroup | NodeType::Table => {
            if has_kept_content(tree, id) {
                prune_children(tree, id)
            } else {
                tree.remove_node(id)?;
                Ok(1)
            }
        }
        NodeType::TableRow => prune_children(tree, id),
        NodeType::TableCell => {
            let removed = prune_children(tree, id)?;
            let has_paragraph = tree
                .children_of(id)
                .iter()
                .any(|&c| tree.node_type(c) == Some(NodeType::Paragraph));
            if !has_paragraph {
                tree.insert_paragraph(Paragraph::new(), id, None)?;
            }
            Ok(removed)
        }
    }
}

fn prune_children(tree: &mut DocumentTree, id: NodeId) -> Result<usize> {
    let mut removed = 0;
    for child in tree.children_of(id).to_vec() {
        removed += prune(tree, child)?;
    }
    Ok(removed)
}
