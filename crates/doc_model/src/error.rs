//! Error types for document model operations

use crate::{NodeId, NodeType};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DocModelError {
    #[error("Node not found: {0}")]
    NodeNotFound(NodeId),

    #[error("Invalid position: node {node_id}, offset {offset}")]
    InvalidPosition { node_id: NodeId, offset: usize },

    #[error("{parent:?} cannot contain {child:?}")]
    InvalidChild { parent: NodeType, child: NodeType },

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    #[error("Tree structure error: {0}")]
    TreeStructureError(String),
}

pub type Result<T> = std::result::Result<T, DocModelError>;
