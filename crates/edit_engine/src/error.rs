//! Error types for editing operations

use doc_model::NodeId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EditError {
    #[error("Invalid coordinate: {0}")]
    InvalidCoordinate(String),

    #[error("Range is not reachable: {0}")]
    UnreachableRange(String),

    #[error("Node is detached from the tree: {0}")]
    Detached(NodeId),

    #[error("Document model error: {0}")]
    DocModel(#[from] doc_model::DocModelError),
}

pub type Result<T> = std::result::Result<T, EditError>;
