//! Error types for revision tracking operations

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RevisionError {
    #[error("Invalid revision operation: {0}")]
    InvalidOperation(String),

    #[error("Edit error: {0}")]
    Edit(#[from] edit_engine::EditError),

    #[error("Document model error: {0}")]
    DocModel(#[from] doc_model::DocModelError),
}

pub type Result<T> = std::result::Result<T, RevisionError>;
