//! Error types for applying changes

use edit_engine::EditError;
use revisions::RevisionError;
use std::path::PathBuf;
use store::DocxError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnnotateError {
    /// A required argument or field is missing or empty
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The document, its main part or its body does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// A change could not be understood
    #[error("Malformed change: {0}")]
    MalformedChange(String),

    #[error("Failed to save {}: {source}", path.display())]
    PersistenceFailure {
        path: PathBuf,
        #[source]
        source: DocxError,
    },

    /// The end query resolved at or before the start of the range
    #[error("Range end (offset {end}) does not follow its start (offset {start})")]
    InvertedRange { start: usize, end: usize },

    #[error("Range is not reachable: {0}")]
    UnreachableRange(String),

    /// Failure while applying one change of a batch (1-based index)
    #[error("Change {index}: {source}")]
    Change {
        index: usize,
        #[source]
        source: Box<AnnotateError>,
    },

    #[error("Document error: {0}")]
    Document(DocxError),

    #[error("Edit error: {0}")]
    Edit(EditError),

    #[error("Revision error: {0}")]
    Revision(RevisionError),
}

impl AnnotateError {
    /// Attach the 1-based position of the failing change
    pub fn in_change(self, index: usize) -> Self {
        AnnotateError::Change {
            index,
            source: Box::new(self),
        }
    }
}

impl From<DocxError> for AnnotateError {
    fn from(err: DocxError) -> Self {
        match err {
            DocxError::NotFound(what) => AnnotateError::NotFound(what),
            other => AnnotateError::Document(other),
        }
    }
}

impl From<EditError> for AnnotateError {
    fn from(err: EditError) -> Self {
        match err {
            EditError::UnreachableRange(detail) => AnnotateError::UnreachableRange(detail),
            other => AnnotateError::Edit(other),
        }
    }
}

impl From<RevisionError> for AnnotateError {
    fn from(err: RevisionError) -> Self {
        match err {
            RevisionError::Edit(edit) => AnnotateError::from(edit),
            RevisionError::InvalidOperation(detail) => AnnotateError::InvalidInput(detail),
            other => AnnotateError::Revision(other),
        }
    }
}

pub type Result<T> = std::result::Result<T, AnnotateError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_document_maps_to_not_found() {
        let err = AnnotateError::from(DocxError::NotFound("a.docx".into()));
        assert!(matches!(err, AnnotateError::NotFound(ref what) if what == "a.docx"));
    }

    #[test]
    fn test_unreachable_is_lifted_through_revision_errors() {
        let err = AnnotateError::from(RevisionError::Edit(EditError::UnreachableRange("x".into())));
        assert!(matches!(err, AnnotateError::UnreachableRange(_)));
    }

    #[test]
    fn test_change_context_in_message() {
        let err = AnnotateError::MalformedChange("unknown change type \"Edit\"".into()).in_change(3);
        assert_eq!(err.to_string(), "Change 3: Malformed change: unknown change type \"Edit\"");
    }
}
