//! Error types for DOCX operations

use thiserror::Error;

/// Errors that can occur while reading or writing a DOCX package
#[derive(Debug, Error)]
pub enum DocxError {
    /// IO error (permission denied, disk full, etc.)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// ZIP archive error
    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// XML parsing error
    #[error("XML parsing error: {0}")]
    XmlParse(String),

    /// Invalid DOCX structure
    #[error("Invalid DOCX structure: {0}")]
    InvalidStructure(String),

    /// The file, its main document part or its body is missing
    #[error("Not found: {0}")]
    NotFound(String),

    /// Document model error
    #[error("Document model error: {0}")]
    DocModel(#[from] doc_model::DocModelError),
}

impl From<quick_xml::Error> for DocxError {
    fn from(err: quick_xml::Error) -> Self {
        DocxError::XmlParse(err.to_string())
    }
}

impl From<quick_xml::events::attributes::AttrError> for DocxError {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        DocxError::XmlParse(format!("Attribute error: {}", err))
    }
}

impl From<tempfile::PersistError> for DocxError {
    fn from(err: tempfile::PersistError) -> Self {
        DocxError::Io(err.error)
    }
}

/// Result type for DOCX operations
pub type DocxResult<T> = std::result::Result<T, DocxError>;
