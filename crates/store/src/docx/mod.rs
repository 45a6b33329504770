//! DOCX package reading and writing
//!
//! A DOCX file is a ZIP archive of XML parts:
//! - `[Content_Types].xml` - Content type definitions
//! - `_rels/.rels` - Root relationships, pointing at the main document part
//! - `word/document.xml` - Main document content
//! - `word/_rels/document.xml.rels` - Relationships of the main part
//! - `word/comments.xml` - Comments content
//! - `word/settings.xml` - Document settings, including the tracking flag
//!
//! Only the main part, the comments part and the settings part are ever
//! rewritten. Every other entry is copied through as read.

mod error;
mod reader;
mod content_types;
mod relationships;
mod document;
mod document_writer;
mod comments_io;
mod settings_io;
mod writer;
mod package;

pub use error::{DocxError, DocxResult};
pub use document::{parse_document, DocumentShell};
pub use document_writer::DocumentWriter;
pub use comments_io::{append_comments, parse_comments};
pub use settings_io::{enable_track_revisions, read_track_revisions};
pub use package::DocxPackage;

/// XML namespaces used in DOCX
pub mod namespaces {
    /// WordprocessingML main namespace
    pub const W: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
}

/// Relationship types
pub mod relationship_types {
    pub const DOCUMENT: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument";
    pub const HYPERLINK: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/hyperlink";
    pub const SETTINGS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/settings";
    pub const COMMENTS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/comments";
}

/// Content types
pub mod content_type_values {
    pub const DOCUMENT: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml";
    pub const SETTINGS: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.settings+xml";
    pub const COMMENTS: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.comments+xml";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_namespace_constants() {
        assert!(namespaces::W.contains("wordprocessingml"));
        assert!(relationship_types::COMMENTS.ends_with("/comments"));
    }
}
