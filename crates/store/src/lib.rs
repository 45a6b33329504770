//! Store - DOCX package I/O
//!
//! Opens a DOCX archive into a `DocumentTree` plus the parts around it, and
//! writes it back with only the edited parts regenerated.

pub mod docx;

pub use docx::{DocxError, DocxPackage, DocxResult};
