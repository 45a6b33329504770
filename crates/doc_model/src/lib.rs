//! Document Model - arena document tree for WordprocessingML content
//!
//! The tree keeps every node in typed storage maps keyed by [`NodeId`]. Runs
//! hold their leaf content and a verbatim formatting descriptor, and anything
//! the model does not interpret is carried as an opaque node so it can be
//! written back untouched.

mod node;
mod node_id;
mod error;
mod formatting;
mod run;
mod paragraph;
mod table;
mod markup;
mod comment;
mod document;
mod tree;

pub use node::*;
pub use node_id::*;
pub use error::*;
pub use formatting::*;
pub use run::*;
pub use paragraph::*;
pub use table::*;
pub use markup::*;
pub use comment::*;
pub use document::*;
pub use tree::*;
