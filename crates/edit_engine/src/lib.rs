//! Edit Engine - text location and surgical tree edits
//!
//! This crate maps the visible text of a [`doc_model::DocumentTree`] to a
//! flat character stream, resolves text queries back to run coordinates, and
//! splits runs so annotations can be inserted on exact boundaries.

mod error;
mod position_map;
mod locator;
mod splicer;
mod comment_commands;

pub use error::*;
pub use position_map::*;
pub use locator::*;
pub use splicer::*;
pub use comment_commands::*;
