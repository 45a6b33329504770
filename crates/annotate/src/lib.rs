//! Annotate - applies review changes to a document
//!
//! A [`Change`] names a span by the text it contains and asks for either a
//! comment on it or a tracked replacement of it. The orchestrator resolves
//! each change against the live tree in order, then saves once.

mod error;
mod change;
mod config;
mod session;
mod orchestrator;

pub use error::*;
pub use change::*;
pub use config::*;
pub use session::*;
pub use orchestrator::*;

pub use edit_engine::{MatchTier, TextSearchPosition};
