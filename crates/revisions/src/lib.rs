//! Revisions - tracked changes for the review engine
//!
//! This crate provides:
//! - Revision ids drawn from a per-session counter
//! - Tracked-change records handed back to callers
//! - The document-level tracking switch
//! - Suggestion insertion (deletion + insertion pair at a located span)

mod commands;
mod error;
mod revision;
mod state;

pub use commands::*;
pub use error::*;
pub use revision::*;
pub use state::*;
