//! Block editor core for NovaScribe
//!
//! This module tracks block identities across re-splits, drives the
//! active-block state machine, keeps the undo/redo history and computes
//! the status-bar statistics and document outline.

pub mod controller;
pub mod history;
pub mod identity;
mod outline;
mod stats;

pub use controller::{ActiveState, BlockController, EditorKey, Outcome, Selection};
pub use history::History;
pub use identity::{Block, BlockId, BlockList};
pub use outline::{extract_outline, DocumentOutline, OutlineItem};
pub use stats::TextStats;
