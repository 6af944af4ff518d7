//! File persistence for NovaScribe
//!
//! This module provides the document storage collaborator and the
//! per-file write queue used when a document is bound to a workspace file.

pub mod storage;
pub mod write_queue;

pub use storage::{DocumentStorage, JsonFileStorage, MemoryStorage};
pub use write_queue::{FlushReport, WriteJob, WriteQueue};
