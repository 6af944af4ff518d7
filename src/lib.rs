//! NovaScribe - block-based Markdown editor core
//!
//! A document is edited as a sequence of blocks separated by blank lines.
//! Exactly one block at a time shows its raw Markdown; every other block is
//! rendered. The crate provides the fence-aware block splitter, stable
//! block identities, the active-block state machine, undo history, the
//! document store and the collaborator traits a desktop shell plugs into.

pub mod app;
pub mod config;
pub mod editor;
pub mod error;
pub mod export;
pub mod files;
pub mod markdown;
pub mod services;
pub mod state;
pub mod string_utils;
pub mod workspaces;

pub use app::{BlockView, EditorSession, Notice, NoticeKind, ShortcutAction};
pub use config::Settings;
pub use error::{Error, Result};
pub use state::{Document, DocumentStore};
