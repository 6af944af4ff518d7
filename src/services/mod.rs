//! External collaborators for NovaScribe
//!
//! The editor core depends on a few capabilities it does not implement:
//! a text-polishing service, rich-text to Markdown conversion and the
//! clipboard. Each is a trait here with a desktop or scripted
//! implementation next to it.

pub mod clipboard;
pub mod paste;
pub mod polish;

pub use clipboard::{ClipboardSink, MemoryClipboard, SystemClipboard};
pub use paste::{paste_text, place_image, ClipboardPayload, HtmlToMarkdown, PastedImage, ScriptedConverter};
pub use polish::{PolishGuard, PolishRequest, PolishTicket, ScriptedTransformer, TextTransformer};
