//! Clipboard collaborator
//!
//! Copying a block puts its text on the clipboard. The desktop
//! implementation uses arboard; tests use an in-memory clipboard.

use arboard::Clipboard;
use log::debug;

use crate::error::{Error, Result};

/// Something that can receive copied text (and optionally HTML).
pub trait ClipboardSink {
    fn set_text(&mut self, text: &str) -> Result<()>;

    /// Set rich HTML with a plain-text fallback.
    ///
    /// Defaults to plain text only.
    fn set_html(&mut self, _html: &str, plain_text: &str) -> Result<()> {
        self.set_text(plain_text)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// System Clipboard
// ─────────────────────────────────────────────────────────────────────────────

/// The platform clipboard.
///
/// A fresh arboard handle is opened per operation, so a clipboard that is
/// unavailable at startup doesn't disable copying for the whole session.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClipboard;

impl ClipboardSink for SystemClipboard {
    fn set_text(&mut self, text: &str) -> Result<()> {
        let mut clipboard = Clipboard::new()?;
        clipboard.set_text(text)?;
        debug!("Copied {} bytes to the clipboard", text.len());
        Ok(())
    }

    fn set_html(&mut self, html: &str, plain_text: &str) -> Result<()> {
        let mut clipboard = Clipboard::new()?;
        clipboard.set_html(html, Some(plain_text))?;
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// In-Memory Clipboard
// ─────────────────────────────────────────────────────────────────────────────

/// A clipboard that records what was copied.
#[derive(Debug, Default, Clone)]
pub struct MemoryClipboard {
    pub text: Option<String>,
    pub html: Option<String>,
    /// Fail every operation
    pub unavailable: bool,
}

impl MemoryClipboard {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ClipboardSink for MemoryClipboard {
    fn set_text(&mut self, text: &str) -> Result<()> {
        if self.unavailable {
            return Err(Error::Clipboard("clipboard unavailable".to_string()));
        }
        self.text = Some(text.to_string());
        Ok(())
    }

    fn set_html(&mut self, html: &str, plain_text: &str) -> Result<()> {
        self.set_text(plain_text)?;
        self.html = Some(html.to_string());
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
