//! Text statistics for the status bar
//!
//! Counts are taken over the trimmed document text, so leading and trailing
//! blank lines (such as an empty block waiting at the end) don't count.

use crate::config::Settings;

// ─────────────────────────────────────────────────────────────────────────────
// TextStats
// ─────────────────────────────────────────────────────────────────────────────

/// Text statistics for a document.
///
/// # Example
///
/// ```ignore
/// let stats = TextStats::from_text("Hello, World!\n\nNew paragraph.", 200);
/// assert_eq!(stats.words, 4);
/// assert_eq!(stats.reading_minutes, 1);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TextStats {
    /// Number of words (sequences of non-whitespace characters)
    pub words: usize,
    /// Number of characters including whitespace
    pub characters: usize,
    /// Number of characters excluding whitespace
    pub characters_no_spaces: usize,
    /// Number of lines
    pub lines: usize,
    /// Estimated reading time, rounded up to whole minutes
    pub reading_minutes: usize,
}

impl TextStats {
    /// Calculate statistics in a single pass over the trimmed text.
    ///
    /// A `words_per_minute` of zero is treated as one.
    pub fn from_text(text: &str, words_per_minute: usize) -> Self {
        let text = text.trim();
        if text.is_empty() {
            return Self::default();
        }

        let mut stats = Self {
            lines: 1,
            ..Self::default()
        };
        let mut in_word = false;

        for ch in text.chars() {
            stats.characters += 1;

            if ch.is_whitespace() {
                in_word = false;
                if ch == '\n' {
                    stats.lines += 1;
                }
            } else {
                stats.characters_no_spaces += 1;
                if !in_word {
                    in_word = true;
                    stats.words += 1;
                }
            }
        }

        stats.reading_minutes = stats.words.div_ceil(words_per_minute.max(1));
        stats
    }

    /// Statistics using the configured reading speed.
    pub fn with_settings(text: &str, settings: &Settings) -> Self {
        Self::from_text(text, settings.words_per_minute)
    }

    /// Format the statistics for display in the status bar.
    ///
    /// Returns a compact string like "150 words | 892 chars | 1 min read"
    pub fn format_compact(&self) -> String {
        format!(
            "{} words | {} chars | {} min read",
            self.words, self.characters, self.reading_minutes
        )
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
