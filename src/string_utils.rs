//! UTF-8 Safe String Utilities
//!
//! Carets and selections arrive from the UI as byte offsets that may be
//! stale (the block text changed underneath them) or fall inside a
//! multi-byte character. These helpers clamp offsets to valid boundaries
//! before any slicing or splicing happens.
//!
//! # Example
//! ```ignore
//! use crate::string_utils::splice;
//!
//! let (text, caret) = splice("Hei på deg", 4, 4, "    ");
//! assert_eq!(text, "Hei     på deg");
//! assert_eq!(caret, 8);
//! ```

/// The largest character boundary at or before `index`, clamped to the
/// string length.
#[inline]
pub fn floor_char_boundary(s: &str, index: usize) -> usize {
    if index >= s.len() {
        return s.len();
    }
    (0..=index)
        .rev()
        .find(|&i| s.is_char_boundary(i))
        .unwrap_or(0)
}

/// Replace the byte range `start..end` of `s` with `insert`.
///
/// Both ends are floored to character boundaries and swapped if reversed.
/// Returns the new text and the byte offset just after the inserted text.
pub fn splice(s: &str, start: usize, end: usize, insert: &str) -> (String, usize) {
    let a = floor_char_boundary(s, start);
    let b = floor_char_boundary(s, end);
    let (start, end) = (a.min(b), a.max(b));

    let mut out = String::with_capacity(s.len() - (end - start) + insert.len());
    out.push_str(&s[..start]);
    out.push_str(insert);
    out.push_str(&s[end..]);
    (out, start + insert.len())
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
