//! Fence-aware block splitting
//!
//! A document is a flat Markdown buffer. The editor works on an ordered
//! sequence of blocks: runs of lines separated by blank lines, except that
//! blank lines inside an open code (```` ``` ````) or math (`$$`) fence
//! never separate anything.
//!
//! `split` and `join` are inverses for any document whose blocks are
//! separated by exactly one blank line and whose fences are all closed.

/// Marker that opens and closes a fenced code block.
pub const CODE_FENCE: &str = "```";

/// Marker that opens and closes a display math block.
pub const MATH_FENCE: &str = "$$";

/// Separator placed between blocks when re-assembling a document.
pub const BLOCK_SEPARATOR: &str = "\n\n";

/// Which fence, if any, is open at the current line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct FenceState {
    in_code: bool,
    in_math: bool,
}

impl FenceState {
    pub(crate) fn is_open(&self) -> bool {
        self.in_code || self.in_math
    }

    /// Update the state for a line. A code fence marker inside open math
    /// (and vice versa) is content, not a delimiter.
    pub(crate) fn observe(&mut self, line: &str) {
        let trimmed = line.trim();
        if trimmed.starts_with(CODE_FENCE) && !self.in_math {
            self.in_code = !self.in_code;
        } else if trimmed.starts_with(MATH_FENCE) && !self.in_code {
            // A one-line `$$ x $$` opens and closes on the same line
            let one_liner = trimmed.len() > 2 * MATH_FENCE.len()
                && trimmed.ends_with(MATH_FENCE)
                && !self.in_math;
            if !one_liner {
                self.in_math = !self.in_math;
            }
        }
    }
}

/// Split a document into its ordered block strings.
///
/// Always returns at least one block; an empty or whitespace-only document
/// yields a single empty block so there is somewhere to place the caret.
/// A fence left open at the end of the document swallows the remaining
/// lines into one block.
///
/// Line endings are normalized: `\r\n` reads as `\n`, so joining the
/// blocks again always produces `\n`-only text.
pub fn split_blocks(text: &str) -> Vec<String> {
    let mut blocks = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    let mut fences = FenceState::default();

    for line in text.lines() {
        let was_open = fences.is_open();
        fences.observe(line);

        if !was_open && !fences.is_open() && line.trim().is_empty() {
            if !current.is_empty() {
                blocks.push(current.join("\n"));
                current.clear();
            }
            continue;
        }

        current.push(line);
    }

    if !current.is_empty() {
        blocks.push(current.join("\n"));
    }

    if blocks.is_empty() {
        blocks.push(String::new());
    }
    blocks
}

/// Re-assemble blocks into a single document buffer.
pub fn join_blocks<S: AsRef<str>>(blocks: &[S]) -> String {
    let mut out = String::new();
    for (i, block) in blocks.iter().enumerate() {
        if i > 0 {
            out.push_str(BLOCK_SEPARATOR);
        }
        out.push_str(block.as_ref());
    }
    out
}

/// Whether a block's text is fenced content (starts with a code or math fence).
///
/// Inside such a block Enter inserts a newline rather than splitting.
pub fn is_fenced(text: &str) -> bool {
    let trimmed = text.trim_start();
    trimmed.starts_with(CODE_FENCE) || trimmed.starts_with(MATH_FENCE)
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn normalized(text: &str) -> String {
        text.trim_end().to_string()
    }

    #[test]
    fn test_split_scenario_document() {
        let doc = "# Title\n\nBody text\n\n```\ncode\n```";
        let blocks = split_blocks(doc);
        assert_eq!(blocks, vec!["# Title", "Body text", "```\ncode\n```"]);
    }

    #[test]
    fn test_crlf_normalized() {
        let blocks = split_blocks("# Title\r\n\r\nline one\r\nline two\r\n");
        assert_eq!(blocks, vec!["# Title", "line one\nline two"]);
        assert_eq!(join_blocks(&blocks), "# Title\n\nline one\nline two");
    }

    #[test]
    fn test_split_empty_yields_one_empty_block() {
        assert_eq!(split_blocks(""), vec![String::new()]);
        assert_eq!(split_blocks("   "), vec![String::new()]);
        assert_eq!(split_blocks("\n\n\n"), vec![String::new()]);
    }

    #[test]
    fn test_blank_line_inside_code_fence_does_not_split() {
        assert_eq!(split_blocks("```\n\n```"), vec!["```\n\n```"]);

        let doc = "```rust\nfn a() {}\n\nfn b() {}\n```\n\nafter";
        let blocks = split_blocks(doc);
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0], "```rust\nfn a() {}\n\nfn b() {}\n```");
        assert_eq!(blocks[1], "after");
    }

    #[test]
    fn test_blank_line_inside_math_fence_does_not_split() {
        let doc = "$$\na = b\n\nc = d\n$$\n\ntext";
        let blocks = split_blocks(doc);
        assert_eq!(blocks, vec!["$$\na = b\n\nc = d\n$$", "text"]);
    }

    #[test]
    fn test_one_line_math_does_not_open_fence() {
        let doc = "$$ x^2 $$\n\nnext";
        assert_eq!(split_blocks(doc), vec!["$$ x^2 $$", "next"]);
    }

    #[test]
    fn test_math_marker_inside_code_is_content() {
        let doc = "```\n$$\n\n```\n\nafter";
        assert_eq!(split_blocks(doc), vec!["```\n$$\n\n```", "after"]);
    }

    #[test]
    fn test_unterminated_fence_swallows_rest() {
        let doc = "intro\n\n```\ncode\n\nmore\n\nstill code";
        let blocks = split_blocks(doc);
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[1], "```\ncode\n\nmore\n\nstill code");
    }

    #[test]
    fn test_multiple_blank_lines_collapse() {
        let blocks = split_blocks("a\n\n\n\nb\n   \nc");
        assert_eq!(blocks, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_single_newline_stays_in_block() {
        let blocks = split_blocks("line one\nline two\n\nnext");
        assert_eq!(blocks, vec!["line one\nline two", "next"]);
    }

    #[test]
    fn test_round_trip() {
        let docs = [
            "# Title\n\nBody text\n\n```\ncode\n```",
            "single paragraph",
            "- a\n- b\n\n> quote\n\n$$\nx\n\ny\n$$\n\n---",
            "trailing\n\n",
            "",
        ];
        for doc in docs {
            let joined = join_blocks(&split_blocks(doc));
            assert_eq!(normalized(&joined), normalized(doc), "doc: {:?}", doc);
        }
    }

    #[test]
    fn test_join_keeps_empty_blocks() {
        let joined = join_blocks(&["a", "", "b"]);
        assert_eq!(joined, "a\n\n\n\nb");
    }

    #[test]
    fn test_is_fenced() {
        assert!(is_fenced("```\ncode\n```"));
        assert!(is_fenced("  $$\nx\n$$"));
        assert!(!is_fenced("plain"));
        assert!(!is_fenced("text with ``` inside"));
    }
}
