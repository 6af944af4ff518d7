//! Block classification
//!
//! Maps a block's raw text to what it is (its [`BlockKind`]) and how its
//! row is displayed (its [`BlockStyle`]). Classification only looks at the
//! trimmed text of a single block; it never needs neighbouring blocks.

use regex::Regex;
use std::sync::OnceLock;

use super::splitter::{CODE_FENCE, MATH_FENCE};

// ─────────────────────────────────────────────────────────────────────────────
// Types
// ─────────────────────────────────────────────────────────────────────────────

/// A standalone image reference `![alt](target)` occupying a whole block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRef {
    pub alt: String,
    pub target: String,
}

impl ImageRef {
    /// Format as Markdown image syntax.
    pub fn to_markdown(&self) -> String {
        format!("![{}]({})", self.alt, self.target)
    }
}

/// The structural kind of a block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockKind {
    /// Whitespace only
    Empty,
    /// ATX heading with level 1-6
    Heading(u8),
    /// Blockquote (`> `)
    Quote,
    /// Fenced code block with optional info string
    Code { language: Option<String> },
    /// Display math (`$$`)
    Math,
    /// A block that is exactly one image reference
    Image(ImageRef),
    /// Bullet or ordered list
    List { ordered: bool },
    /// Thematic break (`---`, `***`, `___`)
    Rule,
    /// GFM pipe table
    Table,
    /// Anything else
    Paragraph,
}

/// How a block row is displayed, independent of its exact kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockStyle {
    Title,
    Section,
    Subsection,
    Quote,
    Code,
    Math,
    Image,
    Body,
}

impl BlockStyle {
    /// CSS class a renderer attaches to the block row.
    pub fn css_class(&self) -> &'static str {
        match self {
            BlockStyle::Title => "block-title",
            BlockStyle::Section => "block-section",
            BlockStyle::Subsection => "block-subsection",
            BlockStyle::Quote => "block-quote",
            BlockStyle::Code => "block-code",
            BlockStyle::Math => "block-math",
            BlockStyle::Image => "block-image",
            BlockStyle::Body => "block-body",
        }
    }

    /// Whether the raw editor for this style should use a monospace font.
    pub fn is_monospace(&self) -> bool {
        matches!(self, BlockStyle::Code | BlockStyle::Math)
    }
}

/// Result of classifying a block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub kind: BlockKind,
    pub style: BlockStyle,
}

// ─────────────────────────────────────────────────────────────────────────────
// Patterns
// ─────────────────────────────────────────────────────────────────────────────

fn image_pattern() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^!\[(.*?)\]\((.*?)\)$").ok())
        .as_ref()
}

fn heading_pattern() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(#{1,6})\s").ok()).as_ref()
}

fn ordered_item_pattern() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d{1,9}[.)]\s").ok()).as_ref()
}

// ─────────────────────────────────────────────────────────────────────────────
// Classification
// ─────────────────────────────────────────────────────────────────────────────

/// Parse a block that consists of exactly one image reference.
pub fn parse_image_reference(text: &str) -> Option<ImageRef> {
    let caps = image_pattern()?.captures(text.trim())?;
    Some(ImageRef {
        alt: caps.get(1).map(|m| m.as_str()).unwrap_or_default().to_string(),
        target: caps.get(2).map(|m| m.as_str()).unwrap_or_default().to_string(),
    })
}

/// Heading level of a block starting with `#{1,6}` and a space.
pub fn heading_level(text: &str) -> Option<u8> {
    let caps = heading_pattern()?.captures(text.trim_start())?;
    caps.get(1).map(|m| m.as_str().len() as u8)
}

/// Classify a block's text.
pub fn classify(text: &str) -> Classification {
    let trimmed = text.trim();

    let (kind, style) = if trimmed.is_empty() {
        (BlockKind::Empty, BlockStyle::Body)
    } else if let Some(level) = heading_level(trimmed) {
        let style = match level {
            1 => BlockStyle::Title,
            2 => BlockStyle::Section,
            3 => BlockStyle::Subsection,
            _ => BlockStyle::Body,
        };
        (BlockKind::Heading(level), style)
    } else if trimmed.starts_with("> ") || trimmed == ">" {
        (BlockKind::Quote, BlockStyle::Quote)
    } else if let Some(info) = trimmed.strip_prefix(CODE_FENCE) {
        let language = info
            .lines()
            .next()
            .map(str::trim)
            .filter(|lang| !lang.is_empty())
            .map(str::to_string);
        (BlockKind::Code { language }, BlockStyle::Code)
    } else if trimmed.starts_with(MATH_FENCE) {
        (BlockKind::Math, BlockStyle::Math)
    } else if let Some(image) = parse_image_reference(trimmed) {
        (BlockKind::Image(image), BlockStyle::Image)
    } else if is_rule(trimmed) {
        (BlockKind::Rule, BlockStyle::Body)
    } else if let Some(ordered) = list_marker(trimmed) {
        (BlockKind::List { ordered }, BlockStyle::Body)
    } else if is_table(trimmed) {
        (BlockKind::Table, BlockStyle::Body)
    } else {
        (BlockKind::Paragraph, BlockStyle::Body)
    };

    Classification { kind, style }
}

/// `Some(ordered)` if the text starts with a list item marker.
fn list_marker(text: &str) -> Option<bool> {
    if text.starts_with("- ") || text.starts_with("* ") || text.starts_with("+ ") {
        return Some(false);
    }
    if ordered_item_pattern().is_some_and(|re| re.is_match(text)) {
        return Some(true);
    }
    None
}

/// Three or more of the same rule character, optionally spaced.
fn is_rule(text: &str) -> bool {
    if text.contains('\n') {
        return false;
    }
    let compact: Vec<char> = text.chars().filter(|c| !c.is_whitespace()).collect();
    match compact.first() {
        Some(&first) if matches!(first, '-' | '*' | '_') => {
            compact.len() >= 3 && compact.iter().all(|&c| c == first)
        }
        _ => false,
    }
}

/// A header row followed by a delimiter row such as `| --- | :-: |`.
fn is_table(text: &str) -> bool {
    let mut lines = text.lines();
    let (Some(header), Some(delimiter)) = (lines.next(), lines.next()) else {
        return false;
    };
    let delimiter = delimiter.trim();
    header.contains('|')
        && delimiter.contains('-')
        && delimiter
            .chars()
            .all(|c| matches!(c, '|' | '-' | ':' | ' '))
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_headings() {
        assert_eq!(classify("# Title").style, BlockStyle::Title);
        assert_eq!(classify("## Part").style, BlockStyle::Section);
        assert_eq!(classify("### Sub").style, BlockStyle::Subsection);

        let deep = classify("#### Deep");
        assert_eq!(deep.kind, BlockKind::Heading(4));
        assert_eq!(deep.style, BlockStyle::Body);

        assert_eq!(classify("#hashtag").kind, BlockKind::Paragraph);
    }

    #[test]
    fn test_classify_uses_trimmed_text() {
        assert_eq!(classify("   # Title  ").kind, BlockKind::Heading(1));
        assert_eq!(classify("  \n ").kind, BlockKind::Empty);
    }

    #[test]
    fn test_classify_quote() {
        let c = classify("> wise words");
        assert_eq!(c.kind, BlockKind::Quote);
        assert_eq!(c.style.css_class(), "block-quote");
    }

    #[test]
    fn test_classify_code_with_language() {
        let c = classify("```rust\nfn main() {}\n```");
        assert_eq!(
            c.kind,
            BlockKind::Code {
                language: Some("rust".to_string())
            }
        );
        assert!(c.style.is_monospace());

        let plain = classify("```\ncode\n```");
        assert_eq!(plain.kind, BlockKind::Code { language: None });
    }

    #[test]
    fn test_classify_math() {
        assert_eq!(classify("$$\nE = mc^2\n$$").kind, BlockKind::Math);
    }

    #[test]
    fn test_classify_image() {
        let c = classify("![diagram](assets/image-1.png)");
        assert_eq!(c.style, BlockStyle::Image);
        match c.kind {
            BlockKind::Image(image) => {
                assert_eq!(image.alt, "diagram");
                assert_eq!(image.target, "assets/image-1.png");
            }
            other => panic!("expected image, got {:?}", other),
        }
    }

    #[test]
    fn test_image_must_be_whole_block() {
        assert_eq!(
            classify("see ![x](y.png) here").kind,
            BlockKind::Paragraph
        );
        assert!(parse_image_reference("![x](y.png)\nmore").is_none());
    }

    #[test]
    fn test_classify_lists() {
        assert_eq!(classify("- a\n- b").kind, BlockKind::List { ordered: false });
        assert_eq!(classify("* a").kind, BlockKind::List { ordered: false });
        assert_eq!(classify("1. first").kind, BlockKind::List { ordered: true });
        assert_eq!(classify("12) twelfth").kind, BlockKind::List { ordered: true });
    }

    #[test]
    fn test_classify_rules() {
        assert_eq!(classify("---").kind, BlockKind::Rule);
        assert_eq!(classify("* * *").kind, BlockKind::Rule);
        assert_eq!(classify("___").kind, BlockKind::Rule);
        assert_ne!(classify("--").kind, BlockKind::Rule);
    }

    #[test]
    fn test_classify_table() {
        let table = "| Column 1 | Column 2 |\n| --- | --- |\n| Content | Content |";
        assert_eq!(classify(table).kind, BlockKind::Table);
        assert_eq!(classify("| just a pipe |").kind, BlockKind::Paragraph);
    }

    #[test]
    fn test_classify_paragraph() {
        let c = classify("Body text");
        assert_eq!(c.kind, BlockKind::Paragraph);
        assert_eq!(c.style, BlockStyle::Body);
    }

    #[test]
    fn test_image_ref_to_markdown() {
        let image = ImageRef {
            alt: "a".to_string(),
            target: "b.png".to_string(),
        };
        assert_eq!(image.to_markdown(), "![a](b.png)");
    }
}
