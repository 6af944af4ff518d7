//! Document outline
//!
//! Extracts ATX headings (`# Heading`) from the document text. Each item
//! carries the index of the block that contains it so the editor can scroll
//! to and activate that block directly.

use crate::markdown::splitter::FenceState;

// ─────────────────────────────────────────────────────────────────────────────
// OutlineItem
// ─────────────────────────────────────────────────────────────────────────────

/// A single heading in the document outline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutlineItem {
    /// Heading level (1-6 for H1-H6)
    pub level: u8,
    /// The heading text, stripped of inline Markdown formatting
    pub title: String,
    /// Line index in the document (0-based)
    pub line: usize,
    /// Index of the block holding the heading
    pub block: usize,
}

impl OutlineItem {
    /// Get the indentation level (0 for H1, 1 for H2, etc.)
    pub fn indent_level(&self) -> usize {
        self.level.saturating_sub(1) as usize
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// DocumentOutline
// ─────────────────────────────────────────────────────────────────────────────

/// All headings of a document, in order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentOutline {
    pub items: Vec<OutlineItem>,
}

impl DocumentOutline {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Get the number of headings at each level.
    pub fn level_counts(&self) -> [usize; 6] {
        let mut counts = [0usize; 6];
        for item in &self.items {
            if (1..=6).contains(&item.level) {
                counts[(item.level - 1) as usize] += 1;
            }
        }
        counts
    }

    /// Get a summary string like "3 H1, 5 H2, 2 H3"
    pub fn summary(&self) -> String {
        let parts: Vec<String> = self
            .level_counts()
            .iter()
            .enumerate()
            .filter(|(_, &count)| count > 0)
            .map(|(i, count)| format!("{} H{}", count, i + 1))
            .collect();
        if parts.is_empty() {
            "No headings".to_string()
        } else {
            parts.join(", ")
        }
    }

    /// The heading whose section contains `block`, if any.
    pub fn section_for_block(&self, block: usize) -> Option<&OutlineItem> {
        self.items.iter().take_while(|item| item.block <= block).last()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Extraction
// ─────────────────────────────────────────────────────────────────────────────

/// Extract headings from Markdown text.
///
/// Lines inside code or math fences are skipped. Block indices follow the
/// same blank-line rule the block splitter uses.
pub fn extract_outline(text: &str) -> DocumentOutline {
    let mut items = Vec::new();
    let mut fences = FenceState::default();
    let mut block = 0;
    let mut block_has_content = false;

    for (line_idx, line) in text.lines().enumerate() {
        let was_open = fences.is_open();
        fences.observe(line);

        if !was_open && !fences.is_open() && line.trim().is_empty() {
            if block_has_content {
                block += 1;
                block_has_content = false;
            }
            continue;
        }
        block_has_content = true;

        if was_open || fences.is_open() {
            continue;
        }
        if let Some((level, title)) = parse_atx_heading(line) {
            items.push(OutlineItem {
                level,
                title,
                line: line_idx,
                block,
            });
        }
    }

    DocumentOutline { items }
}

/// Parse an ATX-style heading from a line.
///
/// Returns Some((level, title)) if the line is a heading, None otherwise.
fn parse_atx_heading(line: &str) -> Option<(u8, String)> {
    let trimmed = line.trim_start();
    let hash_count = trimmed.chars().take_while(|&c| c == '#').count();
    if hash_count == 0 || hash_count > 6 {
        return None;
    }

    // Must have whitespace after the hashes (or nothing at all)
    let rest = &trimmed[hash_count..];
    if !rest.is_empty() && !rest.starts_with(' ') && !rest.starts_with('\t') {
        return None;
    }

    // Optional closing hashes
    let title = rest.trim().trim_end_matches('#').trim();

    Some((hash_count as u8, strip_inline_formatting(title)))
}

/// Strip common inline Markdown formatting from heading text.
///
/// Removes: **bold**, `code`, ~~strikethrough~~, [links](url), ![images](url)
fn strip_inline_formatting(text: &str) -> String {
    let mut result = text.to_string();
    for wrapper in ["**", "__", "`", "~~"] {
        result = remove_wrapper(&result, wrapper);
    }
    // Images first, so the `!` isn't left behind by the link pass
    result = remove_link_syntax(&result, "![");
    result = remove_link_syntax(&result, "[");
    result
}

/// Remove a symmetric wrapper like ** or ~~
fn remove_wrapper(text: &str, wrapper: &str) -> String {
    let mut result = text.to_string();
    let len = wrapper.len();

    while let Some(start) = result.find(wrapper) {
        let Some(end) = result[start + len..].find(wrapper) else {
            break;
        };
        let end_pos = start + len + end;
        result = format!(
            "{}{}{}",
            &result[..start],
            &result[start + len..end_pos],
            &result[end_pos + len..]
        );
    }
    result
}

/// Replace `[text](url)` (or `![alt](url)` with `open = "!["`) by its text.
fn remove_link_syntax(text: &str, open: &str) -> String {
    let mut result = text.to_string();
    let mut from = 0;

    while let Some(found) = result[from..].find(open) {
        let start = from + found;
        let Some(mid) = result[start..].find("](") else {
            break;
        };
        let mid_pos = start + mid;
        let Some(end) = result[mid_pos + 2..].find(')') else {
            break;
        };
        let end_pos = mid_pos + 2 + end;
        let inner = result[start + open.len()..mid_pos].to_string();
        result = format!("{}{}{}", &result[..start], inner, &result[end_pos + 1..]);
        from = start + inner.len();
    }
    result
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn titles(outline: &DocumentOutline) -> Vec<&str> {
        outline.items.iter().map(|i| i.title.as_str()).collect()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Extraction
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_empty_document() {
        let outline = extract_outline("");
        assert!(outline.is_empty());
        assert_eq!(outline.summary(), "No headings");
    }

    #[test]
    fn test_headings_with_lines_and_blocks() {
        let text = "# Title\n\nIntro\n\n## Part one\nText\n\n## Part two";
        let outline = extract_outline(text);

        assert_eq!(titles(&outline), vec!["Title", "Part one", "Part two"]);
        let lines: Vec<usize> = outline.items.iter().map(|i| i.line).collect();
        assert_eq!(lines, vec![0, 4, 7]);
        let blocks: Vec<usize> = outline.items.iter().map(|i| i.block).collect();
        assert_eq!(blocks, vec![0, 2, 3]);
    }

    #[test]
    fn test_block_index_ignores_extra_blank_lines() {
        let outline = extract_outline("\n\n# A\n\n\n\n# B");
        let blocks: Vec<usize> = outline.items.iter().map(|i| i.block).collect();
        assert_eq!(blocks, vec![0, 1]);
    }

    #[test]
    fn test_all_heading_levels() {
        let text = "# 1\n## 2\n### 3\n#### 4\n##### 5\n###### 6\n####### 7";
        let outline = extract_outline(text);
        assert_eq!(outline.len(), 6);
        assert_eq!(outline.level_counts(), [1, 1, 1, 1, 1, 1]);
        assert_eq!(outline.items[5].indent_level(), 5);
    }

    #[test]
    fn test_not_a_heading_no_space() {
        assert!(extract_outline("#hashtag").is_empty());
    }

    #[test]
    fn test_heading_with_trailing_hashes() {
        let outline = extract_outline("## Closed ##");
        assert_eq!(titles(&outline), vec!["Closed"]);
    }

    #[test]
    fn test_headings_in_fences_skipped() {
        let text = "# Real\n\n```\n# comment\n\n# still code\n```\n\n$$\n# not\n$$\n\n# After";
        let outline = extract_outline(text);
        assert_eq!(titles(&outline), vec!["Real", "After"]);
        assert_eq!(outline.items[1].block, 3);
    }

    #[test]
    fn test_heading_inline_formatting_stripped() {
        let outline = extract_outline("# **Bold** and `code` with [link](http://x) ![img](a.png)");
        assert_eq!(titles(&outline), vec!["Bold and code with link img"]);
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Queries
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_summary() {
        let outline = extract_outline("# A\n\n## B\n\n## C");
        assert_eq!(outline.summary(), "1 H1, 2 H2");
    }

    #[test]
    fn test_section_for_block() {
        let outline = extract_outline("intro\n\n# A\n\ntext\n\n# B\n\nmore");
        assert_eq!(outline.section_for_block(0), None);
        assert_eq!(outline.section_for_block(2).map(|i| i.title.as_str()), Some("A"));
        assert_eq!(outline.section_for_block(4).map(|i| i.title.as_str()), Some("B"));
    }
}
