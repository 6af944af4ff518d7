//! Block Formatting Actions
//!
//! The context menu and the toolbar share one action table. Text actions
//! rewrite a single block's text; structural actions (insert, delete, copy)
//! are carried out by the active-block controller, which asks this module
//! only for the text they operate on.
//!
//! # Usage
//! ```ignore
//! use crate::markdown::formatting::{apply_text_action, BlockAction};
//!
//! let text = apply_text_action(BlockAction::Heading(2), "> quoted");
//! assert_eq!(text.as_deref(), Some("## quoted"));
//! ```

use regex::Regex;
use std::sync::OnceLock;

use super::splitter::{CODE_FENCE, MATH_FENCE};

/// Template inserted by the table action. The block's previous content is discarded.
pub const TABLE_TEMPLATE: &str = "| Column 1 | Column 2 | Column 3 |\n| --- | --- | --- |\n| Content | Content | Content |";

/// Text inserted by the horizontal rule action.
pub const RULE_TEXT: &str = "---";

// ─────────────────────────────────────────────────────────────────────────────
// Action Enum
// ─────────────────────────────────────────────────────────────────────────────

/// A context-menu or toolbar action applied to one block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockAction {
    /// Heading level 1-3
    Heading(u8),
    Quote,
    Bullet,
    Number,
    Bold,
    Italic,
    Code,
    Math,
    Table,
    Rule,
    Copy,
    InsertAbove,
    InsertBelow,
    Delete,
}

impl BlockAction {
    /// Every action, in context-menu order.
    pub const ALL: [BlockAction; 16] = [
        BlockAction::Copy,
        BlockAction::InsertAbove,
        BlockAction::InsertBelow,
        BlockAction::Heading(1),
        BlockAction::Heading(2),
        BlockAction::Heading(3),
        BlockAction::Quote,
        BlockAction::Bullet,
        BlockAction::Number,
        BlockAction::Bold,
        BlockAction::Italic,
        BlockAction::Code,
        BlockAction::Math,
        BlockAction::Table,
        BlockAction::Rule,
        BlockAction::Delete,
    ];

    /// Look up an action by the name the UI sends.
    ///
    /// The toolbar's `list` is an alias for `bullet`.
    pub fn from_name(name: &str) -> Option<Self> {
        let action = match name {
            "h1" => Self::Heading(1),
            "h2" => Self::Heading(2),
            "h3" => Self::Heading(3),
            "quote" => Self::Quote,
            "bullet" | "list" => Self::Bullet,
            "number" => Self::Number,
            "bold" => Self::Bold,
            "italic" => Self::Italic,
            "code" => Self::Code,
            "math" => Self::Math,
            "table" => Self::Table,
            "hr" => Self::Rule,
            "copy" => Self::Copy,
            "insertAbove" => Self::InsertAbove,
            "insertBelow" => Self::InsertBelow,
            "delete" => Self::Delete,
            _ => return None,
        };
        Some(action)
    }

    /// Stable name of the action, the inverse of [`from_name`](Self::from_name).
    pub fn name(&self) -> &'static str {
        match self {
            Self::Heading(1) => "h1",
            Self::Heading(2) => "h2",
            Self::Heading(_) => "h3",
            Self::Quote => "quote",
            Self::Bullet => "bullet",
            Self::Number => "number",
            Self::Bold => "bold",
            Self::Italic => "italic",
            Self::Code => "code",
            Self::Math => "math",
            Self::Table => "table",
            Self::Rule => "hr",
            Self::Copy => "copy",
            Self::InsertAbove => "insertAbove",
            Self::InsertBelow => "insertBelow",
            Self::Delete => "delete",
        }
    }

    /// Menu label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Heading(1) => "Heading 1",
            Self::Heading(2) => "Heading 2",
            Self::Heading(_) => "Heading 3",
            Self::Quote => "Quote",
            Self::Bullet => "Bullet List",
            Self::Number => "Numbered List",
            Self::Bold => "Bold",
            Self::Italic => "Italic",
            Self::Code => "Code Block",
            Self::Math => "Math Block",
            Self::Table => "Table",
            Self::Rule => "Divider",
            Self::Copy => "Copy Block",
            Self::InsertAbove => "Insert Above",
            Self::InsertBelow => "Insert Below",
            Self::Delete => "Delete",
        }
    }

    /// Whether the action changes the block list rather than one block's text.
    pub fn is_structural(&self) -> bool {
        matches!(self, Self::InsertAbove | Self::InsertBelow | Self::Delete)
    }

    /// Whether the editor toolbar offers this action.
    pub fn is_toolbar(&self) -> bool {
        matches!(
            self,
            Self::Heading(1 | 2)
                | Self::Bullet
                | Self::Bold
                | Self::Italic
                | Self::Code
                | Self::Math
                | Self::Table
        )
    }

    /// Starting text for a new block created by this action when no block is active.
    ///
    /// Returns `None` for actions that need an existing block.
    pub fn template(&self) -> Option<String> {
        let text = match self {
            Self::Bold => "**bold**".to_string(),
            Self::Italic => "*italic*".to_string(),
            Self::Code => format!("{CODE_FENCE}\n\n{CODE_FENCE}"),
            Self::Math => format!("{MATH_FENCE}\n\n{MATH_FENCE}"),
            Self::Copy | Self::InsertAbove | Self::InsertBelow | Self::Delete => return None,
            other => return apply_text_action(*other, ""),
        };
        Some(text)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Marker Handling
// ─────────────────────────────────────────────────────────────────────────────

fn leading_marker_pattern() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^#+\s|^>\s|^-\s|^\d+\.\s").ok())
        .as_ref()
}

/// Split off one leading block marker (`# `, `> `, `- `, `1. `).
///
/// Returns `(marker, rest)`; the marker is empty when there is none.
pub fn split_leading_marker(text: &str) -> (&str, &str) {
    let end = leading_marker_pattern()
        .and_then(|re| re.find(text))
        .map(|m| m.end())
        .unwrap_or(0);
    text.split_at(end)
}

/// The block text with one leading marker removed.
pub fn strip_leading_marker(text: &str) -> &str {
    split_leading_marker(text).1
}

fn is_bold_wrapped(text: &str) -> bool {
    text.len() >= 4 && text.starts_with("**") && text.ends_with("**")
}

fn is_italic_wrapped(text: &str) -> bool {
    if text.len() >= 6 && text.starts_with("***") && text.ends_with("***") {
        return true;
    }
    text.len() >= 2
        && text.starts_with('*')
        && text.ends_with('*')
        && !text.starts_with("**")
        && !text.ends_with("**")
}

fn toggle_wrap(text: &str, wrapper: &str, wrapped: bool) -> String {
    if wrapped {
        text[wrapper.len()..text.len() - wrapper.len()].to_string()
    } else {
        format!("{wrapper}{text}{wrapper}")
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Text Actions
// ─────────────────────────────────────────────────────────────────────────────

/// Apply a text action to a block, returning its new text.
///
/// Returns `None` for structural actions and `Copy`, which leave the text alone.
pub fn apply_text_action(action: BlockAction, text: &str) -> Option<String> {
    let stripped = strip_leading_marker(text);

    let new_text = match action {
        BlockAction::Heading(level) => {
            let level = level.clamp(1, 3) as usize;
            format!("{} {}", "#".repeat(level), stripped)
        }
        BlockAction::Quote => format!("> {stripped}"),
        BlockAction::Bullet => format!("- {stripped}"),
        BlockAction::Number => format!("1. {stripped}"),
        BlockAction::Bold => {
            let (marker, rest) = split_leading_marker(text);
            format!("{marker}{}", toggle_wrap(rest, "**", is_bold_wrapped(rest)))
        }
        BlockAction::Italic => {
            let (marker, rest) = split_leading_marker(text);
            format!("{marker}{}", toggle_wrap(rest, "*", is_italic_wrapped(rest)))
        }
        BlockAction::Code => format!("{CODE_FENCE}\n{stripped}\n{CODE_FENCE}"),
        BlockAction::Math => format!("{MATH_FENCE}\n{stripped}\n{MATH_FENCE}"),
        BlockAction::Table => TABLE_TEMPLATE.to_string(),
        BlockAction::Rule => RULE_TEXT.to_string(),
        BlockAction::Copy
        | BlockAction::InsertAbove
        | BlockAction::InsertBelow
        | BlockAction::Delete => return None,
    };

    Some(new_text)
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
