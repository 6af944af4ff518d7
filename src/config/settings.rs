//! User settings and preferences for NovaScribe
//!
//! This module defines the `Settings` struct that holds all user-configurable
//! options, with serde support for JSON persistence.

use serde::{Deserialize, Serialize};

// ─────────────────────────────────────────────────────────────────────────────
// Canvas Click Behavior
// ─────────────────────────────────────────────────────────────────────────────

/// What a click on empty canvas space (outside every block) does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CanvasClick {
    /// Focus the last block, appending an empty one if the last block has text
    #[default]
    FocusLast,
    /// Leave raw-edit mode entirely
    Deactivate,
}

impl CanvasClick {
    /// Get the display label for the behavior.
    pub fn label(&self) -> &'static str {
        match self {
            CanvasClick::FocusLast => "Focus last block",
            CanvasClick::Deactivate => "Stop editing",
        }
    }

    pub fn all() -> &'static [CanvasClick] {
        &[CanvasClick::FocusLast, CanvasClick::Deactivate]
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Main Settings Struct
// ─────────────────────────────────────────────────────────────────────────────

/// Default instruction sent with text-polishing requests.
pub const DEFAULT_POLISH_INSTRUCTION: &str = "You are a professional copy editor. Polish the following Markdown so it reads clearly and professionally, keeping all existing formatting. Return only the revised Markdown.";

/// User preferences and application settings.
///
/// All fields have sensible defaults and will be populated with defaults
/// if missing from the config file (for backward compatibility).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // ─────────────────────────────────────────────────────────────────────────
    // Editing
    // ─────────────────────────────────────────────────────────────────────────
    /// Snapshots kept by undo history
    pub history_capacity: usize,

    /// Quiet period before an edit becomes an undo snapshot (milliseconds)
    pub history_debounce_ms: u64,

    /// Spaces inserted by Tab
    pub indent_width: usize,

    /// Behavior of clicks on empty canvas space
    pub canvas_click: CanvasClick,

    // ─────────────────────────────────────────────────────────────────────────
    // Images & Workspace
    // ─────────────────────────────────────────────────────────────────────────
    /// Inline images larger than this raise a size warning (bytes)
    pub inline_image_warn_bytes: usize,

    /// Folder inside the workspace where pasted images are stored
    pub assets_dir: String,

    /// Only Markdown files can be opened from the workspace tree
    pub markdown_only_workspace: bool,

    /// Names hidden from the workspace tree
    pub hidden_entries: Vec<String>,

    // ─────────────────────────────────────────────────────────────────────────
    // Storage
    // ─────────────────────────────────────────────────────────────────────────
    /// Key under which the document list is stored
    pub storage_key: String,

    // ─────────────────────────────────────────────────────────────────────────
    // Statistics & Services
    // ─────────────────────────────────────────────────────────────────────────
    /// Reading speed used for the reading-time estimate
    pub words_per_minute: usize,

    /// Instruction sent with text-polishing requests
    pub polish_instruction: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            history_capacity: 50,
            history_debounce_ms: 500,
            indent_width: 4,
            canvas_click: CanvasClick::default(),
            inline_image_warn_bytes: 2 * 1024 * 1024,
            assets_dir: "assets".to_string(),
            markdown_only_workspace: true,
            hidden_entries: ["node_modules", ".git", "dist", "venv", "target", ".DS_Store"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            storage_key: "novascribe_docs".to_string(),
            words_per_minute: 200,
            polish_instruction: DEFAULT_POLISH_INSTRUCTION.to_string(),
        }
    }
}

impl Settings {
    /// Minimum history capacity.
    pub const MIN_HISTORY_CAPACITY: usize = 2;
    /// Maximum history capacity.
    pub const MAX_HISTORY_CAPACITY: usize = 1000;
    /// Maximum debounce window.
    pub const MAX_DEBOUNCE_MS: u64 = 10_000;
    /// Minimum indent width.
    pub const MIN_INDENT_WIDTH: usize = 1;
    /// Maximum indent width.
    pub const MAX_INDENT_WIDTH: usize = 8;

    /// Sanitize settings by clamping values to valid ranges.
    ///
    /// This is useful after loading settings from a file that might have
    /// been manually edited with invalid values.
    pub fn sanitize(&mut self) {
        self.history_capacity = self
            .history_capacity
            .clamp(Self::MIN_HISTORY_CAPACITY, Self::MAX_HISTORY_CAPACITY);

        self.history_debounce_ms = self.history_debounce_ms.min(Self::MAX_DEBOUNCE_MS);

        self.indent_width = self
            .indent_width
            .clamp(Self::MIN_INDENT_WIDTH, Self::MAX_INDENT_WIDTH);

        if self.words_per_minute == 0 {
            self.words_per_minute = 200;
        }

        // The assets folder must be a single relative folder name
        let assets = self.assets_dir.trim().trim_matches('/').to_string();
        if assets.is_empty() || assets.contains("..") || assets.contains('\\') {
            self.assets_dir = "assets".to_string();
        } else {
            self.assets_dir = assets;
        }

        if self.storage_key.trim().is_empty() {
            self.storage_key = "novascribe_docs".to_string();
        }

        if self.polish_instruction.trim().is_empty() {
            self.polish_instruction = DEFAULT_POLISH_INSTRUCTION.to_string();
        }

        self.hidden_entries.retain(|name| !name.trim().is_empty());
        self.hidden_entries.dedup();
    }

    /// Load settings and sanitize them to ensure validity.
    ///
    /// This is a convenience method that deserializes and then sanitizes.
    pub fn from_json_sanitized(json: &str) -> Result<Self, serde_json::Error> {
        let mut settings: Self = serde_json::from_str(json)?;
        settings.sanitize();
        Ok(settings)
    }

    /// Indent inserted by Tab.
    pub fn indent(&self) -> String {
        " ".repeat(self.indent_width)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
