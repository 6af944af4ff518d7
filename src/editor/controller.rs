//! Active-block controller
//!
//! Exactly zero or one block is in raw-edit mode at a time; every other
//! block is rendered. This module owns that state together with the block
//! list and the caret of the active block, and implements the keyboard and
//! menu commands that change block structure.
//!
//! Carets and selections are byte offsets into the active block's text and
//! are clamped to character boundaries on every use.

use log::{debug, warn};

use super::identity::{BlockId, BlockList};
use crate::config::{CanvasClick, Settings};
use crate::markdown::formatting::{apply_text_action, strip_leading_marker, BlockAction};
use crate::markdown::{is_fenced, split_blocks};
use crate::string_utils::{floor_char_boundary, splice};

// ─────────────────────────────────────────────────────────────────────────────
// Types
// ─────────────────────────────────────────────────────────────────────────────

/// Which block, if any, is in raw-edit mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ActiveState {
    #[default]
    NoActive,
    ActiveAt(usize),
}

impl ActiveState {
    pub fn index(&self) -> Option<usize> {
        match self {
            ActiveState::NoActive => None,
            ActiveState::ActiveAt(i) => Some(*i),
        }
    }
}

/// Keys the controller intercepts inside the active block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorKey {
    Enter { shift: bool },
    Backspace,
    Tab,
}

/// Selection inside the active block, as byte offsets.
///
/// `anchor == head` is a collapsed caret.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Selection {
    pub anchor: usize,
    pub head: usize,
}

impl Selection {
    pub fn caret(at: usize) -> Self {
        Self {
            anchor: at,
            head: at,
        }
    }

    /// Ordered `(start, end)`.
    pub fn range(&self) -> (usize, usize) {
        if self.anchor <= self.head {
            (self.anchor, self.head)
        } else {
            (self.head, self.anchor)
        }
    }
}

/// What a controller command did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Outcome {
    /// The command was consumed; the text widget must not apply its default.
    pub handled: bool,
    /// The joined document text changed.
    pub content_changed: bool,
    /// Text to place on the clipboard.
    pub clipboard: Option<String>,
}

impl Outcome {
    fn ignored() -> Self {
        Self::default()
    }

    fn handled(content_changed: bool) -> Self {
        Self {
            handled: true,
            content_changed,
            clipboard: None,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Controller
// ─────────────────────────────────────────────────────────────────────────────

/// Block list plus the active-block state machine.
#[derive(Debug, Clone)]
pub struct BlockController {
    blocks: BlockList,
    active: ActiveState,
    selection: Selection,
    indent: String,
    canvas_click: CanvasClick,
}

impl BlockController {
    /// Split `text` into blocks with nothing active.
    pub fn new(text: &str, settings: &Settings) -> Self {
        Self {
            blocks: BlockList::from_text(text),
            active: ActiveState::NoActive,
            selection: Selection::default(),
            indent: settings.indent(),
            canvas_click: settings.canvas_click,
        }
    }

    /// Apply changed settings (indent width, canvas click behavior).
    pub fn apply_settings(&mut self, settings: &Settings) {
        self.indent = settings.indent();
        self.canvas_click = settings.canvas_click;
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────────

    pub fn blocks(&self) -> &BlockList {
        &self.blocks
    }

    pub fn active(&self) -> ActiveState {
        self.active
    }

    pub fn active_index(&self) -> Option<usize> {
        self.active.index()
    }

    pub fn active_id(&self) -> Option<BlockId> {
        self.active_index()
            .and_then(|i| self.blocks.get(i))
            .map(|b| b.id())
    }

    pub fn is_active(&self, index: usize) -> bool {
        self.active == ActiveState::ActiveAt(index)
    }

    /// The active block's selection, clamped to its current text.
    pub fn selection(&self) -> Selection {
        let text = self.active_text().unwrap_or_default();
        Selection {
            anchor: floor_char_boundary(text, self.selection.anchor),
            head: floor_char_boundary(text, self.selection.head),
        }
    }

    fn active_text(&self) -> Option<&str> {
        self.active_index().and_then(|i| self.blocks.text(i))
    }

    /// The document text: all blocks joined.
    pub fn text(&self) -> String {
        self.blocks.join()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Activation
    // ─────────────────────────────────────────────────────────────────────────

    /// Put block `index` into raw-edit mode with the caret at its end.
    ///
    /// Out-of-range indices are refused and leave the state unchanged.
    pub fn activate(&mut self, index: usize) -> bool {
        let Some(text) = self.blocks.text(index) else {
            warn!(
                "Refusing to activate block {} of {}",
                index,
                self.blocks.len()
            );
            return false;
        };
        self.selection = Selection::caret(text.len());
        self.active = ActiveState::ActiveAt(index);
        true
    }

    /// Activate the block with `id`, wherever it now is.
    pub fn activate_id(&mut self, id: BlockId) -> bool {
        match self.blocks.position(id) {
            Some(index) => self.activate(index),
            None => false,
        }
    }

    pub fn deactivate(&mut self) {
        self.active = ActiveState::NoActive;
        self.selection = Selection::default();
    }

    /// Record the caret/selection reported by the text widget.
    pub fn set_selection(&mut self, anchor: usize, head: usize) {
        let text = self.active_text().unwrap_or_default();
        self.selection = Selection {
            anchor: floor_char_boundary(text, anchor),
            head: floor_char_boundary(text, head),
        };
    }

    /// A click on empty canvas space.
    pub fn canvas_click(&mut self) -> Outcome {
        match self.canvas_click {
            CanvasClick::Deactivate => {
                self.deactivate();
                Outcome::handled(false)
            }
            CanvasClick::FocusLast => {
                let last = self.blocks.last_index();
                let needs_block = self
                    .blocks
                    .text(last)
                    .is_some_and(|t| !t.trim().is_empty());
                if needs_block {
                    self.blocks.insert(last + 1, "");
                }
                self.activate(self.blocks.last_index());
                Outcome::handled(needs_block)
            }
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Editing
    // ─────────────────────────────────────────────────────────────────────────

    /// Replace the active block's text with what the user typed.
    ///
    /// If the new text contains a blank line outside a fence, the block is
    /// split in place: the first piece keeps the block's id and the piece
    /// holding the caret becomes active. Blank lines at the edges of a
    /// single block are dropped; one trailing newline survives so a line
    /// break typed at the end stays in place.
    pub fn edit_active(&mut self, text: &str, caret: usize) -> Outcome {
        let Some(index) = self.active_index() else {
            return Outcome::ignored();
        };
        if self.blocks.text(index) == Some(text) {
            self.set_selection(caret, caret);
            return Outcome::handled(false);
        }

        let mut pieces = split_blocks(text);
        if pieces.len() <= 1 {
            let block = pieces.pop().unwrap_or_default();
            if text == block || text.strip_suffix('\n') == Some(block.as_str()) {
                self.blocks.set_text(index, text);
                self.set_selection(caret, caret);
                return Outcome::handled(true);
            }

            let lead = text.find(block.as_str()).unwrap_or(0);
            let caret = floor_char_boundary(&block, caret.saturating_sub(lead));
            let changed = self.blocks.text(index) != Some(block.as_str());
            self.blocks.set_text(index, block);
            self.set_selection(caret, caret);
            return Outcome::handled(changed);
        }

        let caret = floor_char_boundary(text, caret);
        let target = index + piece_at(text, caret, pieces.len());
        debug!(
            "Block {} split into {} blocks while editing",
            index,
            pieces.len()
        );
        self.blocks.splice(index, pieces);
        self.activate(target);
        Outcome::handled(true)
    }

    /// Handle a key inside the active block.
    pub fn handle_key(&mut self, key: EditorKey) -> Outcome {
        let Some(index) = self.active_index() else {
            return Outcome::ignored();
        };
        let text = self.blocks.text(index).unwrap_or_default().to_string();

        match key {
            EditorKey::Enter { shift: true } => Outcome::ignored(),
            EditorKey::Enter { shift: false } => {
                if is_fenced(&text) {
                    self.insert_at_selection(index, &text, "\n");
                } else {
                    let at = self.blocks.insert(index + 1, "");
                    self.activate(at);
                }
                Outcome::handled(true)
            }
            EditorKey::Backspace => {
                if !text.is_empty() || self.blocks.len() <= 1 {
                    return Outcome::ignored();
                }
                self.blocks.remove(index);
                self.activate(index.saturating_sub(1));
                Outcome::handled(true)
            }
            EditorKey::Tab => {
                let indent = self.indent.clone();
                self.insert_at_selection(index, &text, &indent);
                Outcome::handled(true)
            }
        }
    }

    fn insert_at_selection(&mut self, index: usize, text: &str, insert: &str) {
        let (start, end) = self.selection().range();
        let (new_text, caret) = splice(text, start, end, insert);
        self.blocks.set_text(index, new_text);
        self.selection = Selection::caret(caret);
    }

    /// Apply a context-menu or toolbar action.
    ///
    /// `target` defaults to the active block. With no target, actions that
    /// have a template append a new block holding it.
    pub fn apply_action(&mut self, action: BlockAction, target: Option<usize>) -> Outcome {
        let target = target.or(self.active_index());
        let Some(index) = target.filter(|&i| i < self.blocks.len()) else {
            if target.is_some() {
                warn!("Ignoring {:?} on missing block {:?}", action, target);
                return Outcome::ignored();
            }
            return self.append_template(action);
        };
        let text = self.blocks.text(index).unwrap_or_default().to_string();

        match action {
            BlockAction::Copy => Outcome {
                handled: true,
                content_changed: false,
                clipboard: Some(strip_leading_marker(&text).to_string()),
            },
            BlockAction::InsertAbove => {
                let at = self.blocks.insert(index, "");
                self.activate(at);
                Outcome::handled(true)
            }
            BlockAction::InsertBelow => {
                let at = self.blocks.insert(index + 1, "");
                self.activate(at);
                Outcome::handled(true)
            }
            BlockAction::Delete => {
                if self.blocks.len() == 1 {
                    self.blocks.set_text(0, "");
                    self.activate(0);
                } else {
                    self.blocks.remove(index);
                    self.activate(index.saturating_sub(1));
                }
                Outcome::handled(true)
            }
            text_action => {
                let Some(new_text) = apply_text_action(text_action, &text) else {
                    return Outcome::ignored();
                };
                let changed = new_text != text;
                self.blocks.set_text(index, new_text);
                self.activate(index);
                Outcome::handled(changed)
            }
        }
    }

    fn append_template(&mut self, action: BlockAction) -> Outcome {
        let Some(template) = action.template() else {
            return Outcome::ignored();
        };
        let last = self.blocks.last_index();
        let reuse_last = self.blocks.text(last).is_some_and(|t| t.trim().is_empty());
        let at = if reuse_last {
            self.blocks.set_text(last, template);
            last
        } else {
            self.blocks.insert(last + 1, template)
        };
        self.activate(at);
        Outcome::handled(true)
    }

    /// Fill block `index` with `text`, then insert an empty block after it
    /// and make that active. Used after an image is placed.
    pub fn fill_and_continue(&mut self, index: usize, text: impl Into<String>) -> Option<usize> {
        if !self.blocks.set_text(index, text) {
            return None;
        }
        let at = self.blocks.insert(index + 1, "");
        self.activate(at);
        Some(at)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // External Content
    // ─────────────────────────────────────────────────────────────────────────

    /// Re-split after the whole text changed outside the controller
    /// (undo, redo, polishing). Ids are carried over and the active index
    /// is clamped into range.
    pub fn replace_text(&mut self, text: &str) {
        let active_id = self.active_id();
        self.blocks.resync(text);
        match (self.active, active_id.and_then(|id| self.blocks.position(id))) {
            (ActiveState::NoActive, _) => {}
            (_, Some(index)) => {
                self.active = ActiveState::ActiveAt(index);
                self.set_selection(self.selection.anchor, self.selection.head);
            }
            (ActiveState::ActiveAt(index), None) => {
                self.activate(index.min(self.blocks.last_index()));
            }
        }
    }

    /// Load a different document; nothing is active afterwards.
    pub fn reset(&mut self, text: &str) {
        self.blocks = BlockList::from_text(text);
        self.deactivate();
    }
}

/// Index of the piece of `text` (split into `count` blocks) that holds `caret`.
fn piece_at(text: &str, caret: usize, count: usize) -> usize {
    // A probe character after the caret lands in the caret's piece
    let probe = format!("{}x", &text[..caret]);
    let index = split_blocks(&probe).len() - 1;
    index.min(count.saturating_sub(1))
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = "# Title\n\nBody text\n\n```\ncode\n```";

    fn controller(text: &str) -> BlockController {
        BlockController::new(text, &Settings::default())
    }

    fn texts(c: &BlockController) -> Vec<String> {
        c.blocks().texts().into_iter().map(str::to_string).collect()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Activation
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_starts_inactive() {
        let c = controller(DOC);
        assert_eq!(c.active(), ActiveState::NoActive);
        assert_eq!(c.blocks().len(), 3);
    }

    #[test]
    fn test_activation_is_exclusive() {
        let mut c = controller(DOC);
        for i in [0, 2, 1, 1, 0] {
            assert!(c.activate(i));
            let active: Vec<usize> = (0..c.blocks().len()).filter(|&j| c.is_active(j)).collect();
            assert_eq!(active, vec![i]);
        }
        c.deactivate();
        assert!((0..3).all(|j| !c.is_active(j)));
    }

    #[test]
    fn test_activate_out_of_range_refused() {
        let mut c = controller(DOC);
        c.activate(1);
        assert!(!c.activate(3));
        assert_eq!(c.active(), ActiveState::ActiveAt(1));
    }

    #[test]
    fn test_activate_places_caret_at_end() {
        let mut c = controller(DOC);
        c.activate(1);
        assert_eq!(c.selection(), Selection::caret("Body text".len()));
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Keys
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_enter_splits_and_backspace_merges() {
        let mut c = controller(DOC);
        c.activate(1);

        let out = c.handle_key(EditorKey::Enter { shift: false });
        assert!(out.handled && out.content_changed);
        assert_eq!(texts(&c), vec!["# Title", "Body text", "", "```\ncode\n```"]);
        assert_eq!(c.active(), ActiveState::ActiveAt(2));

        let out = c.handle_key(EditorKey::Backspace);
        assert!(out.handled);
        assert_eq!(texts(&c), vec!["# Title", "Body text", "```\ncode\n```"]);
        assert_eq!(c.active(), ActiveState::ActiveAt(1));
    }

    #[test]
    fn test_enter_inside_fence_inserts_newline() {
        let mut c = controller(DOC);
        c.activate(2);
        c.set_selection(8, 8); // after "```\ncode"

        let out = c.handle_key(EditorKey::Enter { shift: false });
        assert!(out.handled);
        assert_eq!(c.blocks().len(), 3);
        assert_eq!(c.blocks().text(2), Some("```\ncode\n\n```"));
        assert_eq!(c.selection(), Selection::caret(9));
    }

    #[test]
    fn test_shift_enter_is_left_to_widget() {
        let mut c = controller(DOC);
        c.activate(1);
        let out = c.handle_key(EditorKey::Enter { shift: true });
        assert!(!out.handled);
        assert_eq!(c.blocks().len(), 3);
    }

    #[test]
    fn test_backspace_on_non_empty_block_ignored() {
        let mut c = controller(DOC);
        c.activate(1);
        assert!(!c.handle_key(EditorKey::Backspace).handled);
        assert_eq!(c.blocks().len(), 3);
    }

    #[test]
    fn test_backspace_on_only_block_ignored() {
        let mut c = controller("");
        c.activate(0);
        assert!(!c.handle_key(EditorKey::Backspace).handled);
        assert_eq!(c.blocks().len(), 1);
    }

    #[test]
    fn test_backspace_on_first_block_activates_zero() {
        let mut c = controller("next");
        c.activate(0);
        c.apply_action(BlockAction::InsertAbove, None);
        assert_eq!(c.active(), ActiveState::ActiveAt(0));
        c.handle_key(EditorKey::Backspace);
        assert_eq!(c.active(), ActiveState::ActiveAt(0));
        assert_eq!(texts(&c), vec!["next"]);
    }

    #[test]
    fn test_tab_inserts_indent_at_caret() {
        let mut c = controller("ab");
        c.activate(0);
        c.set_selection(1, 1);
        c.handle_key(EditorKey::Tab);
        assert_eq!(c.blocks().text(0), Some("a    b"));
        assert_eq!(c.selection(), Selection::caret(5));
        assert_eq!(c.blocks().len(), 1);
    }

    #[test]
    fn test_tab_replaces_selection() {
        let mut c = controller("hello world");
        c.activate(0);
        c.set_selection(11, 5);
        c.handle_key(EditorKey::Tab);
        assert_eq!(c.blocks().text(0), Some("hello    "));
    }

    #[test]
    fn test_keys_without_active_block_ignored() {
        let mut c = controller(DOC);
        assert!(!c.handle_key(EditorKey::Tab).handled);
        assert!(!c.handle_key(EditorKey::Enter { shift: false }).handled);
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Editing
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_edit_active_keeps_identity() {
        let mut c = controller(DOC);
        let ids = c.blocks().ids();
        c.activate(1);

        let out = c.edit_active("Body text!", 10);
        assert!(out.content_changed);
        assert_eq!(c.blocks().ids(), ids);
        assert_eq!(c.text(), "# Title\n\nBody text!\n\n```\ncode\n```");
    }

    #[test]
    fn test_edit_with_blank_line_splits_block() {
        let mut c = controller(DOC);
        let ids = c.blocks().ids();
        c.activate(1);

        let out = c.edit_active("Body\n\ntext", 6);
        assert!(out.content_changed);
        assert_eq!(texts(&c), vec!["# Title", "Body", "text", "```\ncode\n```"]);
        assert_eq!(c.blocks().ids()[1], ids[1]);
        assert_eq!(c.active(), ActiveState::ActiveAt(2));
    }

    #[test]
    fn test_edit_keeps_trailing_newline_while_typing() {
        let mut c = controller("line");
        c.activate(0);
        c.edit_active("line\n", 5);
        assert_eq!(c.blocks().text(0), Some("line\n"));
    }

    #[test]
    fn test_edit_drops_blank_lines_at_block_edges() {
        let mut c = controller(DOC);
        let ids = c.blocks().ids();
        c.activate(1);

        let out = c.edit_active("\n\nBody\n\n", 4);
        assert!(out.content_changed);
        assert_eq!(texts(&c), vec!["# Title", "Body", "```\ncode\n```"]);
        assert_eq!(c.blocks().ids(), ids);
        assert_eq!(c.selection(), Selection::caret(2));
        assert_eq!(split_blocks(&c.text()), texts(&c));

        // Fenced content keeps its inner blank lines
        c.activate(2);
        c.edit_active("```\ncode\n\nmore\n```", 0);
        assert_eq!(c.blocks().text(2), Some("```\ncode\n\nmore\n```"));
    }

    #[test]
    fn test_piece_at() {
        assert_eq!(piece_at("a\n\nb", 0, 2), 0);
        assert_eq!(piece_at("a\n\nb", 1, 2), 0);
        assert_eq!(piece_at("a\n\nb", 3, 2), 1);
        assert_eq!(piece_at("a\n\nb", 4, 2), 1);
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Canvas
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_canvas_click_appends_block_after_text() {
        let mut c = controller(DOC);
        let out = c.canvas_click();
        assert!(out.content_changed);
        assert_eq!(c.blocks().len(), 4);
        assert_eq!(c.active(), ActiveState::ActiveAt(3));

        // Last block is now empty: focus it without appending again
        let out = c.canvas_click();
        assert!(!out.content_changed);
        assert_eq!(c.blocks().len(), 4);
    }

    #[test]
    fn test_canvas_click_deactivate_mode() {
        let settings = Settings {
            canvas_click: CanvasClick::Deactivate,
            ..Settings::default()
        };
        let mut c = BlockController::new(DOC, &settings);
        c.activate(0);
        c.canvas_click();
        assert_eq!(c.active(), ActiveState::NoActive);
        assert_eq!(c.blocks().len(), 3);
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Actions
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_heading_action_on_active_block() {
        let mut c = controller(DOC);
        c.activate(1);
        let out = c.apply_action(BlockAction::Heading(2), None);
        assert!(out.content_changed);
        assert_eq!(c.blocks().text(1), Some("## Body text"));
        assert_eq!(c.active(), ActiveState::ActiveAt(1));
    }

    #[test]
    fn test_action_on_explicit_target_activates_it() {
        let mut c = controller(DOC);
        c.apply_action(BlockAction::Quote, Some(0));
        assert_eq!(c.blocks().text(0), Some("> Title"));
        assert_eq!(c.active(), ActiveState::ActiveAt(0));
    }

    #[test]
    fn test_copy_returns_stripped_text() {
        let mut c = controller(DOC);
        let out = c.apply_action(BlockAction::Copy, Some(0));
        assert_eq!(out.clipboard.as_deref(), Some("Title"));
        assert!(!out.content_changed);
    }

    #[test]
    fn test_insert_above_and_below() {
        let mut c = controller(DOC);
        c.apply_action(BlockAction::InsertBelow, Some(0));
        assert_eq!(c.active(), ActiveState::ActiveAt(1));
        assert_eq!(c.blocks().text(1), Some(""));

        c.apply_action(BlockAction::InsertAbove, Some(0));
        assert_eq!(c.active(), ActiveState::ActiveAt(0));
        assert_eq!(c.blocks().len(), 5);
    }

    #[test]
    fn test_delete_action() {
        let mut c = controller(DOC);
        c.apply_action(BlockAction::Delete, Some(1));
        assert_eq!(texts(&c), vec!["# Title", "```\ncode\n```"]);
        assert_eq!(c.active(), ActiveState::ActiveAt(0));
    }

    #[test]
    fn test_delete_only_block_clears_it() {
        let mut c = controller("lonely");
        c.apply_action(BlockAction::Delete, Some(0));
        assert_eq!(texts(&c), vec![""]);
        assert_eq!(c.active(), ActiveState::ActiveAt(0));
    }

    #[test]
    fn test_toolbar_without_active_block_appends_template() {
        let mut c = controller(DOC);
        c.apply_action(BlockAction::Code, None);
        assert_eq!(c.blocks().len(), 4);
        assert_eq!(c.blocks().text(3), Some("```\n\n```"));
        assert_eq!(c.active(), ActiveState::ActiveAt(3));
    }

    #[test]
    fn test_toolbar_template_reuses_empty_last_block() {
        let mut c = controller("");
        c.apply_action(BlockAction::Heading(1), None);
        assert_eq!(texts(&c), vec!["# "]);
    }

    #[test]
    fn test_action_on_missing_block_ignored() {
        let mut c = controller(DOC);
        assert!(!c.apply_action(BlockAction::Bold, Some(10)).handled);
    }

    #[test]
    fn test_fill_and_continue() {
        let mut c = controller("");
        c.activate(0);
        let at = c.fill_and_continue(0, "![img](assets/a.png)");
        assert_eq!(at, Some(1));
        assert_eq!(texts(&c), vec!["![img](assets/a.png)", ""]);
        assert_eq!(c.active(), ActiveState::ActiveAt(1));
    }

    // ─────────────────────────────────────────────────────────────────────────
    // External content
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_replace_text_follows_active_block() {
        let mut c = controller("a\n\nb\n\nc");
        c.activate(2);
        c.replace_text("new\n\na\n\nb\n\nc");
        assert_eq!(c.active(), ActiveState::ActiveAt(3));
    }

    #[test]
    fn test_replace_text_clamps_active_index() {
        let mut c = controller("a\n\nb\n\nc");
        c.activate(2);
        c.replace_text("x");
        assert_eq!(c.active(), ActiveState::ActiveAt(0));
    }

    #[test]
    fn test_reset_clears_active() {
        let mut c = controller(DOC);
        c.activate(1);
        c.reset("other");
        assert_eq!(c.active(), ActiveState::NoActive);
        assert_eq!(texts(&c), vec!["other"]);
    }
}
