//! Editing session for NovaScribe
//!
//! `EditorSession` owns everything one open editor needs and wires the data
//! flow between them: controller edits are joined into the document text,
//! stored, recorded in the undo history and, when the document is bound to
//! a workspace file, queued for writing back.
//!
//! Collaborators (clipboard, text polishing, HTML conversion, PDF rendering)
//! are passed into the operations that use them. Failures that the user
//! should see are queued as [`Notice`]s for the UI to drain.

use std::collections::HashMap;
use std::time::Instant;

use log::{debug, info, warn};

use crate::config::Settings;
use crate::editor::{
    extract_outline, BlockController, BlockId, DocumentOutline, EditorKey, History, Outcome,
    TextStats,
};
use crate::error::{Error, Result};
use crate::export::{
    export_pdf, generate_html_document, generate_html_fragment, PdfExport, PdfRenderer,
};
use crate::files::{DocumentStorage, FlushReport, WriteQueue};
use crate::markdown::{render_block, BlockAction, BlockStyle, MarkdownOptions, RenderContext};
use crate::services::{
    paste_text, place_image, ClipboardPayload, ClipboardSink, HtmlToMarkdown, PolishGuard,
    PolishTicket, TextTransformer,
};
use crate::state::DocumentStore;
use crate::string_utils::splice;
use crate::workspaces::{Workspace, WorkspaceFs};

// ─────────────────────────────────────────────────────────────────────────────
// Notices
// ─────────────────────────────────────────────────────────────────────────────

/// Severity of a user-visible notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Info,
    Warning,
    Error,
}

/// A transient message for the status area.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

impl Notice {
    pub fn new(kind: NoticeKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Shortcuts
// ─────────────────────────────────────────────────────────────────────────────

/// Keyboard shortcut actions handled by the session rather than the
/// active block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShortcutAction {
    /// Ctrl+Z
    Undo,
    /// Ctrl+Shift+Z / Ctrl+Y
    Redo,
    /// Ctrl+S: write the bound workspace file
    Save,
    /// Ctrl+N
    NewDocument,
}

// ─────────────────────────────────────────────────────────────────────────────
// Block Views
// ─────────────────────────────────────────────────────────────────────────────

/// What the UI shows for one block row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockView {
    pub id: BlockId,
    pub index: usize,
    pub active: bool,
    /// Raw Markdown of the block
    pub text: String,
    pub style: BlockStyle,
    /// Rendered row, `None` for the active block (shown as raw text)
    pub html: Option<String>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Session
// ─────────────────────────────────────────────────────────────────────────────

/// One editor window: documents, the active document's blocks and history,
/// the attached workspace and pending file writes.
pub struct EditorSession {
    settings: Settings,
    store: DocumentStore,
    controller: BlockController,
    history: History,
    workspace: Option<Workspace>,
    /// Workspace file each imported document writes back to, by document id
    bound_files: HashMap<String, String>,
    write_queue: WriteQueue,
    polish: PolishGuard,
    render_options: MarkdownOptions,
    notices: Vec<Notice>,
}

impl std::fmt::Debug for EditorSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditorSession")
            .field("store", &self.store)
            .field("active", &self.controller.active())
            .field("workspace", &self.workspace)
            .field("pending_writes", &self.write_queue.pending_len())
            .finish()
    }
}

impl EditorSession {
    /// Start a session over the document list stored in `storage`.
    pub fn new(settings: Settings, storage: Box<dyn DocumentStorage>) -> Self {
        let store = DocumentStore::load(storage, settings.storage_key.clone());
        let content = store.active().content.clone();
        info!(
            "Session started with {} documents, active '{}'",
            store.len(),
            store.active_id()
        );
        Self {
            controller: BlockController::new(&content, &settings),
            history: History::from_settings(content, &settings),
            settings,
            store,
            workspace: None,
            bound_files: HashMap::new(),
            write_queue: WriteQueue::new(),
            polish: PolishGuard::new(),
            render_options: MarkdownOptions::default(),
            notices: Vec::new(),
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────────

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn store(&self) -> &DocumentStore {
        &self.store
    }

    pub fn controller(&self) -> &BlockController {
        &self.controller
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn workspace(&self) -> Option<&Workspace> {
        self.workspace.as_ref()
    }

    /// Text of the active document.
    pub fn text(&self) -> &str {
        &self.store.active().content
    }

    /// Workspace path the active document writes back to.
    pub fn active_file(&self) -> Option<&str> {
        self.bound_files
            .get(self.store.active_id())
            .map(String::as_str)
    }

    pub fn pending_writes(&self) -> usize {
        self.write_queue.pending_len()
    }

    /// Apply changed settings to the running session.
    pub fn apply_settings(&mut self, settings: Settings) {
        self.controller.apply_settings(&settings);
        self.settings = settings;
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Notices
    // ─────────────────────────────────────────────────────────────────────────

    fn notify(&mut self, kind: NoticeKind, message: impl Into<String>) {
        let notice = Notice::new(kind, message);
        debug!("Notice ({:?}): {}", notice.kind, notice.message);
        self.notices.push(notice);
    }

    /// Surface an unexpected error. User cancellation stays silent.
    fn report_error(&mut self, context: &str, error: &Error) {
        if error.is_cancellation() {
            debug!("{}: cancelled", context);
            return;
        }
        warn!("{}: {}", context, error);
        self.notify(NoticeKind::Error, format!("{}: {}", context, error));
    }

    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    /// Remove and return every queued notice.
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Data Flow
    // ─────────────────────────────────────────────────────────────────────────

    /// Store new content for the active document and queue its file write.
    fn store_active_content(&mut self, text: &str) -> bool {
        let id = self.store.active_id().to_string();
        if !self.store.update_content(&id, text) {
            return false;
        }
        if let Some(path) = self.bound_files.get(&id) {
            self.write_queue.enqueue(path.clone(), text);
        }
        true
    }

    /// Push a controller result through the store and history.
    fn commit(&mut self, outcome: Outcome, immediate: bool, now: Instant) -> Outcome {
        if outcome.content_changed {
            let text = self.controller.text();
            self.store_active_content(&text);
            self.history.record(&text, immediate, now);
        }
        outcome
    }

    /// Load the active document into the controller and history.
    fn load_active(&mut self) {
        let content = self.store.active().content.clone();
        self.controller.reset(&content);
        self.history.reset(content);
        debug!("Loaded document '{}' into the editor", self.store.active_id());
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Block Editing
    // ─────────────────────────────────────────────────────────────────────────

    pub fn activate(&mut self, index: usize) -> bool {
        self.controller.activate(index)
    }

    pub fn deactivate(&mut self) {
        self.controller.deactivate();
    }

    pub fn set_selection(&mut self, anchor: usize, head: usize) {
        self.controller.set_selection(anchor, head);
    }

    /// A click on empty canvas space.
    pub fn canvas_click(&mut self, now: Instant) -> Outcome {
        let outcome = self.controller.canvas_click();
        self.commit(outcome, false, now)
    }

    /// The active block's text area changed.
    pub fn edit_active(&mut self, text: &str, caret: usize, now: Instant) -> Outcome {
        let outcome = self.controller.edit_active(text, caret);
        self.commit(outcome, false, now)
    }

    pub fn handle_key(&mut self, key: EditorKey, now: Instant) -> Outcome {
        let outcome = self.controller.handle_key(key);
        self.commit(outcome, false, now)
    }

    /// Apply a context-menu action to block `target` (or the active block).
    ///
    /// `copy` puts the block's text on `clipboard`; a clipboard failure is
    /// reported as a notice.
    pub fn apply_action(
        &mut self,
        action: BlockAction,
        target: Option<usize>,
        clipboard: &mut dyn ClipboardSink,
        now: Instant,
    ) -> Outcome {
        let outcome = self.controller.apply_action(action, target);
        if let Some(text) = &outcome.clipboard {
            match clipboard.set_text(text) {
                Ok(()) => self.notify(NoticeKind::Info, "Copied to clipboard"),
                Err(e) => {
                    warn!("Failed to copy block: {}", e);
                    self.notify(NoticeKind::Warning, format!("Copy failed: {}", e));
                }
            }
        }
        self.commit(outcome, true, now)
    }

    /// Run a toolbar command by name (`bold`, `italic`, `h1`, `h2`, `list`,
    /// `code`, `math`, `table`).
    pub fn toolbar(&mut self, name: &str, now: Instant) -> Outcome {
        let Some(action) = BlockAction::from_name(name).filter(|a| a.is_toolbar()) else {
            warn!("Unknown toolbar command '{}'", name);
            return Outcome::default();
        };
        let outcome = self.controller.apply_action(action, None);
        self.commit(outcome, true, now)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // History
    // ─────────────────────────────────────────────────────────────────────────

    /// Push a debounced snapshot whose deadline has passed.
    pub fn tick(&mut self, now: Instant) -> bool {
        self.history.tick(now)
    }

    pub fn undo(&mut self) -> bool {
        match self.history.undo() {
            Some(text) => {
                self.controller.replace_text(&text);
                self.store_active_content(&text);
                true
            }
            None => false,
        }
    }

    pub fn redo(&mut self) -> bool {
        match self.history.redo() {
            Some(text) => {
                self.controller.replace_text(&text);
                self.store_active_content(&text);
                true
            }
            None => false,
        }
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Run a keyboard shortcut. Returns `true` if it did something.
    pub fn shortcut(&mut self, action: ShortcutAction, now: Instant) -> bool {
        match action {
            ShortcutAction::Undo => self.undo(),
            ShortcutAction::Redo => self.redo(),
            ShortcutAction::Save => self.save(now).unwrap_or(false),
            ShortcutAction::NewDocument => {
                self.new_document();
                true
            }
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Documents
    // ─────────────────────────────────────────────────────────────────────────

    /// Create an empty document and switch to it.
    pub fn new_document(&mut self) -> String {
        let id = self.store.create();
        self.load_active();
        id
    }

    /// Switch to document `id`.
    pub fn select_document(&mut self, id: &str) -> bool {
        if id == self.store.active_id() {
            return true;
        }
        if !self.store.select(id) {
            return false;
        }
        self.load_active();
        true
    }

    /// Delete document `id`. The last document is never deleted.
    pub fn delete_document(&mut self, id: &str) -> bool {
        let was_active = id == self.store.active_id();
        if !self.store.delete(id) {
            return false;
        }
        self.bound_files.remove(id);
        if was_active {
            self.load_active();
        }
        true
    }

    pub fn rename_document(&mut self, id: &str, title: &str) -> bool {
        let title = title.trim();
        if title.is_empty() {
            return false;
        }
        self.store.rename(id, title)
    }

    /// Add a document from text read outside any workspace (not bound).
    pub fn import_document(&mut self, name: &str, content: &str) -> String {
        let id = self.store.import_file(name, content);
        self.bound_files.remove(&id);
        self.load_active();
        id
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Workspace
    // ─────────────────────────────────────────────────────────────────────────

    /// Attach a workspace folder, replacing any previous one.
    pub fn attach_workspace(&mut self, fs: Box<dyn WorkspaceFs>) {
        self.detach_workspace();
        let workspace = Workspace::new(fs, &self.settings);
        info!(
            "Attached workspace '{}' ({} files)",
            workspace.name(),
            workspace.file_tree.file_count()
        );
        self.notify(
            NoticeKind::Info,
            format!("Opened workspace: {}", workspace.name()),
        );
        self.workspace = Some(workspace);
    }

    /// Flush pending writes and detach the workspace.
    pub fn detach_workspace(&mut self) {
        if self.workspace.is_none() {
            return;
        }
        self.flush_writes();
        self.write_queue.clear();
        self.bound_files.clear();
        if let Some(workspace) = self.workspace.take() {
            info!("Detached workspace '{}'", workspace.name());
        }
    }

    /// Open a workspace file as a document bound to it.
    ///
    /// Returns `Ok(false)` when the file may not be opened (non-Markdown in
    /// Markdown-only mode) or no workspace is attached.
    pub fn open_file(&mut self, path: &str) -> Result<bool> {
        let Some(workspace) = self.workspace.as_ref() else {
            warn!("Cannot open {} without a workspace", path);
            return Ok(false);
        };
        let opened = match workspace.open_file(path) {
            Ok(opened) => opened,
            Err(e) => {
                self.report_error(&format!("Failed to open {}", path), &e);
                return Err(e);
            }
        };
        let Some((name, content)) = opened else {
            debug!("{} is not openable", path);
            return Ok(false);
        };

        let id = self.store.import_file(&name, content);
        self.bound_files.insert(id, path.to_string());
        self.load_active();
        info!("Opened {}", path);
        Ok(true)
    }

    /// Write the active document to its bound workspace file now.
    ///
    /// Returns `Ok(false)` when the document isn't bound to a file.
    pub fn save(&mut self, now: Instant) -> Result<bool> {
        let Some(path) = self.active_file().map(str::to_string) else {
            debug!("Nothing to save: active document has no file");
            return Ok(false);
        };
        let Some(workspace) = self.workspace.as_mut() else {
            return Ok(false);
        };

        let content = self.store.active().content.clone();
        if let Err(e) = workspace.fs_mut().write(&path, content.as_bytes()) {
            self.report_error("Failed to save file", &e);
            return Err(e);
        }
        self.write_queue.take(&path);
        self.history.record(&content, true, now);
        debug!("File saved successfully");
        self.notify(NoticeKind::Info, format!("Saved: {}", path));
        Ok(true)
    }

    /// Run every queued file write. Failures become notices.
    pub fn flush_writes(&mut self) -> FlushReport {
        let Some(workspace) = self.workspace.as_mut() else {
            return FlushReport::default();
        };
        let report = self.write_queue.flush(workspace.fs_mut());
        for (path, e) in &report.failed {
            self.report_error(&format!("Failed to write {}", path), e);
        }
        report
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Paste
    // ─────────────────────────────────────────────────────────────────────────

    /// Paste clipboard content into the active block at the selection.
    pub fn paste(
        &mut self,
        payload: &ClipboardPayload,
        converter: Option<&dyn HtmlToMarkdown>,
        now: Instant,
    ) -> Outcome {
        let Some(index) = self.controller.active_index() else {
            debug!("Paste ignored: no active block");
            return Outcome::default();
        };
        let insert = paste_text(payload, converter);
        let current = self.controller.blocks().text(index).unwrap_or_default();
        let (start, end) = self.controller.selection().range();
        let (text, caret) = splice(current, start, end, &insert);
        self.edit_active(&text, caret, now)
    }

    /// Paste an image into the active block (or a new block at the end).
    ///
    /// The image is stored or inlined before the block list is touched, so
    /// a failure leaves the document as it was.
    pub fn paste_image(
        &mut self,
        bytes: &[u8],
        file_name: Option<&str>,
        now_millis: u128,
        now: Instant,
    ) -> Result<Outcome> {
        let fs = self.workspace.as_mut().map(|w| w.fs_mut());
        let pasted = match place_image(fs, &self.settings, bytes, file_name, now_millis) {
            Ok(pasted) => pasted,
            Err(e) => {
                self.report_error("Failed to paste image", &e);
                return Err(e);
            }
        };
        if pasted.oversized {
            self.notify(
                NoticeKind::Warning,
                "Image is large and may slow down the editor. Open a workspace to store images as files.",
            );
        }
        if let Some(workspace) = self.workspace.as_mut() {
            workspace.refresh_file_tree();
        }

        let index = match self.controller.active_index() {
            Some(index) => index,
            None => {
                let last = self.controller.blocks().last_index();
                let last_empty = self
                    .controller
                    .blocks()
                    .text(last)
                    .is_some_and(|t| t.trim().is_empty());
                if last_empty {
                    last
                } else {
                    self.controller.apply_action(BlockAction::InsertBelow, Some(last));
                    last + 1
                }
            }
        };

        let changed = self
            .controller
            .fill_and_continue(index, pasted.image.to_markdown())
            .is_some();
        let outcome = Outcome {
            handled: true,
            content_changed: changed,
            clipboard: None,
        };
        Ok(self.commit(outcome, true, now))
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Polish
    // ─────────────────────────────────────────────────────────────────────────

    /// Start polishing the active document.
    ///
    /// Returns `None` when the document is blank or a request for it is
    /// already in flight.
    pub fn begin_polish(&mut self) -> Option<PolishTicket> {
        // The last typed edit stays undoable on its own
        self.history.flush();
        let doc = self.store.active();
        let instruction = Some(self.settings.polish_instruction.as_str())
            .filter(|s| !s.trim().is_empty());
        self.polish.begin(&doc.id, &doc.content, instruction)
    }

    pub fn is_polishing(&self) -> bool {
        self.polish.is_in_flight(self.store.active_id())
    }

    /// Apply the service's answer to a polish request.
    ///
    /// Returns `true` if the document changed. A failed request leaves the
    /// content as it was and raises a notice.
    pub fn complete_polish(
        &mut self,
        ticket: &PolishTicket,
        response: Result<String>,
        now: Instant,
    ) -> bool {
        let text = match self.polish.complete(ticket, response) {
            Ok(Some(text)) => text,
            Ok(None) => return false,
            Err(e) => {
                warn!("Polish failed for {}: {}", ticket.doc_id, e);
                self.notify(NoticeKind::Warning, format!("AI polish failed: {}", e));
                return false;
            }
        };

        if ticket.doc_id != self.store.active_id() {
            // The user switched away; the answer still belongs to its document
            let changed = self.store.update_content(&ticket.doc_id, &text);
            if let (true, Some(path)) = (changed, self.bound_files.get(&ticket.doc_id)) {
                self.write_queue.enqueue(path.clone(), text);
            }
            return changed;
        }

        self.controller.replace_text(&text);
        self.store_active_content(&text);
        self.history.record(&text, true, now);
        info!("Polished document {}", ticket.doc_id);
        true
    }

    /// Polish the active document through `transformer` in one step.
    pub fn polish_with(&mut self, transformer: &mut dyn TextTransformer, now: Instant) -> bool {
        let Some(ticket) = self.begin_polish() else {
            return false;
        };
        let response = transformer.transform(&ticket.request);
        self.complete_polish(&ticket, response, now)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Views
    // ─────────────────────────────────────────────────────────────────────────

    /// Every block row: raw text for the active one, rendered HTML for the
    /// rest.
    pub fn block_views(&self) -> Vec<BlockView> {
        let ctx = RenderContext {
            workspace: self.workspace.as_ref().map(|w| w.fs()),
            assets_dir: &self.settings.assets_dir,
            options: &self.render_options,
        };
        self.controller
            .blocks()
            .iter()
            .enumerate()
            .map(|(index, block)| {
                let active = self.controller.is_active(index);
                let rendered = render_block(block.text(), &ctx);
                BlockView {
                    id: block.id(),
                    index,
                    active,
                    text: block.text().to_string(),
                    style: rendered.style,
                    html: (!active).then(|| rendered.to_html()),
                }
            })
            .collect()
    }

    pub fn stats(&self) -> TextStats {
        TextStats::with_settings(self.text(), &self.settings)
    }

    pub fn outline(&self) -> DocumentOutline {
        extract_outline(self.text())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Export
    // ─────────────────────────────────────────────────────────────────────────

    /// The active document as a standalone HTML page.
    pub fn export_html(&self) -> String {
        let doc = self.store.active();
        generate_html_document(&doc.content, Some(&doc.title))
    }

    /// Copy the active document to the clipboard as rich HTML.
    pub fn copy_as_html(&mut self, clipboard: &mut dyn ClipboardSink) -> bool {
        let html = generate_html_fragment(self.text());
        let plain = self.text().to_string();
        match clipboard.set_html(&html, &plain) {
            Ok(()) => {
                self.notify(NoticeKind::Info, "Copied as HTML");
                true
            }
            Err(e) => {
                warn!("Failed to copy HTML: {}", e);
                self.notify(NoticeKind::Warning, format!("Copy failed: {}", e));
                false
            }
        }
    }

    /// Export the active document through a PDF renderer.
    ///
    /// With a workspace attached the file is also written to its root. The
    /// export is returned either way so the caller can offer a download.
    pub fn export_pdf(&mut self, renderer: &mut dyn PdfRenderer) -> Option<PdfExport> {
        let export = match export_pdf(self.store.active(), renderer) {
            Ok(Some(export)) => export,
            Ok(None) => {
                self.notify(NoticeKind::Warning, "PDF export produced no output");
                return None;
            }
            Err(e) => {
                self.report_error("PDF export failed", &e);
                return None;
            }
        };

        if let Some(workspace) = self.workspace.as_mut() {
            match workspace.fs_mut().write(&export.file_name, &export.bytes) {
                Ok(()) => {
                    workspace.refresh_file_tree();
                    self.notify(NoticeKind::Info, format!("Saved {}", export.file_name));
                }
                Err(e) => self.report_error("Failed to save PDF", &e),
            }
        }
        Some(export)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
