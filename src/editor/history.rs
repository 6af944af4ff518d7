//! Undo/redo history over whole-document snapshots
//!
//! Edits are recorded with a trailing-edge debounce: each `record` call
//! replaces the pending snapshot and restarts its deadline, and the
//! snapshot joins the stack only once the deadline passes without another
//! edit. The caller drives time by passing `Instant`s, so the history owns
//! its one pending "timer" and cancelling it is just dropping the slot.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use log::trace;

use crate::config::Settings;

/// Default number of snapshots kept.
pub const DEFAULT_CAPACITY: usize = 50;

/// Default quiet period before an edit becomes a snapshot.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);

/// A snapshot waiting for its debounce deadline.
#[derive(Debug, Clone)]
struct PendingSnapshot {
    text: String,
    due: Instant,
}

/// Bounded linear undo/redo stack.
///
/// Invariants: there is always at least one entry, `pointer` indexes an
/// entry, and no two adjacent entries are equal.
#[derive(Debug, Clone)]
pub struct History {
    entries: VecDeque<String>,
    pointer: usize,
    capacity: usize,
    debounce: Duration,
    pending: Option<PendingSnapshot>,
}

impl History {
    /// Create a history whose first entry is the document's initial text.
    pub fn new(initial: impl Into<String>, capacity: usize, debounce: Duration) -> Self {
        let mut entries = VecDeque::with_capacity(capacity.max(1));
        entries.push_back(initial.into());
        Self {
            entries,
            pointer: 0,
            capacity: capacity.max(1),
            debounce,
            pending: None,
        }
    }

    pub fn from_settings(initial: impl Into<String>, settings: &Settings) -> Self {
        Self::new(
            initial,
            settings.history_capacity,
            Duration::from_millis(settings.history_debounce_ms),
        )
    }

    /// Drop everything and start over from `initial` (document switch).
    pub fn reset(&mut self, initial: impl Into<String>) {
        self.entries.clear();
        self.entries.push_back(initial.into());
        self.pointer = 0;
        self.pending = None;
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Recording
    // ─────────────────────────────────────────────────────────────────────────

    /// Record the document text after an edit.
    ///
    /// Text equal to the current snapshot is a no-op and cancels any pending
    /// snapshot. With `immediate`, the text is pushed now as a single
    /// undoable step; otherwise it waits for the debounce deadline.
    pub fn record(&mut self, text: &str, immediate: bool, now: Instant) {
        if text == self.current() {
            self.pending = None;
            return;
        }

        if immediate {
            self.pending = None;
            self.push(text.to_string());
        } else {
            self.pending = Some(PendingSnapshot {
                text: text.to_string(),
                due: now + self.debounce,
            });
        }
    }

    /// Push the pending snapshot if its deadline has passed.
    ///
    /// Returns `true` if a snapshot was pushed.
    pub fn tick(&mut self, now: Instant) -> bool {
        match &self.pending {
            Some(pending) if pending.due <= now => self.flush(),
            _ => false,
        }
    }

    /// Push the pending snapshot regardless of its deadline.
    pub fn flush(&mut self) -> bool {
        match self.pending.take() {
            Some(pending) => self.push(pending.text),
            None => false,
        }
    }

    /// Deadline of the pending snapshot, if any.
    pub fn pending_deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|p| p.due)
    }

    fn push(&mut self, text: String) -> bool {
        if text == self.current() {
            return false;
        }

        // Pushing after an undo discards the redo branch
        self.entries.truncate(self.pointer + 1);
        self.entries.push_back(text);
        while self.entries.len() > self.capacity {
            self.entries.pop_front();
        }
        self.pointer = self.entries.len() - 1;
        trace!("History push: {} entries", self.entries.len());
        true
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Navigation
    // ─────────────────────────────────────────────────────────────────────────

    /// Step back one snapshot and return it, or `None` at the oldest entry.
    ///
    /// A pending snapshot is committed first so it can be redone.
    pub fn undo(&mut self) -> Option<String> {
        self.flush();
        if self.pointer == 0 {
            return None;
        }
        self.pointer -= 1;
        Some(self.current().to_string())
    }

    /// Step forward one snapshot and return it, or `None` at the newest entry.
    pub fn redo(&mut self) -> Option<String> {
        self.flush();
        if self.pointer + 1 >= self.entries.len() {
            return None;
        }
        self.pointer += 1;
        Some(self.current().to_string())
    }

    pub fn can_undo(&self) -> bool {
        self.pointer > 0 || self.pending.is_some()
    }

    pub fn can_redo(&self) -> bool {
        self.pending.is_none() && self.pointer + 1 < self.entries.len()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────────

    /// The snapshot at the pointer.
    pub fn current(&self) -> &str {
        self.entries
            .get(self.pointer)
            .map(String::as_str)
            .unwrap_or_default()
    }

    pub fn pointer(&self) -> usize {
        self.pointer
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// All snapshots, oldest first.
    pub fn snapshots(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
