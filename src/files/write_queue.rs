//! Per-file write serialization
//!
//! Content edits produce a write for the bound workspace file on every
//! keystroke. The queue keeps a single slot per path: a newer write
//! replaces the one still waiting, and a write that finishes after a newer
//! one has already landed is reported as stale, so the file on disk always
//! ends with the latest content.

use std::collections::{BTreeMap, HashMap};

use log::{debug, warn};

use crate::error::Error;
use crate::workspaces::fs::WorkspaceFs;

/// A write taken from the queue, tagged with its generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteJob {
    pub path: String,
    pub contents: String,
    pub generation: u64,
}

/// Result of [`WriteQueue::flush`].
#[derive(Debug, Default)]
pub struct FlushReport {
    /// Paths written successfully
    pub written: Vec<String>,
    /// Paths whose write failed
    pub failed: Vec<(String, Error)>,
}

impl FlushReport {
    pub fn is_ok(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Single-slot latest-write queue, keyed by workspace path.
#[derive(Debug, Default)]
pub struct WriteQueue {
    pending: BTreeMap<String, WriteJob>,
    completed: HashMap<String, u64>,
    next_generation: u64,
}

impl WriteQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `contents` for `path`, replacing any write still waiting.
    ///
    /// Returns the generation assigned to this write.
    pub fn enqueue(&mut self, path: impl Into<String>, contents: impl Into<String>) -> u64 {
        self.next_generation += 1;
        let path = path.into();
        let job = WriteJob {
            path: path.clone(),
            contents: contents.into(),
            generation: self.next_generation,
        };
        if let Some(old) = self.pending.insert(path, job) {
            debug!(
                "Write #{} to {} superseded before it started",
                old.generation, old.path
            );
        }
        self.next_generation
    }

    /// Take the waiting write for `path`, if any, to run it.
    pub fn take(&mut self, path: &str) -> Option<WriteJob> {
        self.pending.remove(path)
    }

    /// Take every waiting write, in path order.
    pub fn take_all(&mut self) -> Vec<WriteJob> {
        std::mem::take(&mut self.pending).into_values().collect()
    }

    /// Record that `job` finished writing.
    ///
    /// Returns `false` if a newer write for the same path has already
    /// completed, meaning this one landed out of order.
    pub fn complete(&mut self, job: &WriteJob) -> bool {
        let latest = self.completed.entry(job.path.clone()).or_insert(0);
        if job.generation < *latest {
            warn!(
                "Stale write #{} to {} finished after #{}",
                job.generation, job.path, latest
            );
            return false;
        }
        *latest = job.generation;
        true
    }

    /// Run every waiting write against `fs`.
    ///
    /// A failed write goes back into its slot so the next flush retries it,
    /// unless something newer was queued for that path in the meantime.
    pub fn flush(&mut self, fs: &mut dyn WorkspaceFs) -> FlushReport {
        let mut report = FlushReport::default();
        for job in self.take_all() {
            match fs.write(&job.path, job.contents.as_bytes()) {
                Ok(()) => {
                    self.complete(&job);
                    report.written.push(job.path);
                }
                Err(e) => {
                    warn!("Failed to write {}, keeping it queued: {}", job.path, e);
                    report.failed.push((job.path.clone(), e));
                    self.pending.entry(job.path.clone()).or_insert(job);
                }
            }
        }
        report
    }

    pub fn is_pending(&self, path: &str) -> bool {
        self.pending.contains_key(path)
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Drop everything waiting (workspace detached).
    pub fn clear(&mut self) {
        self.pending.clear();
        self.completed.clear();
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workspaces::fs::MemoryWorkspace;

    #[test]
    fn test_latest_write_wins() {
        let mut queue = WriteQueue::new();
        queue.enqueue("notes.md", "a");
        queue.enqueue("notes.md", "ab");
        queue.enqueue("notes.md", "abc");
        assert_eq!(queue.pending_len(), 1);

        let mut fs = MemoryWorkspace::new("ws");
        let report = queue.flush(&mut fs);
        assert!(report.is_ok());
        assert_eq!(report.written, vec!["notes.md"]);
        assert_eq!(fs.file("notes.md"), Some(&b"abc"[..]));
        assert!(!queue.is_pending("notes.md"));
    }

    #[test]
    fn test_separate_paths_kept_apart() {
        let mut queue = WriteQueue::new();
        queue.enqueue("a.md", "1");
        queue.enqueue("b.md", "2");

        let mut fs = MemoryWorkspace::new("ws");
        let report = queue.flush(&mut fs);
        assert_eq!(report.written, vec!["a.md", "b.md"]);
    }

    #[test]
    fn test_stale_completion_detected() {
        let mut queue = WriteQueue::new();
        queue.enqueue("a.md", "old");
        let old = queue.take("a.md").unwrap();
        queue.enqueue("a.md", "new");
        let new = queue.take("a.md").unwrap();

        assert!(queue.complete(&new));
        assert!(!queue.complete(&old));
    }

    #[test]
    fn test_failed_write_reported() {
        let mut queue = WriteQueue::new();
        queue.enqueue("a.md", "1");

        let mut fs = MemoryWorkspace::new("ws");
        fs.fail_writes = true;
        let report = queue.flush(&mut fs);
        assert!(!report.is_ok());
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].0, "a.md");
        assert!(queue.is_pending("a.md"));
    }

    #[test]
    fn test_failed_write_retried_on_next_flush() {
        let mut queue = WriteQueue::new();
        queue.enqueue("a.md", "latest");

        let mut fs = MemoryWorkspace::new("ws");
        fs.fail_writes = true;
        assert!(!queue.flush(&mut fs).is_ok());
        assert_eq!(fs.file("a.md"), None);

        fs.fail_writes = false;
        let report = queue.flush(&mut fs);
        assert_eq!(report.written, vec!["a.md"]);
        assert_eq!(fs.file("a.md"), Some(&b"latest"[..]));
        assert_eq!(queue.pending_len(), 0);
    }

    #[test]
    fn test_newer_write_beats_requeued_failure() {
        let mut queue = WriteQueue::new();
        queue.enqueue("a.md", "old");
        let mut fs = MemoryWorkspace::new("ws");
        fs.fail_writes = true;
        queue.flush(&mut fs);

        queue.enqueue("a.md", "new");
        fs.fail_writes = false;
        queue.flush(&mut fs);
        assert_eq!(fs.file("a.md"), Some(&b"new"[..]));
    }

    #[test]
    fn test_clear() {
        let mut queue = WriteQueue::new();
        queue.enqueue("a.md", "1");
        queue.clear();
        assert_eq!(queue.pending_len(), 0);
    }
}
