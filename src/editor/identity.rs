//! Block identity tracking
//!
//! Every block carries an opaque [`BlockId`] that survives re-splits of the
//! document, so per-row UI state (focus, scroll anchors, cached renders)
//! stays attached to "the same" block while the user types elsewhere.
//!
//! Ids come from a per-list monotonic counter and are never reused. When
//! the document is re-split from scratch (undo, external replacement) the
//! new block texts are reconciled against the old blocks:
//!
//! 1. Equal counts with at most one changed position: positional. This is
//!    the in-place edit, where every block keeps its id.
//! 2. Otherwise the common prefix and suffix keep their ids, and the middle
//!    is aligned by longest common subsequence over exact text.
//! 3. Unmatched new blocks take the id of an unmatched old block with
//!    identical text (first unused, so duplicates tie-break by position).
//! 4. Remaining new blocks inherit, in order, from unmatched old blocks
//!    lying in the same gap between matched anchors.
//! 5. Anything left gets a fresh id.

use std::collections::{HashMap, VecDeque};
use std::fmt;

use log::trace;

use crate::markdown::{join_blocks, split_blocks};

/// Alignment is skipped for middles larger than this many cells.
const MAX_ALIGNMENT_CELLS: usize = 4_000_000;

// ─────────────────────────────────────────────────────────────────────────────
// Block
// ─────────────────────────────────────────────────────────────────────────────

/// Opaque, stable identity of a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlockId(u64);

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "block-{}", self.0)
    }
}

/// One editable unit of a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    id: BlockId,
    text: String,
}

impl Block {
    pub fn id(&self) -> BlockId {
        self.id
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Reconciliation
// ─────────────────────────────────────────────────────────────────────────────

/// Assign ids to `new` texts given the `old` blocks.
///
/// `fresh` is called once per block that needs a new id.
fn reconcile(old: &[Block], new: &[String], mut fresh: impl FnMut() -> BlockId) -> Vec<BlockId> {
    let n = old.len();
    let m = new.len();

    if n == m {
        let changed = old
            .iter()
            .zip(new)
            .filter(|(o, t)| o.text != **t)
            .count();
        if changed <= 1 {
            return old.iter().map(|b| b.id).collect();
        }
    }

    // matched[j] = index of the old block new block j keeps the id of
    let mut matched: Vec<Option<usize>> = vec![None; m];
    let mut old_used = vec![false; n];
    fn link(matched: &mut [Option<usize>], old_used: &mut [bool], i: usize, j: usize) {
        matched[j] = Some(i);
        old_used[i] = true;
    }

    // Common prefix and suffix
    let mut prefix = 0;
    while prefix < n && prefix < m && old[prefix].text == new[prefix] {
        link(&mut matched, &mut old_used, prefix, prefix);
        prefix += 1;
    }
    let mut suffix = 0;
    while suffix < n - prefix
        && suffix < m - prefix
        && old[n - 1 - suffix].text == new[m - 1 - suffix]
    {
        link(&mut matched, &mut old_used, n - 1 - suffix, m - 1 - suffix);
        suffix += 1;
    }

    // LCS over the middle
    let a = n - prefix - suffix;
    let b = m - prefix - suffix;
    if a > 0 && b > 0 && a.saturating_mul(b) <= MAX_ALIGNMENT_CELLS {
        let eq = |i: usize, j: usize| old[prefix + i].text == new[prefix + j];
        let width = b + 1;
        let mut dp = vec![0u32; (a + 1) * width];
        for i in (0..a).rev() {
            for j in (0..b).rev() {
                dp[i * width + j] = if eq(i, j) {
                    dp[(i + 1) * width + j + 1] + 1
                } else {
                    dp[(i + 1) * width + j].max(dp[i * width + j + 1])
                };
            }
        }
        let (mut i, mut j) = (0, 0);
        while i < a && j < b {
            if eq(i, j) {
                link(&mut matched, &mut old_used, prefix + i, prefix + j);
                i += 1;
                j += 1;
            } else if dp[(i + 1) * width + j] >= dp[i * width + j + 1] {
                i += 1;
            } else {
                j += 1;
            }
        }
    }

    // Exact text among the leftovers
    let mut unused_by_text: HashMap<&str, VecDeque<usize>> = HashMap::new();
    for (i, block) in old.iter().enumerate() {
        if !old_used[i] {
            unused_by_text.entry(block.text.as_str()).or_default().push_back(i);
        }
    }
    for j in 0..m {
        if matched[j].is_some() {
            continue;
        }
        if let Some(i) = unused_by_text
            .get_mut(new[j].as_str())
            .and_then(VecDeque::pop_front)
        {
            link(&mut matched, &mut old_used, i, j);
        }
    }

    // Positional inheritance inside gaps between anchors
    let mut j = 0;
    while j < m {
        if matched[j].is_some() {
            j += 1;
            continue;
        }
        let run_start = j;
        while j < m && matched[j].is_none() {
            j += 1;
        }
        let lower = run_start
            .checked_sub(1)
            .and_then(|k| matched[k])
            .map(|i| i + 1)
            .unwrap_or(0);
        let upper = if j < m { matched[j].unwrap_or(n) } else { n };
        if lower >= upper {
            continue;
        }
        let candidates: Vec<usize> = (lower..upper).filter(|&i| !old_used[i]).collect();
        for (offset, i) in candidates.into_iter().enumerate() {
            let target = run_start + offset;
            if target >= j {
                break;
            }
            link(&mut matched, &mut old_used, i, target);
        }
    }

    matched
        .into_iter()
        .map(|slot| match slot {
            Some(i) => old[i].id,
            None => fresh(),
        })
        .collect()
}

// ─────────────────────────────────────────────────────────────────────────────
// Block List
// ─────────────────────────────────────────────────────────────────────────────

/// The ordered blocks of one document, never empty.
#[derive(Debug, Clone)]
pub struct BlockList {
    blocks: Vec<Block>,
    next_id: u64,
}

impl BlockList {
    /// Split a document into blocks with fresh ids.
    pub fn from_text(text: &str) -> Self {
        let blocks: Vec<Block> = split_blocks(text)
            .into_iter()
            .enumerate()
            .map(|(i, text)| Block {
                id: BlockId(i as u64),
                text,
            })
            .collect();
        Self {
            next_id: blocks.len() as u64,
            blocks,
        }
    }

    fn allocate(&mut self) -> BlockId {
        let id = BlockId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Re-split `text` and carry ids over from the current blocks.
    pub fn resync(&mut self, text: &str) {
        let texts = split_blocks(text);
        let mut next_id = self.next_id;
        let ids = reconcile(&self.blocks, &texts, || {
            let id = BlockId(next_id);
            next_id += 1;
            id
        });
        self.next_id = next_id;
        self.blocks = ids
            .into_iter()
            .zip(texts)
            .map(|(id, text)| Block { id, text })
            .collect();
        trace!("Resynced {} blocks", self.blocks.len());
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────────

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Always `false`; a document has at least one block.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Block> {
        self.blocks.get(index)
    }

    pub fn text(&self, index: usize) -> Option<&str> {
        self.blocks.get(index).map(Block::text)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Block> {
        self.blocks.iter()
    }

    pub fn ids(&self) -> Vec<BlockId> {
        self.blocks.iter().map(Block::id).collect()
    }

    pub fn texts(&self) -> Vec<&str> {
        self.blocks.iter().map(Block::text).collect()
    }

    /// Index of the block with `id`.
    pub fn position(&self, id: BlockId) -> Option<usize> {
        self.blocks.iter().position(|b| b.id == id)
    }

    pub fn last_index(&self) -> usize {
        self.blocks.len().saturating_sub(1)
    }

    /// Join the blocks back into one document.
    pub fn join(&self) -> String {
        join_blocks(&self.texts())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Structural Edits
    // ─────────────────────────────────────────────────────────────────────────

    /// Replace one block's text, keeping its id.
    pub fn set_text(&mut self, index: usize, text: impl Into<String>) -> bool {
        match self.blocks.get_mut(index) {
            Some(block) => {
                block.text = text.into();
                true
            }
            None => false,
        }
    }

    /// Insert a block with a fresh id at `index` (clamped to the end).
    pub fn insert(&mut self, index: usize, text: impl Into<String>) -> usize {
        let index = index.min(self.blocks.len());
        let id = self.allocate();
        self.blocks.insert(
            index,
            Block {
                id,
                text: text.into(),
            },
        );
        index
    }

    /// Remove a block. Refuses to remove the only block.
    pub fn remove(&mut self, index: usize) -> Option<Block> {
        if self.blocks.len() <= 1 || index >= self.blocks.len() {
            return None;
        }
        Some(self.blocks.remove(index))
    }

    /// Replace block `index` with several pieces.
    ///
    /// The first piece keeps the block's id; the rest get fresh ids.
    /// Returns the index of the last inserted piece.
    pub fn splice(&mut self, index: usize, pieces: Vec<String>) -> Option<usize> {
        if index >= self.blocks.len() || pieces.is_empty() {
            return None;
        }
        let mut pieces = pieces.into_iter();
        if let Some(first) = pieces.next() {
            self.blocks[index].text = first;
        }
        let mut at = index;
        for piece in pieces {
            at += 1;
            let id = self.allocate();
            self.blocks.insert(at, Block { id, text: piece });
        }
        Some(at)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
