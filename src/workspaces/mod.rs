//! Workspace support for NovaScribe
//!
//! This module provides folder/workspace support including:
//! - The filesystem capability the editor reads and writes through
//! - File tree scanning
//! - Pasted image storage and asset resolution

pub mod assets;
mod file_tree;
pub mod fs;

pub use file_tree::{
    is_markdown_name, list_markdown_files, scan_workspace, FileTreeNode, FileTreeNodeKind,
};
pub use fs::{DirEntry, EntryKind, LocalWorkspace, MemoryWorkspace, WorkspaceFs};

use crate::config::Settings;
use crate::error::Result;

// ─────────────────────────────────────────────────────────────────────────────
// Workspace
// ─────────────────────────────────────────────────────────────────────────────

/// An attached workspace: the filesystem capability plus its scanned tree.
pub struct Workspace {
    fs: Box<dyn WorkspaceFs>,

    /// The file tree structure
    pub file_tree: FileTreeNode,

    /// Names of files and folders never shown
    pub hidden_patterns: Vec<String>,

    /// Only Markdown files can be opened
    pub markdown_only: bool,
}

impl Workspace {
    /// Attach a workspace and scan its tree.
    pub fn new(fs: Box<dyn WorkspaceFs>, settings: &Settings) -> Self {
        let hidden_patterns = settings.hidden_entries.clone();
        let file_tree = scan_workspace(fs.as_ref(), &hidden_patterns);
        Self {
            fs,
            file_tree,
            hidden_patterns,
            markdown_only: settings.markdown_only_workspace,
        }
    }

    pub fn name(&self) -> &str {
        self.fs.name()
    }

    pub fn fs(&self) -> &dyn WorkspaceFs {
        self.fs.as_ref()
    }

    pub fn fs_mut(&mut self) -> &mut dyn WorkspaceFs {
        self.fs.as_mut()
    }

    /// Refresh the file tree from the filesystem.
    pub fn refresh_file_tree(&mut self) {
        self.file_tree = scan_workspace(self.fs.as_ref(), &self.hidden_patterns);
    }

    /// Read a file for opening in the editor.
    ///
    /// Returns `Ok(None)` when the file exists in the tree but may not be
    /// opened (non-Markdown in Markdown-only mode).
    pub fn open_file(&self, path: &str) -> Result<Option<(String, String)>> {
        let name = path.rsplit('/').next().unwrap_or(path).to_string();
        if self.markdown_only && !is_markdown_name(&name) {
            return Ok(None);
        }
        let content = self.fs.read_text(path)?;
        Ok(Some((name, content)))
    }

    /// Flat list of all Markdown files (for quick switching).
    pub fn markdown_files(&self) -> Vec<String> {
        list_markdown_files(self.fs.as_ref(), &self.hidden_patterns)
    }
}

impl std::fmt::Debug for Workspace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Workspace")
            .field("name", &self.name())
            .field("files", &self.file_tree.file_count())
            .finish()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
