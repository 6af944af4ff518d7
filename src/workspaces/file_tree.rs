//! File tree data structures and workspace scanning.

use log::warn;

use super::fs::{DirEntry, WorkspaceFs};

// ─────────────────────────────────────────────────────────────────────────────
// File Tree Node
// ─────────────────────────────────────────────────────────────────────────────

/// A node in the workspace tree representing a file or directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileTreeNode {
    /// Display name of the file or folder
    pub name: String,

    /// Path relative to the workspace root (`""` for the root itself)
    pub path: String,

    /// Type of node (file or directory with children)
    pub kind: FileTreeNodeKind,

    /// Whether this node is expanded in the UI (for directories)
    pub is_expanded: bool,
}

/// The kind of file tree node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileTreeNodeKind {
    /// A regular file
    File {
        /// `.md` extension (case-insensitive)
        is_markdown: bool,
    },

    /// A directory with children
    Directory {
        /// Child nodes (files and subdirectories)
        children: Vec<FileTreeNode>,
    },
}

impl FileTreeNode {
    /// Create a new file node.
    pub fn file(name: String, path: String) -> Self {
        let is_markdown = is_markdown_name(&name);
        Self {
            name,
            path,
            kind: FileTreeNodeKind::File { is_markdown },
            is_expanded: false,
        }
    }

    /// Create a new directory node.
    pub fn directory(name: String, path: String, children: Vec<FileTreeNode>) -> Self {
        Self {
            name,
            path,
            kind: FileTreeNodeKind::Directory { children },
            is_expanded: false,
        }
    }

    pub fn is_directory(&self) -> bool {
        matches!(self.kind, FileTreeNodeKind::Directory { .. })
    }

    pub fn is_markdown(&self) -> bool {
        matches!(self.kind, FileTreeNodeKind::File { is_markdown: true })
    }

    /// Whether selecting this node opens it in the editor.
    ///
    /// With `markdown_only` set, only Markdown files can be opened.
    pub fn is_openable(&self, markdown_only: bool) -> bool {
        match self.kind {
            FileTreeNodeKind::File { is_markdown } => is_markdown || !markdown_only,
            FileTreeNodeKind::Directory { .. } => false,
        }
    }

    /// Get children if this is a directory.
    pub fn children(&self) -> Option<&[FileTreeNode]> {
        match &self.kind {
            FileTreeNodeKind::Directory { children } => Some(children),
            FileTreeNodeKind::File { .. } => None,
        }
    }

    /// Toggle the expanded state of this node.
    pub fn toggle_expanded(&mut self) {
        self.is_expanded = !self.is_expanded;
    }

    /// Set expanded state for a node at the given path.
    pub fn set_expanded(&mut self, target_path: &str, expanded: bool) -> bool {
        if self.path == target_path {
            self.is_expanded = expanded;
            return true;
        }

        if let FileTreeNodeKind::Directory { children } = &mut self.kind {
            for child in children {
                if child.set_expanded(target_path, expanded) {
                    return true;
                }
            }
        }
        false
    }

    /// Find a node by path.
    pub fn find(&self, target_path: &str) -> Option<&FileTreeNode> {
        if self.path == target_path {
            return Some(self);
        }

        if let FileTreeNodeKind::Directory { children } = &self.kind {
            for child in children {
                if let Some(found) = child.find(target_path) {
                    return Some(found);
                }
            }
        }
        None
    }

    /// Count all files in this tree (recursive).
    pub fn file_count(&self) -> usize {
        match &self.kind {
            FileTreeNodeKind::File { .. } => 1,
            FileTreeNodeKind::Directory { children } => {
                children.iter().map(|c| c.file_count()).sum()
            }
        }
    }

    /// Count all directories in this tree (recursive).
    pub fn directory_count(&self) -> usize {
        match &self.kind {
            FileTreeNodeKind::File { .. } => 0,
            FileTreeNodeKind::Directory { children } => {
                1 + children.iter().map(|c| c.directory_count()).sum::<usize>()
            }
        }
    }
}

/// Whether a file name has the `.md` extension.
pub fn is_markdown_name(name: &str) -> bool {
    name.to_lowercase().ends_with(".md")
}

// ─────────────────────────────────────────────────────────────────────────────
// Workspace Scanning
// ─────────────────────────────────────────────────────────────────────────────

/// Scan a workspace and build its file tree.
///
/// Dot-entries and names in `hidden` are skipped. A directory that cannot
/// be listed is kept with no children.
pub fn scan_workspace(fs: &dyn WorkspaceFs, hidden: &[String]) -> FileTreeNode {
    let children = scan_children(fs, "", hidden);
    let mut node = FileTreeNode::directory(fs.name().to_string(), String::new(), children);
    node.is_expanded = true; // Root is always expanded
    node
}

fn scan_children(fs: &dyn WorkspaceFs, dir: &str, hidden: &[String]) -> Vec<FileTreeNode> {
    let listing = match fs.list(dir) {
        Ok(listing) => listing,
        Err(e) => {
            warn!("Failed to list workspace directory '{}': {}", dir, e);
            return Vec::new();
        }
    };

    let mut entries: Vec<FileTreeNode> = listing
        .into_iter()
        .filter(|entry| !should_hide(&entry.name, hidden))
        .map(|entry| {
            if entry.is_dir() {
                let children = scan_children(fs, &entry.path, hidden);
                FileTreeNode::directory(entry.name, entry.path, children)
            } else {
                FileTreeNode::file(entry.name, entry.path)
            }
        })
        .collect();

    sort_entries(&mut entries);
    entries
}

/// Sort: directories first, then alphabetically (case-insensitive).
fn sort_entries(entries: &mut [FileTreeNode]) {
    entries.sort_by(|a, b| match (a.is_directory(), b.is_directory()) {
        (true, false) => std::cmp::Ordering::Less,
        (false, true) => std::cmp::Ordering::Greater,
        _ => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
    });
}

/// Check if a file/folder should be hidden.
fn should_hide(name: &str, hidden: &[String]) -> bool {
    name.starts_with('.') || hidden.iter().any(|pattern| pattern == name)
}

/// Every Markdown file in the workspace, skipping hidden entries and
/// anything beneath a hidden directory.
pub fn list_markdown_files(fs: &dyn WorkspaceFs, hidden: &[String]) -> Vec<String> {
    let entries: Vec<DirEntry> = match fs.walk() {
        Ok(entries) => entries,
        Err(e) => {
            warn!("Failed to walk workspace '{}': {}", fs.name(), e);
            return Vec::new();
        }
    };

    entries
        .into_iter()
        .filter(|entry| !entry.is_dir() && is_markdown_name(&entry.name))
        .filter(|entry| !entry.path.split('/').any(|part| should_hide(part, hidden)))
        .map(|entry| entry.path)
        .collect()
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workspaces::fs::MemoryWorkspace;

    fn hidden() -> Vec<String> {
        vec!["node_modules".to_string(), "target".to_string()]
    }

    fn sample() -> MemoryWorkspace {
        MemoryWorkspace::new("project")
            .with_file("Zeta.md", "z")
            .with_file("alpha.md", "a")
            .with_file("image.png", [0u8, 1, 2])
            .with_file(".secret.md", "s")
            .with_file("docs/Guide.MD", "g")
            .with_file("node_modules/pkg/readme.md", "r")
    }

    #[test]
    fn test_file_node_markdown_flag() {
        let md = FileTreeNode::file("notes.MD".to_string(), "notes.MD".to_string());
        assert!(md.is_markdown());
        assert!(md.is_openable(true));

        let png = FileTreeNode::file("a.png".to_string(), "a.png".to_string());
        assert!(!png.is_markdown());
        assert!(!png.is_openable(true));
        assert!(png.is_openable(false));
    }

    #[test]
    fn test_scan_sorts_and_hides() {
        let ws = sample();
        let tree = scan_workspace(&ws, &hidden());

        assert_eq!(tree.name, "project");
        assert!(tree.is_expanded);

        let names: Vec<&str> = tree
            .children()
            .unwrap()
            .iter()
            .map(|n| n.name.as_str())
            .collect();
        assert_eq!(names, vec!["docs", "alpha.md", "image.png", "Zeta.md"]);
    }

    #[test]
    fn test_scan_counts() {
        let tree = scan_workspace(&sample(), &hidden());
        assert_eq!(tree.file_count(), 4);
        assert_eq!(tree.directory_count(), 2); // root + docs
    }

    #[test]
    fn test_find_and_expand() {
        let mut tree = scan_workspace(&sample(), &hidden());
        assert!(tree.find("docs/Guide.MD").is_some());
        assert!(tree.set_expanded("docs", true));
        assert!(tree.find("docs").unwrap().is_expanded);
        assert!(!tree.set_expanded("missing", true));
    }

    #[test]
    fn test_should_hide() {
        assert!(should_hide(".git", &[]));
        assert!(should_hide("node_modules", &hidden()));
        assert!(!should_hide("src", &hidden()));
    }

    #[test]
    fn test_list_markdown_files() {
        let files = list_markdown_files(&sample(), &hidden());
        assert_eq!(files, vec!["Zeta.md", "alpha.md", "docs/Guide.MD"]);
    }
}
