//! Workspace filesystem access
//!
//! A workspace is a user-granted directory. Everything the editor does
//! inside it (listing entries, opening Markdown files, saving, storing
//! pasted images) goes through the [`WorkspaceFs`] trait with paths that
//! are relative to the workspace root and `/`-separated.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::io::{self, Write};
use std::path::{Component, Path, PathBuf};

use log::debug;
use walkdir::WalkDir;

use crate::error::{Error, Result};

// ─────────────────────────────────────────────────────────────────────────────
// Entries
// ─────────────────────────────────────────────────────────────────────────────

/// Whether an entry is a file or a directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Directory,
}

/// One entry of a workspace directory listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    /// File or folder name
    pub name: String,
    /// Path relative to the workspace root, `/`-separated
    pub path: String,
    pub kind: EntryKind,
}

impl DirEntry {
    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Directory
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Trait
// ─────────────────────────────────────────────────────────────────────────────

/// Capability to read and write inside one workspace directory.
pub trait WorkspaceFs {
    /// Display name of the workspace (the folder name).
    fn name(&self) -> &str;

    /// Immediate children of `dir` (`""` is the root).
    fn list(&self, dir: &str) -> Result<Vec<DirEntry>>;

    /// Every entry below the root, parents before children.
    fn walk(&self) -> Result<Vec<DirEntry>>;

    fn read_text(&self, path: &str) -> Result<String>;

    fn read_bytes(&self, path: &str) -> Result<Vec<u8>>;

    /// Create or replace a file. The contents are complete once this returns.
    fn write(&mut self, path: &str, bytes: &[u8]) -> Result<()>;

    fn create_dir_all(&mut self, dir: &str) -> Result<()>;

    fn exists(&self, path: &str) -> bool;
}

/// Join a directory and a name into a workspace-relative path.
pub fn join_path(dir: &str, name: &str) -> String {
    let dir = dir.trim_end_matches('/');
    if dir.is_empty() {
        name.to_string()
    } else {
        format!("{}/{}", dir, name)
    }
}

/// Validate a workspace-relative path and split it into components.
fn relative_components(path: &str) -> Result<Vec<&str>> {
    let mut parts = Vec::new();
    for component in Path::new(path).components() {
        match component {
            Component::Normal(_) => {}
            Component::CurDir => continue,
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                return Err(Error::InvalidPath(path.to_string()));
            }
        }
    }
    for part in path.split('/') {
        if !part.is_empty() && part != "." {
            parts.push(part);
        }
    }
    Ok(parts)
}

// ─────────────────────────────────────────────────────────────────────────────
// Local Directory
// ─────────────────────────────────────────────────────────────────────────────

/// A workspace backed by a directory on the local disk.
#[derive(Debug, Clone)]
pub struct LocalWorkspace {
    root: PathBuf,
    name: String,
}

impl LocalWorkspace {
    /// Open a directory as a workspace.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        if !root.is_dir() {
            return Err(Error::Workspace {
                path: root.display().to_string(),
                source: io::Error::new(io::ErrorKind::NotFound, "not a directory"),
            });
        }
        let name = root
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("workspace")
            .to_string();
        debug!("Opened workspace '{}' at {}", name, root.display());
        Ok(Self { root, name })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, path: &str) -> Result<PathBuf> {
        let mut full = self.root.clone();
        for part in relative_components(path)? {
            full.push(part);
        }
        Ok(full)
    }

    fn relative(&self, full: &Path) -> Option<String> {
        let rel = full.strip_prefix(&self.root).ok()?;
        let parts: Vec<&str> = rel
            .components()
            .filter_map(|c| match c {
                Component::Normal(s) => s.to_str(),
                _ => None,
            })
            .collect();
        Some(parts.join("/"))
    }

    fn io_error(path: &str, source: io::Error) -> Error {
        Error::Workspace {
            path: path.to_string(),
            source,
        }
    }
}

impl WorkspaceFs for LocalWorkspace {
    fn name(&self) -> &str {
        &self.name
    }

    fn list(&self, dir: &str) -> Result<Vec<DirEntry>> {
        let full = self.resolve(dir)?;
        let read_dir = fs::read_dir(&full).map_err(|e| Self::io_error(dir, e))?;

        let mut entries = Vec::new();
        for entry in read_dir.flatten() {
            let Ok(name) = entry.file_name().into_string() else {
                continue; // Skip entries with invalid UTF-8 names
            };
            let kind = if entry.path().is_dir() {
                EntryKind::Directory
            } else {
                EntryKind::File
            };
            entries.push(DirEntry {
                path: join_path(dir, &name),
                name,
                kind,
            });
        }
        Ok(entries)
    }

    fn walk(&self) -> Result<Vec<DirEntry>> {
        let mut entries = Vec::new();
        for entry in WalkDir::new(&self.root).min_depth(1).sort_by_file_name() {
            let entry = entry.map_err(|e| {
                let path = e
                    .path()
                    .and_then(|p| self.relative(p))
                    .unwrap_or_default();
                Self::io_error(&path, io::Error::new(io::ErrorKind::Other, e.to_string()))
            })?;
            let Some(name) = entry.file_name().to_str().map(str::to_string) else {
                continue;
            };
            let Some(path) = self.relative(entry.path()) else {
                continue;
            };
            let kind = if entry.file_type().is_dir() {
                EntryKind::Directory
            } else {
                EntryKind::File
            };
            entries.push(DirEntry { name, path, kind });
        }
        Ok(entries)
    }

    fn read_text(&self, path: &str) -> Result<String> {
        let full = self.resolve(path)?;
        fs::read_to_string(&full).map_err(|e| Self::io_error(path, e))
    }

    fn read_bytes(&self, path: &str) -> Result<Vec<u8>> {
        let full = self.resolve(path)?;
        fs::read(&full).map_err(|e| Self::io_error(path, e))
    }

    fn write(&mut self, path: &str, bytes: &[u8]) -> Result<()> {
        let full = self.resolve(path)?;
        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent).map_err(|e| Self::io_error(path, e))?;
        }

        // Write to a sibling temp file, then rename over the target
        let temp = full.with_extension("novascribe-tmp");
        let result = fs::File::create(&temp).and_then(|mut file| {
            file.write_all(bytes)?;
            file.sync_all()
        });
        if let Err(e) = result.and_then(|_| fs::rename(&temp, &full)) {
            let _ = fs::remove_file(&temp);
            return Err(Self::io_error(path, e));
        }

        debug!("Wrote {} bytes to workspace file {}", bytes.len(), path);
        Ok(())
    }

    fn create_dir_all(&mut self, dir: &str) -> Result<()> {
        let full = self.resolve(dir)?;
        fs::create_dir_all(&full).map_err(|e| Self::io_error(dir, e))
    }

    fn exists(&self, path: &str) -> bool {
        self.resolve(path).map(|p| p.exists()).unwrap_or(false)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// In-Memory Workspace
// ─────────────────────────────────────────────────────────────────────────────

/// A workspace held entirely in memory.
///
/// Used by tests and by hosts that have no real directory to offer.
#[derive(Debug, Clone, Default)]
pub struct MemoryWorkspace {
    name: String,
    files: BTreeMap<String, Vec<u8>>,
    dirs: BTreeSet<String>,
    /// When set, every write fails with a permission error
    pub fail_writes: bool,
}

impl MemoryWorkspace {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Builder-style helper to seed a file.
    pub fn with_file(mut self, path: &str, contents: impl Into<Vec<u8>>) -> Self {
        self.insert(path, contents.into());
        self
    }

    /// Contents of a file, if present.
    pub fn file(&self, path: &str) -> Option<&[u8]> {
        self.files.get(path).map(Vec::as_slice)
    }

    fn insert(&mut self, path: &str, contents: Vec<u8>) {
        let mut parent = String::new();
        let parts: Vec<&str> = path.split('/').collect();
        for part in &parts[..parts.len().saturating_sub(1)] {
            parent = join_path(&parent, part);
            self.dirs.insert(parent.clone());
        }
        self.files.insert(path.to_string(), contents);
    }

    fn not_found(path: &str) -> Error {
        Error::Workspace {
            path: path.to_string(),
            source: io::Error::new(io::ErrorKind::NotFound, "no such file"),
        }
    }

    fn parent_of(path: &str) -> &str {
        path.rsplit_once('/').map(|(parent, _)| parent).unwrap_or("")
    }

    fn entry(path: &str, kind: EntryKind) -> DirEntry {
        let name = path.rsplit('/').next().unwrap_or(path).to_string();
        DirEntry {
            name,
            path: path.to_string(),
            kind,
        }
    }
}

impl WorkspaceFs for MemoryWorkspace {
    fn name(&self) -> &str {
        &self.name
    }

    fn list(&self, dir: &str) -> Result<Vec<DirEntry>> {
        let dir = relative_components(dir)?.join("/");
        if !dir.is_empty() && !self.dirs.contains(&dir) {
            return Err(Self::not_found(&dir));
        }
        let dirs = self
            .dirs
            .iter()
            .filter(|d| Self::parent_of(d) == dir)
            .map(|d| Self::entry(d, EntryKind::Directory));
        let files = self
            .files
            .keys()
            .filter(|f| Self::parent_of(f) == dir)
            .map(|f| Self::entry(f, EntryKind::File));
        Ok(dirs.chain(files).collect())
    }

    fn walk(&self) -> Result<Vec<DirEntry>> {
        let mut entries: Vec<DirEntry> = self
            .dirs
            .iter()
            .map(|d| Self::entry(d, EntryKind::Directory))
            .chain(self.files.keys().map(|f| Self::entry(f, EntryKind::File)))
            .collect();
        entries.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(entries)
    }

    fn read_text(&self, path: &str) -> Result<String> {
        let bytes = self.read_bytes(path)?;
        String::from_utf8(bytes).map_err(|e| Error::Workspace {
            path: path.to_string(),
            source: io::Error::new(io::ErrorKind::InvalidData, e),
        })
    }

    fn read_bytes(&self, path: &str) -> Result<Vec<u8>> {
        let path = relative_components(path)?.join("/");
        self.files
            .get(&path)
            .cloned()
            .ok_or_else(|| Self::not_found(&path))
    }

    fn write(&mut self, path: &str, bytes: &[u8]) -> Result<()> {
        let path = relative_components(path)?.join("/");
        if self.fail_writes {
            return Err(Error::Workspace {
                path,
                source: io::Error::new(io::ErrorKind::PermissionDenied, "write refused"),
            });
        }
        self.insert(&path, bytes.to_vec());
        Ok(())
    }

    fn create_dir_all(&mut self, dir: &str) -> Result<()> {
        let mut current = String::new();
        for part in relative_components(dir)? {
            current = join_path(&current, part);
            self.dirs.insert(current.clone());
        }
        Ok(())
    }

    fn exists(&self, path: &str) -> bool {
        match relative_components(path) {
            Ok(parts) => {
                let path = parts.join("/");
                self.files.contains_key(&path) || self.dirs.contains(&path)
            }
            Err(_) => false,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
