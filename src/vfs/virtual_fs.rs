//! Path-indexed in-memory filesystem.

use std::collections::BTreeMap;

use snafu::{OptionExt, ResultExt, Snafu};

use crate::ext::{RelativePathExt, SEPARATOR, normalize_relative};
use crate::source::{DirEntry, EntryKind, SourceError, SourceFs, VirtualSnafu};

/// One registered path of a [`VirtualFs`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VfsEntry {
    path: String,
    kind: EntryKind,
    content: Option<Vec<u8>>,
}

impl VfsEntry {
    fn directory(path: String) -> Self {
        Self {
            path,
            kind: EntryKind::Directory,
            content: None,
        }
    }

    fn file(path: String, content: Vec<u8>) -> Self {
        Self {
            path,
            kind: EntryKind::File,
            content: Some(content),
        }
    }

    /// Relative path; the root is `""`.
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn name(&self) -> &str {
        self.path.base_name()
    }

    pub fn kind(&self) -> EntryKind {
        self.kind
    }

    pub fn is_dir(&self) -> bool {
        self.kind.is_dir()
    }

    pub fn is_file(&self) -> bool {
        self.kind.is_file()
    }

    /// File bytes; `None` for directories.
    pub fn content(&self) -> Option<&[u8]> {
        self.content.as_deref()
    }
}

/// A flat, queryable filesystem kept entirely in memory.
///
/// ### Invariants
///
/// 1. The root (`""`) is always present and is a directory.
/// 2. Keys are normalized relative paths: no leading or trailing `/`, no
///    empty, `.` or `..` segments.
/// 3. Every entry's parent exists and is a directory. Adding a deep path
///    creates the missing ancestors.
///
/// Lookups accept loosely written paths (`/a/b/`, `./a`, `.`) and normalize
/// them first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VirtualFs {
    entries: BTreeMap<String, VfsEntry>,
}

impl Default for VirtualFs {
    fn default() -> Self {
        Self::new()
    }
}

impl VirtualFs {
    /// Creates a filesystem holding only the root directory.
    pub fn new() -> Self {
        let mut entries = BTreeMap::new();
        entries.insert(String::new(), VfsEntry::directory(String::new()));
        Self { entries }
    }

    /// Number of entries, not counting the root.
    pub fn len(&self) -> usize {
        self.entries.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Registers a directory and any missing ancestors. Registering an
    /// existing directory is a no-op.
    pub fn add_dir(&mut self, path: &str) -> Result<(), VfsError> {
        let path = resolve(path)?;
        let mut current = String::new();
        for segment in path.segments() {
            current = current.join_segment(segment);
            match self.entries.get(&current) {
                Some(entry) if entry.is_file() => {
                    return ConflictSnafu { path: current }.fail();
                }
                Some(_) => {}
                None => {
                    self.entries
                        .insert(current.clone(), VfsEntry::directory(current.clone()));
                }
            }
        }
        Ok(())
    }

    /// Registers a file, creating its parent directories. An existing file at
    /// the same path is replaced.
    pub fn add_file(&mut self, path: &str, content: impl Into<Vec<u8>>) -> Result<(), VfsError> {
        let path = resolve(path)?;
        if path.is_empty() {
            return IsADirectorySnafu { path }.fail();
        }
        if self.is_dir(&path) {
            return ConflictSnafu { path }.fail();
        }
        self.add_dir(path.parent_path())?;
        self.entries
            .insert(path.clone(), VfsEntry::file(path, content.into()));
        Ok(())
    }

    /// Returns the entry registered at `path`.
    pub fn entry(&self, path: &str) -> Result<&VfsEntry, VfsError> {
        let path = resolve(path)?;
        match self.entries.get(&path) {
            Some(entry) => Ok(entry),
            None => NotFoundSnafu { path }.fail(),
        }
    }

    /// Distinguishes directory, file and missing path.
    pub fn kind(&self, path: &str) -> Option<EntryKind> {
        self.entry(path).ok().map(VfsEntry::kind)
    }

    pub fn exists(&self, path: &str) -> bool {
        self.kind(path).is_some()
    }

    pub fn is_dir(&self, path: &str) -> bool {
        self.kind(path).is_some_and(EntryKind::is_dir)
    }

    pub fn is_file(&self, path: &str) -> bool {
        self.kind(path).is_some_and(EntryKind::is_file)
    }

    /// Full content of the file at `path`.
    pub fn read_file(&self, path: &str) -> Result<&[u8], VfsError> {
        let entry = self.entry(path)?;
        match entry.content() {
            Some(content) => Ok(content),
            None => IsADirectorySnafu {
                path: entry.path.clone(),
            }
            .fail(),
        }
    }

    /// Direct children of the directory at `path`, ordered by name.
    pub fn read_dir(&self, path: &str) -> Result<Vec<DirEntry>, VfsError> {
        let entry = self.entry(path)?;
        if !entry.is_dir() {
            return NotADirectorySnafu {
                path: entry.path.clone(),
            }
            .fail();
        }
        Ok(self
            .children(&entry.path)
            .map(|child| DirEntry::new(child.name(), child.kind))
            .collect())
    }

    /// Every entry except the root, parents before children and siblings in
    /// name order.
    pub fn walk(&self) -> Vec<&VfsEntry> {
        let mut visited = Vec::with_capacity(self.len());
        self.walk_from("", &mut visited);
        visited
    }

    fn walk_from<'a>(&'a self, dir: &str, visited: &mut Vec<&'a VfsEntry>) {
        for child in self.children(dir) {
            visited.push(child);
            if child.is_dir() {
                self.walk_from(&child.path, visited);
            }
        }
    }

    /// Entries directly below the normalized directory path `dir`.
    fn children<'a>(&'a self, dir: &str) -> impl Iterator<Item = &'a VfsEntry> + 'a {
        let prefix = if dir.is_empty() {
            String::new()
        } else {
            format!("{dir}{SEPARATOR}")
        };
        let skip = prefix.len();
        self.entries
            .range(prefix.clone()..)
            .take_while(move |(path, _)| path.starts_with(&prefix))
            .filter(move |(path, _)| !path.is_empty() && !path[skip..].contains(SEPARATOR))
            .map(|(_, entry)| entry)
    }
}

fn resolve(path: &str) -> Result<String, VfsError> {
    normalize_relative(path).context(InvalidPathSnafu { path })
}

impl SourceFs for VirtualFs {
    fn read_dir(&self, path: &str) -> Result<Vec<DirEntry>, SourceError> {
        VirtualFs::read_dir(self, path).context(VirtualSnafu)
    }

    fn read_file(&self, path: &str) -> Result<Vec<u8>, SourceError> {
        VirtualFs::read_file(self, path)
            .map(<[u8]>::to_vec)
            .context(VirtualSnafu)
    }

    fn kind(&self, path: &str) -> Result<EntryKind, SourceError> {
        VirtualFs::entry(self, path)
            .map(VfsEntry::kind)
            .context(VirtualSnafu)
    }
}

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum VfsError {
    #[snafu(display("'{}' does not exist", path))]
    NotFound { path: String },
    #[snafu(display("'{}' is not a directory", path))]
    NotADirectory { path: String },
    #[snafu(display("'{}' is a directory", path))]
    IsADirectory { path: String },
    #[snafu(display("'{}' is not a valid relative path", path))]
    InvalidPath { path: String },
    #[snafu(display("'{}' already exists as a different kind of entry", path))]
    Conflict { path: String },
}
