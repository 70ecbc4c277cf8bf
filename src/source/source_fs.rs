use derive_more::Display;
use snafu::Snafu;

use crate::vfs::VfsError;

/// Kind of an entry in a source or virtual filesystem.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryKind {
    #[display("file")]
    File,
    #[display("directory")]
    Directory,
}

impl EntryKind {
    pub fn is_dir(self) -> bool {
        self == EntryKind::Directory
    }

    pub fn is_file(self) -> bool {
        self == EntryKind::File
    }
}

/// One child of a listed directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    pub name: String,
    pub kind: EntryKind,
}

impl DirEntry {
    pub fn new(name: impl Into<String>, kind: EntryKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }
}

/// Read-only hierarchical file source walked by the tree builder.
///
/// Paths are relative and slash-separated; the root is `""`.
pub trait SourceFs {
    /// Lists the direct children of the directory at `path`.
    fn read_dir(&self, path: &str) -> Result<Vec<DirEntry>, SourceError>;

    /// Reads the whole file at `path`.
    fn read_file(&self, path: &str) -> Result<Vec<u8>, SourceError>;

    /// Reports whether `path` is a file or a directory.
    fn kind(&self, path: &str) -> Result<EntryKind, SourceError>;
}

impl<S: SourceFs + ?Sized> SourceFs for &S {
    fn read_dir(&self, path: &str) -> Result<Vec<DirEntry>, SourceError> {
        (**self).read_dir(path)
    }

    fn read_file(&self, path: &str) -> Result<Vec<u8>, SourceError> {
        (**self).read_file(path)
    }

    fn kind(&self, path: &str) -> Result<EntryKind, SourceError> {
        (**self).kind(path)
    }
}

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum SourceError {
    #[snafu(display("I/O error on {}", host_path))]
    Io {
        host_path: String,
        source: std::io::Error,
    },
    #[snafu(display("Virtual filesystem lookup failed"))]
    Virtual { source: VfsError },
}
