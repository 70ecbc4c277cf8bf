//! Read-only accessors walked by the tree builder.

mod disk_source;
mod source_fs;

pub use disk_source::DiskSource;
pub use source_fs::{DirEntry, EntryKind, SourceError, SourceFs};
pub(crate) use source_fs::{IoSnafu, VirtualSnafu};
