use std::fs;
use std::path::PathBuf;

use snafu::ResultExt;

use crate::ext::{BestEffortPathExt, RelativePathExt};
use crate::source::{DirEntry, EntryKind, IoSnafu, SourceError, SourceFs};

/// A [`SourceFs`] backed by a directory on the host filesystem.
///
/// Entries are classified without following symbolic links, so a link to a
/// directory is reported as a file.
#[derive(Debug, Clone)]
pub struct DiskSource {
    root: PathBuf,
}

impl DiskSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn host_path(&self, path: &str) -> PathBuf {
        path.segments()
            .fold(self.root.clone(), |host, segment| host.join(segment))
    }
}

impl SourceFs for DiskSource {
    fn read_dir(&self, path: &str) -> Result<Vec<DirEntry>, SourceError> {
        let host = self.host_path(path);
        let context = || IoSnafu {
            host_path: host.best_effort_path_display(),
        };

        let mut entries = Vec::new();
        for entry in fs::read_dir(&host).with_context(|_| context())? {
            let entry = entry.with_context(|_| context())?;
            let file_type = entry.file_type().with_context(|_| context())?;
            let kind = if file_type.is_dir() {
                EntryKind::Directory
            } else {
                EntryKind::File
            };
            entries.push(DirEntry::new(
                entry.file_name().to_string_lossy().into_owned(),
                kind,
            ));
        }
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }

    fn read_file(&self, path: &str) -> Result<Vec<u8>, SourceError> {
        let host = self.host_path(path);
        fs::read(&host).context(IoSnafu {
            host_path: host.best_effort_path_display(),
        })
    }

    fn kind(&self, path: &str) -> Result<EntryKind, SourceError> {
        let host = self.host_path(path);
        let metadata = fs::symlink_metadata(&host).context(IoSnafu {
            host_path: host.best_effort_path_display(),
        })?;
        Ok(if metadata.is_dir() {
            EntryKind::Directory
        } else {
            EntryKind::File
        })
    }
}
