use std::path::{Path, PathBuf};

use compio::fs;
use snafu::{ResultExt, Snafu};
use tracing::{debug, info};

use crate::ext::{BestEffortPathExt, RelativePathExt};
use crate::vfs::VirtualFs;

/// Reproduces `vfs` below `dest` as real directories and files.
///
/// `dest` is created if missing. Entries are written parents first, so every
/// file lands in an already existing directory. Existing files are
/// overwritten; nothing is removed.
pub async fn write_dir(vfs: &VirtualFs, dest: &Path) -> Result<(), WriteDirError> {
    fs::create_dir_all(dest).await.context(CreateDirSnafu {
        path: dest.to_path_buf(),
    })?;

    let mut files = 0usize;
    for entry in vfs.walk() {
        let host = host_path(dest, entry.path());
        match entry.content() {
            None => {
                fs::create_dir_all(&host)
                    .await
                    .context(CreateDirSnafu { path: host.clone() })?;
            }
            Some(content) => {
                debug!("Writing {}", host.display());
                fs::write(&host, content.to_vec())
                    .await
                    .0
                    .context(WriteFileSnafu { path: host.clone() })?;
                files += 1;
            }
        }
    }

    info!(
        "Wrote {} files to {}",
        files,
        dest.best_effort_path_display()
    );
    Ok(())
}

fn host_path(dest: &Path, relative: &str) -> PathBuf {
    relative
        .segments()
        .fold(dest.to_path_buf(), |host, segment| host.join(segment))
}

#[derive(Debug, Snafu)]
pub enum WriteDirError {
    #[snafu(display("Failed to create directory {}", path.best_effort_path_display()))]
    CreateDirError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[snafu(display("Failed to write file {}", path.best_effort_path_display()))]
    WriteFileError {
        path: PathBuf,
        source: std::io::Error,
    },
}
