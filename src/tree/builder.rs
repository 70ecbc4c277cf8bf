use snafu::{ResultExt, Snafu};
use tracing::{debug, trace, warn};

use crate::ext::RelativePathExt;
use crate::glob::matches_any;
use crate::ignore::IgnoreScope;
use crate::source::{SourceError, SourceFs};
use crate::tree::{CannotInsertIntoFileError, TreeNode};

/// Directory name skipped by every walk, whatever the options say.
const GIT_DIR_NAME: &str = ".git";

/// Policy applied while walking a source into a [`TreeNode`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildOptions {
    /// Deepest level kept, top-level entries being level 0. `None` is unlimited.
    pub max_depth: Option<usize>,
    /// Globs selecting the files whose content is read, by base name.
    pub include_content: Vec<String>,
    /// A directory must match one of these by base name to be entered.
    pub include_dirs: Vec<String>,
    /// A directory matching any of these by base name is skipped.
    pub exclude_dirs: Vec<String>,
    /// Honor `.gitignore` files found along the walk.
    pub respect_ignore_files: bool,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            max_depth: None,
            include_content: vec!["*".to_string()],
            include_dirs: vec!["*".to_string()],
            exclude_dirs: Vec::new(),
            respect_ignore_files: true,
        }
    }
}

impl BuildOptions {
    /// Converts a signed depth where any negative value means unlimited.
    pub fn depth_from_signed(depth: i64) -> Option<usize> {
        usize::try_from(depth).ok()
    }

    pub fn with_max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_include_content<S: Into<String>>(
        mut self,
        patterns: impl IntoIterator<Item = S>,
    ) -> Self {
        self.include_content = patterns.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_include_dirs<S: Into<String>>(
        mut self,
        patterns: impl IntoIterator<Item = S>,
    ) -> Self {
        self.include_dirs = patterns.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_exclude_dirs<S: Into<String>>(
        mut self,
        patterns: impl IntoIterator<Item = S>,
    ) -> Self {
        self.exclude_dirs = patterns.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_respect_ignore_files(mut self, respect: bool) -> Self {
        self.respect_ignore_files = respect;
        self
    }

    fn exceeds_depth(&self, path: &str) -> bool {
        self.max_depth.is_some_and(|max| path.depth() > max)
    }

    fn accepts_dir(&self, name: &str) -> bool {
        matches_any(name, &self.include_dirs) && !matches_any(name, &self.exclude_dirs)
    }
}

/// Walks `source` depth-first and returns the nested tree of everything the
/// options keep. The root itself is the returned directory node.
///
/// A directory that cannot be listed, or a selected file that cannot be read,
/// fails the whole build. A selected file whose bytes are not UTF-8 is kept
/// without content.
pub fn build<S: SourceFs + ?Sized>(
    source: &S,
    options: &BuildOptions,
) -> Result<TreeNode, BuildError> {
    let mut builder = TreeBuilder {
        source,
        options,
        tree: TreeNode::root(),
    };

    let root_scope = options
        .respect_ignore_files
        .then(|| IgnoreScope::load(source, ""));
    builder.walk("", root_scope.as_ref())?;

    debug!("Built tree with {} nodes", builder.tree.descendant_count());
    Ok(builder.tree)
}

struct TreeBuilder<'a, S: ?Sized> {
    source: &'a S,
    options: &'a BuildOptions,
    tree: TreeNode,
}

impl<S: SourceFs + ?Sized> TreeBuilder<'_, S> {
    fn walk(&mut self, dir: &str, scope: Option<&IgnoreScope<'_>>) -> Result<(), BuildError> {
        let mut entries = self
            .source
            .read_dir(dir)
            .context(ListDirSnafu { path: display(dir) })?;
        entries.sort_by(|a, b| a.name.cmp(&b.name));

        for entry in entries {
            let path = dir.join_segment(&entry.name);
            let is_dir = entry.kind.is_dir();

            if is_dir && entry.name == GIT_DIR_NAME {
                trace!("Skipping git directory {}", path);
                continue;
            }

            if self.options.exceeds_depth(&path) {
                trace!("Skipping {} beyond depth limit", path);
                continue;
            }

            if scope.is_some_and(|scope| scope.matches(&path, is_dir)) {
                debug!("Skipping ignored {} {}", entry.kind, path);
                continue;
            }

            if is_dir {
                if !self.options.accepts_dir(&entry.name) {
                    debug!("Skipping directory {} excluded by patterns", path);
                    continue;
                }
                self.insert(&path, TreeNode::root())?;

                let child_scope =
                    scope.map(|parent| IgnoreScope::child(parent, self.source, &path));
                self.walk(&path, child_scope.as_ref())?;
            } else {
                let content = self.read_content(&path, &entry.name)?;
                self.insert(&path, TreeNode::File(content))?;
            }
        }

        Ok(())
    }

    fn read_content(&self, path: &str, name: &str) -> Result<Option<String>, BuildError> {
        if !matches_any(name, &self.options.include_content) {
            return Ok(None);
        }
        let bytes = self
            .source
            .read_file(path)
            .context(ReadFileSnafu { path })?;
        match String::from_utf8(bytes) {
            Ok(text) => Ok(Some(text.replace("\r\n", "\n"))),
            Err(err) => {
                warn!("Keeping {} without content: {}", path, err.utf8_error());
                Ok(None)
            }
        }
    }

    fn insert(&mut self, path: &str, node: TreeNode) -> Result<(), BuildError> {
        self.tree
            .try_insert_path(path, node)
            .context(InsertSnafu { path })
    }
}

fn display(path: &str) -> &str {
    if path.is_empty() { "." } else { path }
}

#[derive(Debug, Snafu)]
pub enum BuildError {
    #[snafu(display("Failed to list directory '{}'", path))]
    ListDirError { path: String, source: SourceError },
    #[snafu(display("Failed to read '{}'", path))]
    ReadFileError { path: String, source: SourceError },
    #[snafu(display("Failed to place '{}' in the tree", path))]
    InsertError {
        path: String,
        source: CannotInsertIntoFileError,
    },
}
