use std::collections::BTreeMap;

use snafu::Snafu;

use crate::ext::RelativePathExt;

/// In-memory form of a document: a directory of named children or a file.
///
/// Names never contain `/` and are never empty. Children are kept in name
/// order so every traversal is deterministic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeNode {
    Directory(BTreeMap<String, TreeNode>),
    /// `None` when content was not loaded, otherwise text with `\n` line endings.
    File(Option<String>),
}

impl Default for TreeNode {
    fn default() -> Self {
        Self::root()
    }
}

impl TreeNode {
    /// An empty directory, used as the root of every tree.
    pub fn root() -> Self {
        TreeNode::Directory(BTreeMap::new())
    }

    pub fn file(content: Option<impl Into<String>>) -> Self {
        TreeNode::File(content.map(Into::into))
    }

    pub fn is_dir(&self) -> bool {
        matches!(self, TreeNode::Directory(_))
    }

    pub fn children(&self) -> Option<&BTreeMap<String, TreeNode>> {
        match self {
            TreeNode::Directory(children) => Some(children),
            TreeNode::File(_) => None,
        }
    }

    /// Looks up a descendant by slash-separated relative path.
    pub fn get(&self, path: &str) -> Option<&TreeNode> {
        path.segments()
            .try_fold(self, |node, segment| node.children()?.get(segment))
    }

    /// Places `node` at `path`, creating intermediate directories on the way.
    ///
    /// Existing directories are reused, never replaced: inserting a directory
    /// where one already exists keeps the existing one and its children.
    pub fn try_insert_path(
        &mut self,
        path: &str,
        node: TreeNode,
    ) -> Result<(), CannotInsertIntoFileError> {
        let mut segments = path.segments().peekable();
        let mut current = self;

        while let Some(name) = segments.next() {
            let TreeNode::Directory(children) = current else {
                return Err(CannotInsertIntoFileError {
                    path: path.to_string(),
                });
            };

            if segments.peek().is_none() {
                let keep_existing =
                    node.is_dir() && children.get(name).is_some_and(TreeNode::is_dir);
                if !keep_existing {
                    children.insert(name.to_string(), node);
                }
                return Ok(());
            }

            current = children
                .entry(name.to_string())
                .or_insert_with(TreeNode::root);
        }

        Ok(())
    }

    /// Number of nodes below this one.
    pub fn descendant_count(&self) -> usize {
        self.children().map_or(0, |children| {
            children
                .values()
                .map(|child| 1 + child.descendant_count())
                .sum()
        })
    }
}

#[derive(Debug, Snafu)]
#[snafu(display("Cannot insert {} below a file", path))]
pub struct CannotInsertIntoFileError {
    path: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inserts_with_intermediate_directories() {
        let mut root = TreeNode::root();
        root.try_insert_path("a/c/d.txt", TreeNode::file(Some("y")))
            .unwrap();

        assert!(root.get("a").unwrap().is_dir());
        assert!(root.get("a/c").unwrap().is_dir());
        assert_eq!(root.get("a/c/d.txt"), Some(&TreeNode::file(Some("y"))));
    }

    #[test]
    fn does_not_overwrite_existing_directory() {
        let mut root = TreeNode::root();
        root.try_insert_path("a/b.txt", TreeNode::file(Some("x")))
            .unwrap();
        root.try_insert_path("a", TreeNode::root()).unwrap();

        assert_eq!(root.get("a/b.txt"), Some(&TreeNode::file(Some("x"))));
    }

    #[test]
    fn refuses_to_descend_into_a_file() {
        let mut root = TreeNode::root();
        root.try_insert_path("a", TreeNode::file(None::<String>))
            .unwrap();

        let result = root.try_insert_path("a/b.txt", TreeNode::file(None::<String>));
        assert!(result.is_err());
        assert!(format!("{}", result.unwrap_err()).contains("a/b.txt"));
    }

    #[test]
    fn counts_descendants() {
        let mut root = TreeNode::root();
        root.try_insert_path("a/b.txt", TreeNode::file(Some("x")))
            .unwrap();
        root.try_insert_path("c", TreeNode::root()).unwrap();

        assert_eq!(root.descendant_count(), 3);
        assert_eq!(root.get("missing"), None);
        assert_eq!(root.get(""), Some(&root));
    }
}
