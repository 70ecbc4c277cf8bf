use snafu::{ResultExt, Snafu, ensure};
use tracing::debug;

use crate::ext::{RelativePathExt, SEPARATOR};
use crate::tree::TreeNode;
use crate::vfs::{VfsError, VirtualFs};

/// Flattens a nested tree into a path-indexed [`VirtualFs`].
///
/// Names are checked again here, since trees may come from untrusted
/// documents and a name like `..` or `a/b` would otherwise escape its parent.
pub fn materialize(tree: &TreeNode) -> Result<VirtualFs, MaterializeError> {
    let TreeNode::Directory(children) = tree else {
        return Err(MaterializeError::RootNotDirectoryError);
    };

    let mut fs = VirtualFs::new();
    for (name, child) in children {
        register(&mut fs, "", name, child)?;
    }
    debug!("Materialized {} entries", fs.len());
    Ok(fs)
}

fn register(
    fs: &mut VirtualFs,
    parent: &str,
    name: &str,
    node: &TreeNode,
) -> Result<(), MaterializeError> {
    let path = parent.join_segment(name);
    ensure!(is_valid_name(name), InvalidNameSnafu { path: &path });

    match node {
        TreeNode::Directory(children) => {
            fs.add_dir(&path).context(RegisterSnafu { path: &path })?;
            for (child_name, child) in children {
                register(fs, &path, child_name, child)?;
            }
        }
        TreeNode::File(content) => {
            let bytes = content.as_deref().unwrap_or_default().as_bytes();
            fs.add_file(&path, bytes).context(RegisterSnafu { path: &path })?;
        }
    }
    Ok(())
}

fn is_valid_name(name: &str) -> bool {
    !name.is_empty() && name != "." && name != ".." && !name.contains(SEPARATOR)
}

impl TryFrom<&TreeNode> for VirtualFs {
    type Error = MaterializeError;

    fn try_from(tree: &TreeNode) -> Result<Self, Self::Error> {
        materialize(tree)
    }
}

#[derive(Debug, Snafu)]
pub enum MaterializeError {
    #[snafu(display("The root of the tree must be a directory"))]
    RootNotDirectoryError,
    #[snafu(display("'{}' does not end in a valid entry name", path))]
    InvalidNameError { path: String },
    #[snafu(display("Failed to register '{}'", path))]
    RegisterError { path: String, source: VfsError },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{DirEntry, EntryKind};
    use crate::tree::{BuildOptions, build};
    use rstest::rstest;
    use std::collections::BTreeMap;

    fn dir<const N: usize>(children: [(&str, TreeNode); N]) -> TreeNode {
        TreeNode::Directory(
            children
                .into_iter()
                .map(|(name, node)| (name.to_string(), node))
                .collect::<BTreeMap<_, _>>(),
        )
    }

    #[test]
    fn registers_directories_and_files() {
        let tree = dir([
            ("a", dir([("b.txt", TreeNode::file(Some("x"))), ("c", dir([]))])),
            ("top.bin", TreeNode::File(None)),
        ]);

        let fs = materialize(&tree).unwrap();

        assert_eq!(fs.read_file("a/b.txt").unwrap(), b"x");
        assert_eq!(fs.read_file("top.bin").unwrap(), b"");
        assert!(fs.is_dir("a/c"));
        assert_eq!(
            fs.read_dir("a").unwrap(),
            vec![
                DirEntry::new("b.txt", EntryKind::File),
                DirEntry::new("c", EntryKind::Directory),
            ]
        );
    }

    #[test]
    fn empty_tree_gives_empty_filesystem() {
        let fs = VirtualFs::try_from(&TreeNode::root()).unwrap();
        assert!(fs.is_empty());
        assert!(fs.read_dir("").unwrap().is_empty());
    }

    #[test]
    fn root_must_be_a_directory() {
        let result = materialize(&TreeNode::file(Some("x")));
        assert!(matches!(result, Err(MaterializeError::RootNotDirectoryError)));
    }

    #[rstest]
    #[case("..")]
    #[case(".")]
    #[case("")]
    #[case("a/b")]
    fn rejects_escaping_names(#[case] name: &str) {
        let tree = dir([("ok", dir([(name, TreeNode::File(None))]))]);
        let result = materialize(&tree);
        assert!(matches!(result, Err(MaterializeError::InvalidNameError { .. })));
    }

    #[test]
    fn round_trips_a_built_source() {
        let mut source = VirtualFs::new();
        source.add_file("src/main.go", "package main\n").unwrap();
        source.add_file("src/data.bin", "raw").unwrap();
        source.add_file("README.md", "# hi\n").unwrap();
        source.add_dir("empty").unwrap();

        let options = BuildOptions::default()
            .with_include_content(["*.go", "*.md"])
            .with_respect_ignore_files(false);
        let rebuilt = materialize(&build(&source, &options).unwrap()).unwrap();

        let paths = |fs: &VirtualFs| {
            fs.walk()
                .into_iter()
                .map(|e| (e.path().to_string(), e.kind()))
                .collect::<Vec<_>>()
        };
        assert_eq!(paths(&rebuilt), paths(&source));
        assert_eq!(rebuilt.read_file("src/main.go").unwrap(), b"package main\n");
        assert_eq!(rebuilt.read_file("src/data.bin").unwrap(), b"");
    }

    #[test]
    fn ignored_files_are_not_materialized() {
        let mut source = VirtualFs::new();
        source.add_file(".gitignore", "*.log\n").unwrap();
        source.add_file("app.log", "noise").unwrap();
        source.add_file("app.go", "package app").unwrap();

        let fs = materialize(&build(&source, &BuildOptions::default()).unwrap()).unwrap();

        let names: Vec<_> = fs.read_dir("").unwrap().into_iter().map(|e| e.name).collect();
        assert_eq!(names, [".gitignore", "app.go"]);
    }
}
