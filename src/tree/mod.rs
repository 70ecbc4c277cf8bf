//! Nested tree representation of a directory and the walk that builds it.

mod builder;
mod node;

pub use builder::{BuildError, BuildOptions, build};
pub use node::{CannotInsertIntoFileError, TreeNode};
