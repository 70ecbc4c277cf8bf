//! In-memory filesystem materialized from a nested tree.
//!
//! [`VirtualFs`] indexes every entry by its relative path and answers
//! listing and read queries. It can be printed as a tree or written back to
//! disk.

mod disk_writer;
mod materializer;
mod render;
mod virtual_fs;

pub use disk_writer::{WriteDirError, write_dir};
pub use materializer::{MaterializeError, materialize};
pub use render::render_tree;
pub use virtual_fs::{VfsEntry, VfsError, VirtualFs};
