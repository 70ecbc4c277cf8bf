//! Snapshot directory trees into YAML documents and materialize documents
//! back into queryable in-memory filesystems.
//!
//! The flow in one direction is [`source::SourceFs`] → [`tree::build`] →
//! [`document::encode`]; in the other, [`document::load`] yields a
//! [`vfs::VirtualFs`] that can be listed, read, printed or written to disk.

#![allow(clippy::enum_variant_names)]

pub mod application;
pub mod cli;
pub mod config;
pub mod document;
pub mod ext;
pub mod glob;
pub mod ignore;
pub mod source;
pub mod tree;
pub mod vfs;
