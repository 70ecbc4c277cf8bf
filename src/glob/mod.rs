//! Shell-style glob matching of names and relative paths.

mod pattern;

pub use pattern::{matches, matches_any};
