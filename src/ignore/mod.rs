//! Cascading `.gitignore`-style rules, scoped per directory.

mod rule;
mod scope;

pub use rule::IgnoreRule;
pub use scope::{IGNORE_FILE_NAME, IgnoreScope};
