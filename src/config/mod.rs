#[allow(clippy::module_inception)]
mod config;

pub use config::{OptionsFile, OptionsFileError, split_patterns};
