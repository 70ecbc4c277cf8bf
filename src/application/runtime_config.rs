use supports_color::Stream;

use crate::cli::{Cli, Command};

/// Everything a run needs once the command line has been parsed.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub command: Command,
    /// Whether stdout accepts ANSI colours.
    pub color: bool,
}

impl From<Cli> for RuntimeConfig {
    fn from(cli: Cli) -> Self {
        Self {
            command: cli.command,
            color: supports_color::on(Stream::Stdout).is_some(),
        }
    }
}

impl From<Command> for RuntimeConfig {
    fn from(command: Command) -> Self {
        Self {
            command,
            color: false,
        }
    }
}
