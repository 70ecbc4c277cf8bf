use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::tree::BuildOptions;

/// Snapshot directory trees into YAML documents and back.
#[derive(Parser, Debug, Clone)]
#[command(version, about)]
pub struct Cli {
    #[clap(long, short, default_value = "warn", value_enum, global = true)]
    pub log_level: LogLevel,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Create a document from a directory tree
    ///
    /// Directories must match --include-dirs and not match --exclude-dirs.
    /// Files not matching --include-file-content are listed without content.
    /// .gitignore files are respected and cumulative unless --no-gitignore is
    /// given. The .git directory is always excluded.
    ImportDir(ImportDirArgs),
    /// Create a directory structure from a document
    WriteDir(WriteDirArgs),
    /// Print the tree structure of a document
    PrintTree(PrintTreeArgs),
    /// Check that a document is well formed
    Validate(ValidateArgs),
}

#[derive(Args, Debug, Clone)]
pub struct ImportDirArgs {
    /// Source directory to scan
    #[arg(long)]
    pub src_dir: PathBuf,

    /// Output file, stdout when omitted
    #[arg(long)]
    pub out_file: Option<PathBuf>,

    /// Maximum traversal depth, -1 for unlimited
    #[arg(long, allow_negative_numbers = true)]
    pub depth: Option<i64>,

    /// Globs selecting files whose content is captured (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub include_file_content: Option<Vec<String>>,

    /// Globs selecting directories to descend into (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub include_dirs: Option<Vec<String>>,

    /// Globs selecting directories to skip (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub exclude_dirs: Option<Vec<String>>,

    /// Do not read .gitignore files
    #[arg(long)]
    pub no_gitignore: bool,

    /// YAML file providing defaults for the options above
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl ImportDirArgs {
    /// Layers the flags given on the command line over `options`.
    pub fn apply(&self, mut options: BuildOptions) -> BuildOptions {
        if let Some(depth) = self.depth {
            options.max_depth = BuildOptions::depth_from_signed(depth);
        }
        if let Some(patterns) = &self.include_file_content {
            options.include_content = clean(patterns);
        }
        if let Some(patterns) = &self.include_dirs {
            options.include_dirs = clean(patterns);
        }
        if let Some(patterns) = &self.exclude_dirs {
            options.exclude_dirs = clean(patterns);
        }
        if self.no_gitignore {
            options.respect_ignore_files = false;
        }
        options
    }
}

fn clean(patterns: &[String]) -> Vec<String> {
    patterns
        .iter()
        .map(|pattern| pattern.trim())
        .filter(|pattern| !pattern.is_empty())
        .map(ToString::to_string)
        .collect()
}

#[derive(Args, Debug, Clone)]
pub struct WriteDirArgs {
    /// Source document
    #[arg(long)]
    pub src_file: PathBuf,

    /// Destination directory
    #[arg(long)]
    pub dest_dir: PathBuf,
}

#[derive(Args, Debug, Clone)]
pub struct PrintTreeArgs {
    /// Source document
    #[arg(long)]
    pub src_file: PathBuf,
}

#[derive(Args, Debug, Clone)]
pub struct ValidateArgs {
    /// Source document
    #[arg(long)]
    pub src_file: PathBuf,
}

/// Verbosity of the diagnostics written to stderr.
#[derive(Debug, Clone, Copy, ValueEnum, Default, PartialEq, Eq)]
pub enum LogLevel {
    Debug,
    Info,
    #[default]
    Warn,
    Error,
    /// No diagnostics at all
    Silent,
}

impl LogLevel {
    pub fn to_tracing_level(self) -> Option<tracing::Level> {
        match self {
            LogLevel::Debug => Some(tracing::Level::DEBUG),
            LogLevel::Info => Some(tracing::Level::INFO),
            LogLevel::Warn => Some(tracing::Level::WARN),
            LogLevel::Error => Some(tracing::Level::ERROR),
            LogLevel::Silent => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("dirsnap").chain(args.iter().copied()))
            .expect("Failed to parse arguments")
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_import_dir_flags() {
        let cli = parse(&[
            "import-dir",
            "--src-dir",
            "project",
            "--depth",
            "-1",
            "--include-file-content",
            "*.rs,*.toml",
            "--exclude-dirs=target",
            "--no-gitignore",
        ]);

        let Command::ImportDir(args) = cli.command else {
            panic!("Expected import-dir");
        };
        assert_eq!(args.src_dir, PathBuf::from("project"));
        assert_eq!(args.depth, Some(-1));
        assert_eq!(
            args.include_file_content,
            Some(vec!["*.rs".to_string(), "*.toml".to_string()])
        );
        assert!(args.no_gitignore);
        assert_eq!(cli.log_level, LogLevel::Warn);
    }

    #[test]
    fn flags_override_defaults() {
        let cli = parse(&[
            "--log-level",
            "silent",
            "import-dir",
            "--src-dir",
            ".",
            "--depth",
            "2",
            "--include-dirs",
            "src, ,lib",
        ]);
        let Command::ImportDir(args) = cli.command else {
            panic!("Expected import-dir");
        };

        let options = args.apply(BuildOptions::default().with_exclude_dirs(["target"]));

        assert_eq!(options.max_depth, Some(2));
        assert_eq!(options.include_dirs, vec!["src".to_string(), "lib".to_string()]);
        assert_eq!(options.exclude_dirs, vec!["target".to_string()]);
        assert!(options.respect_ignore_files);
        assert_eq!(cli.log_level.to_tracing_level(), None);
    }

    #[rstest]
    #[case(&["write-dir", "--src-file", "fs.yml"])]
    #[case(&["print-tree"])]
    #[case(&["import-dir"])]
    fn missing_required_flags_are_rejected(#[case] args: &[&str]) {
        let result = Cli::try_parse_from(std::iter::once("dirsnap").chain(args.iter().copied()));
        assert!(result.is_err());
    }
}
