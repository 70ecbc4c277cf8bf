use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::string::FromUtf8Error;

use compio::fs;
use snafu::Snafu;
use snafu::prelude::*;
use tracing::{debug, info};

use crate::application::RuntimeConfig;
use crate::cli::{Command, ImportDirArgs, PrintTreeArgs, ValidateArgs, WriteDirArgs};
use crate::config::{OptionsFile, OptionsFileError};
use crate::document::{self, DocumentError, LoadError, ValidationError, Validator};
use crate::ext::BestEffortPathExt;
use crate::source::DiskSource;
use crate::tree::{self, BuildOptions};
use crate::vfs::{self, VirtualFs, WriteDirError};

pub struct Application;

impl Application {
    pub async fn run(app_config: impl Into<RuntimeConfig>) -> Result<(), ApplicationError> {
        let app_config: RuntimeConfig = app_config.into();
        let validator = Validator::new();

        match &app_config.command {
            Command::ImportDir(args) => Self::import_dir(args).await,
            Command::WriteDir(args) => Self::write_dir(args, &validator).await,
            Command::PrintTree(args) => Self::print_tree(args, &validator, app_config.color).await,
            Command::Validate(args) => Self::validate(args, &validator).await,
        }
    }

    async fn import_dir(args: &ImportDirArgs) -> Result<(), ApplicationError> {
        let mut options = BuildOptions::default();
        if let Some(config_path) = &args.config {
            options = OptionsFile::from_path(config_path)
                .await
                .context(OptionsSnafu)?
                .apply(options);
        }
        let options = args.apply(options);
        debug!("Resolved build options: {:?}", options);

        let metadata = fs::metadata(&args.src_dir).await.context(SourceDirSnafu {
            path: args.src_dir.clone(),
        })?;
        ensure!(
            metadata.is_dir(),
            NotADirectorySnafu {
                path: args.src_dir.clone()
            }
        );

        let tree = tree::build(&DiskSource::new(&args.src_dir), &options).context(BuildTreeSnafu)?;
        let text = document::encode(&tree).context(EncodeSnafu)?;
        info!(
            "Captured {} entries from {}",
            tree.descendant_count(),
            args.src_dir.best_effort_path_display()
        );

        match &args.out_file {
            Some(out_file) => fs::write(out_file, text.into_bytes())
                .await
                .0
                .context(WriteOutputSnafu { path: out_file.clone() }),
            None => print_stdout(&text),
        }
    }

    async fn write_dir(args: &WriteDirArgs, validator: &Validator) -> Result<(), ApplicationError> {
        let vfs = load_document(&args.src_file, validator).await?;
        vfs::write_dir(&vfs, &args.dest_dir)
            .await
            .context(WriteDestinationSnafu)
    }

    async fn print_tree(
        args: &PrintTreeArgs,
        validator: &Validator,
        color: bool,
    ) -> Result<(), ApplicationError> {
        let vfs = load_document(&args.src_file, validator).await?;
        print_stdout(&vfs::render_tree(&vfs, color))
    }

    async fn validate(args: &ValidateArgs, validator: &Validator) -> Result<(), ApplicationError> {
        let text = read_document(&args.src_file).await?;
        validator.validate_str(&text).context(InvalidDocumentSnafu {
            path: args.src_file.clone(),
        })?;
        print_stdout("valid\n")
    }
}

async fn read_document(path: &Path) -> Result<String, ApplicationError> {
    debug!("Reading document: {}", path.best_effort_path_display());
    let bytes = fs::read(path).await.context(ReadDocumentSnafu { path })?;
    String::from_utf8(bytes).context(DocumentNotUtf8Snafu { path })
}

async fn load_document(path: &Path, validator: &Validator) -> Result<VirtualFs, ApplicationError> {
    let text = read_document(path).await?;
    document::load(&text, validator).context(LoadDocumentSnafu { path })
}

fn print_stdout(text: &str) -> Result<(), ApplicationError> {
    let mut stdout = std::io::stdout().lock();
    stdout
        .write_all(text.as_bytes())
        .and_then(|()| stdout.flush())
        .context(StdoutSnafu)
}

#[derive(Debug, Snafu)]
pub enum ApplicationError {
    #[snafu(display("Failed to load the options file"))]
    OptionsError { source: OptionsFileError },
    #[snafu(display("Cannot access source directory {}", path.best_effort_path_display()))]
    SourceDirError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[snafu(display("{} is not a directory", path.best_effort_path_display()))]
    NotADirectoryError { path: PathBuf },
    #[snafu(display("Failed to capture the directory tree"))]
    BuildTreeError { source: tree::BuildError },
    #[snafu(display("Failed to encode the document"))]
    EncodeError { source: DocumentError },
    #[snafu(display("Failed to write {}", path.best_effort_path_display()))]
    WriteOutputError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[snafu(display("Failed to read document {}", path.best_effort_path_display()))]
    ReadDocumentError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[snafu(display("Document {} is not valid UTF-8", path.best_effort_path_display()))]
    DocumentNotUtf8Error { path: PathBuf, source: FromUtf8Error },
    #[snafu(display("Failed to load document {}", path.best_effort_path_display()))]
    LoadDocumentError { path: PathBuf, source: LoadError },
    #[snafu(display("Document {} is invalid", path.best_effort_path_display()))]
    InvalidDocumentError {
        path: PathBuf,
        source: ValidationError,
    },
    #[snafu(display("Failed to write the directory tree"))]
    WriteDestinationError { source: WriteDirError },
    #[snafu(display("Failed to write to stdout"))]
    StdoutError { source: std::io::Error },
}
