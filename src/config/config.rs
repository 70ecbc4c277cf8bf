use compio::{fs::File, io::AsyncReadExt, io::BufReader};
use hashlink::LinkedHashMap;
use saphyr::{LoadableYamlNode, Scalar, Yaml};
use snafu::prelude::*;
use std::{io::Cursor, path::Path};
use tracing::debug;

use crate::{ext::BestEffortPathExt, tree::BuildOptions};

const DEPTH_KEY: &str = "depth";
const INCLUDE_CONTENT_KEY: &str = "include-file-content";
const INCLUDE_DIRS_KEY: &str = "include-dirs";
const EXCLUDE_DIRS_KEY: &str = "exclude-dirs";
const RESPECT_GITIGNORE_KEY: &str = "respect-gitignore";

/// Defaults for `import-dir` read from a YAML options file.
///
/// Every key is optional; a missing key leaves the built-in default alone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OptionsFile {
    /// Negative values mean unlimited.
    pub depth: Option<i64>,
    pub include_file_content: Option<Vec<String>>,
    pub include_dirs: Option<Vec<String>>,
    pub exclude_dirs: Option<Vec<String>>,
    pub respect_gitignore: Option<bool>,
}

impl OptionsFile {
    pub async fn from_path(path: &Path) -> Result<Self, OptionsFileError> {
        debug!("Opening options file: {}", path.best_effort_path_display());
        let file = File::open(path).await.context(ReadSnafu {
            file_path: path.best_effort_path_display(),
        })?;

        let mut reader = BufReader::new(Cursor::new(file));
        let res = reader.read_to_string(String::new()).await;
        let n = res.0.context(ReadSnafu {
            file_path: path.best_effort_path_display(),
        })?;
        debug!("Successfully read options file: {n} bytes");

        res.1.as_str().try_into()
    }

    /// Layers the values present in this file over `options`.
    pub fn apply(&self, mut options: BuildOptions) -> BuildOptions {
        if let Some(depth) = self.depth {
            options.max_depth = BuildOptions::depth_from_signed(depth);
        }
        if let Some(patterns) = &self.include_file_content {
            options.include_content = patterns.clone();
        }
        if let Some(patterns) = &self.include_dirs {
            options.include_dirs = patterns.clone();
        }
        if let Some(patterns) = &self.exclude_dirs {
            options.exclude_dirs = patterns.clone();
        }
        if let Some(respect) = self.respect_gitignore {
            options.respect_ignore_files = respect;
        }
        options
    }

    fn parse_top_level(top_level: &LinkedHashMap<Yaml, Yaml>) -> Result<Self, OptionsFileError> {
        let mut options = OptionsFile::default();

        for (key, value) in top_level {
            let Yaml::Value(Scalar::String(key)) = key else {
                debug!("Skipping non-string options key: {:?}", key);
                continue;
            };
            match key.as_ref() {
                DEPTH_KEY => options.depth = Some(parse_integer(DEPTH_KEY, value)?),
                INCLUDE_CONTENT_KEY => {
                    options.include_file_content = Some(parse_patterns(INCLUDE_CONTENT_KEY, value)?)
                }
                INCLUDE_DIRS_KEY => {
                    options.include_dirs = Some(parse_patterns(INCLUDE_DIRS_KEY, value)?)
                }
                EXCLUDE_DIRS_KEY => {
                    options.exclude_dirs = Some(parse_patterns(EXCLUDE_DIRS_KEY, value)?)
                }
                RESPECT_GITIGNORE_KEY => {
                    options.respect_gitignore = Some(parse_bool(RESPECT_GITIGNORE_KEY, value)?)
                }
                other => debug!("Ignoring unknown options key: {}", other),
            }
        }

        Ok(options)
    }
}

fn parse_integer(key: &str, value: &Yaml) -> Result<i64, OptionsFileError> {
    match value {
        Yaml::Value(Scalar::Integer(n)) => Ok(*n),
        _ => InvalidValueSnafu {
            key,
            expected: "an integer",
        }
        .fail(),
    }
}

fn parse_bool(key: &str, value: &Yaml) -> Result<bool, OptionsFileError> {
    match value {
        Yaml::Value(Scalar::Boolean(b)) => Ok(*b),
        _ => InvalidValueSnafu {
            key,
            expected: "a boolean",
        }
        .fail(),
    }
}

/// Accepts a list of globs or a single comma-separated string.
fn parse_patterns(key: &str, value: &Yaml) -> Result<Vec<String>, OptionsFileError> {
    let invalid = || InvalidValueSnafu {
        key,
        expected: "a list of glob patterns",
    };

    match value {
        Yaml::Value(Scalar::String(list)) => Ok(split_patterns(list)),
        Yaml::Sequence(items) => items
            .iter()
            .map(|item| match item {
                Yaml::Value(Scalar::String(pattern)) => Ok(pattern.to_string()),
                _ => invalid().fail(),
            })
            .collect(),
        _ => invalid().fail(),
    }
}

/// Splits a comma-separated glob list, dropping empty items.
pub fn split_patterns(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|pattern| !pattern.is_empty())
        .map(ToString::to_string)
        .collect()
}

impl TryFrom<&str> for OptionsFile {
    type Error = OptionsFileError;

    fn try_from(contents: &str) -> Result<Self, Self::Error> {
        let contents_vec = Yaml::load_from_str(contents).context(ParseSnafu)?;
        match contents_vec.first() {
            None | Some(Yaml::Value(Scalar::Null)) => Ok(OptionsFile::default()),
            Some(Yaml::Mapping(top_level)) => Self::parse_top_level(top_level),
            Some(_) => Err(OptionsFileError::TopLevelNotMap),
        }
    }
}

#[derive(Debug, Snafu)]
pub enum OptionsFileError {
    #[snafu(display("Failed to read the options file: {}", file_path))]
    ReadError {
        file_path: String,
        source: std::io::Error,
    },
    #[snafu(display("Failed to parse the options file"))]
    ParseError { source: saphyr::ScanError },
    #[snafu(display("Top level of the options file should be a map"))]
    TopLevelNotMap,
    #[snafu(display("Option '{}' should be {}", key, expected))]
    InvalidValueError { key: String, expected: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use tempfile::NamedTempFile;

    #[compio::test]
    async fn options_return_error_on_nonexistent_file() {
        let result = OptionsFile::from_path(Path::new("nonexistent.yaml")).await;
        assert!(matches!(result, Err(OptionsFileError::ReadError { .. })));
    }

    #[compio::test]
    async fn options_are_read_from_disk() {
        let file = NamedTempFile::new().expect("Failed to create temp file");
        std::fs::write(file.path(), "depth: 2\nexclude-dirs: [target]\n").expect("Failed to write");

        let options = OptionsFile::from_path(file.path()).await.unwrap();

        assert_eq!(options.depth, Some(2));
        assert_eq!(options.exclude_dirs, Some(vec!["target".to_string()]));
    }

    #[test]
    fn options_return_error_on_invalid_yaml() {
        let result: Result<OptionsFile, _> = "invalid: yaml: content: [unclosed".try_into();
        assert!(matches!(result, Err(OptionsFileError::ParseError { .. })));
    }

    #[rstest]
    #[case("")]
    #[case("~\n")]
    #[case("{}\n")]
    fn empty_options_keep_defaults(#[case] contents: &str) {
        let result: Result<OptionsFile, _> = contents.try_into();
        assert_eq!(result.unwrap(), OptionsFile::default());
    }

    #[rstest]
    #[case("- item1\n- item2")]
    #[case("just a string")]
    fn options_return_error_when_top_level_is_not_map(#[case] contents: &str) {
        let result: Result<OptionsFile, _> = contents.try_into();
        assert!(matches!(result, Err(OptionsFileError::TopLevelNotMap)));
    }

    #[test]
    fn options_parse_every_key() {
        let contents = r#"
depth: 3
include-file-content: ["*.rs", "*.toml"]
include-dirs: "src, tests"
exclude-dirs: [target]
respect-gitignore: false
unknown-key: whatever
"#;
        let options: OptionsFile = contents.try_into().unwrap();

        assert_eq!(
            options,
            OptionsFile {
                depth: Some(3),
                include_file_content: Some(vec!["*.rs".into(), "*.toml".into()]),
                include_dirs: Some(vec!["src".into(), "tests".into()]),
                exclude_dirs: Some(vec!["target".into()]),
                respect_gitignore: Some(false),
            }
        );
    }

    #[rstest]
    #[case("depth: deep", "depth")]
    #[case("respect-gitignore: 1", "respect-gitignore")]
    #[case("include-dirs: {a: b}", "include-dirs")]
    #[case("exclude-dirs: [1, 2]", "exclude-dirs")]
    fn options_reject_wrong_types(#[case] contents: &str, #[case] expected_key: &str) {
        let result: Result<OptionsFile, _> = contents.try_into();
        match result {
            Err(OptionsFileError::InvalidValueError { key, .. }) => assert_eq!(key, expected_key),
            other => panic!("Expected InvalidValueError, got {other:?}"),
        }
    }

    #[test]
    fn options_override_only_present_values() {
        let options = OptionsFile {
            depth: Some(-1),
            exclude_dirs: Some(vec!["target".into()]),
            ..OptionsFile::default()
        };

        let applied = options.apply(BuildOptions::default().with_max_depth(Some(4)));

        assert_eq!(applied.max_depth, None);
        assert_eq!(applied.exclude_dirs, vec!["target".to_string()]);
        assert_eq!(applied.include_content, vec!["*".to_string()]);
        assert!(applied.respect_ignore_files);
    }

    #[rstest]
    #[case("*.rs,*.toml", &["*.rs", "*.toml"])]
    #[case(" a , ,b ", &["a", "b"])]
    #[case("", &[])]
    fn splits_comma_separated_patterns(#[case] list: &str, #[case] expected: &[&str]) {
        assert_eq!(split_patterns(list), expected);
    }
}
