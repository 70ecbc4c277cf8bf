use std::collections::HashSet;

use derive_more::Display;
use hashlink::LinkedHashMap;
use saphyr::{Scalar, Yaml};
use snafu::{ResultExt, Snafu};

use crate::document::codec::{self, split_key};
use crate::ext::{RelativePathExt, SEPARATOR};

/// Characters rejected in entry names, on top of control characters.
const FORBIDDEN_CHARS: [char; 8] = ['<', '>', ':', '"', '|', '?', '*', '\\'];

/// Structural checker for documents.
///
/// Build one and reuse it for every document.
#[derive(Debug, Clone)]
pub struct Validator {
    forbidden: HashSet<char>,
}

impl Default for Validator {
    fn default() -> Self {
        Self::new()
    }
}

impl Validator {
    pub fn new() -> Self {
        Self {
            forbidden: FORBIDDEN_CHARS.into_iter().collect(),
        }
    }

    /// Parses `text` and checks the first document in it. Empty text is a
    /// valid, empty document.
    pub fn validate_str(&self, text: &str) -> Result<(), ValidationError> {
        match codec::parse(text).context(UnparsableSnafu)? {
            Some(document) => self.validate(&document),
            None => Ok(()),
        }
    }

    /// Checks an already parsed document, reporting every problem found.
    pub fn validate(&self, document: &Yaml) -> Result<(), ValidationError> {
        let mut issues = Vec::new();
        match document {
            Yaml::Value(Scalar::Null) => {}
            Yaml::Mapping(mapping) => self.check_directory("", mapping, &mut issues),
            _ => issues.push(ValidationIssue::new("", Problem::TopLevelNotMapping)),
        }

        if issues.is_empty() {
            Ok(())
        } else {
            InvalidSnafu { issues }.fail()
        }
    }

    fn check_directory(
        &self,
        path: &str,
        mapping: &LinkedHashMap<Yaml, Yaml>,
        issues: &mut Vec<ValidationIssue>,
    ) {
        let mut seen = HashSet::new();

        for (key, value) in mapping {
            let Yaml::Value(Scalar::String(key)) = key else {
                issues.push(ValidationIssue::new(path, Problem::KeyNotString));
                continue;
            };

            let (name, is_dir) = split_key(key);
            let child_path = path.join_segment(key);
            if let Some(problem) = self.check_name(name) {
                issues.push(ValidationIssue::new(&child_path, problem));
                continue;
            }
            if !seen.insert(name) {
                issues.push(ValidationIssue::new(&child_path, Problem::DuplicateName));
            }

            let child_path = path.join_segment(name);
            let problem = match (is_dir, value) {
                (_, Yaml::Value(Scalar::Null)) | (false, Yaml::Value(Scalar::String(_))) => None,
                (true, Yaml::Mapping(nested)) => {
                    self.check_directory(&child_path, nested, issues);
                    None
                }
                (true, _) => Some(Problem::DirectoryNotMapping),
                (false, _) => Some(Problem::FileNotText),
            };
            if let Some(problem) = problem {
                issues.push(ValidationIssue::new(&child_path, problem));
            }
        }
    }

    fn check_name(&self, name: &str) -> Option<Problem> {
        if name.is_empty() {
            return Some(Problem::EmptyName);
        }
        if name == "." || name == ".." {
            return Some(Problem::ReservedName);
        }
        if name.contains(SEPARATOR) {
            return Some(Problem::SeparatorInName);
        }
        name.chars()
            .find(|c| c.is_control() || self.forbidden.contains(c))
            .map(Problem::ForbiddenCharacter)
    }
}

/// What is wrong with one entry of a document.
#[derive(Debug, Display, Clone, PartialEq, Eq)]
pub enum Problem {
    #[display("top level must be a mapping or null")]
    TopLevelNotMapping,
    #[display("keys must be strings")]
    KeyNotString,
    #[display("name is empty")]
    EmptyName,
    #[display("'.' and '..' are reserved names")]
    ReservedName,
    #[display("only a single trailing '/' is allowed")]
    SeparatorInName,
    #[display("name contains forbidden character {_0:?}")]
    ForbiddenCharacter(char),
    #[display("name is defined more than once")]
    DuplicateName,
    #[display("directory must map to a mapping or null")]
    DirectoryNotMapping,
    #[display("file must map to a string or null")]
    FileNotText,
}

/// A [`Problem`] together with the key path it was found at.
#[derive(Debug, Display, Clone, PartialEq, Eq)]
#[display("{}: {problem}", if path.is_empty() { "<root>" } else { path.as_str() })]
pub struct ValidationIssue {
    pub path: String,
    pub problem: Problem,
}

impl ValidationIssue {
    fn new(path: &str, problem: Problem) -> Self {
        Self {
            path: path.to_string(),
            problem,
        }
    }
}

#[derive(Debug, Snafu)]
pub enum ValidationError {
    #[snafu(display("Document could not be parsed"))]
    UnparsableError { source: codec::DocumentError },
    #[snafu(display("Document is invalid: {}", join_issues(issues)))]
    InvalidError { issues: Vec<ValidationIssue> },
}

fn join_issues(issues: &[ValidationIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl ValidationError {
    /// Problems found, empty when the text did not parse.
    pub fn issues(&self) -> &[ValidationIssue] {
        match self {
            ValidationError::UnparsableError { .. } => &[],
            ValidationError::InvalidError { issues } => issues,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ordered_float::OrderedFloat;
    use rstest::rstest;
    use std::borrow::Cow;

    fn problems(text: &str) -> Vec<(String, Problem)> {
        match Validator::new().validate_str(text) {
            Ok(()) => Vec::new(),
            Err(err) => err
                .issues()
                .iter()
                .map(|issue| (issue.path.clone(), issue.problem.clone()))
                .collect(),
        }
    }

    #[rstest]
    #[case("")]
    #[case("~\n")]
    #[case("{}\n")]
    #[case("src/:\n  main.go: |\n    package main\nempty/:\nnotes.txt:\n")]
    #[case("\"with space.txt\": x\n")]
    #[case("body.py: \"    return x\\n\\n\"\n")]
    fn accepts_well_formed_documents(#[case] text: &str) {
        assert!(Validator::new().validate_str(text).is_ok());
    }

    #[rstest]
    #[case("- a\n", "", Problem::TopLevelNotMapping)]
    #[case("42\n", "", Problem::TopLevelNotMapping)]
    #[case("1: x\n", "", Problem::KeyNotString)]
    #[case("/: x\n", "/", Problem::EmptyName)]
    #[case("../: x\n", "../", Problem::ReservedName)]
    #[case("a/b: x\n", "a/b", Problem::SeparatorInName)]
    #[case("a//: x\n", "a//", Problem::SeparatorInName)]
    #[case("\"a|b\": x\n", "a|b", Problem::ForbiddenCharacter('|'))]
    #[case("\"tab\\there\": x\n", "tab\there", Problem::ForbiddenCharacter('\t'))]
    #[case("src/: text\n", "src", Problem::DirectoryNotMapping)]
    #[case("main.go: [1]\n", "main.go", Problem::FileNotText)]
    #[case("a: x\na/:\n", "a/", Problem::DuplicateName)]
    fn reports_single_problem(#[case] text: &str, #[case] path: &str, #[case] expected: Problem) {
        assert_eq!(problems(text), vec![(path.to_string(), expected)]);
    }

    #[test]
    fn collects_every_problem_with_its_path() {
        let text = "\
src/:
  ok.go: x
  bad/: 1
  \"x*y\": z
count: 7
";
        assert_eq!(
            problems(text),
            vec![
                ("src/bad".to_string(), Problem::DirectoryNotMapping),
                ("src/x*y".to_string(), Problem::ForbiddenCharacter('*')),
                ("count".to_string(), Problem::FileNotText),
            ]
        );
    }

    #[test]
    fn invalid_error_lists_every_issue() {
        let err = Validator::new().validate_str("a/: 1\nb: [x]\n").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Document is invalid: a: directory must map to a mapping or null; \
             b: file must map to a string or null"
        );
    }

    #[test]
    fn rejects_float_file_content() {
        let mut mapping = LinkedHashMap::new();
        mapping.insert(
            Yaml::Value(Scalar::String(Cow::Borrowed("ratio"))),
            Yaml::Value(Scalar::FloatingPoint(OrderedFloat(0.5))),
        );

        let err = Validator::new()
            .validate(&Yaml::Mapping(mapping))
            .unwrap_err();
        assert_eq!(
            err.issues(),
            [ValidationIssue::new("ratio", Problem::FileNotText)]
        );
        assert_eq!(
            err.to_string(),
            "Document is invalid: ratio: file must map to a string or null"
        );
    }

    #[test]
    fn unparsable_text_is_reported() {
        let result = Validator::new().validate_str("invalid: yaml: content: [unclosed");
        assert!(matches!(result, Err(ValidationError::UnparsableError { .. })));
    }
}
