//! Text form of a tree: a YAML mapping whose keys are entry names.
//!
//! Keys ending in `/` are directories mapping to a nested mapping, or null
//! when empty. Other keys are files mapping to their text content, or null
//! when no content was captured.

mod codec;
mod validator;

use snafu::{ResultExt, Snafu};

pub use codec::{DocumentError, StructuralError, decode, decode_yaml, encode, parse};
pub use validator::{Problem, ValidationError, ValidationIssue, Validator};

use crate::vfs::{MaterializeError, VirtualFs, materialize};

/// Validates, decodes and materializes document text in one go.
pub fn load(text: &str, validator: &Validator) -> Result<VirtualFs, LoadError> {
    let tree = match parse(text).context(DecodeSnafu)? {
        Some(document) => {
            validator.validate(&document).context(ValidateSnafu)?;
            decode_yaml(&document).context(DecodeSnafu)?
        }
        None => crate::tree::TreeNode::root(),
    };
    materialize(&tree).context(MaterializeSnafu)
}

#[derive(Debug, Snafu)]
pub enum LoadError {
    #[snafu(display("Document failed validation"))]
    ValidateError { source: ValidationError },
    #[snafu(display("Failed to decode the document"))]
    DecodeError { source: DocumentError },
    #[snafu(display("Failed to build the virtual filesystem"))]
    MaterializeError { source: MaterializeError },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_a_document_into_a_filesystem() {
        let fs = load(
            "src/:\n  main.go: |\n    package main\nempty/:\nnotes.txt:\n",
            &Validator::new(),
        )
        .unwrap();

        assert_eq!(fs.read_file("src/main.go").unwrap(), b"package main\n");
        assert_eq!(fs.read_file("notes.txt").unwrap(), b"");
        assert!(fs.is_dir("empty"));
        assert!(fs.read_dir("empty").unwrap().is_empty());
    }

    #[test]
    fn empty_text_loads_an_empty_filesystem() {
        assert!(load("", &Validator::new()).unwrap().is_empty());
    }

    #[test]
    fn invalid_names_stop_before_decoding() {
        let result = load("\"a?b\": x\n", &Validator::new());
        assert!(matches!(result, Err(LoadError::ValidateError { .. })));
    }

    #[test]
    fn missing_paths_are_lookup_errors() {
        let fs = load("a.txt: x\n", &Validator::new()).unwrap();
        assert!(matches!(
            fs.read_file("b.txt"),
            Err(crate::vfs::VfsError::NotFound { .. })
        ));
    }
}
