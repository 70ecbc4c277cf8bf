use std::borrow::Cow;
use std::collections::BTreeMap;

use hashlink::LinkedHashMap;
use saphyr::{LoadableYamlNode, Scalar, ScalarStyle, Yaml, YamlEmitter};
use snafu::{ResultExt, Snafu, ensure};

use crate::ext::{RelativePathExt, SEPARATOR};
use crate::tree::TreeNode;

/// Text emitted for a tree without any entries.
const EMPTY_DOCUMENT: &str = "{}\n";

/// Serializes `tree` into document text.
///
/// Keys follow name order, directory keys end in `/`, and both empty
/// directories and files without loaded content are written as null.
/// Multi-line contents become literal blocks when a clip or strip block keeps
/// them intact, and double-quoted scalars otherwise. The text has no leading
/// `---` and always ends with a newline.
pub fn encode(tree: &TreeNode) -> Result<String, DocumentError> {
    let TreeNode::Directory(children) = tree else {
        return RootNotDirectorySnafu.fail();
    };
    if children.is_empty() {
        return Ok(EMPTY_DOCUMENT.to_string());
    }

    let yaml = node_to_yaml(tree);
    let mut out = String::new();
    {
        let mut emitter = YamlEmitter::new(&mut out);
        emitter.multiline_strings(true);
        emitter.dump(&yaml).context(EmitSnafu)?;
    }

    let body = out
        .strip_prefix("---")
        .unwrap_or(&out)
        .trim_start_matches('\n');
    Ok(format!("{body}\n"))
}

fn node_to_yaml(node: &TreeNode) -> Yaml<'static> {
    match node {
        TreeNode::Directory(children) if children.is_empty() => Yaml::Value(Scalar::Null),
        TreeNode::Directory(children) => Yaml::Mapping(
            children
                .iter()
                .map(|(name, child)| (string(key_for(name, child)), node_to_yaml(child)))
                .collect::<LinkedHashMap<_, _>>(),
        ),
        TreeNode::File(None) => Yaml::Value(Scalar::Null),
        TreeNode::File(Some(content)) => content_to_yaml(content),
    }
}

fn content_to_yaml(content: &str) -> Yaml<'static> {
    if content.contains('\n') && !fits_literal_block(content) {
        Yaml::Representation(
            Cow::Owned(double_quoted(content)),
            ScalarStyle::DoubleQuoted,
            None,
        )
    } else {
        string(content.to_string())
    }
}

/// Whether the emitter's `|` or `|-` block reads back as `content`.
///
/// The block carries no indentation indicator and no keep chomping, so the
/// first line must not start with whitespace and at most one trailing
/// newline may follow a non-blank last line.
fn fits_literal_block(content: &str) -> bool {
    let body = content.strip_suffix('\n').unwrap_or(content);
    !body.is_empty()
        && !body.starts_with([' ', '\t', '\n'])
        && !body.ends_with([' ', '\t', '\n'])
        && !content.contains('\r')
}

/// Escapes `content` for a double-quoted scalar, quotes included.
fn double_quoted(content: &str) -> String {
    let mut out = String::with_capacity(content.len() + 2);
    out.push('"');
    for c in content.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => {
                out.push_str(&format!("\\x{:02x}", u32::from(c)));
            }
            '\u{2028}' | '\u{2029}' | '\u{feff}' => {
                out.push_str(&format!("\\u{:04x}", u32::from(c)));
            }
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

fn key_for(name: &str, node: &TreeNode) -> String {
    if node.is_dir() {
        format!("{name}{SEPARATOR}")
    } else {
        name.to_string()
    }
}

fn string(value: String) -> Yaml<'static> {
    Yaml::Value(Scalar::String(Cow::Owned(value)))
}

/// Parses the first YAML document of `text`, `None` when there is none.
pub fn parse(text: &str) -> Result<Option<Yaml<'_>>, DocumentError> {
    let documents = Yaml::load_from_str(text).context(ParseSnafu)?;
    Ok(documents.into_iter().next())
}

/// Parses document text into a tree. Empty text is an empty tree.
pub fn decode(text: &str) -> Result<TreeNode, DocumentError> {
    match parse(text)? {
        Some(document) => decode_yaml(&document),
        None => Ok(TreeNode::root()),
    }
}

/// Converts an already parsed document into a tree.
pub fn decode_yaml(document: &Yaml) -> Result<TreeNode, DocumentError> {
    match document {
        Yaml::Value(Scalar::Null) => Ok(TreeNode::root()),
        Yaml::Mapping(mapping) => decode_directory("", mapping).context(StructureSnafu),
        _ => TopLevelNotMapSnafu.fail(),
    }
}

fn decode_directory(
    path: &str,
    mapping: &LinkedHashMap<Yaml, Yaml>,
) -> Result<TreeNode, StructuralError> {
    let mut children = BTreeMap::new();

    for (key, value) in mapping {
        let Yaml::Value(Scalar::String(key)) = key else {
            return KeyNotStringSnafu {
                path: path.to_string(),
                key: format!("{key:?}"),
            }
            .fail();
        };

        let (name, is_dir) = split_key(key);
        let child_path = path.join_segment(name);
        ensure!(
            !name.is_empty() && name != "." && name != ".." && !name.contains(SEPARATOR),
            InvalidNameSnafu {
                path: path.join_segment(key)
            }
        );
        ensure!(
            !children.contains_key(name),
            DuplicateNameSnafu { path: &child_path }
        );

        let node = if is_dir {
            match value {
                Yaml::Value(Scalar::Null) => TreeNode::root(),
                Yaml::Mapping(nested) => decode_directory(&child_path, nested)?,
                _ => return DirectoryNotMappingSnafu { path: child_path }.fail(),
            }
        } else {
            match value {
                Yaml::Value(Scalar::Null) => TreeNode::File(None),
                Yaml::Value(Scalar::String(content)) => TreeNode::file(Some(content.as_ref())),
                _ => return FileNotTextSnafu { path: child_path }.fail(),
            }
        };
        children.insert(name.to_string(), node);
    }

    Ok(TreeNode::Directory(children))
}

/// Splits a key into its entry name and whether it carries the directory
/// marker. Only one trailing `/` is the marker.
pub(crate) fn split_key(key: &str) -> (&str, bool) {
    match key.strip_suffix(SEPARATOR) {
        Some(name) => (name, true),
        None => (key, false),
    }
}

/// Shape violations found while turning a document into a tree.
#[derive(Debug, Snafu)]
pub enum StructuralError {
    #[snafu(display("Directory '{}' must map to a mapping or null", path))]
    DirectoryNotMappingError { path: String },
    #[snafu(display("File '{}' must map to a string or null", path))]
    FileNotTextError { path: String },
    #[snafu(display("Key {} below '{}' is not a string", key, path))]
    KeyNotStringError { path: String, key: String },
    #[snafu(display("'{}' is not a valid entry name", path))]
    InvalidNameError { path: String },
    #[snafu(display("'{}' is defined more than once", path))]
    DuplicateNameError { path: String },
}

#[derive(Debug, Snafu)]
pub enum DocumentError {
    #[snafu(display("Failed to parse the document"))]
    ParseError { source: saphyr::ScanError },
    #[snafu(display("Top level of the document should be a map"))]
    TopLevelNotMapError,
    #[snafu(display("Malformed document structure"))]
    StructureError { source: StructuralError },
    #[snafu(display("Only a directory tree can be encoded"))]
    RootNotDirectoryError,
    #[snafu(display("Failed to emit the document"))]
    EmitError { source: saphyr::EmitError },
}
