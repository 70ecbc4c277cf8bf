use tracing::debug;

use crate::ext::RelativePathExt;
use crate::ignore::IgnoreRule;
use crate::source::SourceFs;

pub const IGNORE_FILE_NAME: &str = ".gitignore";

/// The ignore rules in effect for one directory of a walk.
///
/// Scopes form a chain through `parent`; a child only ever reads its
/// ancestors. The walk keeps each scope on the stack frame of the directory
/// it belongs to, so a scope lives exactly as long as its subtree is visited.
#[derive(Debug)]
pub struct IgnoreScope<'p> {
    dir: String,
    rules: Vec<IgnoreRule>,
    parent: Option<&'p IgnoreScope<'p>>,
}

impl<'p> IgnoreScope<'p> {
    /// Root scope for `dir`, loading `dir/.gitignore` if there is one.
    pub fn load<S: SourceFs + ?Sized>(source: &S, dir: &str) -> Self {
        Self::from_rules(dir, load_rules(source, dir), None)
    }

    /// Scope for the subdirectory `dir`, layered on top of `parent`.
    pub fn child<S: SourceFs + ?Sized>(
        parent: &'p IgnoreScope<'p>,
        source: &S,
        dir: &str,
    ) -> Self {
        Self::from_rules(dir, load_rules(source, dir), Some(parent))
    }

    /// Scope built from rules already in memory.
    pub fn from_rules(
        dir: &str,
        rules: Vec<IgnoreRule>,
        parent: Option<&'p IgnoreScope<'p>>,
    ) -> Self {
        Self {
            dir: dir.to_string(),
            rules,
            parent,
        }
    }

    /// Returns true if `path` (relative to the walk root) is ignored.
    ///
    /// Ancestors are consulted first and an ancestor's verdict is final.
    /// Within one scope the last matching rule decides.
    pub fn matches(&self, path: &str, is_dir: bool) -> bool {
        if self.parent.is_some_and(|parent| parent.matches(path, is_dir)) {
            return true;
        }

        let relative = self.relative(path);
        let name = path.base_name();

        self.rules
            .iter()
            .rev()
            .find(|rule| rule.matches(name, relative, is_dir))
            .is_some_and(|rule| !rule.negation)
    }

    fn relative<'a>(&self, path: &'a str) -> &'a str {
        if self.dir.is_empty() {
            return path;
        }
        path.strip_prefix(self.dir.as_str())
            .and_then(|rest| rest.strip_prefix('/'))
            .unwrap_or(path)
    }
}

fn load_rules<S: SourceFs + ?Sized>(source: &S, dir: &str) -> Vec<IgnoreRule> {
    let path = dir.join_segment(IGNORE_FILE_NAME);
    match source.read_file(&path) {
        Ok(bytes) => {
            let rules = IgnoreRule::parse_all(&String::from_utf8_lossy(&bytes));
            debug!("Loaded {} ignore rules from {}", rules.len(), path);
            rules
        }
        Err(e) => {
            debug!("No usable ignore file at {}: {}", path, e);
            Vec::new()
        }
    }
}
