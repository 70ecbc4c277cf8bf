use std::path::{Component, Path, PathBuf};

/// Separator used by every relative path handled inside the crate.
pub const SEPARATOR: char = '/';

/// Renders a host path for messages: canonical if possible, otherwise made
/// absolute against the current directory with `.` and `..` folded away.
pub fn best_effort_path_display(path: &Path) -> String {
    if let Ok(canonical) = path.canonicalize() {
        return canonical.display().to_string();
    }

    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .map(|cwd| cwd.join(path))
            .unwrap_or_else(|_| path.to_path_buf())
    };

    let mut folded = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !matches!(folded.components().next_back(), None | Some(Component::RootDir)) {
                    folded.pop();
                }
            }
            other => folded.push(other),
        }
    }
    folded.display().to_string()
}

pub trait BestEffortPathExt {
    fn best_effort_path_display(&self) -> String;
}

impl<P: AsRef<Path> + ?Sized> BestEffortPathExt for P {
    fn best_effort_path_display(&self) -> String {
        best_effort_path_display(self.as_ref())
    }
}

/// Helpers for the slash-separated relative paths used by sources, trees and
/// the virtual filesystem. The root is the empty string.
pub trait RelativePathExt {
    /// Appends `name` to this path.
    fn join_segment(&self, name: &str) -> String;

    /// Last segment, or the whole path if it has no separator.
    fn base_name(&self) -> &str;

    /// Everything before the last segment; the root for top-level paths.
    fn parent_path(&self) -> &str;

    /// Number of separators, so top-level entries are at depth 0.
    fn depth(&self) -> usize;

    /// Non-empty segments in order.
    fn segments(&self) -> impl Iterator<Item = &str>;
}

impl RelativePathExt for str {
    fn join_segment(&self, name: &str) -> String {
        if self.is_empty() {
            name.to_string()
        } else {
            format!("{self}{SEPARATOR}{name}")
        }
    }

    fn base_name(&self) -> &str {
        self.rsplit(SEPARATOR).next().unwrap_or(self)
    }

    fn parent_path(&self) -> &str {
        self.rsplit_once(SEPARATOR).map_or("", |(parent, _)| parent)
    }

    fn depth(&self) -> usize {
        self.matches(SEPARATOR).count()
    }

    fn segments(&self) -> impl Iterator<Item = &str> {
        self.split(SEPARATOR).filter(|segment| !segment.is_empty())
    }
}

/// Turns user input such as `/a/b/`, `./a` or `.` into the canonical relative
/// form (`a/b`, `a`, ``). Returns `None` for paths containing `..`.
pub fn normalize_relative(path: &str) -> Option<String> {
    let mut normalized = String::new();
    for segment in path.segments() {
        match segment {
            "." => continue,
            ".." => return None,
            name => normalized = normalized.join_segment(name),
        }
    }
    Some(normalized)
}
