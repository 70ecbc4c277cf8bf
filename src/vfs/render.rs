use colored::Colorize;

use crate::ext::{RelativePathExt, SEPARATOR};
use crate::vfs::{VfsEntry, VirtualFs};

const INDENT: &str = "  ";

/// Renders `vfs` as an indented listing, one entry per line.
///
/// The first line is the root `./`. Top-level entries follow without
/// indentation, each deeper level adding two spaces. Directory names carry a
/// trailing `/` and, when `colorize` is set, are printed in bold blue.
pub fn render_tree(vfs: &VirtualFs, colorize: bool) -> String {
    let mut output = String::new();
    output.push_str(&paint(&format!(".{SEPARATOR}"), true, colorize));
    output.push('\n');

    for entry in vfs.walk() {
        output.push_str(&INDENT.repeat(entry.path().depth()));
        output.push_str(&label(entry, colorize));
        output.push('\n');
    }
    output
}

fn label(entry: &VfsEntry, colorize: bool) -> String {
    if entry.is_dir() {
        paint(&format!("{}{SEPARATOR}", entry.name()), true, colorize)
    } else {
        entry.name().to_string()
    }
}

fn paint(text: &str, is_dir: bool, colorize: bool) -> String {
    if colorize && is_dir {
        text.blue().bold().to_string()
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indents_two_spaces_per_level() {
        let mut vfs = VirtualFs::new();
        vfs.add_file("a/b.txt", "x").unwrap();
        vfs.add_file("a/c/d.txt", "y").unwrap();
        vfs.add_dir("empty").unwrap();
        vfs.add_file("top.txt", "").unwrap();

        let expected = "\
./
a/
  b.txt
  c/
    d.txt
empty/
top.txt
";
        assert_eq!(render_tree(&vfs, false), expected);
    }

    #[test]
    fn empty_filesystem_prints_root_only() {
        assert_eq!(render_tree(&VirtualFs::new(), false), "./\n");
    }

    #[test]
    fn colours_directories_only() {
        colored::control::set_override(true);
        let mut vfs = VirtualFs::new();
        vfs.add_file("dir/file.txt", "").unwrap();

        let rendered = render_tree(&vfs, true);
        colored::control::unset_override();

        assert!(rendered.contains(&"dir/".blue().bold().to_string()));
        assert!(rendered.contains("\n  file.txt\n"));
    }
}
