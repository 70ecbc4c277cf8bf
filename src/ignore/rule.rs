use crate::glob;

/// One pattern line of an ignore file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IgnoreRule {
    /// Glob with `**` already collapsed to `*`.
    pub pattern: String,
    /// `!pattern`: un-ignores instead of ignoring.
    pub negation: bool,
    /// `pattern/`: only applies to directories.
    pub dir_only: bool,
    /// `/pattern`: only matched against the scope-relative path.
    pub anchored: bool,
}

impl IgnoreRule {
    /// Parses a single ignore-file line. Blank lines, comments and lines that
    /// are empty once their markers are stripped yield `None`.
    pub fn parse(line: &str) -> Option<Self> {
        let mut pattern = line.trim();
        if pattern.is_empty() || pattern.starts_with('#') {
            return None;
        }

        let negation = pattern.starts_with('!');
        if negation {
            pattern = &pattern[1..];
        }

        let dir_only = pattern.ends_with('/');
        if dir_only {
            pattern = pattern.trim_end_matches('/');
        }

        let anchored = pattern.starts_with('/');
        if anchored {
            pattern = pattern.trim_start_matches('/');
        }

        if pattern.is_empty() {
            return None;
        }

        Some(IgnoreRule {
            // Known deviation: `**` does not cross directory boundaries
            pattern: pattern.replace("**", "*"),
            negation,
            dir_only,
            anchored,
        })
    }

    /// Parses every usable line of an ignore file, keeping file order.
    pub fn parse_all(contents: &str) -> Vec<Self> {
        contents.lines().filter_map(IgnoreRule::parse).collect()
    }

    /// Tests the rule against a candidate's base name and its path relative
    /// to the directory owning the ignore file.
    pub fn matches(&self, name: &str, relative_path: &str, is_dir: bool) -> bool {
        if self.dir_only && !is_dir {
            return false;
        }
        if self.anchored {
            return glob::matches(&self.pattern, relative_path);
        }
        glob::matches(&self.pattern, name) || glob::matches(&self.pattern, relative_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("")]
    #[case("   ")]
    #[case("# comment")]
    #[case("!")]
    #[case("/")]
    #[case("!/")]
    fn skips_unusable_lines(#[case] line: &str) {
        assert_eq!(IgnoreRule::parse(line), None);
    }

    #[test]
    fn parses_markers() {
        let rule = IgnoreRule::parse("  !/build/  ").unwrap();
        assert_eq!(
            rule,
            IgnoreRule {
                pattern: "build".into(),
                negation: true,
                dir_only: true,
                anchored: true,
            }
        );
    }

    #[test]
    fn collapses_double_star() {
        let rule = IgnoreRule::parse("**/*.log").unwrap();
        assert_eq!(rule.pattern, "*/*.log");
        assert!(rule.matches("a.log", "logs/a.log", false));
        assert!(!rule.matches("a.log", "logs/deep/a.log", false));
    }

    #[test]
    fn dir_only_rules_skip_files() {
        let rule = IgnoreRule::parse("target/").unwrap();
        assert!(rule.matches("target", "target", true));
        assert!(!rule.matches("target", "target", false));
    }

    #[test]
    fn unanchored_rules_match_base_name_anywhere() {
        let rule = IgnoreRule::parse("*.tmp").unwrap();
        assert!(rule.matches("x.tmp", "deep/nested/x.tmp", false));
    }

    #[test]
    fn anchored_rules_match_only_relative_path() {
        let rule = IgnoreRule::parse("/dist").unwrap();
        assert!(rule.matches("dist", "dist", true));
        assert!(!rule.matches("dist", "web/dist", true));
    }

    #[test]
    fn parse_all_keeps_order() {
        let rules = IgnoreRule::parse_all("*.log\n\n# note\n!keep.log\n");
        let patterns: Vec<_> = rules.iter().map(|r| r.pattern.as_str()).collect();
        assert_eq!(patterns, ["*.log", "keep.log"]);
        assert!(rules[1].negation);
    }
}
