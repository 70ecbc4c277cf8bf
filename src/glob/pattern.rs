/// Path separator. Neither `*` nor `?` ever match it.
const SEPARATOR: char = '/';

/// Matches `name` against a shell-style glob `pattern`.
///
/// Supported syntax:
/// - `*` matches any run of characters except `/`
/// - `?` matches exactly one character except `/`
/// - `[abc]`, `[a-z]` match one character of the class
/// - `[^abc]` or `[!abc]` match one character outside the class
///
/// Every other character matches itself. A malformed pattern (for example
/// an unterminated class) never matches.
pub fn matches(pattern: &str, name: &str) -> bool {
    let pattern: Vec<char> = pattern.chars().collect();
    let name: Vec<char> = name.chars().collect();

    let mut pi = 0;
    let mut ni = 0;
    // Position right after the last `*` seen, and the name position it was tried at
    let mut backtrack: Option<(usize, usize)> = None;

    while ni < name.len() {
        let step = match pattern.get(pi) {
            Some('*') => {
                while pattern.get(pi) == Some(&'*') {
                    pi += 1;
                }
                backtrack = Some((pi, ni));
                continue;
            }
            Some('?') if name[ni] != SEPARATOR => Some(pi + 1),
            Some('[') => match match_class(&pattern, pi + 1, name[ni]) {
                Some((true, next)) => Some(next),
                Some((false, _)) => None,
                None => return false,
            },
            Some(&c) if c != '?' && c == name[ni] => Some(pi + 1),
            _ => None,
        };

        match step {
            Some(next) => {
                pi = next;
                ni += 1;
            }
            None => match backtrack {
                // Let the last star swallow one more character, unless that is a separator
                Some((star_pi, star_ni)) if name[star_ni] != SEPARATOR => {
                    backtrack = Some((star_pi, star_ni + 1));
                    pi = star_pi;
                    ni = star_ni + 1;
                }
                _ => return false,
            },
        }
    }

    while pattern.get(pi) == Some(&'*') {
        pi += 1;
    }
    pi == pattern.len()
}

/// Returns true if any of `patterns` matches `name`. An empty list matches nothing.
pub fn matches_any<S: AsRef<str>>(name: &str, patterns: &[S]) -> bool {
    patterns
        .iter()
        .any(|pattern| matches(pattern.as_ref(), name))
}

/// Evaluates the class starting right after `[` at `start` against `c`.
///
/// Returns whether `c` belongs to the class and the index following the
/// closing `]`, or `None` if the class is malformed.
fn match_class(pattern: &[char], start: usize, c: char) -> Option<(bool, usize)> {
    let mut i = start;
    let negated = matches!(pattern.get(i), Some('^') | Some('!'));
    if negated {
        i += 1;
    }

    let mut found = false;
    let mut first = true;
    loop {
        let lo = *pattern.get(i)?;
        if lo == ']' && !first {
            i += 1;
            break;
        }
        first = false;
        i += 1;

        let hi = if pattern.get(i) == Some(&'-') && pattern.get(i + 1).is_some_and(|&h| h != ']') {
            let hi = pattern[i + 1];
            i += 2;
            if hi < lo {
                return None;
            }
            hi
        } else {
            lo
        };

        if lo <= c && c <= hi {
            found = true;
        }
    }

    Some((found != negated, i))
}
