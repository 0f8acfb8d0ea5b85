//! POSIX shell quoting.
//!
//! Everything the core sends to a backend goes through a `sh`-compatible
//! shell, so paths and values must be quoted before being embedded in a
//! command line. Quoting is single-quote based: `'` becomes `'\''`, and no
//! other character is special inside single quotes.

/// Quote a string for safe embedding in a POSIX shell command.
///
/// Strings made of plainly safe characters pass through unchanged; anything
/// else (including the empty string) is single-quoted.
pub fn sh_quote(s: &str) -> String {
    if !s.is_empty() && s.bytes().all(is_safe_byte) {
        return s.to_string();
    }

    let mut out = String::with_capacity(s.len() + 2);
    out.push('\'');
    for ch in s.chars() {
        if ch == '\'' {
            out.push_str("'\\''");
        } else {
            out.push(ch);
        }
    }
    out.push('\'');
    out
}

fn is_safe_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'_' | b'-' | b'.' | b'/' | b':' | b'=' | b'@')
}

/// Parent of a POSIX path, as a string slice.
///
/// `None` for the root, for bare names (parent is the caller's working
/// directory), and for the empty string. Trailing slashes are ignored.
pub fn posix_parent(path: &str) -> Option<&str> {
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        return None;
    }
    match trimmed.rfind('/') {
        Some(0) => {
            if trimmed.len() > 1 {
                Some("/")
            } else {
                None
            }
        }
        Some(idx) => Some(&trimmed[..idx]),
        None => None,
    }
}

/// Basename of a POSIX path, as a string slice.
pub fn posix_basename(path: &str) -> &str {
    let trimmed = path.trim_end_matches('/');
    match trimmed.rfind('/') {
        Some(idx) => &trimmed[idx + 1..],
        None => trimmed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("plain", "plain")]
    #[case("/data/local/tmp", "/data/local/tmp")]
    #[case("a b", "'a b'")]
    #[case("", "''")]
    #[case("2\n\n", "'2\n\n'")]
    #[case("don't", "'don'\\''t'")]
    #[case("$HOME", "'$HOME'")]
    #[case("a;rm -rf /", "'a;rm -rf /'")]
    fn test_sh_quote(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(sh_quote(input), expected);
    }

    #[rstest]
    #[case("/a/b/c", Some("/a/b"))]
    #[case("/a", Some("/"))]
    #[case("/", None)]
    #[case("relative", None)]
    #[case("a/b", Some("a"))]
    #[case("/a/b/", Some("/a"))]
    #[case("", None)]
    fn test_posix_parent(#[case] path: &str, #[case] expected: Option<&str>) {
        assert_eq!(posix_parent(path), expected);
    }

    #[rstest]
    #[case("/a/b/c", "c")]
    #[case("/a/b/", "b")]
    #[case("name", "name")]
    fn test_posix_basename(#[case] path: &str, #[case] expected: &str) {
        assert_eq!(posix_basename(path), expected);
    }
}
