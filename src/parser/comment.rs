//! Line comment stripping.
//!
//! 4GL sources mix two line-comment syntaxes, `#` and `--`. Both run to
//! end of line. String literals are not tracked: a marker inside quotes
//! still starts a comment.

/// Returns the byte offset of the first comment marker, if any.
///
/// A marker directly preceded by a backslash is escaped and ignored.
pub fn comment_start(line: &str) -> Option<usize> {
    let bytes = line.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        let escaped = i > 0 && bytes[i - 1] == b'\\';
        match bytes[i] {
            b'#' if !escaped => return Some(i),
            b'-' if !escaped && bytes.get(i + 1) == Some(&b'-') => return Some(i),
            _ => {}
        }
        i += 1;
    }
    None
}

/// Removes everything from the first comment marker to end of line.
pub fn strip_comment(line: &str) -> &str {
    match comment_start(line) {
        Some(idx) => &line[..idx],
        None => line,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_hash_comment() {
        assert_eq!(strip_comment("LET a = 1 # set a"), "LET a = 1 ");
    }

    #[test]
    fn test_strip_dash_comment() {
        assert_eq!(strip_comment("DEFINE a INTEGER -- counter"), "DEFINE a INTEGER ");
    }

    #[test]
    fn test_first_marker_wins() {
        assert_eq!(strip_comment("CALL f() -- x # y"), "CALL f() ");
        assert_eq!(strip_comment("CALL f() # x -- y"), "CALL f() ");
    }

    #[test]
    fn test_single_dash_is_not_a_comment() {
        assert_eq!(strip_comment("LET a = b - 1"), "LET a = b - 1");
    }

    #[test]
    fn test_marker_inside_string_still_strips() {
        assert_eq!(strip_comment(r#"DISPLAY "item #1""#), r#"DISPLAY "item "#);
    }

    #[test]
    fn test_escaped_marker_is_kept() {
        assert_eq!(strip_comment(r"DISPLAY a \# b # c"), r"DISPLAY a \# b ");
    }
}
