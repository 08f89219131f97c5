//! Filename sanitization.

/// Characters rejected by at least one common filesystem.
pub(crate) const ILLEGAL_CHARS: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Maximum length of a sanitized token, in characters.
pub const MAX_FILENAME_LEN: usize = 100;

/// Turn an arbitrary title into a filesystem-safe token.
///
/// Illegal and control characters are dropped, every whitespace run becomes
/// a single `_`, surrounding underscores are trimmed and the result is cut to
/// [`MAX_FILENAME_LEN`] characters. The result may be empty.
///
/// ```rust
/// use note_migrate::sanitize::sanitize_filename;
///
/// assert_eq!(sanitize_filename("  Plan: Q3 / Q4?  "), "Plan_Q3_Q4");
/// assert_eq!(sanitize_filename("***"), "");
/// ```
pub fn sanitize_filename(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .filter(|c| !ILLEGAL_CHARS.contains(c) && (c.is_whitespace() || !c.is_control()))
        .collect();

    let joined = cleaned.split_whitespace().collect::<Vec<_>>().join("_");
    let truncated: String = joined
        .trim_matches('_')
        .chars()
        .take(MAX_FILENAME_LEN)
        .collect();

    truncated.trim_end_matches('_').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_safe(out: &str) {
        assert!(!out.chars().any(|c| ILLEGAL_CHARS.contains(&c)), "{out:?}");
        assert!(!out.chars().any(char::is_whitespace), "{out:?}");
        assert!(!out.starts_with('_') && !out.ends_with('_'), "{out:?}");
        assert!(out.chars().count() <= MAX_FILENAME_LEN, "{out:?}");
    }

    #[test]
    fn strips_illegal_characters() {
        assert_eq!(sanitize_filename(r#"a<b>c:d"e/f\g|h?i*j"#), "abcdefghij");
    }

    #[test]
    fn collapses_whitespace_runs() {
        assert_eq!(sanitize_filename("Shopping \t list\n\nfor  today"), "Shopping_list_for_today");
    }

    #[test]
    fn trims_underscores() {
        assert_eq!(sanitize_filename("__draft__"), "draft");
        assert_eq!(sanitize_filename("  ? padded ?  "), "padded");
    }

    #[test]
    fn all_illegal_input_is_empty() {
        assert_eq!(sanitize_filename(""), "");
        assert_eq!(sanitize_filename("   "), "");
        assert_eq!(sanitize_filename("<>:|?*"), "");
    }

    #[test]
    fn drops_control_characters() {
        assert_eq!(sanitize_filename("nul\0byte\u{7f}"), "nulbyte");
    }

    #[test]
    fn truncates_by_characters() {
        let long = "ñ".repeat(250);
        let out = sanitize_filename(&long);
        assert_eq!(out.chars().count(), MAX_FILENAME_LEN);
    }

    #[test]
    fn truncation_does_not_leave_trailing_underscore() {
        let input = format!("{} tail", "a".repeat(MAX_FILENAME_LEN - 1));
        let out = sanitize_filename(&input);
        assert_eq!(out, "a".repeat(MAX_FILENAME_LEN - 1));
    }

    #[test]
    fn output_is_always_safe() {
        let samples = [
            "Meeting notes: 2024/01/02",
            " _ leading and trailing _ ",
            "tabs\tand\r\nnewlines",
            "emoji 🚀 title | with * stars",
            "\"quoted\" <tag>",
            "x",
        ];
        for sample in samples {
            assert_safe(&sanitize_filename(sample));
        }
        assert_safe(&sanitize_filename(&"word ".repeat(80)));
    }
}
