//! Text cleanup for labels and content extracted from source pages
//!
//! The government pages are hand-edited in a CMS and carry zero-width
//! characters, non-breaking spaces and stray control characters that would
//! otherwise leak into stored titles and bodies.

use regex::Regex;
use std::sync::LazyLock;

static WHITESPACE_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("Invalid regex pattern"));

/// Clean a single-line label (title, date token)
///
/// Removes invisible characters and collapses all whitespace runs,
/// including line breaks, to one space.
///
/// # Examples
///
/// ```
/// use policy_tracker::parser::sanitize::clean_label;
///
/// assert_eq!(clean_label(" 監察院\u{200B}\n 新聞稿 "), "監察院 新聞稿");
/// ```
pub fn clean_label(text: &str) -> String {
    let text = remove_invisible(text);
    WHITESPACE_REGEX.replace_all(text.trim(), " ").to_string()
}

/// Clean one text fragment of a content block
///
/// Removes invisible characters and trims the ends only. Interior spacing
/// and line breaks are kept as published. Returns `None` when nothing
/// visible remains, so whitespace-only nodes between block elements can be
/// dropped.
pub fn clean_fragment(text: &str) -> Option<String> {
    let cleaned = remove_invisible(text);
    let trimmed = cleaned.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Remove zero-width characters, BOMs, and control characters
///
/// Non-breaking spaces become ordinary spaces. Removes:
/// - \u{200B}-\u{200F} zero-width and direction marks
/// - \u{2028}-\u{202F} separators and embedding controls
/// - \u{FEFF} byte order mark
/// - C0/C1 control characters other than tab and newline
///
/// # Examples
///
/// ```
/// use policy_tracker::parser::sanitize::remove_invisible;
///
/// assert_eq!(remove_invisible("監\u{200B}察\u{FEFF}院"), "監察院");
/// ```
pub fn remove_invisible(text: &str) -> String {
    text.chars()
        .filter_map(|c| match c {
            '\u{200B}'..='\u{200F}' | '\u{2028}'..='\u{202E}' | '\u{FEFF}' => None,
            '\u{00A0}' | '\u{202F}' => Some(' '),
            c if c.is_control() && c != '\n' && c != '\t' => None,
            c => Some(c),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_label_collapses_whitespace() {
        assert_eq!(clean_label("  糾正\t\t案  \r\n 文 "), "糾正 案 文");
    }

    #[test]
    fn test_clean_label_handles_nbsp() {
        assert_eq!(clean_label("調查\u{00A0}\u{00A0}報告"), "調查 報告");
    }

    #[test]
    fn test_remove_invisible() {
        assert_eq!(remove_invisible("Test\u{200B}\u{200C}\u{200D}Complete"), "TestComplete");
        assert_eq!(remove_invisible("\u{FEFF}Content"), "Content");
        assert_eq!(remove_invisible("A\x00B\x07C"), "ABC");
        assert_eq!(remove_invisible("Line1\nLine2\tTab"), "Line1\nLine2\tTab");
    }

    #[test]
    fn test_clean_fragment_drops_blank_nodes() {
        assert_eq!(clean_fragment(" \n\t \u{200B} "), None);
        assert_eq!(clean_fragment(" 一、案由 "), Some("一、案由".to_string()));
    }

    #[test]
    fn test_clean_fragment_keeps_interior_whitespace() {
        assert_eq!(
            clean_fragment(" 第一行\n  第二行 \n"),
            Some("第一行\n  第二行".to_string())
        );
        assert_eq!(
            clean_fragment("\u{00A0}(一)  第一點\u{200B}"),
            Some("(一)  第一點".to_string())
        );
    }
}
