/// Private helper functions for text cleaning
use regex::Regex;
use std::string::FromUtf8Error;
use std::sync::LazyLock;

// Lazy static regex for whitespace normalization
static WHITESPACE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

/// Keep only 7-bit ASCII characters.
///
/// Everything above U+007F is dropped, not transliterated. The result is
/// rebuilt from bytes, so the conversion is fallible in type even though a
/// filtered ASCII buffer is always valid UTF-8.
pub fn to_narrow_charset(text: &str) -> Result<String, FromUtf8Error> {
    let bytes: Vec<u8> = text
        .chars()
        .filter(char::is_ascii)
        .map(|c| c as u8)
        .collect();
    String::from_utf8(bytes)
}

/// Replace every line feed with a space.
pub fn fold_line_breaks(text: &str) -> String {
    text.replace('\n', " ")
}

/// Normalize whitespace by collapsing runs and trimming.
///
/// - Multiple spaces → single space
/// - Tabs, newlines, no-break spaces → single space
/// - Trim leading/trailing whitespace
pub fn normalize_whitespace(text: &str) -> String {
    WHITESPACE_REGEX
        .replace_all(text, " ")
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_narrow_charset() {
        assert_eq!(to_narrow_charset("héllo wörld").unwrap(), "hllo wrld");
        assert_eq!(to_narrow_charset("plain").unwrap(), "plain");
        assert_eq!(to_narrow_charset("日本").unwrap(), "");
        assert_eq!(to_narrow_charset("tab\there\x7f").unwrap(), "tab\there\x7f");
    }

    #[test]
    fn test_fold_line_breaks() {
        assert_eq!(fold_line_breaks("a\nb\n\nc"), "a b  c");
    }

    #[test]
    fn test_normalize_whitespace() {
        assert_eq!(normalize_whitespace("hello   world"), "hello world");
        assert_eq!(normalize_whitespace("  trim  me  "), "trim me");
        assert_eq!(
            normalize_whitespace("multiple\n\n\nlines"),
            "multiple lines"
        );
        assert_eq!(normalize_whitespace("no\u{A0}break"), "no break");
        assert_eq!(normalize_whitespace("\t\t\t"), "");
    }
}
