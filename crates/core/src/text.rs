//! Display-text cleanup for report content.
//!
//! Report fields are opaque text from the caller. Before they reach the
//! document they are NFC-normalized, line endings are unified to `\n`, and
//! characters that XML 1.0 cannot carry are dropped.

use regex::Regex;
use std::sync::LazyLock;
use unicode_normalization::UnicodeNormalization;

/// CRLF, lone CR and vertical tab (soft line break pasted from word
/// processors) all become `\n`.
static LINE_BREAK_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\r\n?|\x0B").unwrap());

/// Whether `c` may appear in an XML 1.0 text node.
fn is_xml_char(c: char) -> bool {
    matches!(c,
        '\t' | '\n'
        | '\u{20}'..='\u{D7FF}'
        | '\u{E000}'..='\u{FFFD}'
        | '\u{10000}'..='\u{10FFFF}')
}

/// Clean a piece of display text.
pub fn sanitize(text: &str) -> String {
    let unified = LINE_BREAK_REGEX.replace_all(text, "\n");
    unified.nfc().filter(|&c| is_xml_char(c)).collect()
}

/// Clean a piece of display text and split it into its lines.
///
/// Always yields at least one (possibly empty) line.
pub fn sanitized_lines(text: &str) -> Vec<String> {
    sanitize(text).split('\n').map(str::to_string).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_endings_unified() {
        assert_eq!(sanitize("a\r\nb\rc\x0Bd"), "a\nb\nc\nd");
    }

    #[test]
    fn test_control_chars_removed() {
        assert_eq!(sanitize("bell\u{7}ed\u{0}"), "belled");
        assert_eq!(sanitize("tab\tkept"), "tab\tkept");
        assert_eq!(sanitize("\u{FFFE}x\u{FFFF}"), "x");
    }

    #[test]
    fn test_nfc_normalization() {
        // "e" + combining acute becomes a single precomposed character
        assert_eq!(sanitize("Caf\u{65}\u{301}"), "Caf\u{e9}");
    }

    #[test]
    fn test_unicode_passes_through() {
        assert_eq!(sanitize("Savills Malaysia’s top"), "Savills Malaysia’s top");
        assert_eq!(sanitize("南洋商报"), "南洋商报");
    }

    #[test]
    fn test_sanitized_lines() {
        assert_eq!(sanitized_lines("one\r\ntwo"), vec!["one", "two"]);
        assert_eq!(sanitized_lines(""), vec![""]);
    }
}
