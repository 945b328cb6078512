use bstr::ByteSlice;

use super::RecordParser;

/// Splits a line on runs of Unicode whitespace. No quoting or escaping.
///
/// Bytes that are not valid UTF-8 never count as whitespace and stay in
/// their field unchanged.
#[derive(Debug, Default, Clone, Copy)]
pub struct WhitespaceParser;

impl WhitespaceParser {
    pub fn new() -> Self {
        Self
    }
}

impl RecordParser for WhitespaceParser {
    fn split(&self, line: &[u8]) -> Vec<Vec<u8>> {
        line.fields().map(<[u8]>::to_vec).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn split(line: &[u8]) -> Vec<String> {
        WhitespaceParser::new()
            .split(line)
            .into_iter()
            .map(|f| String::from_utf8_lossy(&f).into_owned())
            .collect()
    }

    #[test]
    fn test_collapses_whitespace_runs() {
        assert_eq!(split(b"  1 \t Alice   Smith  "), vec!["1", "Alice", "Smith"]);
    }

    #[test]
    fn test_unicode_whitespace_separates_fields() {
        assert_eq!(split("a\u{00A0}b\u{3000}c".as_bytes()), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_blank_line_has_no_fields() {
        let parser = WhitespaceParser::new();
        assert!(parser.split(b"").is_empty());
        assert!(parser.split(b" \t  ").is_empty());
    }

    #[test]
    fn test_no_quote_handling() {
        assert_eq!(split(b"\"a b\" c"), vec!["\"a", "b\"", "c"]);
    }

    #[test]
    fn test_invalid_utf8_stays_in_field() {
        let fields = WhitespaceParser::new().split(b"caf\xe9 \xff\xfe x");
        assert_eq!(fields, vec![b"caf\xe9".to_vec(), b"\xff\xfe".to_vec(), b"x".to_vec()]);
    }
}
