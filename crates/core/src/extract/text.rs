//! Byte-offset helpers for carving context windows out of model answers.
//!
//! Regex match offsets always sit on char boundaries, but offsets widened by
//! a fixed byte count do not, so every slice here is clamped first.

use std::ops::Range;

/// Largest char boundary in `s` that is `<= i`.
fn floor_char_boundary(s: &str, mut i: usize) -> usize {
    if i >= s.len() {
        return s.len();
    }
    while !s.is_char_boundary(i) {
        i -= 1;
    }
    i
}

/// Window reaching `before` bytes ahead of `span.start` and `after` bytes past
/// `span.end`, clamped to the text.
pub(super) fn window(text: &str, span: Range<usize>, before: usize, after: usize) -> &str {
    let start = floor_char_boundary(text, span.start.saturating_sub(before));
    let end = floor_char_boundary(text, span.end.saturating_add(after));
    &text[start..end]
}

/// Line breaks flattened to spaces, outer whitespace trimmed.
pub(super) fn flatten(text: &str) -> String {
    text.replace(['\r', '\n'], " ").trim().to_string()
}

/// Lenient decimal parse; an unparseable or non-finite capture counts as
/// absent so the caller's fallback policy applies.
pub(super) fn parse_decimal(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_clamps_to_text_bounds() {
        let s = "abcdef";
        assert_eq!(window(s, 2..3, 100, 100), "abcdef");
        assert_eq!(window(s, 2..3, 1, 1), "bcd");
    }

    #[test]
    fn window_never_splits_multibyte_chars() {
        // "é" is two bytes; widened offsets landing one byte into it must be
        // clamped, not panic.
        let s = "ééééé AAPL ééééé";
        let pos = s.find("AAPL").unwrap();
        let w = window(s, pos..pos + 4, 2, 4);
        assert!(w.contains("AAPL"));
    }

    #[test]
    fn flatten_joins_lines() {
        assert_eq!(flatten("a\nb\r\nc\n"), "a b  c");
    }

    #[test]
    fn parse_decimal_rejects_garbage() {
        assert_eq!(parse_decimal("187.65"), Some(187.65));
        assert_eq!(parse_decimal("187."), Some(187.0));
        assert_eq!(parse_decimal("abc"), None);
        assert_eq!(parse_decimal(""), None);
    }
}
