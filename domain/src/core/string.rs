//! String utilities for the domain layer.

use crate::util::truncate_str;

const ELLIPSIS: &str = "...";

/// Collapse a multi-line message into a single preview line of at most
/// `max_len` bytes, ending in `...` when cut.
pub fn preview_line(s: &str, max_len: usize) -> String {
    let flat = s.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.len() <= max_len {
        return flat;
    }
    let kept = truncate_str(&flat, max_len.saturating_sub(ELLIPSIS.len()));
    format!("{}{}", kept, ELLIPSIS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preview_line_short_input_is_unchanged() {
        assert_eq!(preview_line("hello", 10), "hello");
        assert_eq!(preview_line("hello world", 8), "hello...");
    }

    #[test]
    fn test_preview_line_multibyte() {
        // Each CJK character is 3 bytes
        assert_eq!(preview_line("你好世界", 12), "你好世界");
        // max_len=10 -> 7 bytes kept -> back to char boundary at 6
        assert_eq!(preview_line("你好世界", 10), "你好...");
    }

    #[test]
    fn test_preview_line_flattens_whitespace() {
        assert_eq!(preview_line("line one\n\n  line two", 40), "line one line two");
        assert_eq!(preview_line("a\nb c d e f g", 8), "a b c...");
    }
}
