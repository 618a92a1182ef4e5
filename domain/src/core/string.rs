//! String utilities for the domain layer.

/// Truncate a string to a maximum length with ellipsis (UTF-8 safe)
///
/// Uses byte length for max_len but ensures truncation occurs at valid
/// UTF-8 character boundaries. Used for log and history previews.
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        s.to_string()
    } else {
        let target = max_len.saturating_sub(3);
        let mut end = target.min(s.len());
        while end > 0 && !s.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &s[..end])
    }
}

/// Collapse runs of whitespace (including newlines) into single spaces.
pub fn single_line(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_ascii() {
        assert_eq!(truncate("hello", 10), "hello");
        assert_eq!(truncate("hello world", 8), "hello...");
    }

    #[test]
    fn test_truncate_multibyte() {
        // 'ह' is 3 bytes
        let s = "हनुमान";
        assert_eq!(truncate(s, 30), s);
        // target = 4 → backs up to the boundary at 3
        assert_eq!(truncate(s, 7), "ह...");
    }

    #[test]
    fn test_truncate_emoji() {
        // 4 bytes each: max_len=10 → target=7 → boundary at 4
        assert_eq!(truncate("🚩🚩🚩", 10), "🚩...");
        assert_eq!(truncate("🚩🚩🚩", 11), "🚩🚩...");
    }

    #[test]
    fn test_single_line() {
        assert_eq!(single_line("  a\n b\t\tc  "), "a b c");
        assert_eq!(single_line(""), "");
    }
}
