//! String helpers for display

/// Truncate to at most `max_chars` characters, ending with `...` when cut
///
/// Counts characters rather than bytes, so multi-byte text is never split.
pub fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    let keep = max_chars.saturating_sub(3);
    let mut out: String = s.chars().take(keep).collect();
    out.push_str("...");
    out
}

/// Collapse runs of whitespace (including newlines) into single spaces
pub fn single_line(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_short_unchanged() {
        assert_eq!(truncate("late invoices", 20), "late invoices");
        assert_eq!(truncate("exact", 5), "exact");
    }

    #[test]
    fn test_truncate_counts_chars() {
        assert_eq!(truncate("reminders", 7), "remi...");
        assert_eq!(truncate("ééééé", 4), "é...");
    }

    #[test]
    fn test_truncate_tiny_limit() {
        assert_eq!(truncate("abcdef", 2), "...");
    }

    #[test]
    fn test_single_line() {
        assert_eq!(single_line("  a\n\tb   c "), "a b c");
    }
}
