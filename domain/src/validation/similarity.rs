//! Word-overlap similarity between stage fields

use std::collections::BTreeSet;

pub const MIN_TOKEN_LEN: usize = 3;

/// Lowercase alphanumeric tokens of at least three characters
pub fn token_set(text: &str) -> BTreeSet<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| t.chars().count() >= MIN_TOKEN_LEN)
        .map(str::to_lowercase)
        .collect()
}

/// Jaccard similarity of the two token sets; 0 when both are empty
///
/// ```
/// use stagegate_domain::validation::similarity::jaccard;
///
/// assert_eq!(jaccard("invoice reminders", "Reminders, invoice"), 1.0);
/// assert_eq!(jaccard("", ""), 0.0);
/// ```
pub fn jaccard(a: &str, b: &str) -> f64 {
    let a = token_set(a);
    let b = token_set(b);
    let union = a.union(&b).count();
    if union == 0 {
        return 0.0;
    }
    a.intersection(&b).count() as f64 / union as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_tokens_ignored() {
        let tokens = token_set("An app to do it, for US users");
        assert_eq!(
            tokens.into_iter().collect::<Vec<_>>(),
            ["app", "for", "users"]
        );
    }

    #[test]
    fn test_partial_overlap() {
        // {late, invoice, payments} vs {invoice, reminders}: 1 / 4
        assert_eq!(jaccard("late invoice payments", "invoice reminders"), 0.25);
    }

    #[test]
    fn test_three_letter_words_count() {
        // "for" survives the length filter: 2 / 3
        let score = jaccard("invoice reminders", "Reminders for invoice");
        assert!((score - 2.0 / 3.0).abs() < 1e-9, "{score}");
        assert_eq!(jaccard("invoice reminders", "Reminders, invoice"), 1.0);
    }

    #[test]
    fn test_disjoint_is_zero() {
        assert_eq!(jaccard("alpha beta", "gamma delta"), 0.0);
    }
}
