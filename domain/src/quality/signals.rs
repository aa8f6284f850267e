//! Text signals used by the dimension heuristics
//!
//! Single words match whole lowercase tokens; entries containing a space or
//! a hyphen match as substrings of the lowercased text.

/// Lowercased alphanumeric tokens (apostrophes and hyphens split words)
pub fn tokens(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
        .collect()
}

pub fn word_count(text: &str) -> usize {
    tokens(text).len()
}

pub fn char_len(text: &str) -> usize {
    text.trim().chars().count()
}

pub fn has_digits(text: &str) -> bool {
    text.chars().any(|c| c.is_ascii_digit())
}

fn matches_keyword(lower: &str, words: &[String], keyword: &str) -> bool {
    if keyword.contains(' ') || keyword.contains('-') {
        lower.contains(keyword)
    } else {
        words.iter().any(|w| w == keyword)
    }
}

/// Number of distinct keywords from `keywords` present in `text`
pub fn keyword_hits(text: &str, keywords: &[&str]) -> usize {
    let lower = text.to_lowercase();
    let words = tokens(text);
    keywords
        .iter()
        .filter(|k| matches_keyword(&lower, &words, k))
        .count()
}

/// Whether any keyword from `keywords` is present in `text`
pub fn contains_any(text: &str, keywords: &[&str]) -> bool {
    keyword_hits(text, keywords) > 0
}

/// Number of keyword categories with at least one hit
pub fn category_hits(text: &str, categories: &[&[&str]]) -> usize {
    categories.iter().filter(|c| contains_any(text, c)).count()
}

/// Count of tokens that appear in `keywords` (repeats counted)
pub fn token_occurrences(text: &str, keywords: &[&str]) -> usize {
    tokens(text)
        .iter()
        .filter(|t| keywords.contains(&t.as_str()))
        .count()
}

/// Words that make a statement vague
pub const VAGUE_WORDS: &[&str] = &[
    "maybe",
    "somehow",
    "something",
    "stuff",
    "things",
    "various",
    "etc",
    "probably",
    "perhaps",
    "whatever",
    "kind of",
    "sort of",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokens_lowercase_and_split() {
        assert_eq!(tokens("Who's the User?"), ["who", "s", "the", "user"]);
    }

    #[test]
    fn test_keyword_hits_whole_words_only() {
        // "someone" must not count as "some"
        assert_eq!(keyword_hits("someone helps", &["some"]), 0);
        assert_eq!(keyword_hits("some help", &["some", "help", "none"]), 2);
    }

    #[test]
    fn test_phrase_keywords_use_substring() {
        assert_eq!(keyword_hits("it is kind of slow", VAGUE_WORDS), 1);
        assert_eq!(keyword_hits("end-to-end tests", &["end-to-end"]), 1);
    }

    #[test]
    fn test_category_hits() {
        let cats: [&[&str]; 2] = [&["who", "users"], &["why", "because"]];
        assert_eq!(category_hits("users wait because of queues", &cats), 2);
        assert_eq!(category_hits("nothing here", &cats), 0);
    }

    #[test]
    fn test_has_digits() {
        assert!(has_digits("saves 3 hours"));
        assert!(!has_digits("saves hours"));
    }

    #[test]
    fn test_token_occurrences_counts_repeats() {
        assert_eq!(token_occurrences("users and users", &["users"]), 2);
    }
}
