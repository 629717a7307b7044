//! English-eligibility heuristics.

use once_cell::sync::Lazy;
use std::collections::HashSet;

static COMMON_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "a", "about", "after", "all", "also", "am", "an", "and", "any", "are", "as", "at", "be",
        "because", "been", "but", "by", "can", "cannot", "could", "day", "did", "do", "does",
        "even", "first", "for", "from", "get", "give", "go", "good", "had", "has", "have", "he",
        "her", "him", "his", "how", "i", "if", "in", "into", "is", "it", "its", "just", "know",
        "like", "look", "make", "me", "more", "most", "my", "new", "no", "not", "now", "of", "on",
        "one", "only", "or", "other", "our", "out", "over", "people", "say", "see", "she", "so",
        "some", "take", "than", "that", "the", "their", "them", "then", "there", "these", "they",
        "think", "this", "time", "to", "two", "up", "us", "use", "very", "want", "was", "way",
        "we", "well", "were", "what", "when", "which", "who", "will", "with", "work", "would",
        "year", "you", "your",
    ]
    .into_iter()
    .collect()
});

pub fn is_common_word(token: &str) -> bool {
    COMMON_WORDS.contains(token)
}

/// A token counts as English-looking if it is a common function word or an
/// ASCII word (internal `'`/`-` allowed) containing a vowel.
pub fn is_recognizable(token: &str) -> bool {
    if is_common_word(token) {
        return true;
    }
    let ascii_word = token
        .chars()
        .all(|c| c.is_ascii_alphabetic() || c == '\'' || c == '-');
    ascii_word && token.chars().any(|c| matches!(c, 'a' | 'e' | 'i' | 'o' | 'u' | 'y'))
}

/// Share of non-whitespace characters that are neither letters nor digits.
/// Text with no visible characters is treated as all symbols.
pub fn symbol_ratio(text: &str) -> f64 {
    let (visible, symbols) = text
        .chars()
        .filter(|c| !c.is_whitespace())
        .fold((0usize, 0usize), |(visible, symbols), c| {
            (visible + 1, symbols + usize::from(!c.is_alphanumeric()))
        });
    if visible == 0 {
        1.0
    } else {
        symbols as f64 / visible as f64
    }
}

pub fn recognizable_ratio<'a>(tokens: impl ExactSizeIterator<Item = &'a str>) -> f64 {
    let total = tokens.len();
    if total == 0 {
        return 0.0;
    }
    let recognized = tokens.filter(|t| is_recognizable(t)).count();
    recognized as f64 / total as f64
}
