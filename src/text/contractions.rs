//! Contraction expansion.
//!
//! Irregular forms come from a fixed table; the regular suffixes (`n't`,
//! `'re`, `'ve`, `'ll`, `'m`, `'d`) are expanded by rule. A bare `'s` is left
//! alone outside the table because it is usually a possessive, which the
//! target matcher relies on.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

const IRREGULAR: &[(&str, &str)] = &[
    ("can't", "cannot"),
    ("won't", "will not"),
    ("shan't", "shall not"),
    ("ain't", "is not"),
    ("y'all", "you all"),
    ("let's", "let us"),
    ("it's", "it is"),
    ("he's", "he is"),
    ("she's", "she is"),
    ("that's", "that is"),
    ("there's", "there is"),
    ("here's", "here is"),
    ("what's", "what is"),
    ("where's", "where is"),
    ("who's", "who is"),
    ("how's", "how is"),
];

const SUFFIXES: &[(&str, &str)] = &[
    ("n't", " not"),
    ("'re", " are"),
    ("'ve", " have"),
    ("'ll", " will"),
    ("'m", " am"),
    ("'d", " would"),
];

static IRREGULAR_PATTERN: Lazy<Regex> = Lazy::new(|| {
    let alternatives: Vec<String> = IRREGULAR.iter().map(|(from, _)| regex::escape(from)).collect();
    Regex::new(&format!(r"(?i)\b(?:{})\b", alternatives.join("|"))).unwrap()
});

static SUFFIX_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b([\p{L}]+?)(n't|'re|'ve|'ll|'m|'d)\b").unwrap()
});

fn is_shouting(word: &str) -> bool {
    let mut letters = word.chars().filter(|c| c.is_alphabetic()).peekable();
    letters.peek().is_some() && letters.all(|c| c.is_uppercase())
}

fn match_case(original: &str, expansion: &str) -> String {
    if is_shouting(original) {
        expansion.to_uppercase()
    } else if original.chars().next().is_some_and(|c| c.is_uppercase()) {
        let mut chars = expansion.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    } else {
        expansion.to_string()
    }
}

fn expand_irregular(caps: &Captures) -> String {
    let matched = &caps[0];
    let lower = matched.to_lowercase();
    IRREGULAR
        .iter()
        .find(|(from, _)| *from == lower)
        .map(|(_, to)| match_case(matched, to))
        .unwrap_or_else(|| matched.to_string())
}

fn expand_suffix(caps: &Captures) -> String {
    let stem = &caps[1];
    let suffix = caps[2].to_lowercase();
    let expansion = SUFFIXES
        .iter()
        .find(|(from, _)| *from == suffix)
        .map(|(_, to)| *to)
        .unwrap_or("");
    let expansion = if is_shouting(&caps[0]) {
        expansion.to_uppercase()
    } else {
        expansion.to_string()
    };
    format!("{}{}", stem, expansion)
}

/// Expand English contractions, keeping the case of the original word
pub fn expand_contractions(text: &str) -> String {
    let text = IRREGULAR_PATTERN.replace_all(text, expand_irregular);
    SUFFIX_PATTERN.replace_all(&text, expand_suffix).into_owned()
}
