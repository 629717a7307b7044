use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::ops::Range;

use super::contractions::expand_contractions;
use super::eligibility::{recognizable_ratio, symbol_ratio};
use crate::config::NormalizerConfig;

pub const URL_PLACEHOLDER: &str = "url";
pub const EMAIL_PLACEHOLDER: &str = "email";
pub const MENTION_PLACEHOLDER: &str = "user";

static URL: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\b(?:https?://|www\.)\S+").unwrap());
static EMAIL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b[A-Za-z0-9._%+\-]+@[A-Za-z0-9.\-]+\.[A-Za-z]{2,}\b").unwrap());
static MENTION: Lazy<Regex> = Lazy::new(|| Regex::new(r"@\w+").unwrap());
static HASHTAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"#(\w+)").unwrap());
static SOFT_PUNCT_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"[.,;:]{2,}").unwrap());
static EMPHASIS_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"[!?]{4,}").unwrap());
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());
static TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\p{L}\p{N}]+(?:['\-][\p{L}\p{N}]+)*").unwrap());

const URL_TRAILING: &[char] = &['.', ',', '!', '?', ';', ':', ')', '"', '\''];

/// A lower-cased word with its emphasis flag
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub text: String,
    /// Written entirely in capitals in the original, with at least two letters
    pub all_caps: bool,
    pub sentence: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sentence {
    /// Case-preserved sentence text including its terminator
    pub text: String,
    pub tokens: Range<usize>,
    pub exclamations: usize,
}

/// Cleaned, tokenized request text. Produced once per request and read-only
/// afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedText {
    text: String,
    lowered: String,
    sentences: Vec<Sentence>,
    tokens: Vec<Token>,
    symbol_ratio: f64,
    recognizable_ratio: f64,
    eligible: bool,
}

impl NormalizedText {
    /// Cleaned text with case preserved
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn lowered(&self) -> &str {
        &self.lowered
    }

    pub fn sentences(&self) -> &[Sentence] {
        &self.sentences
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn token_count(&self) -> usize {
        self.tokens.len()
    }

    pub fn symbol_ratio(&self) -> f64 {
        self.symbol_ratio
    }

    pub fn recognizable_ratio(&self) -> f64 {
        self.recognizable_ratio
    }

    pub fn is_eligible(&self) -> bool {
        self.eligible
    }

    pub fn exclamations(&self) -> usize {
        self.sentences.iter().map(|s| s.exclamations).sum()
    }

    /// Tokens of the sentences in `range`, clamped to the sentence count
    pub fn sentence_tokens(&self, range: Range<usize>) -> &[Token] {
        let end = range.end.min(self.sentences.len());
        if range.start >= end {
            return &[];
        }
        let first = self.sentences[range.start].tokens.start;
        let last = self.sentences[end - 1].tokens.end;
        &self.tokens[first..last]
    }
}

/// Replace URLs, e-mail addresses and @mentions with placeholders, and strip
/// the `#` from hashtags. Sentence punctuation trailing a URL is kept.
fn replace_entities(text: &str) -> String {
    let text = URL.replace_all(text, |caps: &Captures| {
        let matched = &caps[0];
        let kept = matched.trim_end_matches(URL_TRAILING);
        format!("{}{}", URL_PLACEHOLDER, &matched[kept.len()..])
    });
    let text = EMAIL.replace_all(&text, EMAIL_PLACEHOLDER);
    let text = MENTION.replace_all(&text, MENTION_PLACEHOLDER);
    HASHTAG.replace_all(&text, "$1").into_owned()
}

fn is_allowed(c: char) -> bool {
    c.is_alphanumeric()
        || c.is_whitespace()
        || matches!(c, '.' | ',' | '!' | '?' | ';' | ':' | '-' | '\'' | '"' | '(' | ')')
}

/// Collapse any run of one character longer than three down to three
fn collapse_repeats(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut previous = None;
    let mut run = 0usize;
    for c in text.chars() {
        if Some(c) == previous {
            run += 1;
        } else {
            previous = Some(c);
            run = 1;
        }
        if run <= 3 {
            out.push(c);
        }
    }
    out
}

/// Expand until no contraction is left; every expansion removes an apostrophe
fn expand_all_contractions(text: &str) -> String {
    let mut current = text.to_string();
    loop {
        let next = expand_contractions(&current);
        if next == current {
            return current;
        }
        current = next;
    }
}

/// Clean raw text: placeholders, contractions, symbol stripping, run
/// collapsing and whitespace normalization. Idempotent.
pub fn clean(raw: &str) -> String {
    let folded: String = raw
        .chars()
        .map(|c| match c {
            '\u{2019}' | '\u{2018}' | '`' => '\'',
            '\u{201C}' | '\u{201D}' => '"',
            other => other,
        })
        .collect();
    let replaced = replace_entities(&collapse_repeats(&folded));
    let expanded = expand_all_contractions(&replaced);
    let stripped: String = expanded
        .chars()
        .map(|c| if is_allowed(c) { c } else { ' ' })
        .collect();
    let collapsed = collapse_repeats(&stripped);
    let collapsed = SOFT_PUNCT_RUN.replace_all(&collapsed, |caps: &Captures| caps[0][..1].to_string());
    let collapsed = EMPHASIS_RUN.replace_all(&collapsed, |caps: &Captures| caps[0][..3].to_string());
    WHITESPACE.replace_all(&collapsed, " ").trim().to_string()
}

/// Byte ranges of sentences in cleaned text. Runs of `.`, `!` and `?` end a
/// sentence, except a `.` between two digits.
fn sentence_spans(text: &str) -> Vec<Range<usize>> {
    let chars: Vec<(usize, char)> = text.char_indices().collect();
    let mut spans = Vec::new();
    let mut start = 0usize;
    let mut i = 0usize;
    while i < chars.len() {
        let (_, c) = chars[i];
        let is_terminator = matches!(c, '.' | '!' | '?');
        let decimal_point = c == '.'
            && i > 0
            && chars[i - 1].1.is_ascii_digit()
            && chars.get(i + 1).is_some_and(|(_, next)| next.is_ascii_digit());
        if is_terminator && !decimal_point {
            let mut j = i;
            while j < chars.len() && matches!(chars[j].1, '.' | '!' | '?') {
                j += 1;
            }
            let end = chars.get(j).map(|(offset, _)| *offset).unwrap_or(text.len());
            spans.push(start..end);
            start = end;
            i = j;
        } else {
            i += 1;
        }
    }
    if start < text.len() {
        spans.push(start..text.len());
    }
    spans
}

fn is_all_caps(word: &str) -> bool {
    let letters: Vec<char> = word.chars().filter(|c| c.is_alphabetic()).collect();
    letters.len() >= 2 && letters.iter().all(|c| c.is_uppercase())
}

/// Tokenize a fragment the same way request text is tokenized
pub fn tokenize(text: &str) -> Vec<String> {
    TOKEN
        .find_iter(text)
        .map(|m| m.as_str().to_lowercase())
        .collect()
}

#[derive(Debug, Clone, Default)]
pub struct Normalizer {
    config: NormalizerConfig,
}

impl Normalizer {
    pub fn new(config: NormalizerConfig) -> Self {
        Self { config }
    }

    /// Normalize raw text. Total for any input; unusable text comes back
    /// marked ineligible rather than as an error.
    ///
    /// Everything, eligibility included, is derived from the cleaned text,
    /// so two inputs that clean to the same string normalize identically.
    pub fn normalize(&self, raw: &str) -> NormalizedText {
        let text = clean(raw);
        let symbol_ratio = symbol_ratio(&text);
        let mut sentences: Vec<Sentence> = Vec::new();
        let mut tokens: Vec<Token> = Vec::new();

        for span in sentence_spans(&text) {
            let segment = text[span].trim();
            let first = tokens.len();
            let index = sentences.len();
            tokens.extend(TOKEN.find_iter(segment).map(|m| Token {
                text: m.as_str().to_lowercase(),
                all_caps: is_all_caps(m.as_str()),
                sentence: index,
            }));
            let exclamations = segment.matches('!').count();
            if tokens.len() == first {
                // Punctuation-only fragment: fold its emphasis into the previous sentence
                if let Some(previous) = sentences.last_mut() {
                    previous.exclamations += exclamations;
                }
                continue;
            }
            sentences.push(Sentence {
                text: segment.to_string(),
                tokens: first..tokens.len(),
                exclamations,
            });
        }

        let recognizable_ratio = recognizable_ratio(tokens.iter().map(|t| t.text.as_str()));
        let eligible = !tokens.is_empty()
            && symbol_ratio <= self.config.max_symbol_ratio
            && recognizable_ratio >= self.config.min_recognizable_ratio;

        if !eligible {
            tracing::debug!(
                symbol_ratio,
                recognizable_ratio,
                tokens = tokens.len(),
                "text is not eligible for analysis"
            );
        }

        NormalizedText {
            lowered: text.to_lowercase(),
            text,
            sentences,
            tokens,
            symbol_ratio,
            recognizable_ratio,
            eligible,
        }
    }
}
