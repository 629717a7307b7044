//! Target mention search.

use serde::{Deserialize, Serialize};

use super::normalizer::{clean, tokenize, NormalizedText, Token};

/// A sentence that mentions the target
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mention {
    pub sentence: usize,
    /// The variant that matched, space-joined
    pub variant: String,
}

/// Case-insensitive surface forms of a target
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetVariants {
    canonical: String,
    variants: Vec<Vec<String>>,
}

/// Lower-case, whitespace-collapsed form used for cache keys
pub fn canonical_target(target: &str) -> String {
    target
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

fn plural_of(word: &str) -> String {
    let sibilant = ["s", "x", "z", "ch", "sh"]
        .iter()
        .any(|suffix| word.ends_with(suffix));
    if sibilant {
        format!("{}es", word)
    } else {
        format!("{}s", word)
    }
}

fn possessive_of(word: &str) -> String {
    if word.ends_with('s') {
        // Trailing apostrophe is dropped by the tokenizer, so this is the bare word
        word.to_string()
    } else {
        format!("{}'s", word)
    }
}

impl TargetVariants {
    pub fn new(target: &str) -> Self {
        let literal = tokenize(&clean(target));
        let mut variants = vec![literal.clone()];

        if let Some((last, head)) = literal.split_last() {
            for form in [plural_of(last), possessive_of(last)] {
                let mut variant = head.to_vec();
                variant.push(form);
                if !variants.contains(&variant) {
                    variants.push(variant);
                }
            }
        }

        Self {
            canonical: canonical_target(target),
            variants,
        }
    }

    pub fn canonical(&self) -> &str {
        &self.canonical
    }

    pub fn is_empty(&self) -> bool {
        self.variants.first().is_none_or(|literal| literal.is_empty())
    }

    /// First variant, in declaration order, matching a token run in `tokens`
    fn match_in(&self, tokens: &[Token]) -> Option<&[String]> {
        self.variants
            .iter()
            .filter(|variant| !variant.is_empty())
            .find(|variant| {
                tokens.windows(variant.len()).any(|window| {
                    window
                        .iter()
                        .zip(variant.iter())
                        .all(|(token, word)| token.text == *word)
                })
            })
            .map(|variant| variant.as_slice())
    }

    /// One mention per sentence containing any variant as a whole-token match
    pub fn find_in(&self, text: &NormalizedText) -> Vec<Mention> {
        if self.is_empty() {
            return Vec::new();
        }
        (0..text.sentences().len())
            .filter_map(|index| {
                self.match_in(text.sentence_tokens(index..index + 1))
                    .map(|variant| Mention {
                        sentence: index,
                        variant: variant.join(" "),
                    })
            })
            .collect()
    }
}

/// Locate `target` in normalized text
pub fn find_mentions(text: &NormalizedText, target: &str) -> Vec<Mention> {
    TargetVariants::new(target).find_in(text)
}
