//! Immutable term table shared by the scoring engine and both classifiers.
//!
//! A lexicon is loaded once at startup, either from the table embedded in the
//! binary or from a TOML file with the same layout, and is shared behind an
//! `Arc` for the rest of the process. Loading fails fast: a lexicon that
//! cannot be parsed or that violates a weight rule prevents the analyzer
//! from starting.

use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;

use crate::config::LexiconSource;
use crate::errors::LexiconError;
use crate::text::{clean, tokenize, Token};

const EMBEDDED_LEXICON: &str = include_str!("default.toml");

/// Which side of a target a stance keyword leans to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StanceLean {
    Supportive,
    Opposing,
}

impl StanceLean {
    pub fn sign(self) -> f64 {
        match self {
            StanceLean::Supportive => 1.0,
            StanceLean::Opposing => -1.0,
        }
    }
}

/// Rule attached to a term in addition to (or instead of) its polarity weight
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ModifierClass {
    Negator,
    Intensifier { multiplier: f64 },
    Stance { lean: StanceLean, weight: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LexiconEntry {
    /// Signed sentiment weight; zero for pure modifiers
    pub weight: f64,
    pub modifier: Option<ModifierClass>,
}

impl LexiconEntry {
    pub fn is_negator(&self) -> bool {
        matches!(self.modifier, Some(ModifierClass::Negator))
    }

    pub fn multiplier(&self) -> Option<f64> {
        match self.modifier {
            Some(ModifierClass::Intensifier { multiplier }) => Some(multiplier),
            _ => None,
        }
    }

    /// Signed stance keyword weight, if this is a stance keyword
    pub fn stance_weight(&self) -> Option<f64> {
        match self.modifier {
            Some(ModifierClass::Stance { lean, weight }) => Some(lean.sign() * weight),
            _ => None,
        }
    }

    /// Whether a preceding negator or intensifier applies to this term
    pub fn is_weighted(&self) -> bool {
        self.weight != 0.0 || self.stance_weight().is_some()
    }
}

#[derive(Debug, Default, Deserialize)]
struct StanceTerms {
    #[serde(default)]
    supportive: BTreeMap<String, f64>,
    #[serde(default)]
    opposing: BTreeMap<String, f64>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct LexiconFile {
    #[serde(default)]
    negators: Vec<String>,
    #[serde(default)]
    polarity: BTreeMap<String, f64>,
    #[serde(default)]
    intensifiers: BTreeMap<String, f64>,
    #[serde(default)]
    stance: StanceTerms,
}

/// A phrase-aware term table
#[derive(Debug, Clone)]
pub struct Lexicon {
    entries: HashMap<String, LexiconEntry>,
    max_phrase_len: usize,
}

/// A lexicon hit starting at some token position
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TermMatch<'a> {
    pub len: usize,
    pub entry: &'a LexiconEntry,
}

fn term_key(raw: &str) -> Result<(String, usize), LexiconError> {
    let words = tokenize(&clean(raw));
    if words.is_empty() {
        return Err(LexiconError::EmptyTerm {
            term: raw.to_string(),
        });
    }
    Ok((words.join(" "), words.len()))
}

#[derive(Default)]
struct LexiconBuilder {
    entries: HashMap<String, LexiconEntry>,
    max_phrase_len: usize,
}

impl LexiconBuilder {
    fn slot(&mut self, raw: &str) -> Result<&mut LexiconEntry, LexiconError> {
        let (key, len) = term_key(raw)?;
        self.max_phrase_len = self.max_phrase_len.max(len);
        Ok(self.entries.entry(key).or_default())
    }

    fn polarity(&mut self, term: &str, weight: f64) -> Result<(), LexiconError> {
        if !weight.is_finite() || weight == 0.0 {
            return Err(LexiconError::InvalidWeight {
                term: term.to_string(),
            });
        }
        let entry = self.slot(term)?;
        if matches!(
            entry.modifier,
            Some(ModifierClass::Negator | ModifierClass::Intensifier { .. })
        ) {
            return Err(LexiconError::ConflictingModifier {
                term: term.to_string(),
            });
        }
        entry.weight = weight;
        Ok(())
    }

    fn modifier(&mut self, term: &str, modifier: ModifierClass) -> Result<(), LexiconError> {
        let entry = self.slot(term)?;
        let carries_weight = entry.weight != 0.0;
        let conflict = entry.modifier.is_some()
            || (carries_weight && !matches!(modifier, ModifierClass::Stance { .. }));
        if conflict {
            return Err(LexiconError::ConflictingModifier {
                term: term.to_string(),
            });
        }
        entry.modifier = Some(modifier);
        Ok(())
    }
}

fn check_multiplier(term: &str, value: f64) -> Result<f64, LexiconError> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(LexiconError::InvalidMultiplier {
            term: term.to_string(),
            value,
        })
    }
}

impl Lexicon {
    /// The table compiled into the binary
    pub fn embedded() -> Result<Self, LexiconError> {
        Self::from_toml_str(EMBEDDED_LEXICON)
    }

    pub fn from_path(path: &Path) -> Result<Self, LexiconError> {
        let contents = fs::read_to_string(path).map_err(|source| LexiconError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let lexicon = Self::from_toml_str(&contents)?;
        tracing::info!(
            path = %path.display(),
            terms = lexicon.len(),
            "loaded lexicon"
        );
        Ok(lexicon)
    }

    /// Load from the configured source, falling back to the embedded table
    pub fn load(source: &LexiconSource) -> Result<Self, LexiconError> {
        match &source.path {
            Some(path) => Self::from_path(path),
            None => Self::embedded(),
        }
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, LexiconError> {
        let file: LexiconFile = toml::from_str(contents)?;
        if file.polarity.is_empty() {
            return Err(LexiconError::Empty);
        }

        let mut builder = LexiconBuilder::default();
        for (term, weight) in &file.polarity {
            builder.polarity(term, *weight)?;
        }
        for term in &file.negators {
            builder.modifier(term, ModifierClass::Negator)?;
        }
        for (term, value) in &file.intensifiers {
            let multiplier = check_multiplier(term, *value)?;
            builder.modifier(term, ModifierClass::Intensifier { multiplier })?;
        }
        let stance_terms = file
            .stance
            .supportive
            .iter()
            .map(|(t, w)| (t, *w, StanceLean::Supportive))
            .chain(
                file.stance
                    .opposing
                    .iter()
                    .map(|(t, w)| (t, *w, StanceLean::Opposing)),
            );
        for (term, weight, lean) in stance_terms {
            let weight = check_multiplier(term, weight)?;
            builder.modifier(term, ModifierClass::Stance { lean, weight })?;
        }

        Ok(Self {
            entries: builder.entries,
            max_phrase_len: builder.max_phrase_len,
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn max_phrase_len(&self) -> usize {
        self.max_phrase_len
    }

    /// Entry for a single word or space-joined phrase
    pub fn get(&self, term: &str) -> Option<&LexiconEntry> {
        self.entries.get(term)
    }

    /// Longest entry starting at `tokens[at]`
    pub fn longest_match(&self, tokens: &[Token], at: usize) -> Option<TermMatch<'_>> {
        let available = tokens.len().saturating_sub(at);
        let longest = self.max_phrase_len.min(available);
        (1..=longest).rev().find_map(|len| {
            let key = tokens[at..at + len]
                .iter()
                .map(|t| t.text.as_str())
                .collect::<Vec<_>>()
                .join(" ");
            self.entries.get(&key).map(|entry| TermMatch { len, entry })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::Normalizer;
    use indoc::indoc;

    #[test]
    fn embedded_lexicon_loads() {
        let lexicon = Lexicon::embedded().unwrap();
        assert!(lexicon.len() > 100);
        assert_eq!(lexicon.get("love").map(|e| e.weight), Some(3.2));
        assert!(lexicon.get("not").is_some_and(|e| e.is_negator()));
        assert_eq!(lexicon.get("very").and_then(|e| e.multiplier()), Some(1.3));
        assert_eq!(lexicon.get("against").and_then(|e| e.stance_weight()), Some(-1.0));
    }

    #[test]
    fn embedded_lexicon_leaves_neutral_words_out() {
        let lexicon = Lexicon::embedded().unwrap();
        for word in ["product", "arrived", "time", "standard", "features", "company", "founded"] {
            assert!(lexicon.get(word).is_none(), "{} should be neutral", word);
        }
    }

    #[test]
    fn terms_can_carry_polarity_and_stance() {
        let lexicon = Lexicon::embedded().unwrap();
        let entry = lexicon.get("innovative").unwrap();
        assert!(entry.weight > 0.0);
        assert_eq!(entry.stance_weight(), Some(1.0));
    }

    #[test]
    fn longest_phrase_wins() {
        let lexicon = Lexicon::from_toml_str(indoc! {r#"
            [polarity]
            waste = -1.0
            "waste of money" = -2.8
        "#})
        .unwrap();
        let text = Normalizer::default().normalize("a waste of money");
        let hit = lexicon.longest_match(text.tokens(), 1).unwrap();
        assert_eq!(hit.len, 3);
        assert_eq!(hit.entry.weight, -2.8);
        assert_eq!(lexicon.max_phrase_len(), 3);
    }

    #[test]
    fn rejects_empty_polarity_table() {
        let err = Lexicon::from_toml_str("negators = [\"not\"]").unwrap_err();
        assert!(matches!(err, LexiconError::Empty));
    }

    #[test]
    fn rejects_zero_weight() {
        let err = Lexicon::from_toml_str("[polarity]\nmeh = 0.0").unwrap_err();
        assert!(matches!(err, LexiconError::InvalidWeight { .. }));
    }

    #[test]
    fn rejects_negative_multiplier() {
        let err = Lexicon::from_toml_str(indoc! {r#"
            [polarity]
            good = 1.0
            [intensifiers]
            very = -2.0
        "#})
        .unwrap_err();
        assert!(matches!(err, LexiconError::InvalidMultiplier { .. }));
    }

    #[test]
    fn rejects_weighted_negator() {
        let err = Lexicon::from_toml_str(indoc! {r#"
            negators = ["bad"]
            [polarity]
            bad = -1.0
        "#})
        .unwrap_err();
        assert!(matches!(err, LexiconError::ConflictingModifier { .. }));
    }

    #[test]
    fn rejects_malformed_toml() {
        assert!(matches!(
            Lexicon::from_toml_str("[polarity\n"),
            Err(LexiconError::Parse(_))
        ));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = Lexicon::from_path(Path::new("/nonexistent/lexicon.toml")).unwrap_err();
        assert!(matches!(err, LexiconError::Io { .. }));
    }
}
