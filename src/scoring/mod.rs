//! Lexicon/rule-based polarity scoring.
//!
//! The engine walks a token slice once, matching the longest lexicon phrase at
//! each position, and accumulates two signals:
//!
//! - **polarity**: signed sentiment weight, adjusted by negation, intensifiers
//!   and emphasis
//! - **stance bias**: signed stance keyword weight, adjusted by negation and
//!   intensifiers only
//!
//! The raw polarity is unbounded; classifiers normalize it.

mod emphasis;

pub use emphasis::EmphasisContext;

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::config::ScoringConfig;
use crate::errors::ProcessingError;
use crate::lexicon::Lexicon;
use crate::text::Token;

/// Result of scoring one token span
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PolarityScore {
    /// Term sum plus emphasis bonus
    pub raw: f64,
    pub term_sum: f64,
    /// Bonus added in the direction of the term sum
    pub emphasis: f64,
    pub stance_bias: f64,
    pub matched_terms: usize,
}

#[derive(Debug, Clone)]
pub struct ScoringEngine {
    lexicon: Arc<Lexicon>,
    config: ScoringConfig,
}

#[derive(Debug, Default)]
struct Scan {
    term_sum: f64,
    stance_sum: f64,
    matched: usize,
}

impl ScoringEngine {
    pub fn new(lexicon: Arc<Lexicon>, config: ScoringConfig) -> Self {
        Self { lexicon, config }
    }

    pub fn lexicon(&self) -> &Lexicon {
        &self.lexicon
    }

    fn scan(&self, tokens: &[Token]) -> Scan {
        let mut scan = Scan::default();
        let mut negator_at: Option<usize> = None;
        let mut multiplier = 1.0;
        let mut i = 0;

        while i < tokens.len() {
            let Some(hit) = self.lexicon.longest_match(tokens, i) else {
                multiplier = 1.0;
                i += 1;
                continue;
            };
            let entry = hit.entry;

            if entry.is_negator() {
                negator_at = Some(i + hit.len - 1);
                multiplier = 1.0;
            } else if let Some(factor) = entry.multiplier() {
                multiplier *= factor;
            } else if entry.is_weighted() {
                let negated = negator_at.is_some_and(|n| i - n <= self.config.negation_window);
                if negated {
                    negator_at = None;
                }
                let sign = if negated { -1.0 } else { 1.0 };

                if entry.weight != 0.0 {
                    let shouted = tokens[i..i + hit.len].iter().all(|t| t.all_caps);
                    let boost = if shouted { self.config.caps_term_boost } else { 0.0 };
                    let weight = entry.weight + entry.weight.signum() * boost;
                    scan.term_sum += sign * multiplier * weight;
                    scan.matched += 1;
                }
                if let Some(stance) = entry.stance_weight() {
                    scan.stance_sum += sign * multiplier * stance;
                }
                multiplier = 1.0;
            } else {
                multiplier = 1.0;
            }
            i += hit.len;
        }
        scan
    }

    /// Score a token span with the given emphasis context
    pub fn score(
        &self,
        tokens: &[Token],
        emphasis: &EmphasisContext,
    ) -> Result<PolarityScore, ProcessingError> {
        let scan = self.scan(tokens);
        let bonus = if scan.term_sum == 0.0 {
            0.0
        } else {
            scan.term_sum.signum() * emphasis.bonus(&self.config)
        };
        let raw = scan.term_sum + bonus;

        if !raw.is_finite() || !scan.stance_sum.is_finite() {
            return Err(ProcessingError::scoring(format!(
                "non-finite score over {} tokens",
                tokens.len()
            )));
        }

        Ok(PolarityScore {
            raw,
            term_sum: scan.term_sum,
            emphasis: bonus,
            stance_bias: scan.stance_sum,
            matched_terms: scan.matched,
        })
    }
}
