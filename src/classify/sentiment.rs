use crate::config::SentimentConfig;
use crate::errors::ProcessingError;
use crate::scoring::{EmphasisContext, ScoringEngine};
use crate::text::NormalizedText;

use super::types::{AnalysisNote, Confidence, SentimentLabel, SentimentResult};

/// Label for a length-normalized polarity. Values exactly on a threshold are
/// neutral.
pub fn label_for(polarity: f64, config: &SentimentConfig) -> SentimentLabel {
    if polarity > config.positive_threshold {
        SentimentLabel::Positive
    } else if polarity < config.negative_threshold {
        SentimentLabel::Negative
    } else {
        SentimentLabel::Neutral
    }
}

/// Confidence before length penalties
fn base_confidence(polarity: f64, label: SentimentLabel, config: &SentimentConfig) -> f64 {
    let strength = (polarity.abs() * config.confidence_gain).tanh();
    match label {
        SentimentLabel::Neutral => strength.max(config.neutral_confidence_floor),
        _ => strength,
    }
}

#[derive(Debug, Clone)]
pub struct SentimentClassifier {
    engine: ScoringEngine,
    config: SentimentConfig,
}

impl SentimentClassifier {
    pub fn new(engine: ScoringEngine, config: SentimentConfig) -> Self {
        Self { engine, config }
    }

    fn ineligible(&self, text: &NormalizedText) -> SentimentResult {
        SentimentResult {
            label: SentimentLabel::Neutral,
            confidence: Confidence::new(self.config.min_confidence),
            polarity: 0.0,
            token_count: text.token_count(),
            notes: vec![AnalysisNote::Ineligible],
        }
    }

    pub fn classify(&self, text: &NormalizedText) -> Result<SentimentResult, ProcessingError> {
        if !text.is_eligible() {
            return Ok(self.ineligible(text));
        }

        let tokens = text.tokens();
        let emphasis = EmphasisContext::from_tokens(tokens, text.exclamations());
        let score = self.engine.score(tokens, &emphasis)?;

        let token_count = tokens.len();
        let polarity = score.raw / (token_count as f64).sqrt();
        let label = label_for(polarity, &self.config);

        let mut confidence = base_confidence(polarity, label, &self.config);
        let mut notes = Vec::new();
        if token_count <= self.config.short_text_tokens {
            confidence -= self.config.short_text_penalty;
            notes.push(AnalysisNote::ShortText);
        }
        if token_count > self.config.long_text_tokens {
            confidence -= self.config.long_text_penalty;
            notes.push(AnalysisNote::LongText);
        }

        tracing::trace!(
            raw = score.raw,
            polarity,
            %label,
            matched_terms = score.matched_terms,
            "classified sentiment"
        );

        Ok(SentimentResult {
            label,
            confidence: Confidence::with_floor(confidence, self.config.min_confidence),
            polarity,
            token_count,
            notes,
        })
    }
}
