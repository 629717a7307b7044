use crate::config::{MentionWeighting, StanceConfig};
use crate::errors::ProcessingError;
use crate::scoring::{EmphasisContext, ScoringEngine};
use crate::text::{Mention, NormalizedText, TargetVariants};

use super::types::{AnalysisNote, Confidence, MentionScore, StanceLabel, StanceResult};

/// Label for a combined stance score. Values exactly on the threshold are
/// neutral.
pub fn label_for(score: f64, config: &StanceConfig) -> StanceLabel {
    if score > config.neutral_threshold {
        StanceLabel::Supportive
    } else if score < -config.neutral_threshold {
        StanceLabel::Opposing
    } else {
        StanceLabel::Neutral
    }
}

/// Blend context polarity and keyword bias, boosting agreeing signals
pub fn combine(polarity: f64, keyword: f64, config: &StanceConfig) -> f64 {
    let blended = config.context_weight * polarity + config.keyword_weight * keyword;
    let agree = polarity.abs() > config.agreement_threshold
        && keyword.abs() > config.agreement_threshold
        && polarity.signum() == keyword.signum();
    let boosted = if agree {
        blended * config.agreement_boost
    } else {
        blended
    };
    boosted.clamp(-1.0, 1.0)
}

/// Confidence multiplier for disagreement between mention scores, in
/// `[1 - max_consistency_reduction, 1]`
pub fn consistency_factor(scores: &[f64], config: &StanceConfig) -> f64 {
    if scores.len() < 2 {
        return 1.0;
    }
    let max = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let min = scores.iter().copied().fold(f64::INFINITY, f64::min);
    let spread = max - min;
    if spread <= config.spread_threshold {
        return 1.0;
    }
    let severity = ((spread - config.spread_threshold)
        / (config.spread_saturation - config.spread_threshold))
        .clamp(0.0, 1.0);
    1.0 - config.max_consistency_reduction * severity
}

#[derive(Debug, Clone)]
pub struct StanceClassifier {
    engine: ScoringEngine,
    config: StanceConfig,
}

impl StanceClassifier {
    pub fn new(engine: ScoringEngine, config: StanceConfig) -> Self {
        Self { engine, config }
    }

    fn fallback(&self, target: &str, confidence: f64, note: AnalysisNote) -> StanceResult {
        StanceResult {
            label: StanceLabel::Neutral,
            confidence: Confidence::new(confidence),
            target: target.to_string(),
            score: 0.0,
            consistency: 1.0,
            mentions: Vec::new(),
            notes: vec![note],
        }
    }

    fn score_mention(
        &self,
        text: &NormalizedText,
        mention: &Mention,
    ) -> Result<MentionScore, ProcessingError> {
        let reach = self.config.context_sentences;
        let window = mention.sentence.saturating_sub(reach)..mention.sentence + reach + 1;
        let exclamations = text
            .sentences()
            .get(window.start..window.end.min(text.sentences().len()))
            .map(|sentences| sentences.iter().map(|s| s.exclamations).sum())
            .unwrap_or(0);
        let tokens = text.sentence_tokens(window);
        let emphasis = EmphasisContext::from_tokens(tokens, exclamations);
        let score = self.engine.score(tokens, &emphasis)?;

        let length = tokens.len().max(1) as f64;
        let polarity = (score.raw / length.sqrt() * self.config.polarity_gain).tanh();
        let keyword_bias = (score.stance_bias * self.config.keyword_gain).tanh();
        let combined = combine(polarity, keyword_bias, &self.config);

        Ok(MentionScore {
            sentence: mention.sentence,
            variant: mention.variant.clone(),
            context_tokens: tokens.len(),
            polarity,
            keyword_bias,
            score: combined,
            label: label_for(combined, &self.config),
        })
    }

    fn aggregate(&self, mentions: &[MentionScore]) -> f64 {
        let weight = |m: &MentionScore| match self.config.weighting {
            MentionWeighting::Equal => 1.0,
            MentionWeighting::ByContextLength => m.context_tokens.max(1) as f64,
        };
        let total: f64 = mentions.iter().map(weight).sum();
        if total == 0.0 {
            return 0.0;
        }
        let weighted: f64 = mentions.iter().map(|m| weight(m) * m.score).sum();
        (weighted / total).clamp(-1.0, 1.0)
    }

    /// Classify stance toward `target`. The returned target echoes the
    /// argument unchanged.
    pub fn classify(
        &self,
        text: &NormalizedText,
        target: &str,
    ) -> Result<StanceResult, ProcessingError> {
        if !text.is_eligible() {
            return Ok(self.fallback(target, self.config.min_confidence, AnalysisNote::Ineligible));
        }

        let found = TargetVariants::new(target).find_in(text);
        if found.is_empty() {
            tracing::debug!(target, "target not mentioned");
            return Ok(self.fallback(
                target,
                self.config.not_found_confidence,
                AnalysisNote::TargetNotFound,
            ));
        }

        let mentions = found
            .iter()
            .map(|mention| self.score_mention(text, mention))
            .collect::<Result<Vec<_>, _>>()?;

        let score = self.aggregate(&mentions);
        let label = label_for(score, &self.config);
        let per_mention: Vec<f64> = mentions.iter().map(|m| m.score).collect();
        let consistency = consistency_factor(&per_mention, &self.config);

        let mut notes = Vec::new();
        let mut confidence = score.abs();
        if label == StanceLabel::Neutral {
            confidence = confidence.max(self.config.neutral_confidence_floor);
        }
        if mentions.len() > 1 {
            confidence += self.config.mention_bonus;
        }
        if consistency < 1.0 {
            confidence *= consistency;
            notes.push(AnalysisNote::InconsistentMentions);
        }
        if text.token_count() < self.config.short_text_tokens {
            confidence -= self.config.short_text_penalty;
            notes.push(AnalysisNote::ShortText);
        }
        if score.abs() > self.config.clarity_threshold {
            confidence += self.config.clarity_bonus;
        }

        tracing::trace!(
            target,
            score,
            %label,
            mentions = mentions.len(),
            consistency,
            "classified stance"
        );

        Ok(StanceResult {
            label,
            confidence: Confidence::with_floor(confidence, self.config.min_confidence),
            target: target.to_string(),
            score,
            consistency,
            mentions,
            notes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ScoringConfig;
    use crate::lexicon::Lexicon;
    use crate::text::Normalizer;
    use std::sync::Arc;

    fn classifier_with(config: StanceConfig) -> StanceClassifier {
        let engine = ScoringEngine::new(
            Arc::new(Lexicon::embedded().unwrap()),
            ScoringConfig::default(),
        );
        StanceClassifier::new(engine, config)
    }

    fn classify(raw: &str, target: &str) -> StanceResult {
        classifier_with(StanceConfig::default())
            .classify(&Normalizer::default().normalize(raw), target)
            .unwrap()
    }

    #[test]
    fn combine_boosts_agreeing_signals() {
        let config = StanceConfig::default();
        let plain = 0.4 * 0.5 + 0.6 * 0.5;
        assert!((combine(0.5, 0.5, &config) - plain * 1.2).abs() < 1e-9);
        assert!((combine(0.5, -0.5, &config) - (0.2 - 0.3)).abs() < 1e-9);
        assert_eq!(combine(1.0, 1.0, &config), 1.0);
    }

    #[test]
    fn consistency_ignores_small_spread() {
        let config = StanceConfig::default();
        assert_eq!(consistency_factor(&[0.5], &config), 1.0);
        assert_eq!(consistency_factor(&[0.4, 0.6], &config), 1.0);
        let factor = consistency_factor(&[0.8, -0.8], &config);
        assert!((factor - 0.2).abs() < 1e-9);
    }

    #[test]
    fn supportive_keywords_toward_target() {
        let result = classify(
            "Apple makes innovative products that change the industry",
            "Apple",
        );
        assert_eq!(result.label, StanceLabel::Supportive);
        assert!(result.confidence.value() > 0.6);
        assert_eq!(result.target, "Apple");
        assert_eq!(result.mention_count(), 1);
    }

    #[test]
    fn opposing_keywords_toward_target() {
        let result = classify("We strongly oppose the new tax plan. It is a bad idea.", "tax plan");
        assert_eq!(result.label, StanceLabel::Opposing);
    }

    #[test]
    fn factual_mention_is_neutral() {
        let result = classify(
            "Amazon is a large e-commerce company founded in 1994.",
            "Amazon",
        );
        assert_eq!(result.label, StanceLabel::Neutral);
        assert!((result.confidence.value() - 0.5).abs() < 1e-9);
    }

    #[test]
    fn missing_target_is_low_confidence_neutral() {
        let result = classify("Apple", "Microsoft");
        assert_eq!(result.label, StanceLabel::Neutral);
        assert_eq!(result.confidence.value(), 0.1);
        assert_eq!(result.target, "Microsoft");
        assert_eq!(result.notes, vec![AnalysisNote::TargetNotFound]);
    }

    #[test]
    fn mixed_mentions_lower_confidence() {
        let mixed = classify("I love Apple. Apple is terrible.", "Apple");
        let consistent = classify("I love Apple. Apple is great.", "Apple");
        assert_eq!(mixed.mention_count(), 2);
        assert!(mixed.consistency < 1.0);
        assert!(mixed.notes.contains(&AnalysisNote::InconsistentMentions));
        assert!(mixed.confidence.value() < consistent.confidence.value());
    }

    #[test]
    fn context_sentences_widen_window() {
        let narrow = classify("Tesla released a car. It is terrible.", "Tesla");
        assert_eq!(narrow.label, StanceLabel::Neutral);

        let wide = classifier_with(StanceConfig {
            context_sentences: 1,
            ..StanceConfig::default()
        })
        .classify(
            &Normalizer::default().normalize("Tesla released a car. It is terrible."),
            "Tesla",
        )
        .unwrap();
        assert_eq!(wide.label, StanceLabel::Opposing);
    }
}
