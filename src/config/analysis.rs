use serde::{Deserialize, Serialize};

/// Text cleaning and English-eligibility thresholds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizerConfig {
    /// Maximum share of symbol characters among non-whitespace characters
    #[serde(default = "default_max_symbol_ratio")]
    pub max_symbol_ratio: f64,

    /// Minimum share of tokens that must look like English words
    #[serde(default = "default_min_recognizable_ratio")]
    pub min_recognizable_ratio: f64,
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        Self {
            max_symbol_ratio: default_max_symbol_ratio(),
            min_recognizable_ratio: default_min_recognizable_ratio(),
        }
    }
}

fn default_max_symbol_ratio() -> f64 {
    0.7
}
fn default_min_recognizable_ratio() -> f64 {
    0.5
}

/// Lexicon scoring rules shared by both classifiers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringConfig {
    /// How many tokens back a negator may sit and still flip a term
    #[serde(default = "default_negation_window")]
    pub negation_window: usize,

    #[serde(default = "default_exclamation_bonus")]
    pub exclamation_bonus: f64,

    #[serde(default = "default_exclamation_cap")]
    pub exclamation_cap: f64,

    /// Bonus per unit of ALL-CAPS token ratio
    #[serde(default = "default_caps_bonus")]
    pub caps_bonus: f64,

    #[serde(default = "default_caps_cap")]
    pub caps_cap: f64,

    /// Added to the magnitude of a sentiment term written in ALL-CAPS
    #[serde(default = "default_caps_term_boost")]
    pub caps_term_boost: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            negation_window: default_negation_window(),
            exclamation_bonus: default_exclamation_bonus(),
            exclamation_cap: default_exclamation_cap(),
            caps_bonus: default_caps_bonus(),
            caps_cap: default_caps_cap(),
            caps_term_boost: default_caps_term_boost(),
        }
    }
}

fn default_negation_window() -> usize {
    3
}
fn default_exclamation_bonus() -> f64 {
    0.3
}
fn default_exclamation_cap() -> f64 {
    1.2
}
fn default_caps_bonus() -> f64 {
    1.0
}
fn default_caps_cap() -> f64 {
    0.6
}
fn default_caps_term_boost() -> f64 {
    0.5
}

/// Sentiment label thresholds and confidence calibration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentConfig {
    /// Normalized polarity strictly above this is positive
    #[serde(default = "default_positive_threshold")]
    pub positive_threshold: f64,

    /// Normalized polarity strictly below this is negative
    #[serde(default = "default_negative_threshold")]
    pub negative_threshold: f64,

    #[serde(default = "default_sentiment_gain")]
    pub confidence_gain: f64,

    #[serde(default = "default_sentiment_neutral_floor")]
    pub neutral_confidence_floor: f64,

    #[serde(default = "default_sentiment_short_tokens")]
    pub short_text_tokens: usize,

    #[serde(default = "default_short_text_penalty")]
    pub short_text_penalty: f64,

    #[serde(default = "default_long_text_tokens")]
    pub long_text_tokens: usize,

    #[serde(default = "default_long_text_penalty")]
    pub long_text_penalty: f64,

    #[serde(default = "default_min_confidence")]
    pub min_confidence: f64,
}

impl Default for SentimentConfig {
    fn default() -> Self {
        Self {
            positive_threshold: default_positive_threshold(),
            negative_threshold: default_negative_threshold(),
            confidence_gain: default_sentiment_gain(),
            neutral_confidence_floor: default_sentiment_neutral_floor(),
            short_text_tokens: default_sentiment_short_tokens(),
            short_text_penalty: default_short_text_penalty(),
            long_text_tokens: default_long_text_tokens(),
            long_text_penalty: default_long_text_penalty(),
            min_confidence: default_min_confidence(),
        }
    }
}

fn default_positive_threshold() -> f64 {
    0.35
}
fn default_negative_threshold() -> f64 {
    -0.35
}
fn default_sentiment_gain() -> f64 {
    0.6
}
fn default_sentiment_neutral_floor() -> f64 {
    0.4
}
fn default_sentiment_short_tokens() -> usize {
    3
}
fn default_short_text_penalty() -> f64 {
    0.2
}
fn default_long_text_tokens() -> usize {
    600
}
fn default_long_text_penalty() -> f64 {
    0.15
}
fn default_min_confidence() -> f64 {
    0.1
}

/// How per-mention stance scores are averaged
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MentionWeighting {
    #[default]
    Equal,
    ByContextLength,
}

/// Stance combination weights, thresholds and confidence calibration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StanceConfig {
    /// Adjacent sentences on each side included in a mention's context
    #[serde(default)]
    pub context_sentences: usize,

    #[serde(default = "default_context_weight")]
    pub context_weight: f64,

    #[serde(default = "default_keyword_weight")]
    pub keyword_weight: f64,

    #[serde(default = "default_polarity_gain")]
    pub polarity_gain: f64,

    #[serde(default = "default_keyword_gain")]
    pub keyword_gain: f64,

    /// Both signals must exceed this magnitude with the same sign to boost
    #[serde(default = "default_agreement_threshold")]
    pub agreement_threshold: f64,

    #[serde(default = "default_agreement_boost")]
    pub agreement_boost: f64,

    #[serde(default = "default_neutral_threshold")]
    pub neutral_threshold: f64,

    #[serde(default)]
    pub weighting: MentionWeighting,

    #[serde(default = "default_stance_neutral_floor")]
    pub neutral_confidence_floor: f64,

    #[serde(default = "default_mention_bonus")]
    pub mention_bonus: f64,

    /// Per-mention score spread above which confidence is reduced
    #[serde(default = "default_spread_threshold")]
    pub spread_threshold: f64,

    /// Spread at which the consistency reduction reaches its maximum
    #[serde(default = "default_spread_saturation")]
    pub spread_saturation: f64,

    #[serde(default = "default_max_consistency_reduction")]
    pub max_consistency_reduction: f64,

    #[serde(default = "default_stance_short_tokens")]
    pub short_text_tokens: usize,

    #[serde(default = "default_short_text_penalty")]
    pub short_text_penalty: f64,

    #[serde(default = "default_clarity_threshold")]
    pub clarity_threshold: f64,

    #[serde(default = "default_clarity_bonus")]
    pub clarity_bonus: f64,

    #[serde(default = "default_min_confidence")]
    pub not_found_confidence: f64,

    #[serde(default = "default_min_confidence")]
    pub min_confidence: f64,
}

impl Default for StanceConfig {
    fn default() -> Self {
        Self {
            context_sentences: 0,
            context_weight: default_context_weight(),
            keyword_weight: default_keyword_weight(),
            polarity_gain: default_polarity_gain(),
            keyword_gain: default_keyword_gain(),
            agreement_threshold: default_agreement_threshold(),
            agreement_boost: default_agreement_boost(),
            neutral_threshold: default_neutral_threshold(),
            weighting: MentionWeighting::default(),
            neutral_confidence_floor: default_stance_neutral_floor(),
            mention_bonus: default_mention_bonus(),
            spread_threshold: default_spread_threshold(),
            spread_saturation: default_spread_saturation(),
            max_consistency_reduction: default_max_consistency_reduction(),
            short_text_tokens: default_stance_short_tokens(),
            short_text_penalty: default_short_text_penalty(),
            clarity_threshold: default_clarity_threshold(),
            clarity_bonus: default_clarity_bonus(),
            not_found_confidence: default_min_confidence(),
            min_confidence: default_min_confidence(),
        }
    }
}

fn default_context_weight() -> f64 {
    0.4
}
fn default_keyword_weight() -> f64 {
    0.6
}
fn default_polarity_gain() -> f64 {
    1.0
}
fn default_keyword_gain() -> f64 {
    1.0
}
fn default_agreement_threshold() -> f64 {
    0.3
}
fn default_agreement_boost() -> f64 {
    1.2
}
fn default_neutral_threshold() -> f64 {
    0.12
}
fn default_stance_neutral_floor() -> f64 {
    0.5
}
fn default_mention_bonus() -> f64 {
    0.1
}
fn default_spread_threshold() -> f64 {
    0.3
}
fn default_spread_saturation() -> f64 {
    1.0
}
fn default_max_consistency_reduction() -> f64 {
    0.8
}
fn default_stance_short_tokens() -> usize {
    5
}
fn default_clarity_threshold() -> f64 {
    0.7
}
fn default_clarity_bonus() -> f64 {
    0.1
}
