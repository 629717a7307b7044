//! Labels and result types produced by the classifiers.
//!
//! Labels are closed enums; the only place they become display strings is
//! the interface layer, which applies the configured localization.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Confidence on a 0-1 scale.
///
/// Values are clamped to [0.0, 1.0] on construction; NaN becomes 0.0.
///
/// ```rust
/// use sentiscope::classify::Confidence;
///
/// assert_eq!(Confidence::new(0.85).value(), 0.85);
/// assert_eq!(Confidence::new(1.7).value(), 1.0);
/// assert_eq!(Confidence::new(f64::NAN).value(), 0.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Confidence(f64);

impl Confidence {
    pub fn new(value: f64) -> Self {
        if value.is_nan() {
            Self(0.0)
        } else {
            Self(value.clamp(0.0, 1.0))
        }
    }

    /// Clamp into `[floor, 1.0]`, for classifier minimum confidences
    pub fn with_floor(value: f64, floor: f64) -> Self {
        Self::new(value.max(floor))
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.3}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SentimentLabel {
    Positive,
    Negative,
    Neutral,
}

impl fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SentimentLabel::Positive => "positive",
            SentimentLabel::Negative => "negative",
            SentimentLabel::Neutral => "neutral",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StanceLabel {
    Supportive,
    Opposing,
    Neutral,
}

impl fmt::Display for StanceLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StanceLabel::Supportive => "supportive",
            StanceLabel::Opposing => "opposing",
            StanceLabel::Neutral => "neutral",
        };
        write!(f, "{}", name)
    }
}

/// Why a result fell back to a fixed or penalized confidence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisNote {
    /// Text failed the English-eligibility check
    Ineligible,
    ShortText,
    LongText,
    TargetNotFound,
    /// Mentions disagreed enough to reduce confidence
    InconsistentMentions,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentResult {
    pub label: SentimentLabel,
    pub confidence: Confidence,
    /// Raw polarity divided by the square root of the token count
    pub polarity: f64,
    pub token_count: usize,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<AnalysisNote>,
}

impl SentimentResult {
    pub fn fallback_used(&self) -> bool {
        !self.notes.is_empty()
    }
}

/// Per-mention stance evidence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MentionScore {
    pub sentence: usize,
    pub variant: String,
    pub context_tokens: usize,
    pub polarity: f64,
    pub keyword_bias: f64,
    pub score: f64,
    pub label: StanceLabel,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StanceResult {
    pub label: StanceLabel,
    pub confidence: Confidence,
    /// The target exactly as the caller supplied it
    pub target: String,
    /// Weighted mean of per-mention scores, in [-1, 1]
    pub score: f64,
    /// Multiplier applied for cross-mention disagreement, in (0, 1]
    pub consistency: f64,
    pub mentions: Vec<MentionScore>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<AnalysisNote>,
}

impl StanceResult {
    pub fn mention_count(&self) -> usize {
        self.mentions.len()
    }

    pub fn fallback_used(&self) -> bool {
        self.notes
            .iter()
            .any(|n| matches!(n, AnalysisNote::Ineligible | AnalysisNote::TargetNotFound))
    }

    pub fn mean_polarity(&self) -> f64 {
        mean(self.mentions.iter().map(|m| m.polarity))
    }

    pub fn mean_keyword_bias(&self) -> f64 {
        mean(self.mentions.iter().map(|m| m.keyword_bias))
    }
}

fn mean(values: impl ExactSizeIterator<Item = f64>) -> f64 {
    let n = values.len();
    if n == 0 {
        0.0
    } else {
        values.sum::<f64>() / n as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn labels_serialize_snake_case() {
        assert_eq!(
            serde_json::to_string(&StanceLabel::Supportive).unwrap(),
            "\"supportive\""
        );
        assert_eq!(SentimentLabel::Neutral.to_string(), "neutral");
    }

    #[test]
    fn confidence_serializes_as_number() {
        assert_eq!(serde_json::to_string(&Confidence::new(0.5)).unwrap(), "0.5");
    }

    proptest! {
        #[test]
        fn confidence_always_in_unit_range(value in prop::num::f64::ANY) {
            let c = Confidence::new(value).value();
            prop_assert!((0.0..=1.0).contains(&c));
        }

        #[test]
        fn floor_is_respected(value in -5.0f64..5.0, floor in 0.0f64..1.0) {
            let c = Confidence::with_floor(value, floor).value();
            prop_assert!(c >= floor && c <= 1.0);
        }
    }
}
