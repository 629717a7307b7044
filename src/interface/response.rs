use serde::{Deserialize, Serialize};

use super::labels::LabelMap;
use crate::classify::{SentimentResult, StanceResult};
use crate::errors::Error;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentResponse {
    pub sentiment: String,
    pub confidence: f64,
}

impl SentimentResponse {
    pub fn from_result(result: &SentimentResult, labels: &LabelMap) -> Self {
        Self {
            sentiment: labels.sentiment(result.label).to_string(),
            confidence: result.confidence.value(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StanceResponse {
    pub stance: String,
    pub confidence: f64,
    pub target: String,
}

impl StanceResponse {
    pub fn from_result(result: &StanceResult, labels: &LabelMap) -> Self {
        Self {
            stance: labels.stance(result.label).to_string(),
            confidence: result.confidence.value(),
            target: result.target.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error_code: String,
    pub message: String,
}

impl From<&Error> for ErrorResponse {
    fn from(error: &Error) -> Self {
        Self {
            error_code: error.code().to_string(),
            message: error.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::{Confidence, SentimentLabel};
    use crate::errors::ValidationError;

    #[test]
    fn neutral_sentiment_renders_as_normal() {
        let result = SentimentResult {
            label: SentimentLabel::Neutral,
            confidence: Confidence::new(0.4),
            polarity: 0.0,
            token_count: 9,
            notes: Vec::new(),
        };
        let response = SentimentResponse::from_result(&result, &LabelMap::default());
        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            serde_json::json!({"sentiment": "normal", "confidence": 0.4})
        );
    }

    #[test]
    fn error_response_carries_stable_code() {
        let error = Error::from(ValidationError::EmptyText);
        let response = ErrorResponse::from(&error);
        assert_eq!(response.error_code, "EMPTY_TEXT");
    }
}
