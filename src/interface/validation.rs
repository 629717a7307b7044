//! Request validation. The pipeline only accepts the types built here.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::cache::Operation;
use crate::errors::ValidationError;

pub const MAX_TEXT_CHARS: usize = 5000;
pub const MAX_TARGET_CHARS: usize = 200;

static EXCESSIVE_WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s{10,}").unwrap());

/// Drop control characters other than tab, newline and carriage return
pub fn sanitize(input: &str) -> String {
    input
        .chars()
        .filter(|c| !c.is_control() || matches!(c, '\t' | '\n' | '\r'))
        .collect()
}

fn only_special_chars(trimmed: &str) -> bool {
    trimmed
        .chars()
        .all(|c| !c.is_alphanumeric() && !c.is_whitespace() && c != '_')
}

pub fn validate_text(raw: &str) -> Result<String, ValidationError> {
    let text = sanitize(raw);
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyText);
    }
    let len = text.chars().count();
    if len > MAX_TEXT_CHARS {
        return Err(ValidationError::TextTooLong {
            len,
            max: MAX_TEXT_CHARS,
        });
    }
    if EXCESSIVE_WHITESPACE.is_match(&text) {
        return Err(ValidationError::ExcessiveWhitespace);
    }
    if only_special_chars(trimmed) {
        return Err(ValidationError::OnlySpecialChars);
    }
    if trimmed.chars().all(|c| c.is_ascii_digit()) {
        return Err(ValidationError::OnlyNumbers);
    }
    if !trimmed.chars().any(char::is_alphabetic) {
        return Err(ValidationError::NoAlphabeticChars);
    }
    Ok(text)
}

pub fn validate_target(raw: &str) -> Result<String, ValidationError> {
    let target = sanitize(raw);
    let trimmed = target.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyTarget);
    }
    let len = target.chars().count();
    if len > MAX_TARGET_CHARS {
        return Err(ValidationError::TargetTooLong {
            len,
            max: MAX_TARGET_CHARS,
        });
    }
    if EXCESSIVE_WHITESPACE.is_match(&target) {
        return Err(ValidationError::ExcessiveWhitespace);
    }
    if only_special_chars(trimmed) {
        return Err(ValidationError::TargetOnlySpecialChars);
    }
    Ok(target)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SentimentRequest {
    text: String,
}

impl SentimentRequest {
    pub fn new(text: &str) -> Result<Self, ValidationError> {
        Ok(Self {
            text: validate_text(text)?,
        })
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StanceRequest {
    text: String,
    target: String,
}

impl StanceRequest {
    pub fn new(text: &str, target: &str) -> Result<Self, ValidationError> {
        Ok(Self {
            text: validate_text(text)?,
            target: validate_target(target)?,
        })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// The target as supplied, after control-character removal
    pub fn target(&self) -> &str {
        &self.target
    }
}

/// A request that passed validation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "operation", rename_all = "snake_case")]
pub enum ValidatedRequest {
    Sentiment(SentimentRequest),
    Stance(StanceRequest),
}

impl ValidatedRequest {
    pub fn sentiment(text: &str) -> Result<Self, ValidationError> {
        SentimentRequest::new(text).map(Self::Sentiment)
    }

    pub fn stance(text: &str, target: &str) -> Result<Self, ValidationError> {
        StanceRequest::new(text, target).map(Self::Stance)
    }

    pub fn operation(&self) -> Operation {
        match self {
            ValidatedRequest::Sentiment(_) => Operation::Sentiment,
            ValidatedRequest::Stance(_) => Operation::Stance,
        }
    }

    pub fn text(&self) -> &str {
        match self {
            ValidatedRequest::Sentiment(request) => request.text(),
            ValidatedRequest::Stance(request) => request.text(),
        }
    }
}
