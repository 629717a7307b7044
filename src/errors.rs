//! Shared error types for the analyzer.
//!
//! Errors fall into four families:
//!
//! - [`ValidationError`]: rejected input, raised at the interface before any
//!   analysis work is done. Each variant carries a stable machine-readable code.
//! - [`ProcessingError`]: a per-request failure inside the pipeline. These are
//!   recoverable, recorded by the performance monitor and never cached.
//! - [`LexiconError`]: the term table could not be loaded. Fatal at startup.
//! - [`ConfigError`]: configuration could not be read or is inconsistent.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for sentiscope operations
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Processing(#[from] ProcessingError),

    #[error(transparent)]
    Lexicon(#[from] LexiconError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl Error {
    /// Stable code for the error, suitable for structured responses
    pub fn code(&self) -> &'static str {
        match self {
            Error::Validation(e) => e.code(),
            Error::Processing(_) => "PROCESSING_ERROR",
            Error::Lexicon(_) => "LEXICON_ERROR",
            Error::Config(_) => "CONFIG_ERROR",
        }
    }

    /// Whether the process can keep serving requests after this error
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Error::Validation(_) | Error::Processing(_))
    }
}

/// Result type alias using our error type
pub type Result<T> = std::result::Result<T, Error>;

/// Input rejected before analysis
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("text must not be empty")]
    EmptyText,

    #[error("text is too long ({len} characters, maximum {max})")]
    TextTooLong { len: usize, max: usize },

    #[error("text contains excessive whitespace")]
    ExcessiveWhitespace,

    #[error("text contains only special characters")]
    OnlySpecialChars,

    #[error("text contains only numbers")]
    OnlyNumbers,

    #[error("text must contain at least one letter")]
    NoAlphabeticChars,

    #[error("target must not be empty")]
    EmptyTarget,

    #[error("target is too long ({len} characters, maximum {max})")]
    TargetTooLong { len: usize, max: usize },

    #[error("target contains only special characters")]
    TargetOnlySpecialChars,
}

impl ValidationError {
    pub fn code(&self) -> &'static str {
        match self {
            ValidationError::EmptyText => "EMPTY_TEXT",
            ValidationError::TextTooLong { .. } => "TEXT_TOO_LONG",
            ValidationError::ExcessiveWhitespace => "EXCESSIVE_WHITESPACE",
            ValidationError::OnlySpecialChars => "ONLY_SPECIAL_CHARS",
            ValidationError::OnlyNumbers => "ONLY_NUMBERS",
            ValidationError::NoAlphabeticChars => "NO_ALPHABETIC_CHARS",
            ValidationError::EmptyTarget => "EMPTY_TARGET",
            ValidationError::TargetTooLong { .. } => "TARGET_TOO_LONG",
            ValidationError::TargetOnlySpecialChars => "TARGET_ONLY_SPECIAL_CHARS",
        }
    }
}

/// Pipeline stage in which a processing error occurred
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Normalization,
    Scoring,
    Classification,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Normalization => "normalization",
            Stage::Scoring => "scoring",
            Stage::Classification => "classification",
        };
        write!(f, "{}", name)
    }
}

/// Recoverable per-request failure
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{stage} failed: {message}")]
pub struct ProcessingError {
    pub stage: Stage,
    pub message: String,
}

impl ProcessingError {
    pub fn new(stage: Stage, message: impl Into<String>) -> Self {
        Self {
            stage,
            message: message.into(),
        }
    }

    pub fn scoring(message: impl Into<String>) -> Self {
        Self::new(Stage::Scoring, message)
    }

    pub fn classification(message: impl Into<String>) -> Self {
        Self::new(Stage::Classification, message)
    }
}

/// Failure to load the term table
#[derive(Debug, Error)]
pub enum LexiconError {
    #[error("failed to read lexicon {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse lexicon: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("lexicon contains no polarity terms")]
    Empty,

    #[error("term '{term}' has a non-finite or zero weight")]
    InvalidWeight { term: String },

    #[error("modifier '{term}' has invalid multiplier {value} (must be finite and > 0)")]
    InvalidMultiplier { term: String, value: f64 },

    #[error("term '{term}' is declared with conflicting modifiers")]
    ConflictingModifier { term: String },

    #[error("term '{term}' is empty after normalization")]
    EmptyTerm { term: String },
}

/// Configuration loading or validation failure
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

impl ConfigError {
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_codes_are_stable() {
        assert_eq!(ValidationError::EmptyText.code(), "EMPTY_TEXT");
        assert_eq!(
            ValidationError::TextTooLong { len: 6000, max: 5000 }.code(),
            "TEXT_TOO_LONG"
        );
        assert_eq!(ValidationError::EmptyTarget.code(), "EMPTY_TARGET");
        assert_eq!(
            Error::from(ValidationError::OnlyNumbers).code(),
            "ONLY_NUMBERS"
        );
    }

    #[test]
    fn processing_error_display_includes_stage() {
        let err = ProcessingError::scoring("non-finite polarity");
        assert_eq!(err.to_string(), "scoring failed: non-finite polarity");
    }

    #[test]
    fn lexicon_errors_are_not_recoverable() {
        let err = Error::from(LexiconError::Empty);
        assert!(!err.is_recoverable());
        assert!(Error::from(ProcessingError::classification("x")).is_recoverable());
    }
}
