use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// Core operation a request asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Sentiment,
    Stance,
}

impl Operation {
    pub fn as_str(self) -> &'static str {
        match self {
            Operation::Sentiment => "sentiment",
            Operation::Stance => "stance",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Cache key: operation prefix plus a SHA-256 over the normalized inputs.
///
/// Fields are separated by NUL so that `("ab", "c")` and `("a", "bc")` hash
/// differently.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fingerprint(String);

impl Fingerprint {
    fn compute(operation: Operation, parts: &[&str]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(operation.as_str().as_bytes());
        for part in parts {
            hasher.update([0u8]);
            hasher.update(part.as_bytes());
        }
        Self(format!("{}:{:x}", operation, hasher.finalize()))
    }

    pub fn sentiment(normalized_text: &str) -> Self {
        Self::compute(Operation::Sentiment, &[normalized_text])
    }

    pub fn stance(normalized_text: &str, canonical_target: &str) -> Self {
        Self::compute(Operation::Stance, &[normalized_text, canonical_target])
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn operation(&self) -> Option<Operation> {
        match self.0.split_once(':')?.0 {
            "sentiment" => Some(Operation::Sentiment),
            "stance" => Some(Operation::Stance),
            _ => None,
        }
    }

    /// Prefix and first hex digits, for display
    pub fn short(&self) -> &str {
        let end = self
            .0
            .find(':')
            .map(|i| (i + 13).min(self.0.len()))
            .unwrap_or(self.0.len());
        &self.0[..end]
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
