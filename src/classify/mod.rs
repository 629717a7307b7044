//! Sentiment and stance classifiers built on the shared scoring engine.

pub mod sentiment;
pub mod stance;
mod types;

pub use sentiment::SentimentClassifier;
pub use stance::StanceClassifier;
pub use types::{
    AnalysisNote, Confidence, MentionScore, SentimentLabel, SentimentResult, StanceLabel,
    StanceResult,
};
