//! Lexicon and rule based sentiment and stance classification.
//!
//! The [`Analyzer`] composition root wires the text normalizer, the shared
//! scoring engine, both classifiers, a bounded TTL/LRU result cache and a
//! sliding-window performance monitor:
//!
//! ```rust,no_run
//! use sentiscope::{Analyzer, SentiscopeConfig, ValidatedRequest};
//!
//! let analyzer = Analyzer::new(SentiscopeConfig::default())?;
//! let request = ValidatedRequest::stance("Apple makes innovative products", "Apple")?;
//! let outcome = analyzer.analyze(&request)?;
//! println!("{:?}", outcome.response(analyzer.labels()));
//! # Ok::<(), sentiscope::Error>(())
//! ```

pub mod cache;
pub mod classify;
pub mod cli;
pub mod clock;
pub mod commands;
pub mod config;
pub mod errors;
pub mod interface;
pub mod lexicon;
pub mod observability;
pub mod output;
pub mod performance;
pub mod pipeline;
pub mod scoring;
pub mod text;

// Re-export commonly used types
pub use crate::cache::{CacheStats, Fingerprint, ResultCache};
pub use crate::classify::{
    Confidence, SentimentLabel, SentimentResult, StanceLabel, StanceResult,
};
pub use crate::clock::{Clock, ManualClock, SystemClock};
pub use crate::config::SentiscopeConfig;
pub use crate::errors::{Error, Result};
pub use crate::interface::{SentimentRequest, StanceRequest, ValidatedRequest};
pub use crate::lexicon::Lexicon;
pub use crate::performance::{DetailedMetrics, PerformanceMonitor, PerformanceStats, SystemStats};
pub use crate::pipeline::{Analysis, AnalysisOutcome, Analyzer, ResetOptions};
