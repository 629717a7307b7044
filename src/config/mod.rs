//! Configuration for the analyzer.
//!
//! Every heuristic constant used by the pipeline lives here with a serde
//! default, so a `.sentiscope.toml` only needs the values it changes:
//!
//! ```toml
//! [sentiment]
//! positive_threshold = 0.4
//!
//! [stance]
//! context_sentences = 1
//!
//! [cache]
//! max_entries = 5000
//! ```

mod analysis;
pub mod env;
mod labels;
pub mod loader;
mod runtime;

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::errors::ConfigError;

pub use analysis::{MentionWeighting, NormalizerConfig, ScoringConfig, SentimentConfig, StanceConfig};
pub use env::EnvironmentSnapshot;
pub use labels::{LabelsConfig, SentimentLabels, StanceLabels};
pub use loader::{load_config, load_config_from, parse_config, CONFIG_FILE_NAME};
pub use runtime::{CacheConfig, MonitorConfig};

/// Where the term table comes from
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LexiconSource {
    /// TOML lexicon file; the embedded default table is used when unset
    #[serde(default)]
    pub path: Option<PathBuf>,
}

/// Root configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SentiscopeConfig {
    #[serde(default)]
    pub normalizer: NormalizerConfig,

    #[serde(default)]
    pub scoring: ScoringConfig,

    #[serde(default)]
    pub sentiment: SentimentConfig,

    #[serde(default)]
    pub stance: StanceConfig,

    #[serde(default)]
    pub cache: CacheConfig,

    #[serde(default)]
    pub monitor: MonitorConfig,

    #[serde(default)]
    pub labels: LabelsConfig,

    #[serde(default)]
    pub lexicon: LexiconSource,
}

fn check_ratio(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::invalid(field, format!("{} is not within [0, 1]", value)))
    }
}

fn check_positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::invalid(field, format!("{} must be > 0", value)))
    }
}

impl SentiscopeConfig {
    /// Reject values that would break pipeline invariants
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_ratio("normalizer.max_symbol_ratio", self.normalizer.max_symbol_ratio)?;
        check_ratio(
            "normalizer.min_recognizable_ratio",
            self.normalizer.min_recognizable_ratio,
        )?;

        let sentiment = &self.sentiment;
        if !(sentiment.negative_threshold < sentiment.positive_threshold) {
            return Err(ConfigError::invalid(
                "sentiment.negative_threshold",
                "must be below sentiment.positive_threshold",
            ));
        }
        check_positive("sentiment.confidence_gain", sentiment.confidence_gain)?;
        check_ratio("sentiment.min_confidence", sentiment.min_confidence)?;
        check_ratio(
            "sentiment.neutral_confidence_floor",
            sentiment.neutral_confidence_floor,
        )?;

        let stance = &self.stance;
        check_ratio("stance.neutral_threshold", stance.neutral_threshold)?;
        check_ratio("stance.min_confidence", stance.min_confidence)?;
        check_ratio("stance.not_found_confidence", stance.not_found_confidence)?;
        check_ratio(
            "stance.max_consistency_reduction",
            stance.max_consistency_reduction,
        )?;
        check_positive("stance.polarity_gain", stance.polarity_gain)?;
        check_positive("stance.keyword_gain", stance.keyword_gain)?;
        if stance.context_weight < 0.0 || stance.keyword_weight < 0.0 {
            return Err(ConfigError::invalid(
                "stance.context_weight",
                "combination weights must be non-negative",
            ));
        }
        if stance.spread_saturation <= stance.spread_threshold {
            return Err(ConfigError::invalid(
                "stance.spread_saturation",
                "must exceed stance.spread_threshold",
            ));
        }

        if self.cache.max_entries == 0 {
            return Err(ConfigError::invalid("cache.max_entries", "must be at least 1"));
        }
        check_ratio("cache.optimize_high_water", self.cache.optimize_high_water)?;
        check_ratio("cache.optimize_target", self.cache.optimize_target)?;
        if self.cache.optimize_target > self.cache.optimize_high_water {
            return Err(ConfigError::invalid(
                "cache.optimize_target",
                "must not exceed cache.optimize_high_water",
            ));
        }

        if self.monitor.max_samples == 0 {
            return Err(ConfigError::invalid("monitor.max_samples", "must be at least 1"));
        }
        if self.monitor.window_secs == 0 {
            return Err(ConfigError::invalid("monitor.window_secs", "must be at least 1"));
        }
        check_positive("monitor.memory_warn_mb", self.monitor.memory_warn_mb)?;
        check_positive("monitor.memory_delta_warn_mb", self.monitor.memory_delta_warn_mb)?;
        if self.monitor.system_refresh_secs == 0 {
            return Err(ConfigError::invalid(
                "monitor.system_refresh_secs",
                "must be at least 1",
            ));
        }
        Ok(())
    }
}

/// Commented template written by `sentiscope init`
pub const DEFAULT_CONFIG_TEMPLATE: &str = r#"# Sentiscope configuration
# Every value below is the built-in default; delete what you do not change.

[normalizer]
max_symbol_ratio = 0.7
min_recognizable_ratio = 0.5

[sentiment]
positive_threshold = 0.35
negative_threshold = -0.35

[stance]
# Adjacent sentences on each side included around a target mention
context_sentences = 0
context_weight = 0.4
keyword_weight = 0.6
neutral_threshold = 0.12
weighting = "equal"

[cache]
enabled = true
max_entries = 1000
default_ttl_secs = 3600
sweep_interval_secs = 300

[monitor]
window_secs = 3600
max_samples = 10000
# Log a warning when a request finishes above this resident size
memory_warn_mb = 500.0
memory_delta_warn_mb = 10.0
# Background sampling of host CPU, memory and disk usage
system_stats = false
system_refresh_secs = 30

[labels.stance]
supportive = "مؤيد"
opposing = "معارض"
neutral = "محايد"

[lexicon]
# path = "lexicon.toml"
"#;
