use std::sync::Arc;

use super::Analyzer;
use crate::cache::{CacheSweeper, ResultCache};
use crate::classify::{SentimentClassifier, StanceClassifier};
use crate::clock::{Clock, SystemClock};
use crate::config::SentiscopeConfig;
use crate::errors::Result;
use crate::interface::LabelMap;
use crate::lexicon::Lexicon;
use crate::performance::{MemoryProbe, PerformanceMonitor, ProcessMemoryProbe};
use crate::scoring::ScoringEngine;
use crate::text::Normalizer;

/// Assembles an [`Analyzer`], letting tests swap the clock, memory probe or
/// lexicon.
///
/// ```rust,ignore
/// let analyzer = Analyzer::builder(config)
///     .clock(Arc::new(ManualClock::starting_now()))
///     .lexicon(Arc::new(Lexicon::embedded()?))
///     .build()?;
/// ```
pub struct AnalyzerBuilder {
    config: SentiscopeConfig,
    clock: Option<Arc<dyn Clock>>,
    probe: Option<Arc<dyn MemoryProbe>>,
    lexicon: Option<Arc<Lexicon>>,
}

impl AnalyzerBuilder {
    pub fn new(config: SentiscopeConfig) -> Self {
        Self {
            config,
            clock: None,
            probe: None,
            lexicon: None,
        }
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn memory_probe(mut self, probe: Arc<dyn MemoryProbe>) -> Self {
        self.probe = Some(probe);
        self
    }

    /// Use an already loaded lexicon instead of `config.lexicon`
    pub fn lexicon(mut self, lexicon: Arc<Lexicon>) -> Self {
        self.lexicon = Some(lexicon);
        self
    }

    /// Validate the configuration and wire the components together.
    ///
    /// Fails on invalid configuration or an unusable lexicon. A background
    /// sweeper that cannot be spawned is logged and skipped; expired entries
    /// are still swept on access.
    pub fn build(self) -> Result<Analyzer> {
        let config = self.config;
        config.validate()?;

        let lexicon = match self.lexicon {
            Some(lexicon) => lexicon,
            None => Arc::new(Lexicon::load(&config.lexicon)?),
        };
        let clock = self.clock.unwrap_or_else(|| Arc::new(SystemClock));
        let probe = self
            .probe
            .unwrap_or_else(|| Arc::new(ProcessMemoryProbe::new()));

        let engine = ScoringEngine::new(Arc::clone(&lexicon), config.scoring.clone());
        let sentiment = SentimentClassifier::new(engine.clone(), config.sentiment.clone());
        let stance = StanceClassifier::new(engine, config.stance.clone());

        let cache = Arc::new(ResultCache::new(config.cache.clone(), Arc::clone(&clock)));
        let monitor = PerformanceMonitor::new(config.monitor.clone(), clock, probe);

        let sweeper = if config.cache.enabled && config.cache.background_sweep {
            match CacheSweeper::spawn(Arc::clone(&cache), config.cache.sweep_interval()) {
                Ok(sweeper) => Some(sweeper),
                Err(error) => {
                    tracing::warn!(%error, "could not start cache sweeper");
                    None
                }
            }
        } else {
            None
        };

        let system_refresher = if config.monitor.system_stats {
            match monitor.spawn_system_refresher() {
                Ok(refresher) => Some(refresher),
                Err(error) => {
                    tracing::warn!(%error, "could not start system stats sampling");
                    None
                }
            }
        } else {
            None
        };

        tracing::info!(
            lexicon_terms = lexicon.len(),
            cache_enabled = config.cache.enabled,
            max_entries = config.cache.max_entries,
            "analyzer ready"
        );

        Ok(Analyzer {
            labels: LabelMap::new(config.labels.clone()),
            normalizer: Normalizer::new(config.normalizer.clone()),
            config,
            lexicon,
            sentiment,
            stance,
            cache,
            monitor,
            sweeper,
            system_refresher,
        })
    }
}
