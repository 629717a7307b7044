//! The analysis pipeline and its composition root.
//!
//! [`Analyzer`] owns every long-lived component: the lexicon, both
//! classifiers, the result cache and the performance monitor. Each request
//! runs sequentially through normalize → fingerprint → cache lookup →
//! classify → cache store, wrapped in a [`RequestTracker`] so that hits,
//! misses and failures all land in the telemetry window.

mod builder;

pub use builder::AnalyzerBuilder;

use serde::Serialize;
use std::sync::Arc;

use crate::cache::{CacheSweeper, CachedResult, Fingerprint, Operation, ResultCache};
use crate::classify::{SentimentClassifier, SentimentResult, StanceClassifier, StanceResult};
use crate::config::SentiscopeConfig;
use crate::errors::{Error, ProcessingError, Result};
use crate::interface::{
    LabelMap, SentimentRequest, SentimentResponse, StanceRequest, StanceResponse,
    ValidatedRequest,
};
use crate::lexicon::Lexicon;
use crate::performance::{CacheOutcome, PerformanceMonitor, RequestTracker, SystemStatsRefresher};
use crate::text::{canonical_target, NormalizedText, Normalizer};

/// A result plus the metadata of the request that produced it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Analysis<T> {
    pub result: T,
    pub cache_hit: bool,
    pub request_id: String,
    pub latency_ms: f64,
}

/// Result of [`Analyzer::analyze`]
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "operation", rename_all = "snake_case")]
pub enum AnalysisOutcome {
    Sentiment(Analysis<SentimentResult>),
    Stance(Analysis<StanceResult>),
}

/// Interface response for either operation
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AnalysisResponse {
    Sentiment(SentimentResponse),
    Stance(StanceResponse),
}

impl AnalysisOutcome {
    pub fn cache_hit(&self) -> bool {
        match self {
            AnalysisOutcome::Sentiment(a) => a.cache_hit,
            AnalysisOutcome::Stance(a) => a.cache_hit,
        }
    }

    pub fn request_id(&self) -> &str {
        match self {
            AnalysisOutcome::Sentiment(a) => &a.request_id,
            AnalysisOutcome::Stance(a) => &a.request_id,
        }
    }

    pub fn response(&self, labels: &LabelMap) -> AnalysisResponse {
        match self {
            AnalysisOutcome::Sentiment(a) => {
                AnalysisResponse::Sentiment(SentimentResponse::from_result(&a.result, labels))
            }
            AnalysisOutcome::Stance(a) => {
                AnalysisResponse::Stance(StanceResponse::from_result(&a.result, labels))
            }
        }
    }
}

/// Which statistics [`Analyzer::reset`] clears
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ResetOptions {
    pub performance: bool,
    pub cache: bool,
}

pub struct Analyzer {
    config: SentiscopeConfig,
    labels: LabelMap,
    lexicon: Arc<Lexicon>,
    normalizer: Normalizer,
    sentiment: SentimentClassifier,
    stance: StanceClassifier,
    cache: Arc<ResultCache>,
    monitor: PerformanceMonitor,
    sweeper: Option<CacheSweeper>,
    system_refresher: Option<SystemStatsRefresher>,
}

impl std::fmt::Debug for Analyzer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Analyzer")
            .field("lexicon_terms", &self.lexicon.len())
            .field("cache", &self.cache.len())
            .field("background_sweep", &self.sweeper.is_some())
            .field("system_stats", &self.system_refresher.is_some())
            .finish()
    }
}

impl Analyzer {
    /// Build with the system clock, process memory probe and the lexicon
    /// named by `config.lexicon`
    pub fn new(config: SentiscopeConfig) -> Result<Self> {
        AnalyzerBuilder::new(config).build()
    }

    pub fn builder(config: SentiscopeConfig) -> AnalyzerBuilder {
        AnalyzerBuilder::new(config)
    }

    pub fn config(&self) -> &SentiscopeConfig {
        &self.config
    }

    pub fn labels(&self) -> &LabelMap {
        &self.labels
    }

    pub fn lexicon(&self) -> &Lexicon {
        &self.lexicon
    }

    pub fn cache(&self) -> &ResultCache {
        &self.cache
    }

    pub fn monitor(&self) -> &PerformanceMonitor {
        &self.monitor
    }

    pub fn has_background_sweeper(&self) -> bool {
        self.sweeper.as_ref().is_some_and(CacheSweeper::is_running)
    }

    pub fn has_system_refresher(&self) -> bool {
        self.system_refresher
            .as_ref()
            .is_some_and(SystemStatsRefresher::is_running)
    }

    fn cache_enabled(&self) -> bool {
        self.config.cache.enabled
    }

    fn lookup(&self, fingerprint: &Fingerprint) -> Option<CachedResult> {
        if !self.cache_enabled() {
            return None;
        }
        let hit = self.cache.get(fingerprint);
        if hit.is_some() {
            tracing::debug!(fingerprint = fingerprint.short(), "cache hit");
        } else {
            tracing::debug!(fingerprint = fingerprint.short(), "cache miss");
        }
        hit
    }

    fn store(&self, fingerprint: Fingerprint, payload: CachedResult) -> CacheOutcome {
        if !self.cache_enabled() {
            return CacheOutcome::Bypassed;
        }
        self.cache.put(fingerprint, payload, None);
        CacheOutcome::Miss
    }

    fn normalize(&self, text: &str) -> NormalizedText {
        let normalized = self.normalizer.normalize(text);
        if !normalized.is_eligible() {
            tracing::warn!(
                tokens = normalized.token_count(),
                "input is not recognizable English, using fallback confidence"
            );
        }
        normalized
    }

    pub fn analyze_sentiment(
        &self,
        request: &SentimentRequest,
    ) -> Result<Analysis<SentimentResult>> {
        let tracker = self.monitor.start(Operation::Sentiment.as_str());
        let request_id = tracker.request_id().to_string();
        let span = tracing::info_span!("analyze", request_id = %request_id, operation = "sentiment");
        let _guard = span.enter();

        let normalized = self.normalize(request.text());
        let fingerprint = Fingerprint::sentiment(normalized.text());

        if let Some(CachedResult::Sentiment(result)) = self.lookup(&fingerprint) {
            let latency_ms = tracker.finish(CacheOutcome::Hit);
            return Ok(Analysis {
                result,
                cache_hit: true,
                request_id,
                latency_ms,
            });
        }

        match self.sentiment.classify(&normalized) {
            Ok(result) => {
                let outcome = self.store(fingerprint, CachedResult::Sentiment(result.clone()));
                let latency_ms = tracker.finish(outcome);
                Ok(Analysis {
                    result,
                    cache_hit: false,
                    request_id,
                    latency_ms,
                })
            }
            Err(error) => Err(self.failed(tracker, error)),
        }
    }

    pub fn analyze_stance(&self, request: &StanceRequest) -> Result<Analysis<StanceResult>> {
        let tracker = self.monitor.start(Operation::Stance.as_str());
        let request_id = tracker.request_id().to_string();
        let span = tracing::info_span!("analyze", request_id = %request_id, operation = "stance");
        let _guard = span.enter();

        let normalized = self.normalize(request.text());
        let fingerprint = Fingerprint::stance(normalized.text(), &canonical_target(request.target()));

        if let Some(CachedResult::Stance(mut result)) = self.lookup(&fingerprint) {
            // Targets differing only in case or spacing share an entry
            result.target = request.target().to_string();
            let latency_ms = tracker.finish(CacheOutcome::Hit);
            return Ok(Analysis {
                result,
                cache_hit: true,
                request_id,
                latency_ms,
            });
        }

        match self.stance.classify(&normalized, request.target()) {
            Ok(result) => {
                let outcome = self.store(fingerprint, CachedResult::Stance(result.clone()));
                let latency_ms = tracker.finish(outcome);
                Ok(Analysis {
                    result,
                    cache_hit: false,
                    request_id,
                    latency_ms,
                })
            }
            Err(error) => Err(self.failed(tracker, error)),
        }
    }

    fn failed(&self, tracker: RequestTracker<'_>, error: ProcessingError) -> Error {
        tracing::warn!(stage = %error.stage, %error, "analysis failed");
        tracker.fail(&error);
        Error::from(error)
    }

    pub fn analyze(&self, request: &ValidatedRequest) -> Result<AnalysisOutcome> {
        match request {
            ValidatedRequest::Sentiment(r) => self.analyze_sentiment(r).map(AnalysisOutcome::Sentiment),
            ValidatedRequest::Stance(r) => self.analyze_stance(r).map(AnalysisOutcome::Stance),
        }
    }

    /// Analyze and render the localized interface response
    pub fn respond(&self, request: &ValidatedRequest) -> Result<AnalysisResponse> {
        self.analyze(request).map(|outcome| outcome.response(&self.labels))
    }

    pub fn reset(&self, options: ResetOptions) {
        if options.performance {
            self.monitor.reset();
        }
        if options.cache {
            self.cache.reset_stats();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::{SentimentLabel, StanceLabel};
    use crate::clock::ManualClock;
    use crate::performance::MemoryProbe;
    use std::time::Duration;

    struct NoMemory;

    impl MemoryProbe for NoMemory {
        fn resident_bytes(&self) -> u64 {
            0
        }
    }

    fn analyzer(config: SentiscopeConfig) -> (Analyzer, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::starting_now());
        let analyzer = Analyzer::builder(config)
            .clock(clock.clone())
            .memory_probe(Arc::new(NoMemory))
            .build()
            .unwrap();
        (analyzer, clock)
    }

    fn sentiment(text: &str) -> SentimentRequest {
        SentimentRequest::new(text).unwrap()
    }

    #[test]
    fn second_request_is_served_from_cache() {
        let (analyzer, _) = analyzer(SentiscopeConfig::default());
        let request = sentiment("I love this product! It works great!");

        let first = analyzer.analyze_sentiment(&request).unwrap();
        let second = analyzer.analyze_sentiment(&request).unwrap();

        assert!(!first.cache_hit);
        assert!(second.cache_hit);
        assert_eq!(first.result, second.result);
        assert_eq!(first.result.label, SentimentLabel::Positive);
        assert_ne!(first.request_id, second.request_id);

        let stats = analyzer.monitor().stats();
        assert_eq!(stats.total_requests, 2);
        assert_eq!(stats.cache_hits, 1);
        assert_eq!(stats.cache_misses, 1);
        assert_eq!(analyzer.cache().stats().hits, 1);
    }

    #[test]
    fn expired_entry_is_recomputed() {
        let mut config = SentiscopeConfig::default();
        config.cache.default_ttl_secs = 10;
        let (analyzer, clock) = analyzer(config);
        let request = sentiment("This is terrible.");

        analyzer.analyze_sentiment(&request).unwrap();
        clock.advance(Duration::from_secs(11));
        let again = analyzer.analyze_sentiment(&request).unwrap();
        assert!(!again.cache_hit);
    }

    #[test]
    fn disabled_cache_is_bypassed() {
        let mut config = SentiscopeConfig::default();
        config.cache.enabled = false;
        let (analyzer, _) = analyzer(config);
        let request = sentiment("I love this product!");

        let first = analyzer.analyze_sentiment(&request).unwrap();
        let second = analyzer.analyze_sentiment(&request).unwrap();
        assert!(!second.cache_hit);
        assert_eq!(first.result, second.result);
        assert!(analyzer.cache().is_empty());
        assert_eq!(analyzer.monitor().stats().cache_misses, 0);
    }

    #[test]
    fn stance_hit_echoes_callers_target() {
        let (analyzer, _) = analyzer(SentiscopeConfig::default());
        let text = "Apple makes innovative products that change the industry";
        let first = analyzer
            .analyze_stance(&StanceRequest::new(text, "Apple").unwrap())
            .unwrap();
        let second = analyzer
            .analyze_stance(&StanceRequest::new(text, "APPLE").unwrap())
            .unwrap();

        assert!(second.cache_hit);
        assert_eq!(first.result.label, StanceLabel::Supportive);
        assert_eq!(second.result.label, StanceLabel::Supportive);
        assert_eq!(second.result.target, "APPLE");
    }

    #[test]
    fn sentiment_and_stance_never_share_entries() {
        let (analyzer, _) = analyzer(SentiscopeConfig::default());
        analyzer
            .analyze_sentiment(&sentiment("Apple is great"))
            .unwrap();
        let stance = analyzer
            .analyze_stance(&StanceRequest::new("Apple is great", "Apple").unwrap())
            .unwrap();
        assert!(!stance.cache_hit);
        assert_eq!(analyzer.cache().len(), 2);
    }

    #[test]
    fn reset_clears_selected_statistics() {
        let (analyzer, _) = analyzer(SentiscopeConfig::default());
        let request = sentiment("I love it");
        analyzer.analyze_sentiment(&request).unwrap();
        analyzer.analyze_sentiment(&request).unwrap();

        analyzer.reset(ResetOptions {
            performance: true,
            cache: false,
        });
        assert_eq!(analyzer.monitor().stats().total_requests, 0);
        assert_eq!(analyzer.cache().stats().hits, 1);

        analyzer.reset(ResetOptions {
            performance: false,
            cache: true,
        });
        assert_eq!(analyzer.cache().stats().total_requests, 0);
        assert_eq!(analyzer.cache().len(), 1);
    }

    #[test]
    fn respond_localizes_labels() {
        let (analyzer, _) = analyzer(SentiscopeConfig::default());
        let request =
            ValidatedRequest::stance("Apple makes innovative products that change the industry", "Apple")
                .unwrap();
        let response = serde_json::to_value(analyzer.respond(&request).unwrap()).unwrap();
        assert_eq!(response["stance"], "مؤيد");
        assert_eq!(response["target"], "Apple");
    }
}
