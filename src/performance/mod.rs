//! Sliding-window request telemetry.
//!
//! Every core operation is wrapped in a [`RequestTracker`]: it timestamps the
//! start, captures resident memory before and after, and records a
//! [`PerformanceSample`] when finished. Samples older than the configured
//! window are discarded on every insert and read, and the window never holds
//! more than `max_samples` entries.
//!
//! Host CPU, memory and disk usage is sampled separately by a
//! [`SystemStatsRefresher`] and reported alongside the window in
//! [`PerformanceMonitor::detailed`].

pub mod memory;
mod stats;
pub mod system;

pub use memory::{MemoryProbe, ProcessMemoryProbe};
pub use stats::{
    percentile, CacheOutcome, DetailedMetrics, EndpointStats, LatencyStats, MemoryStats,
    PerformanceSample, PerformanceStats,
};
pub use system::{SystemSampler, SystemStats, SystemStatsRefresher};

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::collections::hash_map::RandomState;
use std::collections::VecDeque;
use std::hash::BuildHasher;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

use crate::clock::{to_chrono, Clock};
use crate::config::MonitorConfig;
use memory::bytes_to_mb;
use system::SystemStatsSlot;

static REQUEST_COUNTER: AtomicU64 = AtomicU64::new(0);

/// `req_<unix millis>_<8 hex digits>`
pub fn generate_request_id(now: DateTime<Utc>) -> String {
    let sequence = REQUEST_COUNTER.fetch_add(1, Ordering::Relaxed);
    let noise = RandomState::new().hash_one((sequence, now.timestamp_nanos_opt()));
    format!("req_{}_{:08x}", now.timestamp_millis(), noise as u32)
}

pub struct PerformanceMonitor {
    config: MonitorConfig,
    clock: Arc<dyn Clock>,
    probe: Arc<dyn MemoryProbe>,
    samples: Mutex<VecDeque<PerformanceSample>>,
    active: AtomicUsize,
    system: SystemStatsSlot,
}

impl std::fmt::Debug for PerformanceMonitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PerformanceMonitor")
            .field("config", &self.config)
            .field("samples", &self.samples.lock().len())
            .field("active", &self.active_requests())
            .finish()
    }
}

impl PerformanceMonitor {
    pub fn new(config: MonitorConfig, clock: Arc<dyn Clock>, probe: Arc<dyn MemoryProbe>) -> Self {
        Self {
            config,
            clock,
            probe,
            samples: Mutex::new(VecDeque::new()),
            active: AtomicUsize::new(0),
            system: Arc::new(Mutex::new(None)),
        }
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    fn window_start(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now.checked_sub_signed(to_chrono(self.config.window()))
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    }

    fn prune(&self, samples: &mut VecDeque<PerformanceSample>, now: DateTime<Utc>) {
        let cutoff = self.window_start(now);
        samples.retain(|s| s.timestamp >= cutoff);
        while samples.len() > self.config.max_samples {
            samples.pop_front();
        }
    }

    /// Begin tracking a request against `endpoint`
    pub fn start(&self, endpoint: impl Into<String>) -> RequestTracker<'_> {
        let started_at = self.clock.now();
        self.active.fetch_add(1, Ordering::Relaxed);
        RequestTracker {
            monitor: self,
            request_id: generate_request_id(started_at),
            endpoint: endpoint.into(),
            started: Instant::now(),
            memory_before: self.probe.resident_bytes(),
            finished: false,
        }
    }

    /// Add a finished sample to the window
    pub fn record(&self, sample: PerformanceSample) {
        let now = self.clock.now();
        let mut samples = self.samples.lock();
        samples.push_back(sample);
        self.prune(&mut samples, now);
    }

    /// Requests started but not yet finished
    pub fn active_requests(&self) -> usize {
        self.active.load(Ordering::Relaxed)
    }

    pub fn stats(&self) -> PerformanceStats {
        let now = self.clock.now();
        let mut samples = self.samples.lock();
        self.prune(&mut samples, now);
        let view: Vec<&PerformanceSample> = samples.iter().collect();
        stats::aggregate(&view, self.window_start(now), now)
    }

    pub fn endpoint_stats(&self, endpoint: &str) -> Option<EndpointStats> {
        let now = self.clock.now();
        let mut samples = self.samples.lock();
        self.prune(&mut samples, now);
        let view: Vec<&PerformanceSample> =
            samples.iter().filter(|s| s.endpoint == endpoint).collect();
        if view.is_empty() {
            None
        } else {
            Some(stats::endpoint_stats(&view))
        }
    }

    /// Endpoints seen inside the window, sorted
    pub fn endpoints(&self) -> Vec<String> {
        self.stats().endpoints.into_keys().collect()
    }

    /// Most recent samples, newest first
    pub fn recent(&self, limit: usize) -> Vec<PerformanceSample> {
        let now = self.clock.now();
        let mut samples = self.samples.lock();
        self.prune(&mut samples, now);
        samples.iter().rev().take(limit).cloned().collect()
    }

    pub fn sample_count(&self) -> usize {
        let now = self.clock.now();
        let mut samples = self.samples.lock();
        self.prune(&mut samples, now);
        samples.len()
    }

    /// Latest host usage snapshot, if one has been taken
    pub fn system_stats(&self) -> Option<SystemStats> {
        *self.system.lock()
    }

    pub fn record_system_stats(&self, stats: SystemStats) {
        *self.system.lock() = Some(stats);
    }

    /// Keep [`system_stats`](Self::system_stats) fresh from a background
    /// thread until the returned handle is dropped
    pub fn spawn_system_refresher(&self) -> std::io::Result<SystemStatsRefresher> {
        SystemStatsRefresher::spawn(
            Arc::clone(&self.system),
            Arc::clone(&self.clock),
            self.config.system_refresh_interval(),
        )
    }

    /// Aggregate stats plus host usage and the `recent_limit` newest samples
    pub fn detailed(&self, recent_limit: usize) -> DetailedMetrics {
        DetailedMetrics {
            stats: self.stats(),
            system: self.system_stats(),
            recent: self.recent(recent_limit),
            active_requests: self.active_requests(),
        }
    }

    pub fn reset(&self) {
        self.samples.lock().clear();
        tracing::info!("performance window reset");
    }
}

/// Why a finished request's memory is worth reporting
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MemoryAlert {
    /// Resident size above `memory_warn_mb`
    High { resident_mb: f64, delta_mb: f64 },
    /// Change during the request above `memory_delta_warn_mb`
    LargeDelta { resident_mb: f64, delta_mb: f64 },
}

/// High resident memory takes precedence over a large change
pub fn memory_alert(after_bytes: u64, delta_bytes: i64, config: &MonitorConfig) -> Option<MemoryAlert> {
    let resident_mb = bytes_to_mb(after_bytes as f64);
    let delta_mb = bytes_to_mb(delta_bytes as f64);
    if resident_mb > config.memory_warn_mb {
        Some(MemoryAlert::High {
            resident_mb,
            delta_mb,
        })
    } else if delta_mb.abs() > config.memory_delta_warn_mb {
        Some(MemoryAlert::LargeDelta {
            resident_mb,
            delta_mb,
        })
    } else {
        None
    }
}

/// RAII guard for one in-flight request.
///
/// Call [`finish`](Self::finish) or [`fail`](Self::fail); a tracker dropped
/// without either is recorded as a failed, abandoned request.
#[must_use]
pub struct RequestTracker<'a> {
    monitor: &'a PerformanceMonitor,
    request_id: String,
    endpoint: String,
    started: Instant,
    memory_before: u64,
    finished: bool,
}

impl RequestTracker<'_> {
    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn complete(&mut self, cache: CacheOutcome, error: Option<String>) -> f64 {
        self.finished = true;
        let latency_ms = self.started.elapsed().as_secs_f64() * 1000.0;
        let memory_after = self.monitor.probe.resident_bytes();
        let memory_delta = memory_after as i64 - self.memory_before as i64;
        match memory_alert(memory_after, memory_delta, &self.monitor.config) {
            Some(MemoryAlert::High {
                resident_mb,
                delta_mb,
            }) => tracing::warn!(
                request_id = %self.request_id,
                resident_mb,
                delta_mb,
                "high memory usage"
            ),
            Some(MemoryAlert::LargeDelta {
                resident_mb,
                delta_mb,
            }) => tracing::info!(
                request_id = %self.request_id,
                resident_mb,
                delta_mb,
                "memory changed during request"
            ),
            None => {}
        }
        let sample = PerformanceSample {
            request_id: self.request_id.clone(),
            endpoint: self.endpoint.clone(),
            timestamp: self.monitor.clock.now(),
            latency_ms,
            cache,
            memory_after_bytes: memory_after,
            memory_delta_bytes: memory_delta,
            success: error.is_none(),
            error,
        };
        self.monitor.record(sample);
        self.monitor.active.fetch_sub(1, Ordering::Relaxed);
        latency_ms
    }

    /// Record a successful request; returns its latency in milliseconds
    pub fn finish(mut self, cache: CacheOutcome) -> f64 {
        self.complete(cache, None)
    }

    /// Record a failed request; returns its latency in milliseconds
    pub fn fail(mut self, error: impl std::fmt::Display) -> f64 {
        self.complete(CacheOutcome::Bypassed, Some(error.to_string()))
    }
}

impl Drop for RequestTracker<'_> {
    fn drop(&mut self) {
        if !self.finished {
            self.complete(CacheOutcome::Bypassed, Some("request abandoned".to_string()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use std::time::Duration;

    struct FixedProbe(u64);

    impl MemoryProbe for FixedProbe {
        fn resident_bytes(&self) -> u64 {
            self.0
        }
    }

    fn monitor(config: MonitorConfig) -> (PerformanceMonitor, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::starting_now());
        let monitor = PerformanceMonitor::new(config, clock.clone(), Arc::new(FixedProbe(4096)));
        (monitor, clock)
    }

    fn sample(endpoint: &str, at: DateTime<Utc>, latency_ms: f64, cache: CacheOutcome) -> PerformanceSample {
        PerformanceSample {
            request_id: "req_test".to_string(),
            endpoint: endpoint.to_string(),
            timestamp: at,
            latency_ms,
            cache,
            memory_after_bytes: 1024 * 1024,
            memory_delta_bytes: 0,
            success: true,
            error: None,
        }
    }

    #[test]
    fn request_ids_have_expected_shape() {
        let id = generate_request_id(Utc::now());
        let parts: Vec<&str> = id.split('_').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "req");
        assert!(parts[1].parse::<i64>().is_ok());
        assert_eq!(parts[2].len(), 8);
        assert!(parts[2].chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn tracker_records_success_and_failure() {
        let (monitor, _) = monitor(MonitorConfig::default());
        let tracker = monitor.start("sentiment");
        assert_eq!(monitor.active_requests(), 1);
        tracker.finish(CacheOutcome::Miss);
        monitor.start("stance").fail("boom");

        let stats = monitor.stats();
        assert_eq!(stats.total_requests, 2);
        assert_eq!(stats.successful, 1);
        assert_eq!(stats.failed, 1);
        assert_eq!(stats.cache_misses, 1);
        assert_eq!(monitor.active_requests(), 0);
        assert_eq!(monitor.recent(1)[0].error.as_deref(), Some("boom"));
    }

    #[test]
    fn dropped_tracker_counts_as_failure() {
        let (monitor, _) = monitor(MonitorConfig::default());
        drop(monitor.start("sentiment"));
        assert_eq!(monitor.stats().failed, 1);
        assert_eq!(monitor.active_requests(), 0);
    }

    #[test]
    fn old_samples_leave_the_window() {
        let (monitor, clock) = monitor(MonitorConfig {
            window_secs: 60,
            ..MonitorConfig::default()
        });
        monitor.record(sample("sentiment", clock.now(), 5.0, CacheOutcome::Hit));
        clock.advance(Duration::from_secs(61));
        monitor.record(sample("sentiment", clock.now(), 7.0, CacheOutcome::Miss));

        let stats = monitor.stats();
        assert_eq!(stats.total_requests, 1);
        assert_eq!(stats.latency.max_ms, 7.0);
    }

    #[test]
    fn sample_count_is_capped() {
        let (monitor, clock) = monitor(MonitorConfig {
            max_samples: 3,
            ..MonitorConfig::default()
        });
        for n in 0..5 {
            monitor.record(sample("sentiment", clock.now(), n as f64, CacheOutcome::Miss));
        }
        assert_eq!(monitor.sample_count(), 3);
        assert_eq!(monitor.stats().latency.min_ms, 2.0);
    }

    #[test]
    fn per_endpoint_breakdown() {
        let (monitor, clock) = monitor(MonitorConfig::default());
        monitor.record(sample("sentiment", clock.now(), 10.0, CacheOutcome::Hit));
        monitor.record(sample("sentiment", clock.now(), 20.0, CacheOutcome::Miss));
        monitor.record(sample("stance", clock.now(), 30.0, CacheOutcome::Miss));

        assert_eq!(monitor.endpoints(), vec!["sentiment", "stance"]);
        let sentiment = monitor.endpoint_stats("sentiment").unwrap();
        assert_eq!(sentiment.total_requests, 2);
        assert_eq!(sentiment.cache_hits, 1);
        assert_eq!(sentiment.avg_latency_ms, 15.0);
        assert!(monitor.endpoint_stats("batch").is_none());
    }

    #[test]
    fn memory_alerts_follow_thresholds() {
        let config = MonitorConfig::default();
        let mb = 1024 * 1024;
        assert_eq!(memory_alert(100 * mb, 0, &config), None);
        assert_eq!(
            memory_alert(600 * mb, 2 * mb as i64, &config),
            Some(MemoryAlert::High {
                resident_mb: 600.0,
                delta_mb: 2.0
            })
        );
        assert_eq!(
            memory_alert(100 * mb, -12 * mb as i64, &config),
            Some(MemoryAlert::LargeDelta {
                resident_mb: 100.0,
                delta_mb: -12.0
            })
        );
        let relaxed = MonitorConfig {
            memory_warn_mb: 1024.0,
            ..MonitorConfig::default()
        };
        assert_eq!(memory_alert(600 * mb, 0, &relaxed), None);
    }

    #[test]
    fn over_threshold_requests_are_still_recorded() {
        let clock = Arc::new(ManualClock::starting_now());
        let monitor = PerformanceMonitor::new(
            MonitorConfig {
                memory_warn_mb: 1.0,
                ..MonitorConfig::default()
            },
            clock,
            Arc::new(FixedProbe(8 * 1024 * 1024)),
        );
        monitor.start("sentiment").finish(CacheOutcome::Miss);
        assert_eq!(monitor.stats().successful, 1);
        assert_eq!(monitor.stats().memory.peak_mb, 8.0);
    }

    #[test]
    fn detailed_metrics_include_system_stats_and_history() {
        let (monitor, clock) = monitor(MonitorConfig::default());
        assert!(monitor.detailed(10).system.is_none());

        monitor.record(sample("sentiment", clock.now(), 10.0, CacheOutcome::Hit));
        monitor.record(sample("stance", clock.now(), 20.0, CacheOutcome::Miss));
        let host = SystemStats {
            cpu_percent: 12.5,
            memory_percent: 40.0,
            memory_available_mb: 2048.0,
            disk_percent: 55.0,
            sampled_at: clock.now(),
        };
        monitor.record_system_stats(host);

        let detailed = monitor.detailed(1);
        assert_eq!(detailed.system, Some(host));
        assert_eq!(detailed.stats.total_requests, 2);
        assert_eq!(detailed.recent.len(), 1);
        assert_eq!(detailed.recent[0].endpoint, "stance");
        assert_eq!(detailed.active_requests, 0);
    }

    #[test]
    fn reset_keeps_host_snapshot() {
        let (monitor, clock) = monitor(MonitorConfig::default());
        monitor.record_system_stats(SystemStats {
            cpu_percent: 1.0,
            memory_percent: 1.0,
            memory_available_mb: 1.0,
            disk_percent: 1.0,
            sampled_at: clock.now(),
        });
        monitor.reset();
        assert!(monitor.system_stats().is_some());
    }

    #[test]
    fn reset_empties_window() {
        let (monitor, clock) = monitor(MonitorConfig::default());
        monitor.record(sample("sentiment", clock.now(), 10.0, CacheOutcome::Hit));
        monitor.reset();
        assert_eq!(monitor.stats().total_requests, 0);
    }
}
