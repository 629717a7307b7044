use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::memory::bytes_to_mb;
use super::system::SystemStats;

/// How a request interacted with the result cache
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheOutcome {
    Hit,
    Miss,
    /// Cache disabled, or the request failed before reaching it
    Bypassed,
}

/// One finished request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceSample {
    pub request_id: String,
    pub endpoint: String,
    pub timestamp: DateTime<Utc>,
    pub latency_ms: f64,
    pub cache: CacheOutcome,
    pub memory_after_bytes: u64,
    pub memory_delta_bytes: i64,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LatencyStats {
    pub avg_ms: f64,
    pub min_ms: f64,
    pub max_ms: f64,
    pub p95_ms: f64,
    pub p99_ms: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MemoryStats {
    pub avg_mb: f64,
    pub peak_mb: f64,
    pub avg_delta_mb: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EndpointStats {
    pub total_requests: usize,
    pub successful: usize,
    pub failed: usize,
    pub avg_latency_ms: f64,
    pub cache_hits: usize,
}

/// Aggregate view of the samples inside the window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceStats {
    pub total_requests: usize,
    pub successful: usize,
    pub failed: usize,
    pub success_rate: f64,
    pub cache_hits: usize,
    pub cache_misses: usize,
    pub cache_hit_rate: f64,
    pub latency: LatencyStats,
    pub memory: MemoryStats,
    pub window_start: DateTime<Utc>,
    pub window_end: DateTime<Utc>,
    pub endpoints: BTreeMap<String, EndpointStats>,
}

/// Window stats with host usage and recent history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetailedMetrics {
    pub stats: PerformanceStats,
    /// `None` until the first host sample is taken
    pub system: Option<SystemStats>,
    /// Newest first
    pub recent: Vec<PerformanceSample>,
    pub active_requests: usize,
}

/// Value at `floor(len * p)` of a sorted slice, clamped to the last element
pub fn percentile(sorted: &[f64], p: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let index = ((sorted.len() as f64 * p).floor() as usize).min(sorted.len() - 1);
    sorted[index]
}

fn ratio(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64
    }
}

pub(crate) fn latency_stats<'a>(samples: impl Iterator<Item = &'a PerformanceSample>) -> LatencyStats {
    let mut latencies: Vec<f64> = samples.map(|s| s.latency_ms).collect();
    if latencies.is_empty() {
        return LatencyStats::default();
    }
    latencies.sort_by(f64::total_cmp);
    let sum: f64 = latencies.iter().sum();
    LatencyStats {
        avg_ms: sum / latencies.len() as f64,
        min_ms: latencies[0],
        max_ms: latencies[latencies.len() - 1],
        p95_ms: percentile(&latencies, 0.95),
        p99_ms: percentile(&latencies, 0.99),
    }
}

fn memory_stats(samples: &[&PerformanceSample]) -> MemoryStats {
    if samples.is_empty() {
        return MemoryStats::default();
    }
    let n = samples.len() as f64;
    let total_after: f64 = samples.iter().map(|s| s.memory_after_bytes as f64).sum();
    let peak = samples.iter().map(|s| s.memory_after_bytes).max().unwrap_or(0);
    let total_delta: f64 = samples.iter().map(|s| s.memory_delta_bytes as f64).sum();
    MemoryStats {
        avg_mb: bytes_to_mb(total_after / n),
        peak_mb: bytes_to_mb(peak as f64),
        avg_delta_mb: bytes_to_mb(total_delta / n),
    }
}

pub(crate) fn endpoint_stats(samples: &[&PerformanceSample]) -> EndpointStats {
    let total = samples.len();
    let successful = samples.iter().filter(|s| s.success).count();
    let latency_sum: f64 = samples.iter().map(|s| s.latency_ms).sum();
    EndpointStats {
        total_requests: total,
        successful,
        failed: total - successful,
        avg_latency_ms: if total == 0 { 0.0 } else { latency_sum / total as f64 },
        cache_hits: samples
            .iter()
            .filter(|s| s.cache == CacheOutcome::Hit)
            .count(),
    }
}

pub(crate) fn aggregate(
    samples: &[&PerformanceSample],
    window_start: DateTime<Utc>,
    window_end: DateTime<Utc>,
) -> PerformanceStats {
    let total = samples.len();
    let successful = samples.iter().filter(|s| s.success).count();
    let cache_hits = samples.iter().filter(|s| s.cache == CacheOutcome::Hit).count();
    let cache_misses = samples.iter().filter(|s| s.cache == CacheOutcome::Miss).count();

    let mut by_endpoint: BTreeMap<&str, Vec<&PerformanceSample>> = BTreeMap::new();
    for sample in samples {
        by_endpoint
            .entry(sample.endpoint.as_str())
            .or_default()
            .push(sample);
    }

    PerformanceStats {
        total_requests: total,
        successful,
        failed: total - successful,
        success_rate: ratio(successful, total),
        cache_hits,
        cache_misses,
        cache_hit_rate: ratio(cache_hits, cache_hits + cache_misses),
        latency: latency_stats(samples.iter().copied()),
        memory: memory_stats(samples),
        window_start,
        window_end,
        endpoints: by_endpoint
            .into_iter()
            .map(|(name, group)| (name.to_string(), endpoint_stats(&group)))
            .collect(),
    }
}
