use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Result cache sizing and expiry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    #[serde(default = "default_max_entries")]
    pub max_entries: usize,

    #[serde(default = "default_ttl_secs")]
    pub default_ttl_secs: u64,

    /// Minimum time between on-access sweeps of expired entries
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,

    /// Run a background thread that sweeps on the same interval
    #[serde(default)]
    pub background_sweep: bool,

    /// Fill ratio above which `optimize` trims the cache
    #[serde(default = "default_optimize_high_water")]
    pub optimize_high_water: f64,

    /// Fill ratio `optimize` trims down to
    #[serde(default = "default_optimize_target")]
    pub optimize_target: f64,

    /// Bookkeeping bytes charged per entry on top of its payload
    #[serde(default = "default_entry_overhead_bytes")]
    pub entry_overhead_bytes: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            max_entries: default_max_entries(),
            default_ttl_secs: default_ttl_secs(),
            sweep_interval_secs: default_sweep_interval_secs(),
            background_sweep: false,
            optimize_high_water: default_optimize_high_water(),
            optimize_target: default_optimize_target(),
            entry_overhead_bytes: default_entry_overhead_bytes(),
        }
    }
}

impl CacheConfig {
    pub fn default_ttl(&self) -> Duration {
        Duration::from_secs(self.default_ttl_secs)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }
}

fn default_enabled() -> bool {
    true
}
fn default_max_entries() -> usize {
    1000
}
fn default_ttl_secs() -> u64 {
    3600
}
fn default_sweep_interval_secs() -> u64 {
    300
}
fn default_optimize_high_water() -> f64 {
    0.8
}
fn default_optimize_target() -> f64 {
    0.7
}
fn default_entry_overhead_bytes() -> usize {
    128
}

/// Sliding-window performance telemetry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonitorConfig {
    #[serde(default = "default_window_secs")]
    pub window_secs: u64,

    #[serde(default = "default_max_samples")]
    pub max_samples: usize,

    /// Resident memory above which a finished request logs a warning
    #[serde(default = "default_memory_warn_mb")]
    pub memory_warn_mb: f64,

    /// Per-request memory change worth logging
    #[serde(default = "default_memory_delta_warn_mb")]
    pub memory_delta_warn_mb: f64,

    /// Sample host CPU, memory and disk usage on a background thread
    #[serde(default)]
    pub system_stats: bool,

    #[serde(default = "default_system_refresh_secs")]
    pub system_refresh_secs: u64,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            window_secs: default_window_secs(),
            max_samples: default_max_samples(),
            memory_warn_mb: default_memory_warn_mb(),
            memory_delta_warn_mb: default_memory_delta_warn_mb(),
            system_stats: false,
            system_refresh_secs: default_system_refresh_secs(),
        }
    }
}

impl MonitorConfig {
    pub fn window(&self) -> Duration {
        Duration::from_secs(self.window_secs)
    }

    pub fn system_refresh_interval(&self) -> Duration {
        Duration::from_secs(self.system_refresh_secs)
    }
}

fn default_window_secs() -> u64 {
    60 * 60
}
fn default_max_samples() -> usize {
    10_000
}
fn default_memory_warn_mb() -> f64 {
    500.0
}
fn default_memory_delta_warn_mb() -> f64 {
    10.0
}
fn default_system_refresh_secs() -> u64 {
    30
}
