use serde::{Deserialize, Serialize};

/// Monotonic cache counters. Only `reset` clears them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct CacheCounters {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub expired_removals: u64,
    pub manual_removals: u64,
}

impl CacheCounters {
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Estimated bytes held by live entries
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MemoryUsage {
    pub total_bytes: usize,
    pub min_entry_bytes: usize,
    pub max_entry_bytes: usize,
    pub avg_entry_bytes: f64,
}

impl MemoryUsage {
    pub fn from_sizes(sizes: impl Iterator<Item = usize>) -> Self {
        let (count, total, min, max) = sizes.fold(
            (0usize, 0usize, usize::MAX, 0usize),
            |(count, total, min, max), size| (count + 1, total + size, min.min(size), max.max(size)),
        );
        if count == 0 {
            return Self::default();
        }
        Self {
            total_bytes: total,
            min_entry_bytes: min,
            max_entry_bytes: max,
            avg_entry_bytes: total as f64 / count as f64,
        }
    }

    pub fn total_megabytes(&self) -> f64 {
        self.total_bytes as f64 / (1024.0 * 1024.0)
    }
}

/// Point-in-time view of cache counters and occupancy.
///
/// `hits + misses == total_requests` holds for every snapshot because all
/// three are read under the same lock.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub expired_removals: u64,
    pub manual_removals: u64,
    pub total_requests: u64,
    pub hit_rate_percent: f64,
    pub size: usize,
    pub max_size: usize,
    pub default_ttl_secs: u64,
    pub memory: MemoryUsage,
}

impl CacheStats {
    pub(crate) fn from_parts(
        counters: &CacheCounters,
        size: usize,
        max_size: usize,
        default_ttl_secs: u64,
        memory: MemoryUsage,
    ) -> Self {
        let total_requests = counters.hits + counters.misses;
        let hit_rate_percent = if total_requests == 0 {
            0.0
        } else {
            counters.hits as f64 / total_requests as f64 * 100.0
        };
        Self {
            hits: counters.hits,
            misses: counters.misses,
            evictions: counters.evictions,
            expired_removals: counters.expired_removals,
            manual_removals: counters.manual_removals,
            total_requests,
            hit_rate_percent,
            size,
            max_size,
            default_ttl_secs,
            memory,
        }
    }

    pub fn hit_rate(&self) -> f64 {
        self.hit_rate_percent / 100.0
    }
}
