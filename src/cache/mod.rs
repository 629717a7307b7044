//! Bounded result cache with TTL expiry and LRU eviction.
//!
//! Entries are keyed by [`Fingerprint`] and hold a fully computed
//! classification result. The cache never grows past its configured maximum:
//! inserting a new key at capacity first drops expired entries and then the
//! least recently accessed live ones. Expired entries are also swept lazily,
//! at most once per sweep interval, from `get`/`put`, and optionally by a
//! [`CacheSweeper`] thread.
//!
//! All state sits behind one mutex so counters and occupancy are always
//! observed together.

mod fingerprint;
pub mod pruning;
mod stats;
mod sweeper;

pub use fingerprint::{Fingerprint, Operation};
pub use stats::{CacheStats, MemoryUsage};
pub use sweeper::CacheSweeper;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use crate::classify::{SentimentResult, StanceResult};
use crate::clock::Clock;
use crate::config::CacheConfig;
use crate::errors::ConfigError;
use pruning::{RecencyKey, UsageKey};
use stats::CacheCounters;

/// A cached classification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "operation", rename_all = "snake_case")]
pub enum CachedResult {
    Sentiment(SentimentResult),
    Stance(StanceResult),
}

impl CachedResult {
    pub fn operation(&self) -> Operation {
        match self {
            CachedResult::Sentiment(_) => Operation::Sentiment,
            CachedResult::Stance(_) => Operation::Stance,
        }
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    payload: CachedResult,
    created_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
    last_accessed_at: DateTime<Utc>,
    access_count: u64,
    access_seq: u64,
    size_bytes: usize,
}

impl CacheEntry {
    fn recency(&self) -> RecencyKey {
        (self.last_accessed_at, self.access_seq)
    }

    fn usage(&self) -> UsageKey {
        (self.access_count, self.last_accessed_at, self.access_seq)
    }
}

/// Metadata for one entry, as reported by [`ResultCache::entries`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryInfo {
    pub fingerprint: Fingerprint,
    pub operation: Operation,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub last_accessed_at: DateTime<Utc>,
    pub access_count: u64,
    pub size_bytes: usize,
    pub expired: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OptimizationReport {
    pub entries_before: usize,
    pub entries_after: usize,
    pub expired_removed: usize,
    pub evicted: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResizeReport {
    pub old_max: usize,
    pub new_max: usize,
    pub evicted: usize,
}

#[derive(Debug)]
struct CacheState {
    entries: HashMap<Fingerprint, CacheEntry>,
    counters: CacheCounters,
    max_entries: usize,
    last_sweep: DateTime<Utc>,
    next_seq: u64,
}

impl CacheState {
    fn next_seq(&mut self) -> u64 {
        self.next_seq += 1;
        self.next_seq
    }

    fn remove_expired(&mut self, now: DateTime<Utc>) -> usize {
        let before = self.entries.len();
        self.entries
            .retain(|_, entry| !pruning::is_expired(entry.expires_at, now));
        let removed = before - self.entries.len();
        self.counters.expired_removals += removed as u64;
        self.last_sweep = now;
        removed
    }

    fn maybe_sweep(&mut self, now: DateTime<Utc>, interval: Duration) {
        if pruning::sweep_due(self.last_sweep, now, interval) {
            let removed = self.remove_expired(now);
            if removed > 0 {
                tracing::debug!(removed, "swept expired cache entries");
            }
        }
    }

    fn evict_least_recent(&mut self, count: usize) -> usize {
        let candidates = self
            .entries
            .iter()
            .map(|(fp, entry)| (fp.clone(), entry.recency()))
            .collect();
        self.evict(pruning::select_victims(candidates, count))
    }

    fn evict_least_used(&mut self, count: usize) -> usize {
        let candidates = self
            .entries
            .iter()
            .map(|(fp, entry)| (fp.clone(), entry.usage()))
            .collect();
        self.evict(pruning::select_victims(candidates, count))
    }

    fn evict(&mut self, victims: Vec<Fingerprint>) -> usize {
        let evicted = victims
            .iter()
            .filter(|fp| self.entries.remove(*fp).is_some())
            .count();
        self.counters.evictions += evicted as u64;
        evicted
    }
}

pub struct ResultCache {
    config: CacheConfig,
    clock: Arc<dyn Clock>,
    state: Mutex<CacheState>,
}

impl std::fmt::Debug for ResultCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("ResultCache")
            .field("len", &state.entries.len())
            .field("max_entries", &state.max_entries)
            .finish()
    }
}

impl ResultCache {
    pub fn new(config: CacheConfig, clock: Arc<dyn Clock>) -> Self {
        let now = clock.now();
        let state = CacheState {
            entries: HashMap::new(),
            counters: CacheCounters::default(),
            max_entries: config.max_entries.max(1),
            last_sweep: now,
            next_seq: 0,
        };
        Self {
            config,
            clock,
            state: Mutex::new(state),
        }
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    fn estimate_size(&self, fingerprint: &Fingerprint, payload: &CachedResult) -> usize {
        let payload_bytes = serde_json::to_vec(payload).map(|v| v.len()).unwrap_or(0);
        payload_bytes + fingerprint.as_str().len() + self.config.entry_overhead_bytes
    }

    /// Look up a live entry. Absent and expired entries count as misses;
    /// an expired entry is removed on the spot.
    pub fn get(&self, fingerprint: &Fingerprint) -> Option<CachedResult> {
        let now = self.clock.now();
        let mut state = self.state.lock();
        state.maybe_sweep(now, self.config.sweep_interval());

        let expired = match state.entries.get(fingerprint) {
            None => {
                state.counters.misses += 1;
                return None;
            }
            Some(entry) => pruning::is_expired(entry.expires_at, now),
        };

        if expired {
            state.entries.remove(fingerprint);
            state.counters.expired_removals += 1;
            state.counters.misses += 1;
            return None;
        }

        let seq = state.next_seq();
        state.counters.hits += 1;
        let entry = state.entries.get_mut(fingerprint)?;
        entry.last_accessed_at = now;
        entry.access_count += 1;
        entry.access_seq = seq;
        Some(entry.payload.clone())
    }

    /// Insert or replace an entry. `ttl` defaults to the configured TTL and
    /// is raised to at least one millisecond.
    pub fn put(&self, fingerprint: Fingerprint, payload: CachedResult, ttl: Option<Duration>) {
        let now = self.clock.now();
        let ttl = ttl.unwrap_or_else(|| self.config.default_ttl());
        let size_bytes = self.estimate_size(&fingerprint, &payload);

        let mut state = self.state.lock();
        state.maybe_sweep(now, self.config.sweep_interval());

        if !state.entries.contains_key(&fingerprint) && state.entries.len() >= state.max_entries {
            state.remove_expired(now);
            let needed = pruning::evictions_needed(state.entries.len(), state.max_entries);
            let evicted = state.evict_least_recent(needed);
            if evicted > 0 {
                tracing::debug!(evicted, "evicted least recently used cache entries");
            }
        }

        let seq = state.next_seq();
        state.entries.insert(
            fingerprint,
            CacheEntry {
                payload,
                created_at: now,
                expires_at: pruning::expiry_for(now, ttl),
                last_accessed_at: now,
                access_count: 0,
                access_seq: seq,
                size_bytes,
            },
        );
    }

    /// Remove one entry; returns whether it existed
    pub fn delete(&self, fingerprint: &Fingerprint) -> bool {
        let mut state = self.state.lock();
        let removed = state.entries.remove(fingerprint).is_some();
        if removed {
            state.counters.manual_removals += 1;
        }
        removed
    }

    /// Remove every entry; counters are kept
    pub fn clear(&self) -> usize {
        let mut state = self.state.lock();
        let removed = state.entries.len();
        state.entries.clear();
        state.counters.manual_removals += removed as u64;
        tracing::info!(removed, "cleared result cache");
        removed
    }

    /// Remove all expired entries now, regardless of the sweep interval
    pub fn sweep_expired(&self) -> usize {
        let now = self.clock.now();
        self.state.lock().remove_expired(now)
    }

    /// Drop expired entries, then trim least-used entries down to the
    /// optimize target if the cache sits above its high-water mark
    pub fn optimize(&self) -> OptimizationReport {
        let now = self.clock.now();
        let mut state = self.state.lock();
        let entries_before = state.entries.len();
        let expired_removed = state.remove_expired(now);

        let evicted = match pruning::optimization_target(
            state.entries.len(),
            state.max_entries,
            self.config.optimize_high_water,
            self.config.optimize_target,
        ) {
            Some(keep) => {
                let excess = state.entries.len().saturating_sub(keep);
                state.evict_least_used(excess)
            }
            None => 0,
        };

        let report = OptimizationReport {
            entries_before,
            entries_after: state.entries.len(),
            expired_removed,
            evicted,
        };
        tracing::info!(?report, "optimized result cache");
        report
    }

    /// Change the maximum entry count, evicting least recently used entries
    /// beyond the new bound
    pub fn resize(&self, new_max: usize) -> Result<ResizeReport, ConfigError> {
        if new_max == 0 {
            return Err(ConfigError::invalid("cache.max_entries", "must be at least 1"));
        }
        let mut state = self.state.lock();
        let old_max = state.max_entries;
        state.max_entries = new_max;
        let excess = state.entries.len().saturating_sub(new_max);
        let evicted = state.evict_least_recent(excess);
        tracing::info!(old_max, new_max, evicted, "resized result cache");
        Ok(ResizeReport {
            old_max,
            new_max,
            evicted,
        })
    }

    pub fn stats(&self) -> CacheStats {
        let state = self.state.lock();
        let memory = MemoryUsage::from_sizes(state.entries.values().map(|e| e.size_bytes));
        CacheStats::from_parts(
            &state.counters,
            state.entries.len(),
            state.max_entries,
            self.config.default_ttl_secs,
            memory,
        )
    }

    pub fn reset_stats(&self) {
        self.state.lock().counters.reset();
    }

    /// Entry metadata, newest first
    pub fn entries(&self, limit: usize) -> Vec<EntryInfo> {
        let now = self.clock.now();
        let state = self.state.lock();
        let mut infos: Vec<(u64, EntryInfo)> = state
            .entries
            .iter()
            .map(|(fp, entry)| {
                let info = EntryInfo {
                    fingerprint: fp.clone(),
                    operation: entry.payload.operation(),
                    created_at: entry.created_at,
                    expires_at: entry.expires_at,
                    last_accessed_at: entry.last_accessed_at,
                    access_count: entry.access_count,
                    size_bytes: entry.size_bytes,
                    expired: pruning::is_expired(entry.expires_at, now),
                };
                (entry.access_seq, info)
            })
            .collect();
        infos.sort_by(|a, b| {
            b.1.created_at
                .cmp(&a.1.created_at)
                .then_with(|| b.0.cmp(&a.0))
        });
        infos.into_iter().take(limit).map(|(_, info)| info).collect()
    }

    /// Entries currently held, including expired ones not yet swept
    pub fn len(&self) -> usize {
        self.state.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.state.lock().max_entries
    }

    /// Whether a live entry exists, without touching recency or counters
    pub fn contains(&self, fingerprint: &Fingerprint) -> bool {
        let now = self.clock.now();
        self.state
            .lock()
            .entries
            .get(fingerprint)
            .is_some_and(|entry| !pruning::is_expired(entry.expires_at, now))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::{Confidence, SentimentLabel};
    use crate::clock::ManualClock;

    fn payload(polarity: f64) -> CachedResult {
        CachedResult::Sentiment(SentimentResult {
            label: SentimentLabel::Positive,
            confidence: Confidence::new(0.9),
            polarity,
            token_count: 4,
            notes: Vec::new(),
        })
    }

    fn cache_with(max_entries: usize) -> (ResultCache, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::starting_now());
        let config = CacheConfig {
            max_entries,
            ..CacheConfig::default()
        };
        (ResultCache::new(config, clock.clone()), clock)
    }

    fn key(n: usize) -> Fingerprint {
        Fingerprint::sentiment(&format!("text {}", n))
    }

    #[test]
    fn put_then_get_hits() {
        let (cache, _) = cache_with(10);
        cache.put(key(1), payload(1.0), None);
        assert_eq!(cache.get(&key(1)), Some(payload(1.0)));
        let stats = cache.stats();
        assert_eq!((stats.hits, stats.misses), (1, 0));
    }

    #[test]
    fn absent_key_is_miss() {
        let (cache, _) = cache_with(10);
        assert_eq!(cache.get(&key(1)), None);
        assert_eq!(cache.stats().misses, 1);
    }

    #[test]
    fn expired_entry_is_miss_and_removed() {
        let (cache, clock) = cache_with(10);
        cache.put(key(1), payload(1.0), Some(Duration::from_secs(5)));
        clock.advance(Duration::from_secs(5));

        assert_eq!(cache.get(&key(1)), None);
        let stats = cache.stats();
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.expired_removals, 1);
        assert_eq!(cache.len(), 0);
    }

    #[test]
    fn replacing_existing_key_does_not_evict() {
        let (cache, _) = cache_with(2);
        cache.put(key(1), payload(1.0), None);
        cache.put(key(2), payload(2.0), None);
        cache.put(key(1), payload(3.0), None);
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.stats().evictions, 0);
        assert_eq!(cache.get(&key(1)), Some(payload(3.0)));
    }

    #[test]
    fn expired_entries_are_dropped_before_evicting_live_ones() {
        let (cache, clock) = cache_with(2);
        cache.put(key(1), payload(1.0), Some(Duration::from_secs(1)));
        cache.put(key(2), payload(2.0), None);
        clock.advance(Duration::from_secs(2));
        cache.put(key(3), payload(3.0), None);

        assert!(cache.contains(&key(2)));
        assert!(cache.contains(&key(3)));
        let stats = cache.stats();
        assert_eq!(stats.evictions, 0);
        assert_eq!(stats.expired_removals, 1);
    }

    #[test]
    fn delete_and_clear_count_manual_removals() {
        let (cache, _) = cache_with(10);
        for n in 0..3 {
            cache.put(key(n), payload(n as f64), None);
        }
        assert!(cache.delete(&key(0)));
        assert!(!cache.delete(&key(0)));
        assert_eq!(cache.clear(), 2);
        assert_eq!(cache.stats().manual_removals, 3);
        assert!(cache.is_empty());
    }

    #[test]
    fn resize_evicts_least_recent() {
        let (cache, clock) = cache_with(5);
        for n in 0..5 {
            cache.put(key(n), payload(n as f64), None);
            clock.advance(Duration::from_secs(1));
        }
        cache.get(&key(0));

        let report = cache.resize(2).unwrap();
        assert_eq!(report.evicted, 3);
        assert!(cache.contains(&key(0)));
        assert!(cache.contains(&key(4)));
        assert_eq!(cache.capacity(), 2);
    }

    #[test]
    fn resize_to_zero_is_rejected() {
        let (cache, _) = cache_with(5);
        assert!(cache.resize(0).is_err());
    }

    #[test]
    fn optimize_trims_least_used_above_high_water() {
        let (cache, _) = cache_with(10);
        for n in 0..9 {
            cache.put(key(n), payload(n as f64), None);
        }
        for n in 0..7 {
            cache.get(&key(n));
        }
        let report = cache.optimize();
        assert_eq!(report.entries_before, 9);
        assert_eq!(report.entries_after, 7);
        assert_eq!(report.evicted, 2);
        assert!(!cache.contains(&key(7)));
        assert!(!cache.contains(&key(8)));
    }

    #[test]
    fn optimize_below_high_water_only_sweeps() {
        let (cache, clock) = cache_with(10);
        cache.put(key(0), payload(0.0), Some(Duration::from_secs(1)));
        cache.put(key(1), payload(1.0), None);
        clock.advance(Duration::from_secs(2));
        let report = cache.optimize();
        assert_eq!(report.expired_removed, 1);
        assert_eq!(report.evicted, 0);
        assert_eq!(report.entries_after, 1);
    }

    #[test]
    fn on_access_sweep_runs_after_interval() {
        let (cache, clock) = cache_with(10);
        cache.put(key(0), payload(0.0), Some(Duration::from_secs(10)));
        cache.put(key(1), payload(1.0), Some(Duration::from_secs(10)));
        clock.advance(Duration::from_secs(301));

        cache.get(&key(5));
        assert_eq!(cache.len(), 0);
        assert_eq!(cache.stats().expired_removals, 2);
    }

    #[test]
    fn entries_are_newest_first() {
        let (cache, clock) = cache_with(10);
        for n in 0..3 {
            cache.put(key(n), payload(n as f64), None);
            clock.advance(Duration::from_secs(1));
        }
        let infos = cache.entries(2);
        assert_eq!(infos.len(), 2);
        assert_eq!(infos[0].fingerprint, key(2));
        assert_eq!(infos[1].fingerprint, key(1));
        assert_eq!(infos[0].operation, Operation::Sentiment);
    }

    #[test]
    fn memory_accounting_covers_live_entries() {
        let (cache, _) = cache_with(10);
        cache.put(key(0), payload(0.0), None);
        cache.put(key(1), payload(1.0), None);
        let memory = cache.stats().memory;
        assert!(memory.total_bytes > 2 * 128);
        assert!(memory.min_entry_bytes <= memory.max_entry_bytes);
    }

    #[test]
    fn reset_stats_keeps_entries() {
        let (cache, _) = cache_with(10);
        cache.put(key(0), payload(0.0), None);
        cache.get(&key(0));
        cache.reset_stats();
        let stats = cache.stats();
        assert_eq!(stats.hits, 0);
        assert_eq!(stats.size, 1);
    }
}
