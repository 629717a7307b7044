use proptest::prelude::*;
use sentiscope::cache::{CachedResult, Fingerprint, ResultCache};
use sentiscope::classify::{Confidence, SentimentLabel, SentimentResult};
use sentiscope::config::CacheConfig;
use sentiscope::ManualClock;
use std::sync::Arc;
use std::time::Duration;

fn payload(n: usize) -> CachedResult {
    CachedResult::Sentiment(SentimentResult {
        label: SentimentLabel::Neutral,
        confidence: Confidence::new(0.4),
        polarity: n as f64,
        token_count: n,
        notes: Vec::new(),
    })
}

fn key(n: usize) -> Fingerprint {
    Fingerprint::sentiment(&format!("review number {}", n))
}

fn cache(max_entries: usize, ttl_secs: u64) -> (ResultCache, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::starting_now());
    let config = CacheConfig {
        max_entries,
        default_ttl_secs: ttl_secs,
        ..CacheConfig::default()
    };
    (ResultCache::new(config, clock.clone()), clock)
}

#[test]
fn test_entry_is_served_until_ttl_then_gone() {
    let (cache, clock) = cache(10, 60);
    cache.put(key(1), payload(1), None);

    clock.advance(Duration::from_secs(59));
    assert_eq!(cache.get(&key(1)), Some(payload(1)));

    clock.advance(Duration::from_secs(1));
    assert_eq!(cache.get(&key(1)), None);
    assert_eq!(cache.len(), 0);

    let stats = cache.stats();
    assert_eq!(stats.hits, 1);
    assert_eq!(stats.misses, 1);
    assert_eq!(stats.expired_removals, 1);
}

#[test]
fn test_zero_ttl_still_expires_after_creation() {
    let (cache, clock) = cache(10, 60);
    cache.put(key(1), payload(1), Some(Duration::ZERO));
    let info = &cache.entries(1)[0];
    assert!(info.expires_at > info.created_at);

    clock.advance(Duration::from_millis(1));
    assert_eq!(cache.get(&key(1)), None);
}

#[test]
fn test_least_recently_accessed_entry_is_evicted() {
    let (cache, clock) = cache(3, 3600);
    for n in 0..3 {
        cache.put(key(n), payload(n), None);
        clock.advance(Duration::from_secs(1));
    }
    // Touch the oldest so the middle entry becomes least recent
    cache.get(&key(0));
    clock.advance(Duration::from_secs(1));

    cache.put(key(3), payload(3), None);

    assert_eq!(cache.len(), 3);
    assert!(cache.contains(&key(0)));
    assert!(!cache.contains(&key(1)));
    assert!(cache.contains(&key(2)));
    assert!(cache.contains(&key(3)));
    assert_eq!(cache.stats().evictions, 1);
}

#[test]
fn test_same_instant_ties_break_by_access_order() {
    let (cache, _) = cache(2, 3600);
    cache.put(key(0), payload(0), None);
    cache.put(key(1), payload(1), None);
    cache.get(&key(0));
    cache.put(key(2), payload(2), None);

    assert!(cache.contains(&key(0)));
    assert!(!cache.contains(&key(1)));
}

#[test]
fn test_stats_survive_clear_until_reset() {
    let (cache, _) = cache(10, 3600);
    cache.put(key(0), payload(0), None);
    cache.get(&key(0));
    cache.get(&key(9));
    cache.clear();

    let stats = cache.stats();
    assert_eq!(stats.size, 0);
    assert_eq!(stats.total_requests, 2);
    assert_eq!(stats.hit_rate_percent, 50.0);

    cache.reset_stats();
    let stats = cache.stats();
    assert_eq!(stats.total_requests, 0);
    assert_eq!(stats.manual_removals, 0);
}

#[test]
fn test_concurrent_access_keeps_bound_and_counts() {
    let (cache, _) = cache(16, 3600);
    let cache = Arc::new(cache);
    let handles: Vec<_> = (0..4)
        .map(|worker| {
            let cache = Arc::clone(&cache);
            std::thread::spawn(move || {
                for n in 0..200 {
                    let k = key((worker * 7 + n) % 40);
                    if cache.get(&k).is_none() {
                        cache.put(k, payload(n), None);
                    }
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let stats = cache.stats();
    assert!(stats.size <= 16);
    assert_eq!(stats.hits + stats.misses, stats.total_requests);
    assert_eq!(stats.total_requests, 800);
}

#[derive(Debug, Clone)]
enum Op {
    Put(usize),
    Get(usize),
    Delete(usize),
    Advance(u64),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => (0usize..30).prop_map(Op::Put),
        3 => (0usize..30).prop_map(Op::Get),
        1 => (0usize..30).prop_map(Op::Delete),
        1 => (0u64..120).prop_map(Op::Advance),
    ]
}

proptest! {
    #[test]
    fn prop_size_never_exceeds_capacity(max in 1usize..12, ops in prop::collection::vec(op(), 1..200)) {
        let (cache, clock) = cache(max, 60);
        for op in ops {
            match op {
                Op::Put(n) => cache.put(key(n), payload(n), None),
                Op::Get(n) => { cache.get(&key(n)); }
                Op::Delete(n) => { cache.delete(&key(n)); }
                Op::Advance(secs) => clock.advance(Duration::from_secs(secs)),
            }
            let stats = cache.stats();
            prop_assert!(stats.size <= max);
            prop_assert_eq!(stats.hits + stats.misses, stats.total_requests);
        }
    }

    #[test]
    fn prop_live_entries_expire_after_creation(ttl_ms in 0u64..5000) {
        let (cache, _) = cache(4, 60);
        cache.put(key(0), payload(0), Some(Duration::from_millis(ttl_ms)));
        for info in cache.entries(10) {
            prop_assert!(info.expires_at > info.created_at);
        }
    }
}
