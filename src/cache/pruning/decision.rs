//! Pure pruning decision logic
//!
//! This module contains pure functions for deciding what the result cache
//! should drop. Nothing here touches cache state; callers pass in the
//! relevant entry metadata and the current time.

use chrono::{DateTime, Utc};
use std::time::Duration;

use crate::cache::Fingerprint;
use crate::clock::to_chrono;

/// Smallest TTL accepted, so that `expires_at > created_at` always holds
pub const MIN_TTL: Duration = Duration::from_millis(1);

/// Ordering key for least-recently-used selection. The access sequence
/// breaks timestamp ties deterministically.
pub type RecencyKey = (DateTime<Utc>, u64);

/// Ordering key for least-used selection: access count, then recency
pub type UsageKey = (u64, DateTime<Utc>, u64);

pub fn effective_ttl(requested: Duration) -> Duration {
    requested.max(MIN_TTL)
}

pub fn expiry_for(created_at: DateTime<Utc>, ttl: Duration) -> DateTime<Utc> {
    created_at
        .checked_add_signed(to_chrono(effective_ttl(ttl)))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

/// An entry is expired once the clock reaches its expiry instant
pub fn is_expired(expires_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    now >= expires_at
}

/// Whether enough time has passed since the last sweep
pub fn sweep_due(last_sweep: DateTime<Utc>, now: DateTime<Utc>, interval: Duration) -> bool {
    now - last_sweep >= to_chrono(interval)
}

/// How many live entries must go before inserting a new key
pub fn evictions_needed(live_entries: usize, capacity: usize) -> usize {
    (live_entries + 1).saturating_sub(capacity)
}

/// Entry count `optimize` should trim down to, if the cache is above its
/// high-water mark
pub fn optimization_target(
    len: usize,
    capacity: usize,
    high_water: f64,
    target: f64,
) -> Option<usize> {
    let high = capacity as f64 * high_water;
    if (len as f64) > high {
        Some((capacity as f64 * target).floor() as usize)
    } else {
        None
    }
}

/// The `count` candidates with the smallest keys
pub fn select_victims<K: Ord>(mut candidates: Vec<(Fingerprint, K)>, count: usize) -> Vec<Fingerprint> {
    if count == 0 {
        return Vec::new();
    }
    candidates.sort_by(|a, b| a.1.cmp(&b.1));
    candidates.into_iter().take(count).map(|(fp, _)| fp).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    #[test]
    fn zero_ttl_is_raised_to_minimum() {
        assert_eq!(effective_ttl(Duration::ZERO), MIN_TTL);
        assert!(expiry_for(at(0), Duration::ZERO) > at(0));
    }

    #[test]
    fn expiry_is_inclusive() {
        assert!(!is_expired(at(10), at(9)));
        assert!(is_expired(at(10), at(10)));
    }

    #[test]
    fn sweep_waits_for_interval() {
        let interval = Duration::from_secs(300);
        assert!(!sweep_due(at(0), at(299), interval));
        assert!(sweep_due(at(0), at(300), interval));
    }

    #[test]
    fn evictions_needed_leaves_room_for_one() {
        assert_eq!(evictions_needed(3, 3), 1);
        assert_eq!(evictions_needed(2, 3), 0);
        assert_eq!(evictions_needed(5, 3), 3);
    }

    #[test]
    fn optimization_only_above_high_water() {
        assert_eq!(optimization_target(80, 100, 0.8, 0.7), None);
        assert_eq!(optimization_target(81, 100, 0.8, 0.7), Some(70));
    }

    #[test]
    fn victims_are_smallest_keys_with_ties_broken() {
        let candidates = vec![
            (Fingerprint::sentiment("a"), (at(5), 2)),
            (Fingerprint::sentiment("b"), (at(5), 1)),
            (Fingerprint::sentiment("c"), (at(9), 0)),
        ];
        let victims = select_victims(candidates, 2);
        assert_eq!(
            victims,
            vec![Fingerprint::sentiment("b"), Fingerprint::sentiment("a")]
        );
    }
}
