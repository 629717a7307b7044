//! Expiry and eviction decisions for the result cache

pub mod decision;

pub use decision::{
    effective_ttl, evictions_needed, expiry_for, is_expired, optimization_target, select_victims,
    sweep_due, RecencyKey, UsageKey, MIN_TTL,
};
