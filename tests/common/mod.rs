// Shared helpers for sentiscope integration tests
#![allow(dead_code)]

use sentiscope::performance::MemoryProbe;
use sentiscope::{Analyzer, ManualClock, SentiscopeConfig};
use std::sync::Arc;

/// Memory probe reporting a constant resident size
pub struct FixedProbe(pub u64);

impl MemoryProbe for FixedProbe {
    fn resident_bytes(&self) -> u64 {
        self.0
    }
}

pub fn analyzer_with(config: SentiscopeConfig) -> (Analyzer, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::starting_now());
    let analyzer = Analyzer::builder(config)
        .clock(clock.clone())
        .memory_probe(Arc::new(FixedProbe(64 * 1024 * 1024)))
        .build()
        .expect("default configuration builds");
    (analyzer, clock)
}

pub fn analyzer() -> Analyzer {
    analyzer_with(SentiscopeConfig::default()).0
}

pub fn uncached_analyzer() -> Analyzer {
    let mut config = SentiscopeConfig::default();
    config.cache.enabled = false;
    analyzer_with(config).0
}

/// Words used to generate realistic review-like text in property tests
pub const VOCABULARY: &[&str] = &[
    "I", "we", "the", "product", "service", "Apple", "it", "is", "was", "very", "really",
    "slightly", "not", "never", "love", "hate", "great", "terrible", "good", "bad", "okay",
    "AMAZING", "awful", "can't", "won't", "it's", "don't", "disappointed", "happy", "support",
    "oppose", "innovative", "arrived", "on", "time", "2.5", "1994", "e-commerce", "Apple's",
    "@support", "#deal", "https://example.com/item", "!", "!!!!", "?", "...", ".", ",",
];
