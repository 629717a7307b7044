use std::collections::HashMap;
use std::path::PathBuf;

use super::SentiscopeConfig;

const ENV_PREFIX: &str = "SENTISCOPE_";

pub const CACHE_ENABLED: &str = "SENTISCOPE_CACHE_ENABLED";
pub const CACHE_MAX_ENTRIES: &str = "SENTISCOPE_CACHE_MAX_ENTRIES";
pub const CACHE_TTL_SECS: &str = "SENTISCOPE_CACHE_TTL_SECS";
pub const MONITOR_WINDOW_SECS: &str = "SENTISCOPE_MONITOR_WINDOW_SECS";
pub const MONITOR_MEMORY_WARN_MB: &str = "SENTISCOPE_MONITOR_MEMORY_WARN_MB";
pub const MONITOR_SYSTEM_STATS: &str = "SENTISCOPE_MONITOR_SYSTEM_STATS";
pub const LEXICON_PATH: &str = "SENTISCOPE_LEXICON";

/// Snapshot of the `SENTISCOPE_*` environment variables
///
/// Taken once so that overrides can be applied by a pure function and tested
/// without touching the process environment.
#[derive(Debug, Clone, Default)]
pub struct EnvironmentSnapshot {
    pub vars: HashMap<String, String>,
}

impl EnvironmentSnapshot {
    pub fn from_current_env() -> Self {
        let vars = std::env::vars()
            .filter(|(key, _)| key.starts_with(ENV_PREFIX))
            .collect();
        Self { vars }
    }

    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let vars = pairs
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Self { vars }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(|s| s.as_str())
    }

    pub fn parse<T: std::str::FromStr>(&self, key: &str) -> Option<T> {
        let raw = self.get(key)?;
        match raw.trim().parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(key, value = raw, "ignoring unparsable environment override");
                None
            }
        }
    }

    fn flag(&self, key: &str) -> Option<bool> {
        self.get(key).map(|v| {
            matches!(
                v.trim().to_ascii_lowercase().as_str(),
                "1" | "true" | "yes" | "on"
            )
        })
    }
}

/// Apply environment overrides on top of file-based configuration
pub fn apply_overrides(mut config: SentiscopeConfig, env: &EnvironmentSnapshot) -> SentiscopeConfig {
    if let Some(enabled) = env.flag(CACHE_ENABLED) {
        config.cache.enabled = enabled;
    }
    if let Some(max) = env.parse::<usize>(CACHE_MAX_ENTRIES) {
        config.cache.max_entries = max;
    }
    if let Some(ttl) = env.parse::<u64>(CACHE_TTL_SECS) {
        config.cache.default_ttl_secs = ttl;
    }
    if let Some(window) = env.parse::<u64>(MONITOR_WINDOW_SECS) {
        config.monitor.window_secs = window;
    }
    if let Some(threshold) = env.parse::<f64>(MONITOR_MEMORY_WARN_MB) {
        config.monitor.memory_warn_mb = threshold;
    }
    if let Some(enabled) = env.flag(MONITOR_SYSTEM_STATS) {
        config.monitor.system_stats = enabled;
    }
    if let Some(path) = env.get(LEXICON_PATH).filter(|p| !p.trim().is_empty()) {
        config.lexicon.path = Some(PathBuf::from(path));
    }
    config
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overrides_replace_file_values() {
        let env = EnvironmentSnapshot::from_pairs([
            (CACHE_MAX_ENTRIES, "25"),
            (CACHE_TTL_SECS, "60"),
            (CACHE_ENABLED, "false"),
            (LEXICON_PATH, "/tmp/custom.toml"),
        ]);

        let config = apply_overrides(SentiscopeConfig::default(), &env);

        assert_eq!(config.cache.max_entries, 25);
        assert_eq!(config.cache.default_ttl_secs, 60);
        assert!(!config.cache.enabled);
        assert_eq!(config.lexicon.path, Some(PathBuf::from("/tmp/custom.toml")));
    }

    #[test]
    fn unparsable_values_are_ignored() {
        let env = EnvironmentSnapshot::from_pairs([(CACHE_MAX_ENTRIES, "lots")]);
        let config = apply_overrides(SentiscopeConfig::default(), &env);
        assert_eq!(config.cache.max_entries, 1000);
    }

    #[test]
    fn monitor_overrides_apply() {
        let env = EnvironmentSnapshot::from_pairs([
            (MONITOR_MEMORY_WARN_MB, "256.5"),
            (MONITOR_SYSTEM_STATS, "on"),
        ]);
        let config = apply_overrides(SentiscopeConfig::default(), &env);
        assert_eq!(config.monitor.memory_warn_mb, 256.5);
        assert!(config.monitor.system_stats);
    }
}
