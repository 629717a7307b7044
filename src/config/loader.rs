use std::fs;
use std::path::{Path, PathBuf};

use super::env::{apply_overrides, EnvironmentSnapshot};
use super::SentiscopeConfig;
use crate::errors::ConfigError;

pub const CONFIG_FILE_NAME: &str = ".sentiscope.toml";
const MAX_TRAVERSAL_DEPTH: usize = 10;

/// Parse and validate config from a TOML string
pub fn parse_config(contents: &str, origin: &Path) -> Result<SentiscopeConfig, ConfigError> {
    let config: SentiscopeConfig = toml::from_str(contents).map_err(|source| ConfigError::Parse {
        path: origin.to_path_buf(),
        source,
    })?;
    config.validate()?;
    Ok(config)
}

/// Load configuration from an explicit file; a missing file is an error
pub fn load_config_from(path: &Path) -> Result<SentiscopeConfig, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let config = parse_config(&contents, path)?;
    tracing::debug!(path = %path.display(), "loaded config");
    Ok(config)
}

/// Generate directory ancestors up to a depth limit
pub fn directory_ancestors(start: PathBuf, max_depth: usize) -> impl Iterator<Item = PathBuf> {
    std::iter::successors(Some(start), |dir| {
        let mut parent = dir.clone();
        if parent.pop() {
            Some(parent)
        } else {
            None
        }
    })
    .take(max_depth)
}

/// Find the nearest config file walking up from `start`
pub fn discover_config(start: &Path) -> Option<PathBuf> {
    directory_ancestors(start.to_path_buf(), MAX_TRAVERSAL_DEPTH)
        .map(|dir| dir.join(CONFIG_FILE_NAME))
        .find(|candidate| candidate.is_file())
}

fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("sentiscope").join("config.toml"))
}

/// Resolve configuration for a run.
///
/// An explicit path must exist and parse. Otherwise `.sentiscope.toml` is
/// searched in `start` and its ancestors, then the user config directory;
/// discovered files that fail to parse are errors too, since silently falling
/// back would hide a typo. Environment overrides are applied last.
pub fn load_config(
    explicit: Option<&Path>,
    start: &Path,
    env: &EnvironmentSnapshot,
) -> Result<SentiscopeConfig, ConfigError> {
    let discovered = match explicit {
        Some(path) => Some(path.to_path_buf()),
        None => discover_config(start).or_else(|| user_config_path().filter(|p| p.is_file())),
    };

    let config = match discovered {
        Some(path) => load_config_from(&path)?,
        None => {
            tracing::debug!(
                depth = MAX_TRAVERSAL_DEPTH,
                "no config file found, using defaults"
            );
            SentiscopeConfig::default()
        }
    };

    let config = apply_overrides(config, env);
    config.validate()?;
    Ok(config)
}
