use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::util::paths::config_path;

/// Example configuration file contents (bundled with the binary)
pub const EXAMPLE_CONFIG: &str = include_str!("config.toml.example");

/// Application configuration
///
/// Loaded from ~/.warikan/config.toml. A missing or unreadable file is not
/// an error: everything falls back to defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Base URL prepended to share tokens (`<base>#data=<token>`)
    pub share_base_url: Option<String>,
    /// Data directory override (same effect as --data-dir)
    pub data_dir: Option<PathBuf>,
}

impl Config {
    /// Load configuration from the default location.
    pub fn load() -> Self {
        Self::load_from(&config_path())
    }

    /// Load configuration from a specific path.
    pub fn load_from(path: &Path) -> Self {
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(_) => return Self::default(),
        };

        match toml::from_str(&raw) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Ignoring invalid config file");
                Self::default()
            }
        }
    }
}
