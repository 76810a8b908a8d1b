//! Configuration loading and management.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};
use wd_store::{DEFAULT_IMPORT_LIMIT, StoreConfig};

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Directory holding the history file. Overridden by `WHATDIDIDO_DATA_DIR`.
    pub data_dir: Option<PathBuf>,
    /// Shell history file read by `sync`.
    pub shell_history: Option<PathBuf>,
    /// Number of trailing shell history lines `sync` considers.
    pub import_limit: usize,
    /// How long to wait for the history lock, in milliseconds.
    pub lock_timeout_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: dirs_data_path(),
            shell_history: dirs::home_dir().map(|home| home.join(".zsh_history")),
            import_limit: DEFAULT_IMPORT_LIMIT,
            lock_timeout_ms: 5000,
        }
    }
}

impl Config {
    /// Loads configuration, optionally from a specific file.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Load from default config location
        if let Some(config_dir) = dirs_config_path() {
            figment = figment.merge(Toml::file(config_dir.join("config.toml")));
        }

        // Load from specified config file
        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        // Load from environment variables (WHATDIDIDO_*)
        figment = figment.merge(Env::prefixed("WHATDIDIDO_"));

        figment.extract()
    }

    /// Builds the store configuration.
    ///
    /// Fails if no data directory is configured and none could be derived
    /// from the platform.
    pub fn store_config(&self) -> Result<StoreConfig> {
        let data_dir = self
            .data_dir
            .clone()
            .context("could not determine data directory; set WHATDIDIDO_DATA_DIR")?;
        Ok(StoreConfig::new(data_dir).with_lock_timeout(Duration::from_millis(self.lock_timeout_ms)))
    }
}

/// Returns the platform-specific config directory for whatdidido.
fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("whatdidido"))
}

/// Returns the platform-specific data directory for whatdidido.
///
/// On Linux: `$XDG_DATA_HOME/whatdidido` or `~/.local/share/whatdidido`
pub fn dirs_data_path() -> Option<PathBuf> {
    dirs::data_dir().map(|p| p.join("whatdidido"))
}
