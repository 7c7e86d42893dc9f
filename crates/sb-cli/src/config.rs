//! Configuration loading and management.

use std::fmt;
use std::path::{Path, PathBuf};

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};

/// Application configuration.
#[derive(Clone, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the event source API.
    pub endpoint: String,
    /// Bearer token for the event source API. Usually supplied via the
    /// `SB_API_TOKEN` environment variable.
    pub api_token: String,
    /// Only include actions that started within the last N days.
    pub retention_days: Option<u32>,
    /// Maximum number of stacks fetched concurrently.
    pub concurrency: usize,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("endpoint", &self.endpoint)
            .field("api_token", &"[REDACTED]")
            .field("retention_days", &self.retention_days)
            .field("concurrency", &self.concurrency)
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:8080".to_string(),
            api_token: String::new(),
            retention_days: None,
            concurrency: 4,
        }
    }
}

impl Config {
    /// Loads configuration, optionally from a specific file.
    ///
    /// Layering, lowest to highest precedence: built-in defaults, the
    /// platform config-dir `config.toml`, the explicit `--config` file,
    /// `SB_`-prefixed environment variables.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(config_dir) = dirs_config_path() {
            figment = figment.merge(Toml::file(config_dir.join("config.toml")));
        }

        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        figment = figment.merge(Env::prefixed("SB_"));

        figment.extract()
    }
}

/// Returns the platform-specific config directory for stackblame.
fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("stackblame"))
}
