//! Settings for the impt CLI itself
//!
//! These are tool settings, not credentials: the default endpoint, HTTP
//! timeouts and output preferences. Credentials live in auth files (see
//! [`crate::auth`]).

use crate::error::{CliError, Result};
use etcetera::{choose_base_strategy, BaseStrategy};
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use impt_common::{DEFAULT_ENDPOINT, DEFAULT_TIMEOUT_SECS, ENV_SETTINGS_PREFIX, TOOL_NAME};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;

/// CLI configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct CliConfig {
    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub auth: AuthSettings,

    #[serde(default)]
    pub output: OutputConfig,
}

/// API configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApiConfig {
    /// Endpoint used when neither the account nor the command names one
    pub endpoint: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout_secs: default_timeout(),
        }
    }
}

fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

/// Access token handling
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuthSettings {
    /// Refresh tokens this many seconds before expiry
    #[serde(default = "default_token_refresh_margin")]
    pub token_refresh_margin_secs: u64,
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            token_refresh_margin_secs: default_token_refresh_margin(),
        }
    }
}

fn default_token_refresh_margin() -> u64 {
    60
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct OutputConfig {
    /// Print JSON instead of tables
    #[serde(default)]
    pub json: bool,
}

impl CliConfig {
    /// Load settings: defaults, then the TOML file, then `IMPT_CLI_*` variables.
    ///
    /// A missing file is not an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::default_path()?,
        };
        debug!("Loading settings from {}", path.display());

        let config = Figment::from(Serialized::defaults(Self::default()))
            .merge(Toml::file(&path))
            .merge(Env::prefixed(ENV_SETTINGS_PREFIX).split("__"))
            .extract()?;
        Ok(config)
    }

    /// Get configuration directory
    pub fn config_dir() -> Result<PathBuf> {
        let strategy = choose_base_strategy().map_err(|e| {
            CliError::internal(format!("Failed to determine base directories: {e}"))
        })?;
        Ok(strategy.config_dir().join(TOOL_NAME))
    }

    /// Default settings file
    pub fn default_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Get all configuration as key-value pairs
    pub fn to_map(&self) -> BTreeMap<String, String> {
        let mut map = BTreeMap::new();
        map.insert("api.endpoint".to_string(), self.api.endpoint.clone());
        map.insert(
            "api.timeout_secs".to_string(),
            self.api.timeout_secs.to_string(),
        );
        map.insert(
            "auth.token_refresh_margin_secs".to_string(),
            self.auth.token_refresh_margin_secs.to_string(),
        );
        map.insert("output.json".to_string(), self.output.json.to_string());
        map
    }
}
