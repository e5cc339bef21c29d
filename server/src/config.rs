//! Server configuration.
//!
//! Loaded with precedence: CLI flags > `PALI_*` env vars > TOML file > defaults
//!
//! # Example config file (pali-reader.toml)
//! ```toml
//! listen = "0.0.0.0:3000"
//! data_dir = "/var/lib/pali-reader"
//! static_dir = "frontend/dist"
//! log_filter = "pali_reader=debug,tower_http=info"
//! ```

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::net::{Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const DEFAULT_CONFIG_FILE: &str = "pali-reader.toml";
pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_DATA_DIR: &str = "data";
pub const DEFAULT_LOG_FILTER: &str = "info";
pub const ENV_PREFIX: &str = "PALI_";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Address the HTTP server binds to
    pub listen: SocketAddr,
    /// Directory holding `texts.json` and the `dictionary/` shards
    pub data_dir: PathBuf,
    /// Pre-built front-end served for paths outside `/api`
    pub static_dir: Option<PathBuf>,
    /// `tracing` filter used when `RUST_LOG` is unset
    pub log_filter: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            listen: SocketAddr::from((Ipv4Addr::LOCALHOST, DEFAULT_PORT)),
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            static_dir: None,
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

/// Values given on the command line.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub listen: Option<SocketAddr>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
}

#[derive(Debug, Error)]
#[error("configuration error: {0}")]
pub struct ConfigError(#[from] figment::Error);

impl AppConfig {
    /// `config_path` defaults to `pali-reader.toml`; a missing file is skipped.
    pub fn load(
        config_path: Option<&Path>,
        overrides: ConfigOverrides,
    ) -> Result<Self, ConfigError> {
        let path = config_path.unwrap_or_else(|| Path::new(DEFAULT_CONFIG_FILE));
        let config = Figment::new()
            .merge(Serialized::defaults(AppConfig::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed(ENV_PREFIX))
            .merge(Serialized::defaults(overrides))
            .extract()?;
        Ok(config)
    }
}
