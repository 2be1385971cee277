//! Runtime configuration from the environment.

use crate::source::DEFAULT_URL;

/// Listen address variable.
pub const ADDR_VAR: &str = "DAEMON_MCP_ADDR";
/// Upstream document URL variable.
pub const SOURCE_URL_VAR: &str = "DAEMON_MCP_SOURCE_URL";
pub const DEFAULT_ADDR: &str = "127.0.0.1:8787";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} is set but empty")]
    Empty { var: &'static str },
    #[error("{var} must be an http:// or https:// URL, got {value:?}")]
    UnsupportedUrl { var: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Address the HTTP listener binds.
    pub listen_addr: String,
    /// Where the daemon document is fetched from on every request.
    pub source_url: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            listen_addr: DEFAULT_ADDR.to_string(),
            source_url: DEFAULT_URL.to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Builds a config from `lookup`, which maps a variable name to its value.
    ///
    /// Unset variables fall back to the defaults.
    pub fn from_lookup<F: Fn(&str) -> Option<String>>(lookup: F) -> Result<Self, ConfigError> {
        let mut config = Config::default();
        if let Some(addr) = read(&lookup, ADDR_VAR)? {
            config.listen_addr = addr;
        }
        if let Some(url) = read(&lookup, SOURCE_URL_VAR)? {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(ConfigError::UnsupportedUrl {
                    var: SOURCE_URL_VAR,
                    value: url,
                });
            }
            config.source_url = url;
        }
        Ok(config)
    }
}

fn read<F: Fn(&str) -> Option<String>>(
    lookup: &F,
    var: &'static str,
) -> Result<Option<String>, ConfigError> {
    match lookup(var) {
        Some(value) if value.trim().is_empty() => Err(ConfigError::Empty { var }),
        Some(value) => Ok(Some(value.trim().to_string())),
        None => Ok(None),
    }
}
