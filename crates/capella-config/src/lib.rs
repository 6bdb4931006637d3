//! Capella configuration
//!
//! Settings come from one YAML file plus environment overrides:
//!
//! ```yaml
//! host: https://cloudapi.cloud.couchbase.com
//! auth_token: <token>
//! request_timeout_secs: 60
//! retry:
//!   rate_limit_backoff_secs: 2
//!   gateway_timeout_backoff_secs: 2
//!   max_gateway_timeout_retries: 5
//! wait:
//!   timeout_secs: 3600
//!   poll_interval_secs: 3
//!   initial_delay_secs: 0
//! ```

pub mod error;

pub use error::*;

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const CONFIG_PATH_ENV: &str = "CAPELLA_CONFIG_PATH";
pub const HOST_ENV: &str = "CAPELLA_HOST";
pub const AUTH_TOKEN_ENV: &str = "CAPELLA_AUTH_TOKEN";

const LOCAL_CANDIDATES: [&str; 2] = ["capella.local.yaml", "capella.yaml"];

/// Retry tuning for the control-plane client
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RetrySettings {
    pub rate_limit_backoff_secs: u64,
    pub gateway_timeout_backoff_secs: u64,
    pub max_gateway_timeout_retries: u32,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            rate_limit_backoff_secs: 2,
            gateway_timeout_backoff_secs: 2,
            max_gateway_timeout_retries: 5,
        }
    }
}

/// Defaults for `capella wait`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct WaitSettings {
    pub timeout_secs: u64,
    pub poll_interval_secs: u64,
    /// Grace period before the first poll
    pub initial_delay_secs: u64,
}

impl Default for WaitSettings {
    fn default() -> Self {
        Self {
            timeout_secs: 3600,
            poll_interval_secs: 3,
            initial_delay_secs: 0,
        }
    }
}

impl WaitSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn initial_delay(&self) -> Duration {
        Duration::from_secs(self.initial_delay_secs)
    }
}

/// Contents of a config file; everything is optional
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ConfigFile {
    pub host: Option<String>,
    pub auth_token: Option<String>,
    pub request_timeout_secs: Option<u64>,
    pub retry: RetrySettings,
    pub wait: WaitSettings,
}

impl ConfigFile {
    pub fn parse(path: &Path, contents: &str) -> Result<Self> {
        // an empty file deserializes as null
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(contents).map_err(|source| ConfigError::Yaml {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn read(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(path, &contents)
    }
}

/// Fully resolved settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapellaConfig {
    /// Control-plane base URL, without trailing slash
    pub host: String,
    pub auth_token: String,
    pub request_timeout: Duration,
    pub retry: RetrySettings,
    pub wait: WaitSettings,
    /// File the settings were read from, if any
    pub source: Option<PathBuf>,
}

impl CapellaConfig {
    /// Merge a file with environment overrides and validate the result
    ///
    /// `host` and `auth_token` from the environment win over the file.
    pub fn resolve(
        file: ConfigFile,
        source: Option<PathBuf>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        let non_empty = |v: Option<String>| v.filter(|s| !s.trim().is_empty());

        let host = non_empty(env(HOST_ENV))
            .or(non_empty(file.host))
            .ok_or(ConfigError::MissingHost)?;
        let auth_token = non_empty(env(AUTH_TOKEN_ENV))
            .or(non_empty(file.auth_token))
            .ok_or(ConfigError::MissingToken)?;

        let host = host.trim().trim_end_matches('/').to_string();
        if !host.starts_with("http://") && !host.starts_with("https://") {
            return Err(invalid("host", format!("'{}' is not an http(s) URL", host)));
        }

        let request_timeout_secs = file.request_timeout_secs.unwrap_or(60);
        if request_timeout_secs == 0 {
            return Err(invalid("request_timeout_secs", "must be greater than zero"));
        }
        if file.wait.poll_interval_secs == 0 {
            return Err(invalid("wait.poll_interval_secs", "must be greater than zero"));
        }
        if file.wait.poll_interval_secs >= file.wait.timeout_secs {
            return Err(invalid(
                "wait.poll_interval_secs",
                format!(
                    "must be shorter than wait.timeout_secs ({})",
                    file.wait.timeout_secs
                ),
            ));
        }

        Ok(Self {
            host,
            auth_token: auth_token.trim().to_string(),
            request_timeout: Duration::from_secs(request_timeout_secs),
            retry: file.retry,
            wait: file.wait,
            source,
        })
    }
}

fn invalid(field: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::InvalidValue {
        field: field.to_string(),
        reason: reason.into(),
    }
}

/// Capella's directory under the user config dir
pub fn get_config_dir() -> Result<PathBuf> {
    Ok(dirs::config_dir()
        .ok_or(ConfigError::ConfigDirNotFound)?
        .join("capella"))
}

/// Find the config file to use
///
/// Search order:
/// 1. `CAPELLA_CONFIG_PATH`
/// 2. current directory: `capella.local.yaml`, `capella.yaml`
/// 3. `~/.config/capella/config.yaml`
///
/// Returns `None` when no file exists; settings may still come from the
/// environment.
pub fn find_config_file() -> Result<Option<PathBuf>> {
    if let Ok(config_path) = std::env::var(CONFIG_PATH_ENV) {
        let path = PathBuf::from(config_path);
        if path.exists() {
            return Ok(Some(path));
        }
    }

    let current_dir = std::env::current_dir()?;
    for filename in &LOCAL_CANDIDATES {
        let path = current_dir.join(filename);
        if path.exists() {
            return Ok(Some(path));
        }
    }

    if let Ok(config_dir) = get_config_dir() {
        let global_config = config_dir.join("config.yaml");
        if global_config.exists() {
            return Ok(Some(global_config));
        }
    }

    Ok(None)
}

/// Discover, read and resolve the configuration
pub fn load() -> Result<CapellaConfig> {
    let source = find_config_file()?;
    let file = match &source {
        Some(path) => ConfigFile::read(path)?,
        None => ConfigFile::default(),
    };
    CapellaConfig::resolve(file, source, |key| std::env::var(key).ok())
}
