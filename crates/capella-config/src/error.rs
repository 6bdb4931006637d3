use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config directory not found")]
    ConfigDirNotFound,

    #[error(
        "No control-plane host configured. Set `host` in one of:\n\
        - the file named by CAPELLA_CONFIG_PATH\n\
        - ./capella.local.yaml or ./capella.yaml\n\
        - ~/.config/capella/config.yaml\n\
        or export CAPELLA_HOST"
    )]
    MissingHost,

    #[error("No auth token configured. Set `auth_token` in the config file or export CAPELLA_AUTH_TOKEN")]
    MissingToken,

    #[error("Invalid value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("Failed to parse {path}: {source}")]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ConfigError>;
