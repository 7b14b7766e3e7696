//! Error types for dashpub-core.

use std::path::PathBuf;

use thiserror::Error;

/// All errors that can arise while locating and loading the publisher config.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read (permission denied, is a directory, ...).
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// YAML parse error on load: includes file path and line context from serde_yaml.
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// YAML serialization error (write path).
    #[error("YAML serialization error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// The config file did not exist at the expected path.
    #[error("config file not found at {path}")]
    NotFound { path: PathBuf },
}
