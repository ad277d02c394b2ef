//! Error types for the cadence CLI

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Unsupported configuration format: {0} (expected .json, .yaml or .yml)")]
    UnsupportedFormat(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),
}

impl CliError {
    /// Whether the error comes from a bad configuration file or flag.
    pub fn is_configuration(&self) -> bool {
        !matches!(self, CliError::IoError(_))
    }
}
