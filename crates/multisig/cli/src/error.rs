//! CLI error types

use multisig_types::MultisigError;
use thiserror::Error;

/// CLI error type
#[derive(Error, Debug)]
pub enum CliError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Multisig error: {0}")]
    Multisig(#[from] MultisigError),

    #[error("Script error: {0}")]
    Script(String),
}

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;
