//! Errors for the fallible entry points (config loading).

use thiserror::Error;

use crate::config::ConfigError;

#[derive(Debug, Error)]
pub enum OpsError {
    #[error("failed to parse ops config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid ops config: {}", join_errors(.0))]
    InvalidConfig(Vec<ConfigError>),
}

fn join_errors(errors: &[ConfigError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
