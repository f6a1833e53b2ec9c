use std::net::AddrParseError;
use thiserror::Error;

/// Errors that can occur when building configuration from the environment
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variables: {}", .names.join(", "))]
    MissingVariables { names: Vec<String> },

    #[error("invalid bind address '{value}': {source}")]
    InvalidBindAddr {
        value: String,
        #[source]
        source: AddrParseError,
    },
}
