use crate::config::ConfigError;
use crate::infrastructure::model::ModelError;
use std::net::SocketAddr;
use thiserror::Error;

/// Reasons the chat service fails to start or stops serving.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("cannot load model credentials: {0}")]
    Credentials(#[from] ModelError),
    #[error("failed to bind chat API on {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },
    #[error("chat API stopped: {0}")]
    Serve(#[source] std::io::Error),
}
