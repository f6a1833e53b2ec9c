use crate::domain::conversation::{ModelMessage, ToolCall};
use crate::domain::types::ToolDefinition;
use futures::Stream;
use reqwest::StatusCode;
use std::path::PathBuf;
use std::pin::Pin;
use thiserror::Error;

#[derive(Debug, Clone)]
pub struct ModelRequest {
    pub model: String,
    pub system_prompt: Option<String>,
    pub messages: Vec<ModelMessage>,
    pub tools: Vec<ToolDefinition>,
}

/// Incremental output of one model step.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelEvent {
    TextDelta(String),
    ToolCall(ToolCall),
}

pub type ModelEventStream<'a> =
    Pin<Box<dyn Stream<Item = Result<ModelEvent, ModelError>> + Send + 'a>>;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("failed to read service account credentials from {path}: {source}")]
    CredentialsIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid service account credentials: {0}")]
    Credentials(String),
    #[error("failed to sign token assertion: {0}")]
    Signing(#[from] jsonwebtoken::errors::Error),
    #[error("token exchange failed with status {status}: {body}")]
    TokenExchange { status: StatusCode, body: String },
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("model provider returned status {status}: {body}")]
    Api { status: StatusCode, body: String },
    #[error("model stream failed: {0}")]
    Stream(String),
    #[error("model provider returned invalid response: {0}")]
    InvalidResponse(String),
}

impl ModelError {
    /// Text safe to show to the person chatting.
    pub fn user_message(&self) -> String {
        match self {
            ModelError::CredentialsIo { .. }
            | ModelError::Credentials(_)
            | ModelError::Signing(_)
            | ModelError::TokenExchange { .. } => {
                "The assistant could not authenticate with the AI service. Check the service account configuration."
                    .to_string()
            }
            ModelError::Network(err) => {
                if err.is_connect() {
                    "Could not connect to the AI service. Try again shortly.".to_string()
                } else if err.is_timeout() {
                    "The request to the AI service timed out. Try again shortly.".to_string()
                } else {
                    "A network error occurred while contacting the AI service.".to_string()
                }
            }
            ModelError::Api { status, .. } => match *status {
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                    "The AI service rejected the credentials (check project and region).".to_string()
                }
                StatusCode::NOT_FOUND => {
                    "The configured model was not found in this project or region.".to_string()
                }
                StatusCode::TOO_MANY_REQUESTS => {
                    "The AI service is rate limiting requests. Try again later.".to_string()
                }
                status => format!(
                    "The AI service failed with status {}. Try again later.",
                    status.as_u16()
                ),
            },
            ModelError::Stream(_) | ModelError::InvalidResponse(_) => {
                "The AI service returned a response that could not be processed.".to_string()
            }
        }
    }
}
