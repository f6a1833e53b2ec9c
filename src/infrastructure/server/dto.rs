use crate::domain::conversation::UiMessage;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Body posted by the chat transport.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ChatRequestBody {
    pub messages: Vec<UiMessage>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
}
