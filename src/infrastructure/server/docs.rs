use super::dto::{ChatRequestBody, ErrorResponse, HealthResponse};
use super::routes;
use crate::domain::conversation::UiMessage;
use crate::domain::types::{LatLng, ToolResult, ToolState};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(routes::chat::chat_handler, routes::health::health_handler),
    components(schemas(
        ChatRequestBody,
        ErrorResponse,
        HealthResponse,
        UiMessage,
        ToolResult,
        ToolState,
        LatLng
    )),
    tags(
        (name = "chat", description = "Streamed chat with the geocoding assistant"),
        (name = "system", description = "Service health")
    )
)]
pub(super) struct ApiDoc;
