use super::super::dto::{ChatRequestBody, ErrorResponse};
use super::super::state::ServerState;
use crate::domain::stream::UiChunk;
use crate::infrastructure::model::ModelProvider;
use axum::Json;
use axum::extract::State;
use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{IntoResponse, Response};
use futures::{StreamExt, stream};
use std::convert::Infallible;
use std::sync::Arc;
use tracing::{error, info};

/// Marks the body as a UI message stream for the chat transport.
pub const UI_STREAM_HEADER: &str = "x-vercel-ai-ui-message-stream";
pub const UI_STREAM_VERSION: &str = "v1";
const DONE_MARKER: &str = "[DONE]";

fn chunk_event(chunk: &UiChunk) -> Event {
    Event::default().json_data(chunk).unwrap_or_else(|err| {
        error!(%err, "Failed to encode stream chunk");
        Event::default().data(r#"{"type":"error","errorText":"failed to encode stream chunk"}"#)
    })
}

#[utoipa::path(
    post,
    path = "/api/chat",
    tag = "chat",
    request_body = ChatRequestBody,
    responses(
        (status = 200, description = "UI message stream of the assistant reply", content_type = "text/event-stream", body = String),
        (status = 400, description = "Conversation is empty", body = ErrorResponse),
        (status = 422, description = "Body is not a valid conversation")
    )
)]
pub async fn chat_handler<P: ModelProvider + 'static>(
    State(state): State<Arc<ServerState<P>>>,
    Json(payload): Json<ChatRequestBody>,
) -> Result<Response, (StatusCode, Json<ErrorResponse>)> {
    info!(messages = payload.messages.len(), "Received /api/chat request");

    if payload.messages.is_empty() {
        error!("Rejecting /api/chat request without messages");
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "messages cannot be empty".to_string(),
            }),
        ));
    }

    let chunks = state.orchestrator().stream(payload.messages);
    let events = chunks
        .map(|chunk| Ok::<_, Infallible>(chunk_event(&chunk)))
        .chain(stream::once(async {
            Ok(Event::default().data(DONE_MARKER))
        }));

    let headers = [(
        HeaderName::from_static(UI_STREAM_HEADER),
        HeaderValue::from_static(UI_STREAM_VERSION),
    )];
    Ok((headers, Sse::new(events).keep_alive(KeepAlive::default())).into_response())
}
