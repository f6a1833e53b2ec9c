mod docs;
mod dto;
mod error;
mod router;
mod routes;
mod state;

pub use dto::{ChatRequestBody, ErrorResponse, HealthResponse};
pub use error::ServerError;
pub use routes::chat::{UI_STREAM_HEADER, UI_STREAM_VERSION};

use crate::application::orchestrator::ChatOrchestrator;
use crate::infrastructure::model::ModelProvider;
use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;

/// The HTTP surface without binding a listener.
pub fn router<P>(orchestrator: Arc<ChatOrchestrator<P>>, cors_origins: &[String]) -> Router
where
    P: ModelProvider + 'static,
{
    router::build(orchestrator, cors_origins)
}

pub async fn serve<P>(
    orchestrator: Arc<ChatOrchestrator<P>>,
    addr: SocketAddr,
    cors_origins: &[String],
) -> Result<(), ServerError>
where
    P: ModelProvider + 'static,
{
    router::serve(orchestrator, addr, cors_origins).await
}
