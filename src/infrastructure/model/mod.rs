pub mod auth;
mod traits;
mod types;
pub mod vertex;

pub use auth::{ServiceAccountCredentials, TokenSource};
pub use traits::ModelProvider;
pub use types::{ModelError, ModelEvent, ModelEventStream, ModelRequest};
pub use vertex::VertexClient;
