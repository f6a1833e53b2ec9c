use super::types::{ModelEventStream, ModelRequest};

/// A chat model that streams one step of output for a request.
pub trait ModelProvider: Send + Sync {
    fn stream<'a>(&'a self, request: &'a ModelRequest) -> ModelEventStream<'a>;
}
