use crate::application::orchestrator::ChatOrchestrator;
use crate::infrastructure::model::ModelProvider;
use std::sync::Arc;

pub(crate) struct ServerState<P: ModelProvider> {
    orchestrator: Arc<ChatOrchestrator<P>>,
}

impl<P: ModelProvider> ServerState<P> {
    pub(crate) fn new(orchestrator: Arc<ChatOrchestrator<P>>) -> Self {
        Self { orchestrator }
    }

    pub(crate) fn orchestrator(&self) -> Arc<ChatOrchestrator<P>> {
        Arc::clone(&self.orchestrator)
    }
}
