use super::options::ChatOptions;
use crate::application::tooling::ToolRegistry;
use crate::domain::conversation::{
    MessageRole, ModelMessage, ModelPart, ToolCall, ToolOutcome, UiMessage,
    convert_to_model_messages,
};
use crate::domain::stream::UiChunk;
use crate::infrastructure::model::{ModelEvent, ModelProvider, ModelRequest};
use async_stream::stream;
use futures::{Stream, StreamExt};
use serde_json::Value;
use std::pin::Pin;
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

pub type UiChunkStream = Pin<Box<dyn Stream<Item = UiChunk> + Send + 'static>>;

/// Drives the model and the geocoding tools for one chat request.
pub struct ChatOrchestrator<P: ModelProvider> {
    provider: Arc<P>,
    tools: Arc<ToolRegistry>,
    options: ChatOptions,
}

impl<P: ModelProvider + 'static> ChatOrchestrator<P> {
    pub fn new(provider: Arc<P>, tools: Arc<ToolRegistry>, options: ChatOptions) -> Self {
        Self {
            provider,
            tools,
            options,
        }
    }

    /// Answer `messages` as a UI message stream.
    ///
    /// The stream always opens with `start` and ends with either `finish` or
    /// `error`. Generation moves to another step only when the previous step
    /// requested tools and fewer than `max_steps` steps have run.
    pub fn stream(&self, messages: Vec<UiMessage>) -> UiChunkStream {
        let provider = Arc::clone(&self.provider);
        let tools = Arc::clone(&self.tools);
        let options = self.options.clone();

        Box::pin(stream! {
            let message_id = Uuid::new_v4().to_string();
            let mut request = ModelRequest {
                model: options.model.clone(),
                system_prompt: options.system_prompt.clone(),
                messages: convert_to_model_messages(&messages),
                tools: tools.definitions(),
            };
            info!(
                message_id = message_id.as_str(),
                messages = request.messages.len(),
                "Chat stream started"
            );
            yield UiChunk::Start { message_id };

            for step in 1..=options.max_steps {
                yield UiChunk::StartStep;
                debug!(step, model = request.model.as_str(), "Submitting step to model provider");

                let mut text_id: Option<String> = None;
                let mut text = String::new();
                let mut calls: Vec<ToolCall> = Vec::new();
                let mut failure = None;
                {
                    let mut events = provider.stream(&request);
                    while let Some(event) = events.next().await {
                        match event {
                            Ok(ModelEvent::TextDelta(delta)) => {
                                let id = match text_id.clone() {
                                    Some(id) => id,
                                    None => {
                                        let id = Uuid::new_v4().to_string();
                                        yield UiChunk::TextStart { id: id.clone() };
                                        text_id = Some(id.clone());
                                        id
                                    }
                                };
                                text.push_str(&delta);
                                yield UiChunk::TextDelta { id, delta };
                            }
                            Ok(ModelEvent::ToolCall(call)) => {
                                debug!(step, tool = call.name.as_str(), "Model requested tool");
                                calls.push(call);
                            }
                            Err(err) => {
                                failure = Some(err);
                                break;
                            }
                        }
                    }
                }
                if let Some(id) = text_id.take() {
                    yield UiChunk::TextEnd { id };
                }
                if let Some(err) = failure {
                    error!(step, error = %err, "Model provider failed");
                    yield UiChunk::Error { error_text: err.user_message() };
                    return;
                }

                let mut assistant = Vec::with_capacity(calls.len() + 1);
                if !text.is_empty() {
                    assistant.push(ModelPart::Text(text));
                }
                assistant.extend(calls.iter().cloned().map(ModelPart::ToolCall));
                if !assistant.is_empty() {
                    request
                        .messages
                        .push(ModelMessage::new(MessageRole::Assistant, assistant));
                }

                if calls.is_empty() {
                    yield UiChunk::FinishStep;
                    break;
                }

                let mut results = Vec::with_capacity(calls.len());
                for call in calls {
                    yield UiChunk::ToolInputAvailable {
                        tool_call_id: call.id.clone(),
                        tool_name: call.name.clone(),
                        input: call.arguments.clone(),
                    };

                    let mut outcome = None;
                    let mut outputs = tools.invoke(&call.name, call.arguments.clone());
                    while let Some(item) = outputs.next().await {
                        match item {
                            Ok(result) => {
                                let output = serde_json::to_value(&result).unwrap_or(Value::Null);
                                let done = result.is_final();
                                yield UiChunk::ToolOutputAvailable {
                                    tool_call_id: call.id.clone(),
                                    output: output.clone(),
                                    preliminary: (!done).then_some(true),
                                };
                                if done {
                                    outcome = Some(ToolOutcome::success(&call, output));
                                }
                            }
                            Err(err) => {
                                warn!(
                                    tool = call.name.as_str(),
                                    kind = err.kind(),
                                    error = %err,
                                    "Tool invocation failed"
                                );
                                yield UiChunk::ToolOutputError {
                                    tool_call_id: call.id.clone(),
                                    error_text: err.to_string(),
                                };
                                outcome = Some(ToolOutcome::failure(&call, err.to_string()));
                            }
                        }
                    }
                    let outcome = outcome
                        .unwrap_or_else(|| ToolOutcome::failure(&call, "tool produced no result"));
                    results.push(ModelPart::ToolResult(outcome));
                }
                request
                    .messages
                    .push(ModelMessage::new(MessageRole::Tool, results));
                yield UiChunk::FinishStep;

                if step == options.max_steps {
                    info!(max_steps = options.max_steps, "Step limit reached, ending generation");
                }
            }

            info!("Chat stream finished");
            yield UiChunk::Finish;
        })
    }
}
