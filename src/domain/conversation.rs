//! Conversation shapes on both sides of the orchestrator.
//!
//! [`UiMessage`] is what the chat transport posts: messages made of typed
//! parts, where tool invocations appear as `tool-<name>` parts carrying their
//! input and (once finished) their output. [`ModelMessage`] is the shape the
//! model runtime consumes. [`convert_to_model_messages`] maps the former to
//! the latter without touching the inbound conversation.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
    Tool,
}

/// A message as posted by the chat UI.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct UiMessage {
    #[serde(default)]
    pub id: String,
    pub role: MessageRole,
    #[serde(default)]
    #[schema(value_type = Vec<Object>)]
    pub parts: Vec<UiPart>,
}

impl UiMessage {
    pub fn user_text(text: impl Into<String>) -> Self {
        Self {
            id: String::new(),
            role: MessageRole::User,
            parts: vec![UiPart::Text { text: text.into() }],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "RawPart")]
pub enum UiPart {
    Text { text: String },
    Reasoning { text: String },
    StepStart,
    Tool(UiToolPart),
    /// Part types the core does not interpret (files, sources, data parts).
    Other { kind: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct UiToolPart {
    pub tool_name: String,
    pub tool_call_id: String,
    pub state: UiToolState,
    pub input: Value,
    pub output: Option<Value>,
    pub error_text: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiToolState {
    InputStreaming,
    InputAvailable,
    OutputAvailable,
    OutputError,
}

impl UiToolState {
    fn parse(value: Option<&str>) -> Self {
        match value {
            Some("input-available") => UiToolState::InputAvailable,
            Some("output-available") => UiToolState::OutputAvailable,
            Some("output-error") => UiToolState::OutputError,
            _ => UiToolState::InputStreaming,
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPart {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    tool_call_id: Option<String>,
    #[serde(default)]
    tool_name: Option<String>,
    #[serde(default)]
    state: Option<String>,
    #[serde(default)]
    input: Option<Value>,
    #[serde(default)]
    output: Option<Value>,
    #[serde(default)]
    error_text: Option<String>,
}

impl From<RawPart> for UiPart {
    fn from(raw: RawPart) -> Self {
        let tool_name = match raw.kind.as_str() {
            "text" => {
                return UiPart::Text {
                    text: raw.text.unwrap_or_default(),
                };
            }
            "reasoning" => {
                return UiPart::Reasoning {
                    text: raw.text.unwrap_or_default(),
                };
            }
            "step-start" => return UiPart::StepStart,
            "dynamic-tool" => raw.tool_name.clone(),
            other => other.strip_prefix("tool-").map(str::to_string),
        };

        match tool_name {
            Some(tool_name) => UiPart::Tool(UiToolPart {
                tool_name,
                tool_call_id: raw.tool_call_id.unwrap_or_default(),
                state: UiToolState::parse(raw.state.as_deref()),
                input: raw.input.unwrap_or(Value::Null),
                output: raw.output,
                error_text: raw.error_text,
            }),
            None => UiPart::Other { kind: raw.kind },
        }
    }
}

/// A message in the model runtime's format.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelMessage {
    pub role: MessageRole,
    pub parts: Vec<ModelPart>,
}

impl ModelMessage {
    pub fn new(role: MessageRole, parts: Vec<ModelPart>) -> Self {
        Self { role, parts }
    }

    pub fn text(role: MessageRole, text: impl Into<String>) -> Self {
        Self::new(role, vec![ModelPart::Text(text.into())])
    }

    pub fn tool_calls(&self) -> impl Iterator<Item = &ToolCall> {
        self.parts.iter().filter_map(|part| match part {
            ModelPart::ToolCall(call) => Some(call),
            _ => None,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ModelPart {
    Text(String),
    ToolCall(ToolCall),
    ToolResult(ToolOutcome),
}

/// A tool invocation requested by the model.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolCall {
    pub id: String,
    pub name: String,
    pub arguments: Value,
}

/// What a tool call produced, as fed back to the model.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolOutcome {
    pub call_id: String,
    pub name: String,
    pub output: Value,
    pub is_error: bool,
}

impl ToolOutcome {
    pub fn success(call: &ToolCall, output: Value) -> Self {
        Self {
            call_id: call.id.clone(),
            name: call.name.clone(),
            output,
            is_error: false,
        }
    }

    pub fn failure(call: &ToolCall, message: impl Into<String>) -> Self {
        Self {
            call_id: call.id.clone(),
            name: call.name.clone(),
            output: json!({ "error": message.into() }),
            is_error: true,
        }
    }
}

/// Convert the UI conversation into model messages.
///
/// Finished tool parts become an assistant tool call followed by a tool
/// message holding the result. Tool parts that never produced an output are
/// dropped, as are parts the model cannot consume.
pub fn convert_to_model_messages(messages: &[UiMessage]) -> Vec<ModelMessage> {
    let mut converted = Vec::with_capacity(messages.len());
    for message in messages {
        match message.role {
            MessageRole::System | MessageRole::User | MessageRole::Tool => {
                let parts: Vec<ModelPart> = message
                    .parts
                    .iter()
                    .filter_map(|part| match part {
                        UiPart::Text { text } if !text.is_empty() => {
                            Some(ModelPart::Text(text.clone()))
                        }
                        _ => None,
                    })
                    .collect();
                if !parts.is_empty() {
                    let role = if message.role == MessageRole::Tool {
                        MessageRole::User
                    } else {
                        message.role
                    };
                    converted.push(ModelMessage::new(role, parts));
                }
            }
            MessageRole::Assistant => convert_assistant(&message.parts, &mut converted),
        }
    }
    converted
}

fn convert_assistant(parts: &[UiPart], out: &mut Vec<ModelMessage>) {
    let mut content = Vec::new();
    let mut results = Vec::new();

    for part in parts {
        match part {
            UiPart::StepStart => flush_block(&mut content, &mut results, out),
            UiPart::Text { text } if !text.is_empty() => {
                content.push(ModelPart::Text(text.clone()));
            }
            UiPart::Tool(tool) => {
                let call = ToolCall {
                    id: tool.tool_call_id.clone(),
                    name: tool.tool_name.clone(),
                    arguments: tool.input.clone(),
                };
                let outcome = match tool.state {
                    UiToolState::OutputAvailable => {
                        ToolOutcome::success(&call, tool.output.clone().unwrap_or(Value::Null))
                    }
                    UiToolState::OutputError => ToolOutcome::failure(
                        &call,
                        tool.error_text.clone().unwrap_or_else(|| "tool failed".into()),
                    ),
                    UiToolState::InputStreaming | UiToolState::InputAvailable => continue,
                };
                content.push(ModelPart::ToolCall(call));
                results.push(ModelPart::ToolResult(outcome));
            }
            _ => {}
        }
    }
    flush_block(&mut content, &mut results, out);
}

fn flush_block(
    content: &mut Vec<ModelPart>,
    results: &mut Vec<ModelPart>,
    out: &mut Vec<ModelMessage>,
) {
    if !content.is_empty() {
        out.push(ModelMessage::new(
            MessageRole::Assistant,
            std::mem::take(content),
        ));
    }
    if !results.is_empty() {
        out.push(ModelMessage::new(MessageRole::Tool, std::mem::take(results)));
    }
}
