//! Gemini on Vertex AI, streamed over server-sent events.

use super::auth::TokenSource;
use super::traits::ModelProvider;
use super::types::{ModelError, ModelEvent, ModelEventStream, ModelRequest};
use crate::domain::conversation::{MessageRole, ModelMessage, ModelPart, ToolCall};
use crate::domain::types::ToolDefinition;
use async_stream::try_stream;
use futures::{Stream, StreamExt};
use reqwest::Client;
use reqwest_eventsource::{Event, EventSource, retry};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

pub struct VertexClient {
    http: Client,
    base_url: String,
    project_id: String,
    region: String,
    tokens: Arc<TokenSource>,
}

impl VertexClient {
    pub fn new(project_id: impl Into<String>, region: impl Into<String>, tokens: TokenSource) -> Self {
        Self::with_client(project_id, region, tokens, Client::new())
    }

    pub fn with_client(
        project_id: impl Into<String>,
        region: impl Into<String>,
        tokens: TokenSource,
        client: Client,
    ) -> Self {
        let region = region.into();
        Self {
            http: client,
            base_url: format!("https://{region}-aiplatform.googleapis.com/v1"),
            project_id: project_id.into(),
            region,
            tokens: Arc::new(tokens),
        }
    }

    /// Point the client at another Vertex-compatible endpoint.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn endpoint(&self, model: &str) -> String {
        format!(
            "{}/projects/{}/locations/{}/publishers/google/models/{}:streamGenerateContent?alt=sse",
            self.base_url.trim_end_matches('/'),
            self.project_id,
            self.region,
            model
        )
    }

    fn events<'a>(
        &'a self,
        request: &'a ModelRequest,
    ) -> impl Stream<Item = Result<ModelEvent, ModelError>> + Send + 'a {
        try_stream! {
            let token = self.tokens.access_token().await?;
            let url = self.endpoint(&request.model);
            let body = GenerateContentRequest::from(request);
            info!(
                model = request.model.as_str(),
                messages = request.messages.len(),
                tools = request.tools.len(),
                "Sending request to model provider"
            );

            let builder = self.http.post(url).bearer_auth(token).json(&body);
            let mut source = EventSource::new(builder)
                .map_err(|err| ModelError::Stream(err.to_string()))?;
            source.set_retry_policy(Box::new(retry::Never));

            while let Some(event) = source.next().await {
                match event {
                    Ok(Event::Open) => debug!("Model stream opened"),
                    Ok(Event::Message(message)) => {
                        for event in decode_chunk(&message.data)? {
                            yield event;
                        }
                    }
                    Err(reqwest_eventsource::Error::StreamEnded) => break,
                    Err(err) => {
                        source.close();
                        let error = stream_error(err).await;
                        warn!(error = %error, "Model stream failed");
                        Err::<(), _>(error)?;
                    }
                }
            }
            source.close();
            debug!("Model stream finished");
        }
    }
}

impl ModelProvider for VertexClient {
    fn stream<'a>(&'a self, request: &'a ModelRequest) -> ModelEventStream<'a> {
        Box::pin(self.events(request))
    }
}

async fn stream_error(err: reqwest_eventsource::Error) -> ModelError {
    match err {
        reqwest_eventsource::Error::InvalidStatusCode(status, response) => {
            let body = response.text().await.unwrap_or_default();
            ModelError::Api { status, body }
        }
        reqwest_eventsource::Error::Transport(err) => ModelError::Network(err),
        other => ModelError::Stream(other.to_string()),
    }
}

/// Turn one SSE `data:` payload into model events.
fn decode_chunk(data: &str) -> Result<Vec<ModelEvent>, ModelError> {
    let chunk: GenerateContentResponse = serde_json::from_str(data)
        .map_err(|err| ModelError::InvalidResponse(format!("stream chunk: {err}")))?;
    let mut events = Vec::new();
    let parts = chunk
        .candidates
        .into_iter()
        .next()
        .and_then(|candidate| candidate.content)
        .map(|content| content.parts)
        .unwrap_or_default();
    for part in parts {
        if let Some(text) = part.text.filter(|text| !text.is_empty()) {
            events.push(ModelEvent::TextDelta(text));
        }
        if let Some(call) = part.function_call {
            events.push(ModelEvent::ToolCall(ToolCall {
                id: Uuid::new_v4().to_string(),
                name: call.name,
                arguments: call.args,
            }));
        }
    }
    Ok(events)
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<Tools>,
}

impl From<&ModelRequest> for GenerateContentRequest {
    fn from(request: &ModelRequest) -> Self {
        let mut system = request.system_prompt.iter().cloned().collect::<Vec<_>>();
        let mut contents = Vec::with_capacity(request.messages.len());
        for message in &request.messages {
            if message.role == MessageRole::System {
                system.extend(message.parts.iter().filter_map(|part| match part {
                    ModelPart::Text(text) => Some(text.clone()),
                    _ => None,
                }));
                continue;
            }
            contents.push(Content::from(message));
        }

        let system_instruction = (!system.is_empty()).then(|| Content {
            role: None,
            parts: vec![Part::text(system.join("\n\n"))],
        });
        let tools = if request.tools.is_empty() {
            Vec::new()
        } else {
            vec![Tools {
                function_declarations: request.tools.iter().map(FunctionDeclaration::from).collect(),
            }]
        };
        Self {
            contents,
            system_instruction,
            tools,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

impl From<&ModelMessage> for Content {
    fn from(message: &ModelMessage) -> Self {
        let role = match message.role {
            MessageRole::Assistant => "model",
            MessageRole::System | MessageRole::User | MessageRole::Tool => "user",
        };
        let parts = message
            .parts
            .iter()
            .map(|part| match part {
                ModelPart::Text(text) => Part::text(text.clone()),
                ModelPart::ToolCall(call) => Part {
                    function_call: Some(FunctionCall {
                        name: call.name.clone(),
                        args: call.arguments.clone(),
                    }),
                    ..Part::default()
                },
                ModelPart::ToolResult(outcome) => Part {
                    function_response: Some(FunctionResponse {
                        name: outcome.name.clone(),
                        response: as_struct(&outcome.output),
                    }),
                    ..Part::default()
                },
            })
            .collect();
        Self {
            role: Some(role.to_string()),
            parts,
        }
    }
}

/// Function responses must be JSON objects.
fn as_struct(value: &Value) -> Value {
    match value {
        Value::Object(_) => value.clone(),
        other => json!({ "output": other }),
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    function_call: Option<FunctionCall>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    function_response: Option<FunctionResponse>,
}

impl Part {
    fn text(text: String) -> Self {
        Self {
            text: Some(text),
            ..Self::default()
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct FunctionCall {
    name: String,
    #[serde(default)]
    args: Value,
}

#[derive(Debug, Serialize, Deserialize)]
struct FunctionResponse {
    name: String,
    response: Value,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Tools {
    function_declarations: Vec<FunctionDeclaration>,
}

#[derive(Debug, Serialize)]
struct FunctionDeclaration {
    name: String,
    description: String,
    parameters: Value,
}

impl From<&ToolDefinition> for FunctionDeclaration {
    fn from(definition: &ToolDefinition) -> Self {
        Self {
            name: definition.name.clone(),
            description: definition.description.clone(),
            parameters: definition.parameters.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::conversation::ToolOutcome;
    use axum::Router;
    use axum::body::Bytes;
    use axum::extract::State;
    use axum::http::{HeaderMap, StatusCode, header};
    use axum::response::IntoResponse;
    use tokio::net::TcpListener;
    use tokio::sync::Mutex;

    fn request() -> ModelRequest {
        let call = ToolCall {
            id: "call-1".into(),
            name: "addressToCoord".into(),
            arguments: json!({"address": "Googleplex"}),
        };
        ModelRequest {
            model: "gemini-2.0-flash-lite-001".into(),
            system_prompt: Some("Answer briefly.".into()),
            messages: vec![
                ModelMessage::text(MessageRole::User, "Where is the Googleplex?"),
                ModelMessage::new(MessageRole::Assistant, vec![ModelPart::ToolCall(call.clone())]),
                ModelMessage::new(
                    MessageRole::Tool,
                    vec![ModelPart::ToolResult(ToolOutcome::failure(&call, "quota exceeded"))],
                ),
            ],
            tools: vec![ToolDefinition::new(
                "addressToCoord",
                "Converts an address into geographic coordinates",
                json!({"type": "object"}),
            )],
        }
    }

    #[test]
    fn endpoint_targets_regional_stream_method() {
        let client = VertexClient::new("demo-project", "us-central1", TokenSource::fixed("t"));
        assert_eq!(
            client.endpoint("gemini-2.0-flash-lite-001"),
            "https://us-central1-aiplatform.googleapis.com/v1/projects/demo-project/locations/us-central1/publishers/google/models/gemini-2.0-flash-lite-001:streamGenerateContent?alt=sse"
        );
    }

    #[test]
    fn request_maps_roles_and_tool_results() {
        let body = serde_json::to_value(GenerateContentRequest::from(&request())).expect("serialize");
        assert_eq!(
            body["systemInstruction"],
            json!({"parts": [{"text": "Answer briefly."}]})
        );
        let roles: Vec<_> = body["contents"]
            .as_array()
            .expect("contents")
            .iter()
            .map(|c| c["role"].as_str().unwrap_or_default().to_string())
            .collect();
        assert_eq!(roles, ["user", "model", "user"]);
        assert_eq!(
            body["contents"][1]["parts"][0]["functionCall"],
            json!({"name": "addressToCoord", "args": {"address": "Googleplex"}})
        );
        assert_eq!(
            body["contents"][2]["parts"][0]["functionResponse"],
            json!({"name": "addressToCoord", "response": {"error": "quota exceeded"}})
        );
        assert_eq!(
            body["tools"][0]["functionDeclarations"][0]["name"],
            "addressToCoord"
        );
    }

    #[test]
    fn system_messages_move_into_system_instruction() {
        let mut request = request();
        request.system_prompt = None;
        request
            .messages
            .insert(0, ModelMessage::text(MessageRole::System, "Be precise."));
        let body = GenerateContentRequest::from(&request);
        assert_eq!(body.contents.len(), 3);
        let instruction = body.system_instruction.expect("system instruction");
        assert_eq!(instruction.parts[0].text.as_deref(), Some("Be precise."));
    }

    #[test]
    fn decodes_text_and_function_calls() {
        let data = r#"{"candidates":[{"content":{"role":"model","parts":[
            {"text":"Looking that up."},
            {"functionCall":{"name":"coordToAddress","args":{"coordinates":"37.4219,-122.0840"}}}
        ]}}]}"#;
        let events = decode_chunk(data).expect("decode");
        assert_eq!(events.len(), 2);
        assert_eq!(events[0], ModelEvent::TextDelta("Looking that up.".into()));
        match &events[1] {
            ModelEvent::ToolCall(call) => {
                assert_eq!(call.name, "coordToAddress");
                assert_eq!(call.arguments["coordinates"], "37.4219,-122.0840");
                assert!(!call.id.is_empty());
            }
            other => panic!("expected tool call, got {other:?}"),
        }
    }

    #[test]
    fn chunk_without_candidates_is_empty() {
        let events = decode_chunk(r#"{"usageMetadata":{"promptTokenCount":3}}"#).expect("decode");
        assert!(events.is_empty());
    }

    #[derive(Clone)]
    struct Stub {
        status: StatusCode,
        body: &'static str,
        seen: Arc<Mutex<Vec<(HeaderMap, Value)>>>,
    }

    async fn respond(State(stub): State<Stub>, headers: HeaderMap, body: Bytes) -> impl IntoResponse {
        let payload = serde_json::from_slice(&body).unwrap_or(Value::Null);
        stub.seen.lock().await.push((headers, payload));
        (
            stub.status,
            [(header::CONTENT_TYPE, "text/event-stream")],
            stub.body,
        )
    }

    async fn spawn_stub(status: StatusCode, body: &'static str) -> (String, Stub) {
        let stub = Stub {
            status,
            body,
            seen: Arc::new(Mutex::new(Vec::new())),
        };
        let app = Router::new().fallback(respond).with_state(stub.clone());
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind stub");
        let addr = listener.local_addr().expect("stub addr");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("stub server");
        });
        (format!("http://{addr}/v1"), stub)
    }

    #[tokio::test]
    async fn streams_events_from_sse_response() {
        let body = concat!(
            "data: {\"candidates\":[{\"content\":{\"role\":\"model\",\"parts\":[{\"text\":\"Hel\"}]}}]}\n\n",
            "data: {\"candidates\":[{\"content\":{\"role\":\"model\",\"parts\":[{\"text\":\"lo\"}]}}]}\n\n",
        );
        let (base, stub) = spawn_stub(StatusCode::OK, body).await;
        let client = VertexClient::new("demo-project", "us-central1", TokenSource::fixed("vertex-token"))
            .with_base_url(base);

        let request = request();
        let events: Vec<_> = client.stream(&request).collect().await;
        let texts: Vec<_> = events
            .into_iter()
            .map(|event| match event {
                Ok(ModelEvent::TextDelta(text)) => text,
                other => panic!("unexpected event {other:?}"),
            })
            .collect();
        assert_eq!(texts, ["Hel", "lo"]);

        let seen = stub.seen.lock().await;
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].0["authorization"], "Bearer vertex-token");
        assert_eq!(seen[0].1["contents"][0]["parts"][0]["text"], "Where is the Googleplex?");
    }

    #[tokio::test]
    async fn error_status_fails_the_stream() {
        let (base, _) = spawn_stub(StatusCode::FORBIDDEN, "permission denied").await;
        let client = VertexClient::new("demo-project", "us-central1", TokenSource::fixed("t"))
            .with_base_url(base);

        let request = request();
        let events: Vec<_> = client.stream(&request).collect().await;
        assert_eq!(events.len(), 1);
        match &events[0] {
            Err(ModelError::Api { status, body }) => {
                assert_eq!(*status, StatusCode::FORBIDDEN);
                assert_eq!(body, "permission denied");
            }
            other => panic!("expected api error, got {other:?}"),
        }
    }
}
