// Geocoding tool tests - tools driving the real HTTP client
//
// A local stub stands in for the geocoding service so the full path from
// tool arguments to provider request to streamed result is covered.

use axum::extract::State;
use axum::http::{HeaderMap, Uri};
use axum::{Json, Router};
use futures::StreamExt;
use geocode_chat::geocode::{GeocodeClient, GeocodeError, UpstreamError};
use geocode_chat::tooling::{ADDRESS_TO_COORD, COORD_TO_ADDRESS, ToolError, ToolRegistry};
use geocode_chat::types::{LatLng, ToolResult, ToolState};
use serde_json::{Value, json};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::Mutex;

// ============================================================================
// Stub geocoding service
// ============================================================================

#[derive(Clone)]
struct Stub {
    body: Value,
    seen: Arc<Mutex<Vec<(String, HeaderMap)>>>,
}

async fn respond(State(stub): State<Stub>, uri: Uri, headers: HeaderMap) -> Json<Value> {
    stub.seen.lock().await.push((uri.to_string(), headers));
    Json(stub.body.clone())
}

async fn spawn_geocoder(body: Value) -> (String, Arc<Mutex<Vec<(String, HeaderMap)>>>) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let stub = Stub {
        body,
        seen: Arc::clone(&seen),
    };
    let app = Router::new().fallback(respond).with_state(stub);
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind stub");
    let addr = listener.local_addr().expect("stub addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("stub server");
    });
    (format!("http://{addr}/v4beta"), seen)
}

async fn invoke(
    base_url: &str,
    token: Option<&str>,
    tool: &str,
    args: Value,
) -> Vec<Result<ToolResult, ToolError>> {
    let client = GeocodeClient::new(base_url, token.map(str::to_string), "demo-project");
    let registry = ToolRegistry::geocoding(Arc::new(client));
    registry.invoke(tool, args).collect().await
}

// ============================================================================
// Forward geocoding
// ============================================================================

#[tokio::test]
async fn address_to_coord_reports_first_candidate() {
    let (base, seen) = spawn_geocoder(json!({"results": [
        {"formattedAddress": "Google Building 40", "location": {"latitude": 37.4220, "longitude": -122.0841}},
        {"formattedAddress": "Somewhere else", "location": {"latitude": 1.0, "longitude": 2.0}}
    ]}))
    .await;

    let items = invoke(
        &base,
        Some("maps-token"),
        ADDRESS_TO_COORD,
        json!({"address": "1600 Amphitheatre Parkway"}),
    )
    .await;

    assert_eq!(items.len(), 2);
    let started = items[0].as_ref().expect("started");
    assert_eq!(started, &ToolResult::started("maps-token"));
    let completed = items[1].as_ref().expect("completed");
    assert_eq!(completed.state, ToolState::Completed);
    assert_eq!(completed.location, Some(LatLng::new(37.4220, -122.0841)));

    let seen = seen.lock().await;
    assert_eq!(seen.len(), 1);
    assert_eq!(
        seen[0].0,
        "/v4beta/geocode/address/1600%20Amphitheatre%20Parkway?languageCode=en"
    );
    assert_eq!(seen[0].1["x-goog-user-project"], "demo-project");
}

#[tokio::test]
async fn address_to_coord_completes_without_candidates() {
    let (base, seen) = spawn_geocoder(json!({"results": []})).await;

    let items = invoke(
        &base,
        Some("maps-token"),
        ADDRESS_TO_COORD,
        json!({"address": "Nowhere in particular"}),
    )
    .await;

    assert_eq!(items.len(), 2);
    let completed = items[1].as_ref().expect("completed");
    assert_eq!(completed.state, ToolState::Completed);
    assert_eq!(completed.location, None);
    assert_eq!(seen.lock().await.len(), 1);
}

#[tokio::test]
async fn empty_address_fails_after_started_without_request() {
    let (base, seen) = spawn_geocoder(json!({"results": []})).await;

    let items = invoke(&base, Some("maps-token"), ADDRESS_TO_COORD, json!({"address": ""})).await;

    assert_eq!(items.len(), 2);
    assert_eq!(items[0].as_ref().expect("started"), &ToolResult::started("maps-token"));
    assert!(matches!(
        items[1],
        Err(ToolError::Geocode(GeocodeError::Validation { field: "address" }))
    ));
    assert!(seen.lock().await.is_empty());
}

#[tokio::test]
async fn missing_token_fails_both_tools_before_any_request() {
    let (base, seen) = spawn_geocoder(json!({"results": []})).await;

    for (tool, args) in [
        (ADDRESS_TO_COORD, json!({"address": "x"})),
        (COORD_TO_ADDRESS, json!({"coordinates": "1,2"})),
    ] {
        let items = invoke(&base, None, tool, args).await;
        assert_eq!(items.len(), 1, "{tool} yields only the error");
        assert!(matches!(
            items[0],
            Err(ToolError::Geocode(GeocodeError::Configuration))
        ));
    }
    assert!(seen.lock().await.is_empty());
}

// ============================================================================
// Reverse geocoding
// ============================================================================

#[tokio::test]
async fn coord_to_address_picks_last_precise_candidate() {
    let (base, seen) = spawn_geocoder(json!({"results": [
        {"formattedAddress": "Mountain View, CA, USA", "types": ["locality", "political"]},
        {"formattedAddress": "Googleplex", "types": ["point_of_interest", "establishment"]},
        {"formattedAddress": "Shoreline Lake", "types": ["natural_feature"]}
    ]}))
    .await;

    let items = invoke(
        &base,
        Some("maps-token"),
        COORD_TO_ADDRESS,
        json!({"coordinates": "37.4219,-122.0840"}),
    )
    .await;

    assert_eq!(items.len(), 2);
    let completed = items[1].as_ref().expect("completed");
    assert_eq!(completed.formatted_address.as_deref(), Some("Shoreline Lake"));
    assert_eq!(
        seen.lock().await[0].0,
        "/v4beta/geocode/location/37.4219,-122.0840?languageCode=en"
    );
}

#[tokio::test]
async fn provider_error_message_ends_the_tool_stream() {
    let (base, _) = spawn_geocoder(json!({"errorMessage": "The provided API key is invalid."})).await;

    let items = invoke(
        &base,
        Some("maps-token"),
        COORD_TO_ADDRESS,
        json!({"coordinates": "37.4219,-122.0840"}),
    )
    .await;

    assert_eq!(items.len(), 2);
    assert!(items[0].is_ok());
    match &items[1] {
        Err(ToolError::Geocode(GeocodeError::Upstream(UpstreamError::Provider(message)))) => {
            assert_eq!(message, "The provided API key is invalid.");
        }
        other => panic!("expected provider error, got {other:?}"),
    }
}
