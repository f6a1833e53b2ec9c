//! Google Maps Geocoding API (v4beta) client

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde_json::Value;
use tracing::{debug, info, warn};

use super::Geocoder;
use super::error::{GeocodeError, UpstreamError};
use crate::config::AppConfig;
use crate::constants::{GEOCODE_LANGUAGE, PROJECT_HEADER};
use crate::domain::types::{GeocodeCandidate, LatLng};

#[derive(Clone)]
pub struct GeocodeClient {
    http: Client,
    base_url: String,
    access_token: Option<String>,
    project_id: String,
}

impl GeocodeClient {
    pub fn new(
        base_url: impl Into<String>,
        access_token: Option<String>,
        project_id: impl Into<String>,
    ) -> Self {
        Self::with_client(base_url, access_token, project_id, Client::new())
    }

    pub fn with_client(
        base_url: impl Into<String>,
        access_token: Option<String>,
        project_id: impl Into<String>,
        client: Client,
    ) -> Self {
        Self {
            http: client,
            base_url: base_url.into(),
            access_token: access_token.filter(|token| !token.trim().is_empty()),
            project_id: project_id.into(),
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            config.geocode_base_url.clone(),
            Some(config.maps_access_token.clone()),
            config.project_id.clone(),
        )
    }

    /// `{base}/geocode/{kind}/{query}?languageCode=en`, with `query` encoded
    /// as a single path segment.
    fn endpoint(&self, kind: &str, query: &str) -> Result<Url, UpstreamError> {
        let mut url = Url::parse(&self.base_url).map_err(|err| {
            UpstreamError::Provider(format!("invalid geocoding endpoint {}: {err}", self.base_url))
        })?;
        url.path_segments_mut()
            .map_err(|_| {
                UpstreamError::Provider(format!(
                    "geocoding endpoint {} cannot carry a path",
                    self.base_url
                ))
            })?
            .pop_if_empty()
            .extend(["geocode", kind])
            .push(query);
        url.query_pairs_mut()
            .append_pair("languageCode", GEOCODE_LANGUAGE);
        Ok(url)
    }

    async fn fetch(&self, kind: &str, query: &str) -> Result<Vec<GeocodeCandidate>, GeocodeError> {
        let token = self.access_token()?;
        let url = self.endpoint(kind, query)?;
        info!(lookup = kind, "Sending request to geocoding service");

        let response = self
            .http
            .get(url)
            .bearer_auth(token)
            .header(PROJECT_HEADER, self.project_id.as_str())
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .send()
            .await
            .map_err(UpstreamError::Network)?;

        let status = response.status();
        if !status.is_success() {
            warn!(lookup = kind, %status, "Geocoding service returned an error status");
            return Err(UpstreamError::Status(status).into());
        }

        let body: Value = response.json().await.map_err(UpstreamError::Network)?;
        debug!(lookup = kind, "Received response from geocoding service");
        parse_results(body).map_err(GeocodeError::from)
    }
}

/// Validate the response envelope and decode its `results` array.
fn parse_results(mut body: Value) -> Result<Vec<GeocodeCandidate>, UpstreamError> {
    if let Some(error) = body.get("errorMessage").filter(|value| is_set(value)) {
        let message = match error {
            Value::String(message) => message.clone(),
            other => other.to_string(),
        };
        return Err(UpstreamError::Provider(message));
    }
    let results = match body.get_mut("results").map(Value::take) {
        Some(results @ Value::Array(_)) => results,
        _ => return Err(UpstreamError::MissingResults),
    };
    serde_json::from_value(results)
        .map_err(|err| UpstreamError::Provider(format!("malformed geocoding results: {err}")))
}

/// Any `errorMessage` other than `null`, `false`, `0` or `""` marks a failure.
fn is_set(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0),
        Value::String(text) => !text.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// The query is sent exactly as given; only an empty one is rejected.
fn require_query(value: &str, field: &'static str) -> Result<(), GeocodeError> {
    if value.is_empty() {
        return Err(GeocodeError::validation(field));
    }
    Ok(())
}

#[async_trait]
impl Geocoder for GeocodeClient {
    fn access_token(&self) -> Result<&str, GeocodeError> {
        self.access_token
            .as_deref()
            .ok_or(GeocodeError::Configuration)
    }

    async fn forward(&self, address: &str) -> Result<Option<LatLng>, GeocodeError> {
        self.access_token()?;
        require_query(address, "address")?;
        let candidates = self.fetch("address", address).await?;
        // The first result is taken as-is; forward lookups are not ranked.
        Ok(candidates.into_iter().next().and_then(|first| first.location))
    }

    async fn reverse(&self, coordinates: &str) -> Result<Vec<GeocodeCandidate>, GeocodeError> {
        self.access_token()?;
        require_query(coordinates, "coordinates")?;
        self.fetch("location", coordinates).await
    }
}
