use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

/// Geographic coordinates as returned by the geocoding provider.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct LatLng {
    pub latitude: f64,
    pub longitude: f64,
}

impl LatLng {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// A single lookup against the geocoding provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GeocodeRequest {
    Forward { address: String },
    /// `coordinates` is `"<lat>,<lon>"`.
    Reverse { coordinates: String },
}

/// One element of the provider's `results` array.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeocodeCandidate {
    #[serde(default)]
    pub formatted_address: Option<String>,
    #[serde(default)]
    pub location: Option<LatLng>,
    #[serde(default)]
    pub types: Vec<String>,
    #[serde(default)]
    pub granularity: Option<String>,
    #[serde(default)]
    pub place_id: Option<String>,
}

impl GeocodeCandidate {
    pub fn has_type(&self, tag: &str) -> bool {
        self.types.iter().any(|t| t == tag)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ToolState {
    Started,
    Completed,
    Error,
}

/// Partial result yielded by a geocoding tool invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ToolResult {
    pub state: ToolState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<LatLng>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formatted_address: Option<String>,
}

impl ToolResult {
    pub fn started(token: impl Into<String>) -> Self {
        Self {
            state: ToolState::Started,
            token: Some(token.into()),
            location: None,
            formatted_address: None,
        }
    }

    pub fn located(location: Option<LatLng>) -> Self {
        Self {
            state: ToolState::Completed,
            token: None,
            location,
            formatted_address: None,
        }
    }

    pub fn addressed(formatted_address: Option<String>) -> Self {
        Self {
            state: ToolState::Completed,
            token: None,
            location: None,
            formatted_address,
        }
    }

    /// Whether this is the last value of its invocation.
    pub fn is_final(&self) -> bool {
        self.state != ToolState::Started
    }
}

/// Tool declaration handed to the model runtime.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    /// JSON schema of the tool input.
    pub parameters: Value,
}

impl ToolDefinition {
    pub fn new(name: impl Into<String>, description: impl Into<String>, parameters: Value) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters,
        }
    }
}
