use super::{Tool, ToolError, ToolStream};
use crate::domain::types::{GeocodeRequest, ToolDefinition, ToolResult};
use crate::infrastructure::geocode::{Geocoder, select};
use async_stream::try_stream;
use futures::Stream;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::debug;

pub const ADDRESS_TO_COORD: &str = "addressToCoord";
pub const COORD_TO_ADDRESS: &str = "coordToAddress";

#[derive(Debug, Deserialize)]
pub struct AddressInput {
    #[serde(default)]
    pub address: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CoordinatesInput {
    #[serde(default)]
    pub coordinates: Option<String>,
}

/// Forward geocoding: address to coordinates.
pub struct AddressToCoordTool {
    geocoder: Arc<dyn Geocoder>,
}

impl AddressToCoordTool {
    pub fn new(geocoder: Arc<dyn Geocoder>) -> Self {
        Self { geocoder }
    }
}

impl Tool for AddressToCoordTool {
    type Input = AddressInput;

    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(
            ADDRESS_TO_COORD,
            "Converts an address into geographic coordinates",
            json!({
                "type": "object",
                "properties": {
                    "address": {
                        "type": "string",
                        "description": "The address to geocode"
                    }
                },
                "required": ["address"]
            }),
        )
    }

    fn invoke(&self, input: AddressInput) -> ToolStream {
        let request = GeocodeRequest::Forward {
            address: input.address.unwrap_or_default(),
        };
        Box::pin(lookup(Arc::clone(&self.geocoder), request))
    }
}

/// Reverse geocoding: coordinates to a human-readable address.
pub struct CoordToAddressTool {
    geocoder: Arc<dyn Geocoder>,
}

impl CoordToAddressTool {
    pub fn new(geocoder: Arc<dyn Geocoder>) -> Self {
        Self { geocoder }
    }
}

impl Tool for CoordToAddressTool {
    type Input = CoordinatesInput;

    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(
            COORD_TO_ADDRESS,
            "Converts geographic coordinates into a human-readable address",
            json!({
                "type": "object",
                "properties": {
                    "coordinates": {
                        "type": "string",
                        "description": "The coordinates to reverse geocode, in the following format: latitude,longitude"
                    }
                },
                "required": ["coordinates"]
            }),
        )
    }

    fn invoke(&self, input: CoordinatesInput) -> ToolStream {
        let request = GeocodeRequest::Reverse {
            coordinates: input.coordinates.unwrap_or_default(),
        };
        Box::pin(lookup(Arc::clone(&self.geocoder), request))
    }
}

/// Token check, `started`, lookup, `completed`.
///
/// A missing token fails before anything is yielded. Input validation
/// belongs to the geocoder, so an empty query, like every later failure,
/// follows the `started` value.
fn lookup(
    geocoder: Arc<dyn Geocoder>,
    request: GeocodeRequest,
) -> impl Stream<Item = Result<ToolResult, ToolError>> + Send + 'static {
    try_stream! {
        let token = geocoder.access_token()?.to_string();
        yield ToolResult::started(token);

        match &request {
            GeocodeRequest::Forward { address } => {
                let location = geocoder.forward(address).await?;
                debug!(?location, "Forward lookup resolved");
                yield ToolResult::located(location);
            }
            GeocodeRequest::Reverse { coordinates } => {
                let candidates = geocoder.reverse(coordinates).await?;
                let total = candidates.len();
                let selected = select(candidates)?;
                debug!(total, address = ?selected.formatted_address, "Reverse lookup resolved");
                yield ToolResult::addressed(selected.formatted_address);
            }
        }
    }
}
