mod client;
mod error;
pub mod selector;

pub use client::GeocodeClient;
pub use error::{GeocodeError, UpstreamError};
pub use selector::select;

use crate::domain::types::{GeocodeCandidate, LatLng};
use async_trait::async_trait;

/// A geocoding provider that resolves addresses to coordinates and back.
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// The bearer token sent with every lookup.
    ///
    /// Fails with [`GeocodeError::Configuration`] when none is configured.
    fn access_token(&self) -> Result<&str, GeocodeError>;

    /// Forward geocode: location of the first candidate for `address`.
    ///
    /// `None` when the provider returned no candidates or the first one
    /// carries no location.
    async fn forward(&self, address: &str) -> Result<Option<LatLng>, GeocodeError>;

    /// Reverse geocode: every candidate for a `"lat,lon"` pair.
    async fn reverse(&self, coordinates: &str) -> Result<Vec<GeocodeCandidate>, GeocodeError>;
}
