use reqwest::StatusCode;
use thiserror::Error;

/// Failures of a single geocoding lookup. None of them are retried.
#[derive(Debug, Error)]
pub enum GeocodeError {
    #[error("Google Maps access token is not configured")]
    Configuration,
    #[error("{field} is required")]
    Validation { field: &'static str },
    #[error(transparent)]
    Upstream(#[from] UpstreamError),
    #[error("no precise address found for coordinates")]
    NoPreciseResult,
}

/// The provider could not be reached or answered with something unusable.
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("failed to reach geocoding service: {0}")]
    Network(#[from] reqwest::Error),
    #[error("failed to fetch geocode data (status {0})")]
    Status(StatusCode),
    #[error("{0}")]
    Provider(String),
    #[error("geocoding response has no results array")]
    MissingResults,
}

impl GeocodeError {
    pub fn validation(field: &'static str) -> Self {
        Self::Validation { field }
    }

    /// Short label of the error category, used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            GeocodeError::Configuration => "configuration",
            GeocodeError::Validation { .. } => "validation",
            GeocodeError::Upstream(_) => "upstream",
            GeocodeError::NoPreciseResult => "no_precise_result",
        }
    }
}
