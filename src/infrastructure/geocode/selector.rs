use super::error::GeocodeError;
use crate::domain::types::GeocodeCandidate;

/// Type tags that mark a reverse-geocoding result as precise.
pub const PRECISE_TYPES: [&str; 4] = ["point_of_interest", "natural_feature", "airport", "park"];

/// Granularity reported for building-level matches.
pub const ROOFTOP: &str = "ROOFTOP";

pub fn is_precise(candidate: &GeocodeCandidate) -> bool {
    PRECISE_TYPES.iter().any(|tag| candidate.has_type(tag))
        || candidate.granularity.as_deref() == Some(ROOFTOP)
}

/// Pick the reverse-geocoding candidate to report.
///
/// Every precise candidate replaces the current pick, so the result is the
/// last precise candidate in provider order rather than the first or the most
/// specific one.
pub fn select(candidates: Vec<GeocodeCandidate>) -> Result<GeocodeCandidate, GeocodeError> {
    candidates
        .into_iter()
        .fold(None, |selected, candidate| {
            if is_precise(&candidate) {
                Some(candidate)
            } else {
                selected
            }
        })
        .ok_or(GeocodeError::NoPreciseResult)
}
