//! Timeout-guarded geocoder calls
//!
//! Wraps reverse geocoding and forward search so that they always settle.
//! Network errors, bad responses and timeouts degrade to the fallback place
//! name or to an empty result list.

use crate::coord::Coordinate;
use crate::geo::{GeoBackend, PlaceName, SearchResult};
use std::time::Duration;
use tracing::debug;

/// Resolve a coordinate to a place name, never failing
///
/// The lookup is raced against `timeout`; when the timer wins the lookup is
/// abandoned and the fallback `"Selected Location"` / `"lat, lon"` is returned.
pub async fn resolve_name<G: GeoBackend>(
    backend: &G,
    coord: Coordinate,
    timeout: Duration,
) -> PlaceName {
    match tokio::time::timeout(timeout, backend.reverse_geocode(coord)).await {
        Ok(Ok(place)) => place,
        Ok(Err(e)) => {
            debug!("Reverse geocoding {} failed, using fallback: {}", coord, e);
            PlaceName::fallback(coord)
        }
        Err(_) => {
            debug!("Reverse geocoding {} timed out after {:?}", coord, timeout);
            PlaceName::fallback(coord)
        }
    }
}

/// Search for places, never failing
///
/// Errors and timeouts both yield an empty list.
pub async fn search_places<G: GeoBackend>(
    backend: &G,
    query: &str,
    limit: usize,
    timeout: Duration,
) -> Vec<SearchResult> {
    match tokio::time::timeout(timeout, backend.search(query, limit)).await {
        Ok(Ok(found)) => found,
        Ok(Err(e)) => {
            debug!("Search for {:?} failed: {}", query, e);
            Vec::new()
        }
        Err(_) => {
            debug!("Search for {:?} timed out after {:?}", query, timeout);
            Vec::new()
        }
    }
}
