//! Geocoding module
//!
//! Provides reverse geocoding (coordinates to a place name) and forward search
//! (free text to candidate coordinates). Provider responses vary in which
//! address fields they carry, so every field is optional and names are picked
//! through explicit fallback chains.

#[cfg(test)]
pub(crate) mod mock;
pub mod nominatim;
pub mod resolver;

use crate::constants::workflow::{FALLBACK_NAME, PLACEHOLDER_NAME};
use crate::coord::Coordinate;
use crate::error::Result;
use serde::{Deserialize, Serialize};

/// Address parts as returned by the geocoder, all optional
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Address {
    pub village: Option<String>,
    pub town: Option<String>,
    pub city: Option<String>,
    pub hamlet: Option<String>,
    pub locality: Option<String>,
    pub suburb: Option<String>,
    pub municipality: Option<String>,
    pub county: Option<String>,
    pub state_district: Option<String>,
    pub state: Option<String>,
    pub region: Option<String>,
    pub country: Option<String>,
}

/// First non-blank value
fn first(candidates: &[&Option<String>]) -> Option<String> {
    candidates
        .iter()
        .filter_map(|c| c.as_deref())
        .map(str::trim)
        .find(|s| !s.is_empty())
        .map(str::to_string)
}

impl Address {
    /// Display name: village → town → city → municipality → county → state → country
    pub fn name(&self) -> Option<String> {
        first(&[
            &self.village,
            &self.town,
            &self.city,
            &self.municipality,
            &self.county,
            &self.state,
            &self.country,
        ])
    }

    pub fn city(&self) -> Option<String> {
        first(&[&self.city, &self.town, &self.village, &self.hamlet, &self.locality])
    }

    pub fn county(&self) -> Option<String> {
        first(&[&self.county, &self.state_district])
    }

    pub fn region(&self) -> Option<String> {
        first(&[&self.state, &self.region])
    }

    pub fn country(&self) -> Option<String> {
        first(&[&self.country])
    }
}

/// A human-readable place name for a coordinate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceName {
    pub name: String,
    pub full_address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub county: Option<String>,
}

impl PlaceName {
    /// Shown while resolution is in flight
    pub fn placeholder(coord: Coordinate) -> Self {
        Self::named(PLACEHOLDER_NAME, coord)
    }

    /// Used when resolution fails or times out
    pub fn fallback(coord: Coordinate) -> Self {
        Self::named(FALLBACK_NAME, coord)
    }

    /// A fixed name with the coordinate label as address
    pub fn named(name: impl Into<String>, coord: Coordinate) -> Self {
        Self {
            name: name.into(),
            full_address: coord.label(),
            city: None,
            region: None,
            country: None,
            county: None,
        }
    }

    /// Build from geocoder address parts
    pub fn from_address(address: &Address, display_name: Option<&str>, coord: Coordinate) -> Self {
        let full_address = display_name
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| coord.label());

        Self {
            name: address.name().unwrap_or_else(|| FALLBACK_NAME.to_string()),
            full_address,
            city: address.city(),
            region: address.region(),
            country: address.country(),
            county: address.county(),
        }
    }

    /// "Name, Country" when the country is known and differs from the name
    pub fn label(&self) -> String {
        match &self.country {
            Some(country) if *country != self.name => format!("{}, {}", self.name, country),
            _ => self.name.clone(),
        }
    }
}

/// A forward search candidate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    pub coordinate: Coordinate,
    pub display_name: String,
    /// Short name: town or city, else the first segment of the display name
    pub place_name: String,
    pub address: PlaceName,
}

impl SearchResult {
    pub fn new(coordinate: Coordinate, display_name: String, address: &Address) -> Self {
        let place_name = first(&[
            &address.city,
            &address.town,
            &address.village,
            &address.hamlet,
            &address.suburb,
        ])
        .or_else(|| {
            display_name
                .split(',')
                .next()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        })
        .unwrap_or_else(|| display_name.clone());

        let address = PlaceName::from_address(address, Some(&display_name), coordinate);

        Self {
            coordinate,
            display_name,
            place_name,
            address,
        }
    }
}

/// Trait for geocoding backends
pub trait GeoBackend: Send + Sync {
    /// Reverse geocode a coordinate to a place name
    fn reverse_geocode(
        &self,
        coord: Coordinate,
    ) -> impl std::future::Future<Output = Result<PlaceName>> + Send;

    /// Search for places matching free text, best match first
    fn search(
        &self,
        query: &str,
        limit: usize,
    ) -> impl std::future::Future<Output = Result<Vec<SearchResult>>> + Send;
}
