//! Coordinates and selection kinds
//!
//! This module handles:
//! - The immutable `Coordinate` value picked on the map or from a search
//! - How a location was chosen (`SelectionType`)
//! - The built-in region catalog

pub mod region;

use serde::{Deserialize, Serialize};

/// A geographic coordinate (latitude, longitude)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinate {
    /// Create a new coordinate
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Validate that the coordinate is within valid ranges
    ///
    /// Latitude: -90 to 90
    /// Longitude: -180 to 180
    pub fn validate(&self) -> crate::error::Result<()> {
        if !(-90.0..=90.0).contains(&self.lat) {
            return Err(crate::error::Error::InvalidCoordinates(format!(
                "Latitude {} is out of range [-90, 90]",
                self.lat
            )));
        }
        if !(-180.0..=180.0).contains(&self.lon) {
            return Err(crate::error::Error::InvalidCoordinates(format!(
                "Longitude {} is out of range [-180, 180]",
                self.lon
            )));
        }
        Ok(())
    }

    /// Six-decimal "lat, lon" label, used as the fallback address
    pub fn label(&self) -> String {
        format!("{:.6}, {:.6}", self.lat, self.lon)
    }

    /// Four-decimal label for compact displays
    pub fn short_label(&self) -> String {
        format!("{:.4}, {:.4}", self.lat, self.lon)
    }
}

impl std::fmt::Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// How a location was chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SelectionType {
    /// Clicked on the map
    #[default]
    Click,
    /// Picked from search results
    Search,
    /// Picked from the region catalog
    Region,
}

impl std::fmt::Display for SelectionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Click => write!(f, "click"),
            Self::Search => write!(f, "search"),
            Self::Region => write!(f, "region"),
        }
    }
}

impl std::str::FromStr for SelectionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "click" | "point" => Ok(Self::Click),
            "search" => Ok(Self::Search),
            "region" => Ok(Self::Region),
            _ => Err(format!("Unknown selection type: {}", s)),
        }
    }
}
