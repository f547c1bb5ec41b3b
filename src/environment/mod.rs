//! Environmental data synthesis
//!
//! Produces a deterministic bundle of pseudo-environmental metrics for a
//! coordinate. Nothing here is sourced from a live dataset: every value is a
//! fixed formula over a sine hash of the coordinate and a latitude factor.
//!
//! ## Algorithm
//!
//! ```text
//! seed       = |sin(lat * 12.9898 + lon * 78.233) * 43758.5453|
//! h          = seed * 1000
//! lat_factor = cos(lat in radians)
//! ```
//!
//! Each metric is a linear formula over `h mod k` and `lat_factor`, followed by
//! a per-field floor/round and clamp. Metric and imperial outputs come from two
//! separately tuned formula sets; they are not unit conversions of each other.

pub mod classify;

use crate::config::SynthesisConfig;
use crate::coord::Coordinate;
use chrono::Datelike;
use classify::{CropSuitability, FrostRisk, IrrigationNeed};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Unit system used for generated values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum UnitSystem {
    /// °C, mm, m/s
    #[default]
    Metric,
    /// °F, inches, mph
    Imperial,
}

impl UnitSystem {
    pub fn temperature_unit(&self) -> &'static str {
        match self {
            Self::Metric => "°C",
            Self::Imperial => "°F",
        }
    }

    pub fn precipitation_unit(&self) -> &'static str {
        match self {
            Self::Metric => "mm",
            Self::Imperial => "in",
        }
    }

    pub fn wind_unit(&self) -> &'static str {
        match self {
            Self::Metric => "m/s",
            Self::Imperial => "mph",
        }
    }
}

impl std::fmt::Display for UnitSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Metric => write!(f, "metric"),
            Self::Imperial => write!(f, "imperial"),
        }
    }
}

impl std::str::FromStr for UnitSystem {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "metric" | "si" => Ok(Self::Metric),
            "imperial" | "us" => Ok(Self::Imperial),
            _ => Err(format!("Unknown unit system: {}", s)),
        }
    }
}

/// Whether a calendar month feeds into the generated values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Seasonality {
    /// Values depend only on the coordinate
    #[default]
    Off,
    /// Values shift with the local month at the time of synthesis
    Current,
    /// Values shift with the given month (1-12)
    Month(u32),
}

impl Seasonality {
    /// Pin `Current` to the local month as of now
    pub fn resolve(self) -> Self {
        match self {
            Self::Current => Self::Month(chrono::Local::now().month()),
            other => other,
        }
    }

    /// Seasonal factor in [-1, 1], positive in local summer
    ///
    /// Peaks in July for the northern hemisphere and January for the southern,
    /// scaled by distance from the equator.
    pub fn factor(&self, lat: f64) -> f64 {
        match self.resolve() {
            Self::Off | Self::Current => 0.0,
            Self::Month(month) => {
                let month = month.clamp(1, 12);
                let phase = 2.0 * PI * (month - 1) as f64 / 12.0;
                let northern = -phase.cos();
                let hemisphere = if lat < 0.0 { -northern } else { northern };
                hemisphere * (lat.abs() / 90.0).min(1.0)
            }
        }
    }

    /// Month folded into the values, if any
    pub fn month(&self) -> Option<u32> {
        match self.resolve() {
            Self::Month(m) => Some(m),
            _ => None,
        }
    }
}

/// Parameters of a synthesis run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SynthesisOptions {
    pub units: UnitSystem,
    pub seasonality: Seasonality,
}

impl SynthesisOptions {
    /// Non-seasonal options for the given unit system
    pub fn new(units: UnitSystem) -> Self {
        Self {
            units,
            seasonality: Seasonality::Off,
        }
    }

    /// Fold a specific month into the values
    pub fn with_month(mut self, month: u32) -> Self {
        self.seasonality = Seasonality::Month(month);
        self
    }

    /// Build options from configuration
    ///
    /// When seasonality is enabled the month is looked up on every synthesis,
    /// so the output is reproducible within a calendar month only.
    pub fn from_config(config: &SynthesisConfig) -> Self {
        let mut options = Self::new(config.units);
        if config.seasonal {
            options.seasonality = Seasonality::Current;
        }
        options
    }
}

/// A point-in-time bundle of synthesized metrics for a coordinate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvironmentalSnapshot {
    pub units: UnitSystem,
    /// Month folded into the values, if seasonal
    #[serde(skip_serializing_if = "Option::is_none")]
    pub month: Option<u32>,

    /// °C or °F
    pub temperature: f64,
    /// mm or inches
    pub precipitation: f64,
    /// Percent, 0-100
    pub soil_moisture: u8,
    /// Nominally 0.0-1.0
    pub vegetation_index: f64,
    pub ndvi: f64,
    /// Percent, 0-100
    pub cloud_coverage: u8,
    /// m/s or mph
    pub wind_speed: f64,
    /// Degrees, 0-359
    pub wind_direction: u16,
    /// Percent, 0-100
    pub humidity: u8,
    /// W/m²
    pub solar_radiation: f64,
    /// AQI, 0-500
    pub air_quality: u16,

    pub frost_risk: FrostRisk,
    pub irrigation_need: IrrigationNeed,
    pub crop_suitability: CropSuitability,
    pub soil_status: String,
    pub vegetation_status: String,
    pub recommendation: String,
}

/// Synthesize a non-seasonal snapshot
pub fn synthesize(lat: f64, lon: f64, units: UnitSystem) -> EnvironmentalSnapshot {
    synthesize_with(lat, lon, &SynthesisOptions::new(units))
}

/// Synthesize a snapshot for a coordinate
pub fn synthesize_at(coord: Coordinate, options: &SynthesisOptions) -> EnvironmentalSnapshot {
    synthesize_with(coord.lat, coord.lon, options)
}

/// Synthesize a snapshot with explicit options
///
/// Pure and total: any finite input yields a value, no range validation.
pub fn synthesize_with(lat: f64, lon: f64, options: &SynthesisOptions) -> EnvironmentalSnapshot {
    let h = hash(lat, lon);
    let lat_factor = (lat * PI / 180.0).cos();
    let seasonality = options.seasonality.resolve();
    let season = seasonality.factor(lat);

    let raw = match options.units {
        UnitSystem::Metric => metric(h, lat, lat_factor, season),
        UnitSystem::Imperial => imperial(h, lat, lat_factor, season),
    };

    let frost_risk = FrostRisk::assess(raw.temperature, options.units);
    let irrigation_need =
        IrrigationNeed::assess(raw.soil_moisture, raw.precipitation, options.units);
    let crop_suitability = CropSuitability::assess(
        raw.temperature,
        raw.soil_moisture,
        raw.vegetation_index,
        options.units,
    );

    EnvironmentalSnapshot {
        units: options.units,
        month: seasonality.month(),
        temperature: raw.temperature,
        precipitation: raw.precipitation,
        soil_moisture: raw.soil_moisture,
        vegetation_index: raw.vegetation_index,
        ndvi: raw.ndvi,
        cloud_coverage: raw.cloud_coverage,
        wind_speed: raw.wind_speed,
        wind_direction: raw.wind_direction,
        humidity: raw.humidity,
        solar_radiation: raw.solar_radiation,
        air_quality: raw.air_quality,
        frost_risk,
        irrigation_need,
        crop_suitability,
        soil_status: classify::soil_status(raw.soil_moisture).to_string(),
        vegetation_status: classify::vegetation_status(raw.vegetation_index).to_string(),
        recommendation: classify::recommendation(frost_risk, irrigation_need, crop_suitability)
            .to_string(),
    }
}

/// Sine hash of the coordinate, scaled by 1000
fn hash(lat: f64, lon: f64) -> f64 {
    ((lat * 12.9898 + lon * 78.233).sin() * 43758.5453).abs() * 1000.0
}

/// Values before classification
struct RawMetrics {
    temperature: f64,
    precipitation: f64,
    soil_moisture: u8,
    vegetation_index: f64,
    ndvi: f64,
    cloud_coverage: u8,
    wind_speed: f64,
    wind_direction: u16,
    humidity: u8,
    solar_radiation: f64,
    air_quality: u16,
}

fn metric(h: f64, lat: f64, lat_factor: f64, season: f64) -> RawMetrics {
    RawMetrics {
        temperature: (25.0 - lat.abs() * 0.5 + h % 15.0 + season * 10.0).floor(),
        precipitation: (lat_factor * 50.0 + h % 150.0).floor().max(0.0),
        wind_speed: round1(2.0 + h % 8.0 + (1.0 - lat_factor) * 4.0),
        solar_radiation: (150.0 + lat_factor * 250.0 + h % 100.0 + season * 60.0)
            .floor()
            .max(0.0),
        ..unitless(h, lat_factor, season)
    }
}

fn imperial(h: f64, lat: f64, lat_factor: f64, season: f64) -> RawMetrics {
    RawMetrics {
        temperature: (78.0 - lat.abs() * 0.85 + h % 26.0 + season * 17.0).floor(),
        precipitation: round2(lat_factor * 1.9 + h % 6.0).max(0.0),
        wind_speed: round1(5.0 + h % 18.0 + (1.0 - lat_factor) * 9.0),
        solar_radiation: (140.0 + lat_factor * 260.0 + h % 95.0 + season * 55.0)
            .floor()
            .max(0.0),
        ..unitless(h, lat_factor, season)
    }
}

/// Metrics that carry no unit and are shared by both unit systems
fn unitless(h: f64, lat_factor: f64, season: f64) -> RawMetrics {
    RawMetrics {
        temperature: 0.0,
        precipitation: 0.0,
        soil_moisture: clamp_percent(40.0 + lat_factor * 30.0 + h % 20.0),
        vegetation_index: round2(0.4 + lat_factor * 0.3 + h % 0.2 + season * 0.1),
        ndvi: round2(0.3 + lat_factor * 0.4 + h % 0.2),
        cloud_coverage: clamp_percent(20.0 + h % 70.0),
        wind_speed: 0.0,
        wind_direction: ((h * 7.0) % 360.0).floor() as u16,
        humidity: clamp_percent(35.0 + lat_factor * 40.0 + h % 25.0),
        solar_radiation: 0.0,
        air_quality: (20.0 + h % 130.0).floor().clamp(0.0, 500.0) as u16,
    }
}

fn clamp_percent(value: f64) -> u8 {
    value.floor().clamp(0.0, 100.0) as u8
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
