//! Derived classifications over synthesized metrics

use crate::environment::UnitSystem;
use serde::{Deserialize, Serialize};

/// Likelihood of frost damage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FrostRisk {
    Low,
    Moderate,
    High,
}

impl FrostRisk {
    pub fn assess(temperature: f64, units: UnitSystem) -> Self {
        let (high, moderate) = match units {
            UnitSystem::Metric => (2.0, 6.0),
            UnitSystem::Imperial => (36.0, 43.0),
        };

        if temperature <= high {
            Self::High
        } else if temperature <= moderate {
            Self::Moderate
        } else {
            Self::Low
        }
    }
}

/// How urgently the field needs watering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IrrigationNeed {
    Low,
    Moderate,
    High,
}

impl IrrigationNeed {
    pub fn assess(soil_moisture: u8, precipitation: f64, units: UnitSystem) -> Self {
        let dry_rain = match units {
            UnitSystem::Metric => 50.0,
            UnitSystem::Imperial => 2.0,
        };
        let low_rain = precipitation < dry_rain;

        if soil_moisture < 45 && low_rain {
            Self::High
        } else if soil_moisture < 55 || low_rain {
            Self::Moderate
        } else {
            Self::Low
        }
    }
}

/// Overall fitness of the location for planting
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CropSuitability {
    Poor,
    Fair,
    Good,
    Excellent,
}

impl CropSuitability {
    /// One point each for temperature, soil moisture and vegetation in range
    pub fn assess(
        temperature: f64,
        soil_moisture: u8,
        vegetation_index: f64,
        units: UnitSystem,
    ) -> Self {
        let temperature_band = match units {
            UnitSystem::Metric => 18.0..=30.0,
            UnitSystem::Imperial => 64.0..=86.0,
        };

        let score = [
            temperature_band.contains(&temperature),
            (40..=80).contains(&soil_moisture),
            vegetation_index >= 0.5,
        ]
        .iter()
        .filter(|ok| **ok)
        .count();

        match score {
            3 => Self::Excellent,
            2 => Self::Good,
            1 => Self::Fair,
            _ => Self::Poor,
        }
    }
}

impl std::fmt::Display for CropSuitability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Poor => write!(f, "poor"),
            Self::Fair => write!(f, "fair"),
            Self::Good => write!(f, "good"),
            Self::Excellent => write!(f, "excellent"),
        }
    }
}

impl std::fmt::Display for FrostRisk {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "low"),
            Self::Moderate => write!(f, "moderate"),
            Self::High => write!(f, "high"),
        }
    }
}

impl std::fmt::Display for IrrigationNeed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "low"),
            Self::Moderate => write!(f, "moderate"),
            Self::High => write!(f, "high"),
        }
    }
}

pub fn soil_status(soil_moisture: u8) -> &'static str {
    match soil_moisture {
        0..=39 => "Dry",
        40..=49 => "Slightly dry",
        50..=70 => "Optimal",
        _ => "Saturated",
    }
}

pub fn vegetation_status(vegetation_index: f64) -> &'static str {
    if vegetation_index < 0.3 {
        "Sparse"
    } else if vegetation_index < 0.5 {
        "Moderate"
    } else if vegetation_index < 0.7 {
        "Healthy"
    } else {
        "Dense"
    }
}

pub fn recommendation(
    frost: FrostRisk,
    irrigation: IrrigationNeed,
    suitability: CropSuitability,
) -> &'static str {
    if frost == FrostRisk::High {
        "Protect seedlings from frost"
    } else if irrigation == IrrigationNeed::High {
        "Consider irrigation"
    } else if suitability >= CropSuitability::Good {
        "Good time for planting most crops"
    } else {
        "Monitor conditions before planting"
    }
}
