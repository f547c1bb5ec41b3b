//! Human-readable text output formatter

use crate::config::Config;
use crate::error::Result;
use crate::format::OutputFormatter;
use crate::selection::SelectedLocation;

/// Terminal panel with the place and its metrics
pub struct TextFormatter;

impl OutputFormatter for TextFormatter {
    fn name(&self) -> &str {
        "text"
    }

    fn description(&self) -> &str {
        "Human-readable panel"
    }

    fn format(&self, location: &SelectedLocation, _config: &Config) -> Result<String> {
        let place = &location.place;
        let env = &location.environmental;
        let units = env.units;
        let mut output = String::new();

        // Header
        output.push_str(&format!("{}\n", place.label()));
        output.push_str(&format!("{}\n", place.full_address));
        output.push_str(&format!(
            "Coordinates: {} ({})\n",
            location.coordinate.label(),
            location.selection_type
        ));
        if location.is_loading {
            output.push_str("(resolving place name)\n");
        }
        if let Some(month) = env.month {
            output.push_str(&format!("Month: {}\n", month));
        }

        output.push_str("\nConditions:\n");
        output.push_str(&format!(
            "  Temperature:     {}{}\n",
            env.temperature,
            units.temperature_unit()
        ));
        output.push_str(&format!(
            "  Precipitation:   {} {}\n",
            env.precipitation,
            units.precipitation_unit()
        ));
        output.push_str(&format!(
            "  Soil moisture:   {}% ({})\n",
            env.soil_moisture, env.soil_status
        ));
        output.push_str(&format!(
            "  Vegetation:      {:.2} ({})\n",
            env.vegetation_index, env.vegetation_status
        ));
        output.push_str(&format!("  NDVI:            {:.2}\n", env.ndvi));
        output.push_str(&format!("  Cloud coverage:  {}%\n", env.cloud_coverage));
        output.push_str(&format!(
            "  Wind:            {} {} from {}°\n",
            env.wind_speed,
            units.wind_unit(),
            env.wind_direction
        ));
        output.push_str(&format!("  Humidity:        {}%\n", env.humidity));
        output.push_str(&format!("  Solar radiation: {} W/m²\n", env.solar_radiation));
        output.push_str(&format!("  Air quality:     {} AQI\n", env.air_quality));

        output.push_str("\nAssessment:\n");
        output.push_str(&format!("  Frost risk:      {}\n", env.frost_risk));
        output.push_str(&format!("  Irrigation:      {}\n", env.irrigation_need));
        output.push_str(&format!("  Suitability:     {}\n", env.crop_suitability));
        output.push_str(&format!("\n{}\n", env.recommendation));

        Ok(output)
    }
}
