//! JSON output formatter

use crate::config::Config;
use crate::error::Result;
use crate::format::OutputFormatter;
use crate::selection::SelectedLocation;

/// Pretty-printed JSON of the whole selection
pub struct JsonFormatter;

impl OutputFormatter for JsonFormatter {
    fn name(&self) -> &str {
        "json"
    }

    fn description(&self) -> &str {
        "Full selection as JSON"
    }

    fn format(&self, location: &SelectedLocation, _config: &Config) -> Result<String> {
        Ok(serde_json::to_string_pretty(location)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::tests::nairobi_location;

    #[test]
    fn test_json_format() {
        let output = JsonFormatter
            .format(&nairobi_location(), &Config::default())
            .unwrap();

        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed["place"]["name"], "Nairobi");
        assert_eq!(parsed["coordinate"]["lat"], -1.2921);
        assert_eq!(parsed["isLoading"], false);
        assert!(parsed["environmental"]["soilMoisture"].is_u64());
    }
}
