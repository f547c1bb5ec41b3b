//! URL output formatter

use crate::config::Config;
use crate::error::Result;
use crate::format::OutputFormatter;
use crate::selection::SelectedLocation;

/// Map link for the selected coordinate
pub struct UrlFormatter;

impl UrlFormatter {
    /// Format URL with optional provider override
    pub fn format_with_provider(
        &self,
        location: &SelectedLocation,
        config: &Config,
        provider: Option<&str>,
    ) -> Result<String> {
        config.format_url(provider, location.coordinate.lat, location.coordinate.lon)
    }
}

impl OutputFormatter for UrlFormatter {
    fn name(&self) -> &str {
        "url"
    }

    fn description(&self) -> &str {
        "Map URL for the selection"
    }

    fn format(&self, location: &SelectedLocation, config: &Config) -> Result<String> {
        self.format_with_provider(location, config, None)
    }
}
