//! Output formatters
//!
//! Render a [`SelectedLocation`] for the terminal, for scripts, or as a map link.

pub mod json;
pub mod text;
pub mod url;

use crate::config::Config;
use crate::error::Result;
use crate::selection::SelectedLocation;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormatInfo {
    pub name: String,
    pub description: String,
}

/// Trait for output formatters
pub trait OutputFormatter: Send + Sync {
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    /// Format a selected location
    ///
    /// `config` supplies the map URL providers.
    fn format(&self, location: &SelectedLocation, config: &Config) -> Result<String>;
}

/// Get a formatter by name
pub fn get_formatter(name: &str) -> Option<Box<dyn OutputFormatter>> {
    match name.to_lowercase().as_str() {
        "json" => Some(Box::new(json::JsonFormatter)),
        "text" => Some(Box::new(text::TextFormatter)),
        "url" => Some(Box::new(url::UrlFormatter)),
        _ => None,
    }
}

pub fn available_formats() -> Vec<FormatInfo> {
    ["json", "text", "url"]
        .into_iter()
        .filter_map(get_formatter)
        .map(|f| FormatInfo {
            name: f.name().to_string(),
            description: f.description().to_string(),
        })
        .collect()
}
