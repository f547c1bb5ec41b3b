//! Configuration management
//!
//! Loads and saves configuration from XDG-compliant paths.
//! Config location: ~/.config/agri-space/config.toml

pub mod defaults;

use crate::environment::UnitSystem;
use crate::error::{Error, Result};
use defaults::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Environmental synthesis settings
    #[serde(default)]
    pub synthesis: SynthesisConfig,

    /// Geocoding and search settings
    #[serde(default)]
    pub geocoding: GeocodingConfig,

    /// Selection workflow settings
    #[serde(default)]
    pub selection: SelectionConfig,

    /// Server settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Backend API settings
    #[serde(default)]
    pub api: ApiConfig,

    /// Map URL settings
    #[serde(default)]
    pub url: UrlConfig,
}

/// Environmental synthesis settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SynthesisConfig {
    /// Unit system: metric or imperial
    #[serde(default = "default_units")]
    pub units: UnitSystem,

    /// Fold the current month into generated values
    #[serde(default = "default_seasonal")]
    pub seasonal: bool,
}

/// Geocoding and search settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeocodingConfig {
    /// Geocoding service base URL (Nominatim compatible)
    #[serde(default = "default_geocoder_url")]
    pub base_url: String,

    /// Reverse geocoding timeout in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Maximum number of search results
    #[serde(default = "default_search_limit")]
    pub search_limit: usize,

    /// Search-as-you-type debounce in milliseconds
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// Accept-Language header value
    #[serde(default = "default_language")]
    pub accept_language: String,
}

/// Selection workflow settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectionConfig {
    /// Search picks go through preview/confirm instead of committing directly
    #[serde(default)]
    pub preview: bool,

    /// Number of recent locations kept
    #[serde(default = "default_recent_limit")]
    pub recent_limit: usize,
}

/// Server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Backend API settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Backend base URL
    #[serde(default = "default_api_url")]
    pub base_url: String,
}

/// URL generation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UrlConfig {
    /// Default URL provider
    #[serde(default = "default_url_provider")]
    pub default: String,

    /// URL provider templates
    #[serde(default = "default_url_providers")]
    pub providers: HashMap<String, String>,
}

// Default value functions for serde
fn default_units() -> UnitSystem {
    DEFAULT_UNITS.parse().unwrap_or_default()
}
fn default_seasonal() -> bool {
    DEFAULT_SEASONAL
}
fn default_geocoder_url() -> String {
    DEFAULT_GEOCODER_URL.to_string()
}
fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}
fn default_search_limit() -> usize {
    DEFAULT_SEARCH_LIMIT
}
fn default_debounce_ms() -> u64 {
    DEFAULT_DEBOUNCE_MS
}
fn default_language() -> String {
    DEFAULT_LANGUAGE.to_string()
}
fn default_recent_limit() -> usize {
    DEFAULT_RECENT_LIMIT
}
fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}
fn default_host() -> String {
    DEFAULT_HOST.to_string()
}
fn default_port() -> u16 {
    DEFAULT_PORT
}
fn default_url_provider() -> String {
    DEFAULT_URL_PROVIDER.to_string()
}
fn default_url_providers() -> HashMap<String, String> {
    let mut providers = HashMap::new();
    providers.insert(
        "google".to_string(),
        "https://www.google.com/maps/@{lat},{lng},12z".to_string(),
    );
    providers.insert(
        "openstreetmap".to_string(),
        "https://www.openstreetmap.org/#map=12/{lat}/{lng}".to_string(),
    );
    providers.insert(
        "worldview".to_string(),
        format!(
            "{}?v={{west}},{{south}},{{east}},{{north}}",
            crate::constants::api::WORLDVIEW_URL
        ),
    );
    providers
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            units: default_units(),
            seasonal: default_seasonal(),
        }
    }
}

impl Default for GeocodingConfig {
    fn default() -> Self {
        Self {
            base_url: default_geocoder_url(),
            timeout_ms: default_timeout_ms(),
            search_limit: default_search_limit(),
            debounce_ms: default_debounce_ms(),
            accept_language: default_language(),
        }
    }
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            preview: false,
            recent_limit: default_recent_limit(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_api_url(),
        }
    }
}

impl Default for UrlConfig {
    fn default() -> Self {
        Self {
            default: default_url_provider(),
            providers: default_url_providers(),
        }
    }
}

impl GeocodingConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|p| p.join(APP_DIR_NAME))
            .ok_or_else(|| Error::Config("Could not determine config directory".to_string()))
    }

    /// Get the config file path
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join(CONFIG_FILE_NAME))
    }

    /// Load configuration from the default path
    ///
    /// Creates default config if file doesn't exist
    pub fn load() -> Result<Self> {
        Self::load_from(Self::config_path()?)
    }

    /// Load configuration from a specific path
    pub fn load_from(path: PathBuf) -> Result<Self> {
        if path.exists() {
            let content = fs::read_to_string(&path)
                .map_err(|e| Error::Config(format!("Failed to read config file: {}", e)))?;

            toml::from_str(&content)
                .map_err(|e| Error::Config(format!("Failed to parse config file: {}", e)))
        } else {
            let config = Config::default();
            config.save_to(&path)?;
            Ok(config)
        }
    }

    /// Save configuration to the default path
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    /// Save configuration to a specific path
    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| Error::Config(format!("Failed to create config directory: {}", e)))?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;

        fs::write(path, content)
            .map_err(|e| Error::Config(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }

    /// Get a configuration value by key path
    ///
    /// Key format: "section.key"
    /// Returns the value as a string, or None if not found
    pub fn get(&self, key: &str) -> Option<String> {
        let parts: Vec<&str> = key.split('.').collect();

        match parts.as_slice() {
            ["synthesis", "units"] => Some(self.synthesis.units.to_string()),
            ["synthesis", "seasonal"] => Some(self.synthesis.seasonal.to_string()),

            ["geocoding", "base_url"] => Some(self.geocoding.base_url.clone()),
            ["geocoding", "timeout_ms"] => Some(self.geocoding.timeout_ms.to_string()),
            ["geocoding", "search_limit"] => Some(self.geocoding.search_limit.to_string()),
            ["geocoding", "debounce_ms"] => Some(self.geocoding.debounce_ms.to_string()),
            ["geocoding", "accept_language"] => Some(self.geocoding.accept_language.clone()),

            ["selection", "preview"] => Some(self.selection.preview.to_string()),
            ["selection", "recent_limit"] => Some(self.selection.recent_limit.to_string()),

            ["server", "host"] => Some(self.server.host.clone()),
            ["server", "port"] => Some(self.server.port.to_string()),

            ["api", "base_url"] => Some(self.api.base_url.clone()),

            ["url", "default"] => Some(self.url.default.clone()),

            _ => None,
        }
    }

    /// Set a configuration value by key path
    ///
    /// Key format: "section.key"
    /// Returns error if key is invalid or value type is wrong
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let parts: Vec<&str> = key.split('.').collect();

        match parts.as_slice() {
            ["synthesis", "units"] => {
                self.synthesis.units = value.parse().map_err(Error::Config)?;
            }
            ["synthesis", "seasonal"] => {
                self.synthesis.seasonal = parse_value(value, "boolean")?;
            }

            ["geocoding", "base_url"] => {
                self.geocoding.base_url = value.trim_end_matches('/').to_string();
            }
            ["geocoding", "timeout_ms"] => {
                self.geocoding.timeout_ms = parse_value(value, "timeout")?;
            }
            ["geocoding", "search_limit"] => {
                self.geocoding.search_limit = parse_value(value, "limit")?;
            }
            ["geocoding", "debounce_ms"] => {
                self.geocoding.debounce_ms = parse_value(value, "debounce")?;
            }
            ["geocoding", "accept_language"] => {
                self.geocoding.accept_language = value.to_string();
            }

            ["selection", "preview"] => {
                self.selection.preview = parse_value(value, "boolean")?;
            }
            ["selection", "recent_limit"] => {
                self.selection.recent_limit = parse_value(value, "limit")?;
            }

            ["server", "host"] => {
                self.server.host = value.to_string();
            }
            ["server", "port"] => {
                self.server.port = parse_value(value, "port")?;
            }

            ["api", "base_url"] => {
                self.api.base_url = value.trim_end_matches('/').to_string();
            }

            ["url", "default"] => {
                self.url.default = value.to_string();
            }

            _ => {
                return Err(Error::Config(format!("Unknown config key: {}", key)));
            }
        }

        Ok(())
    }

    /// List all available config keys
    pub fn available_keys() -> Vec<&'static str> {
        vec![
            "synthesis.units",
            "synthesis.seasonal",
            "geocoding.base_url",
            "geocoding.timeout_ms",
            "geocoding.search_limit",
            "geocoding.debounce_ms",
            "geocoding.accept_language",
            "selection.preview",
            "selection.recent_limit",
            "server.host",
            "server.port",
            "api.base_url",
            "url.default",
        ]
    }

    /// Format a map URL using the specified provider
    ///
    /// Replaces {lat} and {lng}, plus {west} {south} {east} {north} for a
    /// ±5° bounding box around the point
    pub fn format_url(&self, provider: Option<&str>, lat: f64, lng: f64) -> Result<String> {
        let provider_name = provider.unwrap_or(&self.url.default);

        let template = self
            .url
            .providers
            .get(provider_name)
            .ok_or_else(|| Error::Config(format!("Unknown URL provider: {}", provider_name)))?;

        Ok(template
            .replace("{lat}", &lat.to_string())
            .replace("{lng}", &lng.to_string())
            .replace("{west}", &(lng - 5.0).to_string())
            .replace("{south}", &(lat - 5.0).to_string())
            .replace("{east}", &(lng + 5.0).to_string())
            .replace("{north}", &(lat + 5.0).to_string()))
    }

    /// Get server address as "host:port"
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

fn parse_value<T: std::str::FromStr>(value: &str, what: &str) -> Result<T> {
    value
        .parse()
        .map_err(|_| Error::Config(format!("Invalid {} value: {}", what, value)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.synthesis.units, UnitSystem::Metric);
        assert!(!config.synthesis.seasonal);
        assert_eq!(config.geocoding.timeout_ms, 4500);
        assert_eq!(config.geocoding.debounce_ms, 300);
        assert_eq!(config.geocoding.search_limit, 6);
        assert_eq!(config.selection.recent_limit, 5);
        assert_eq!(config.server.port, 5173);
    }

    #[test]
    fn test_get_set() {
        let mut config = Config::default();

        assert_eq!(config.get("synthesis.units"), Some("metric".to_string()));

        config.set("synthesis.units", "imperial").unwrap();
        assert_eq!(config.get("synthesis.units"), Some("imperial".to_string()));

        config.set("geocoding.timeout_ms", "1500").unwrap();
        assert_eq!(config.geocoding.timeout(), Duration::from_millis(1500));

        config.set("api.base_url", "http://localhost:5000/").unwrap();
        assert_eq!(config.api.base_url, "http://localhost:5000");
    }

    #[test]
    fn test_get_invalid_key() {
        let config = Config::default();
        assert_eq!(config.get("invalid.key"), None);
    }

    #[test]
    fn test_set_invalid_key() {
        let mut config = Config::default();
        assert!(config.set("invalid.key", "value").is_err());
    }

    #[test]
    fn test_set_invalid_value() {
        let mut config = Config::default();
        assert!(config.set("geocoding.timeout_ms", "soon").is_err());
        assert!(config.set("synthesis.units", "kelvin").is_err());
        assert!(config.set("selection.preview", "maybe").is_err());
    }

    #[test]
    fn test_every_available_key_is_readable() {
        let config = Config::default();
        for key in Config::available_keys() {
            assert!(config.get(key).is_some(), "{} not readable", key);
        }
    }

    #[test]
    fn test_format_url() {
        let config = Config::default();

        let url = config
            .format_url(Some("openstreetmap"), -1.2921, 36.8219)
            .unwrap();
        assert_eq!(url, "https://www.openstreetmap.org/#map=12/-1.2921/36.8219");

        let url = config.format_url(Some("worldview"), 0.0, 30.0).unwrap();
        assert_eq!(url, "https://worldview.earthdata.nasa.gov/?v=25,-5,35,5");
    }

    #[test]
    fn test_format_url_unknown_provider() {
        let config = Config::default();
        assert!(config.format_url(Some("unknown"), 0.0, 0.0).is_err());
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");

        let mut config = Config::default();
        config.synthesis.units = UnitSystem::Imperial;
        config.selection.preview = true;
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(path).unwrap();
        assert_eq!(loaded.synthesis.units, UnitSystem::Imperial);
        assert!(loaded.selection.preview);
    }

    #[test]
    fn test_load_creates_default_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("config.toml");

        let config = Config::load_from(path.clone()).unwrap();
        assert!(path.exists());
        assert_eq!(config.geocoding.search_limit, 6);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let loaded: Config = toml::from_str("[synthesis]\nunits = \"imperial\"\n").unwrap();
        assert_eq!(loaded.synthesis.units, UnitSystem::Imperial);
        assert_eq!(loaded.geocoding.timeout_ms, 4500);
        assert!(loaded.url.providers.contains_key("worldview"));
    }

    #[test]
    fn test_serialization_format() {
        let toml = toml::to_string_pretty(&Config::default()).unwrap();
        assert!(toml.contains("[synthesis]"));
        assert!(toml.contains("[geocoding]"));
        assert!(toml.contains("[url.providers]"));
    }

    #[test]
    fn test_server_addr() {
        assert_eq!(Config::default().server_addr(), "127.0.0.1:5173");
    }
}
