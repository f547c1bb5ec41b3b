//! Default configuration values
//!
//! Named constants for all tunable parameters

use crate::constants::{api, workflow};

/// Default unit system for synthesized values
pub const DEFAULT_UNITS: &str = "metric";

/// Seasonal synthesis is off unless asked for
pub const DEFAULT_SEASONAL: bool = false;

/// Default geocoding service
pub const DEFAULT_GEOCODER_URL: &str = api::NOMINATIM_URL;

/// Default reverse geocoding timeout in milliseconds
pub const DEFAULT_TIMEOUT_MS: u64 = workflow::REVERSE_TIMEOUT_MS;

/// Default number of search results
pub const DEFAULT_SEARCH_LIMIT: usize = workflow::SEARCH_LIMIT;

/// Default search debounce in milliseconds
pub const DEFAULT_DEBOUNCE_MS: u64 = workflow::SEARCH_DEBOUNCE_MS;

/// Default Accept-Language sent to the geocoder
pub const DEFAULT_LANGUAGE: &str = "en";

/// Default size of the recent-locations list
pub const DEFAULT_RECENT_LIMIT: usize = workflow::RECENT_LIMIT;

/// Default backend API
pub const DEFAULT_API_URL: &str = api::BACKEND_URL;

/// Default server host
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default server port
pub const DEFAULT_PORT: u16 = 5173;

/// Default URL provider
pub const DEFAULT_URL_PROVIDER: &str = "openstreetmap";

/// Config file name
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Application directory name (for XDG paths)
pub const APP_DIR_NAME: &str = "agri-space";
