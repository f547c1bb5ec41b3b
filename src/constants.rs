//! Centralized constants for the agri-space crate
//!
//! Values shared by the synthesizer, the geocoding adapters, the selection
//! workflow and the session store.

/// External API endpoints
pub mod api {
    /// OpenStreetMap Nominatim geocoding API
    pub const NOMINATIM_URL: &str = "https://nominatim.openstreetmap.org";

    /// Backend collaborator API (auth, NASA data, analysis)
    pub const BACKEND_URL: &str = "https://weather-probabilty-app.onrender.com";

    /// NASA Worldview satellite viewer
    pub const WORLDVIEW_URL: &str = "https://worldview.earthdata.nasa.gov/";

    /// User agent sent with every outbound request
    pub const USER_AGENT: &str = concat!("agri-space/", env!("CARGO_PKG_VERSION"));
}

/// Timing and sizing of the interactive workflow
pub mod workflow {
    /// Reverse geocoding is abandoned after this many milliseconds
    pub const REVERSE_TIMEOUT_MS: u64 = 4500;

    /// Trailing debounce applied to search-as-you-type queries
    pub const SEARCH_DEBOUNCE_MS: u64 = 300;

    /// Maximum number of forward search results
    pub const SEARCH_LIMIT: usize = 6;

    /// Number of resolved selections remembered
    pub const RECENT_LIMIT: usize = 5;

    /// Name shown while the place name is still being resolved
    pub const PLACEHOLDER_NAME: &str = "Locating...";

    /// Name used when resolution fails or nothing better is known
    pub const FALLBACK_NAME: &str = "Selected Location";
}

/// Keys of the persisted client state
pub mod storage {
    /// Session token key
    pub const TOKEN_KEY: &str = "token";

    /// User profile key
    pub const USER_KEY: &str = "user";

    /// Theme preference key
    pub const DARK_MODE_KEY: &str = "agrispace_darkMode";

    /// Session file name (inside the XDG data directory)
    pub const SESSION_FILE_NAME: &str = "session.json";
}
