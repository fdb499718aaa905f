//! Centralized constants for the training-mapper crate
//!
//! Endpoints and fixed pipeline parameters shared across modules.

/// External API endpoints
pub mod api {
    /// OpenStreetMap Nominatim geocoding API
    pub const NOMINATIM_URL: &str = "https://nominatim.openstreetmap.org";

    /// DuckDuckGo Instant Answer API (free, no key required)
    pub const DUCKDUCKGO_URL: &str = "https://api.duckduckgo.com";

    /// OpenStreetMap Overpass interpreter
    pub const OVERPASS_URL: &str = "https://overpass-api.de/api/interpreter";

    /// Google generative language API (requires API key)
    pub const GEMINI_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

    /// User-Agent sent with every outbound request
    pub const USER_AGENT: &str = concat!("TrainingCenterMapper/", env!("CARGO_PKG_VERSION"));
}

/// Content gathering parameters
pub mod search {
    /// Query templates, `{loc}` is replaced with the resolved place name
    pub const QUERY_TEMPLATES: [&str; 5] = [
        "training centers in {loc}",
        "vocational schools {loc}",
        "technical colleges {loc}",
        "job training programs {loc}",
        "professional development courses {loc}",
    ];

    /// Related topics kept per search query
    pub const MAX_RELATED_TOPICS: usize = 3;

    /// Amenity tags requested from the geodata source
    pub const FACILITY_AMENITIES: [&str; 4] = ["school", "college", "university", "training"];

    /// Fallback when reverse geocoding yields nothing usable
    pub const UNKNOWN_LOCATION: &str = "Unknown Location";
}

/// Extraction parameters
pub mod extract {
    /// Separator placed between snippets in the model instruction
    pub const SNIPPET_SEPARATOR: &str = "\n---\n";

    /// Prefix for synthesized record ids
    pub const ID_PREFIX: &str = "extracted";
}
