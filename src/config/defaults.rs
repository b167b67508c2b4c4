//! Default configuration values
//!
//! Named constants for all tunable parameters

/// Score points per priority step (lower priority number wins)
pub const DEFAULT_PRIORITY_WEIGHT: f64 = 100.0;

/// Distance assumed when a real distance cannot be computed
pub const DEFAULT_FALLBACK_DISTANCE_KM: f64 = 50.0;

/// Score reduction granted to a contact in the user's own place
pub const DEFAULT_EXACT_PLACE_BONUS: f64 = 25.0;

/// Default geocoding backend
pub const DEFAULT_GEO_BACKEND: &str = "nominatim";

/// Timeout for a single geocoding lookup
pub const DEFAULT_GEO_TIMEOUT_SECS: u64 = 5;

/// Concurrent forward lookups issued by one ranking call
pub const DEFAULT_MAX_CONCURRENT_LOOKUPS: usize = 4;

/// Radius within which the static gazetteer matches a coordinate to a place
pub const DEFAULT_MATCH_RADIUS_KM: f64 = 25.0;

/// Timeout for a single notification send
pub const DEFAULT_SEND_TIMEOUT_SECS: u64 = 8;

/// Country code prepended to phone numbers without one
pub const DEFAULT_COUNTRY_CODE: &str = "+91";

/// Default messaging provider
pub const DEFAULT_MESSAGING_PROVIDER: &str = "console";

/// Default email provider
pub const DEFAULT_EMAIL_PROVIDER: &str = "console";

/// Default server host
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default server port
pub const DEFAULT_PORT: u16 = 5000;

/// Default map link provider
pub const DEFAULT_URL_PROVIDER: &str = "google";

/// Config file name
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Application directory name (for XDG paths)
pub const APP_DIR_NAME: &str = "sos-relay";
