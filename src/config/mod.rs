//! Configuration management
//!
//! Loads and saves configuration from XDG-compliant paths.
//! Config location: ~/.config/sos-relay/config.toml

pub mod defaults;

use crate::coord::Coordinate;
use crate::error::{Error, Result};
use defaults::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Contact scoring weights
    #[serde(default)]
    pub ranking: RankingConfig,

    /// Geocoding provider settings
    #[serde(default)]
    pub geocoding: GeocodingConfig,

    /// Alert dispatch settings
    #[serde(default)]
    pub dispatch: DispatchConfig,

    /// Messaging (WhatsApp/SMS) provider settings
    #[serde(default)]
    pub messaging: MessagingConfig,

    /// Email provider settings
    #[serde(default)]
    pub email: EmailConfig,

    /// Server settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Map link settings
    #[serde(default)]
    pub url: UrlConfig,
}

/// Contact scoring weights
///
/// `score = priority * priority_weight + distance_km - (exact match ? exact_place_bonus : 0)`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RankingConfig {
    #[serde(default = "default_priority_weight")]
    pub priority_weight: f64,

    #[serde(default = "default_fallback_distance_km")]
    pub fallback_distance_km: f64,

    #[serde(default = "default_exact_place_bonus")]
    pub exact_place_bonus: f64,
}

/// Geocoding provider settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeocodingConfig {
    /// "nominatim" or "static"
    #[serde(default = "default_geo_backend")]
    pub backend: String,

    /// Nominatim base URL
    #[serde(default = "default_nominatim_url")]
    pub base_url: String,

    /// Timeout for a single lookup
    #[serde(default = "default_geo_timeout")]
    pub timeout_secs: u64,

    /// Forward lookups in flight per ranking call
    #[serde(default = "default_max_concurrent_lookups")]
    pub max_concurrent_lookups: usize,

    /// Reverse match radius for the static backend
    #[serde(default = "default_match_radius_km")]
    pub match_radius_km: f64,

    /// Known places for the static backend (name -> coordinate)
    #[serde(default)]
    pub places: HashMap<String, Coordinate>,
}

/// Alert dispatch settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchConfig {
    /// Timeout for a single send
    #[serde(default = "default_send_timeout")]
    pub send_timeout_secs: u64,

    /// Prepended to phone numbers that lack a leading '+'
    #[serde(default = "default_country_code")]
    pub default_country_code: String,
}

/// Messaging provider settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessagingConfig {
    /// "twilio" or "console"
    #[serde(default = "default_messaging_provider")]
    pub provider: String,

    #[serde(default = "default_twilio_url")]
    pub api_url: String,

    #[serde(default)]
    pub account_sid: String,

    #[serde(default)]
    pub auth_token: String,

    /// Sender number
    #[serde(default)]
    pub from: String,

    /// Send over WhatsApp rather than SMS
    #[serde(default = "default_true")]
    pub whatsapp: bool,
}

/// Email provider settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailConfig {
    /// "http" or "console"
    #[serde(default = "default_email_provider")]
    pub provider: String,

    #[serde(default = "default_mail_url")]
    pub endpoint: String,

    #[serde(default)]
    pub api_key: String,

    /// Sender address
    #[serde(default)]
    pub from: String,
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

/// Map link settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UrlConfig {
    /// Default map provider
    #[serde(default = "default_url_provider")]
    pub default: String,

    /// Map provider templates
    #[serde(default = "default_url_providers")]
    pub providers: HashMap<String, String>,
}

// Default value functions for serde
fn default_priority_weight() -> f64 {
    DEFAULT_PRIORITY_WEIGHT
}
fn default_fallback_distance_km() -> f64 {
    DEFAULT_FALLBACK_DISTANCE_KM
}
fn default_exact_place_bonus() -> f64 {
    DEFAULT_EXACT_PLACE_BONUS
}
fn default_geo_backend() -> String {
    DEFAULT_GEO_BACKEND.to_string()
}
fn default_nominatim_url() -> String {
    crate::constants::api::NOMINATIM_URL.to_string()
}
fn default_geo_timeout() -> u64 {
    DEFAULT_GEO_TIMEOUT_SECS
}
fn default_max_concurrent_lookups() -> usize {
    DEFAULT_MAX_CONCURRENT_LOOKUPS
}
fn default_match_radius_km() -> f64 {
    DEFAULT_MATCH_RADIUS_KM
}
fn default_send_timeout() -> u64 {
    DEFAULT_SEND_TIMEOUT_SECS
}
fn default_country_code() -> String {
    DEFAULT_COUNTRY_CODE.to_string()
}
fn default_messaging_provider() -> String {
    DEFAULT_MESSAGING_PROVIDER.to_string()
}
fn default_twilio_url() -> String {
    crate::constants::api::TWILIO_API_URL.to_string()
}
fn default_true() -> bool {
    true
}
fn default_email_provider() -> String {
    DEFAULT_EMAIL_PROVIDER.to_string()
}
fn default_mail_url() -> String {
    crate::constants::api::MAIL_API_URL.to_string()
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
        "https://www.google.com/maps?q={lat},{lng}".to_string(),
    );
    providers.insert(
        "openstreetmap".to_string(),
        "https://www.openstreetmap.org/?mlat={lat}&mlon={lng}#map=16/{lat}/{lng}".to_string(),
    );
    providers.insert(
        "apple".to_string(),
        "https://maps.apple.com/?ll={lat},{lng}".to_string(),
    );
    providers
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            priority_weight: default_priority_weight(),
            fallback_distance_km: default_fallback_distance_km(),
            exact_place_bonus: default_exact_place_bonus(),
        }
    }
}

impl Default for GeocodingConfig {
    fn default() -> Self {
        Self {
            backend: default_geo_backend(),
            base_url: default_nominatim_url(),
            timeout_secs: default_geo_timeout(),
            max_concurrent_lookups: default_max_concurrent_lookups(),
            match_radius_km: default_match_radius_km(),
            places: HashMap::new(),
        }
    }
}

impl GeocodingConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            send_timeout_secs: default_send_timeout(),
            default_country_code: default_country_code(),
        }
    }
}

impl DispatchConfig {
    pub fn send_timeout(&self) -> Duration {
        Duration::from_secs(self.send_timeout_secs)
    }
}

impl Default for MessagingConfig {
    fn default() -> Self {
        Self {
            provider: default_messaging_provider(),
            api_url: default_twilio_url(),
            account_sid: String::new(),
            auth_token: String::new(),
            from: String::new(),
            whatsapp: true,
        }
    }
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            provider: default_email_provider(),
            endpoint: default_mail_url(),
            api_key: String::new(),
            from: String::new(),
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

impl Default for UrlConfig {
    fn default() -> Self {
        Self {
            default: default_url_provider(),
            providers: default_url_providers(),
        }
    }
}

/// Parse a config value, naming the key in the error
fn parse_value<T: FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .parse()
        .map_err(|_| Error::Config(format!("Invalid value for {}: {}", key, value)))
}

/// Parse a count or timeout that must be at least 1
fn parse_nonzero<T: FromStr + PartialEq + Default>(key: &str, value: &str) -> Result<T> {
    let parsed: T = parse_value(key, value)?;
    if parsed == T::default() {
        return Err(Error::Config(format!("{} must be at least 1", key)));
    }
    Ok(parsed)
}

/// Shown in place of a configured credential
const MASKED: &str = "***";

fn masked(secret: &str) -> String {
    if secret.is_empty() {
        String::new()
    } else {
        MASKED.to_string()
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
        Self::load_from(&Self::config_path()?)
    }

    /// Load configuration from a specific path, creating it if missing
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = fs::read_to_string(path)
                .map_err(|e| Error::Config(format!("Failed to read config file: {}", e)))?;

            toml::from_str(&content)
                .map_err(|e| Error::Config(format!("Failed to parse config file: {}", e)))
        } else {
            let config = Config::default();
            config.save_to(path)?;
            Ok(config)
        }
    }

    /// Save configuration to the default path
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    /// Save configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                Error::Config(format!("Failed to create config directory: {}", e))
            })?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;

        fs::write(path, content)
            .map_err(|e| Error::Config(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }

    /// Get a configuration value by key path
    ///
    /// Key format: "section.key". Returns None if the key is unknown.
    /// Credentials come back masked.
    pub fn get(&self, key: &str) -> Option<String> {
        let parts: Vec<&str> = key.split('.').collect();

        match parts.as_slice() {
            ["ranking", "priority_weight"] => Some(self.ranking.priority_weight.to_string()),
            ["ranking", "fallback_distance_km"] => {
                Some(self.ranking.fallback_distance_km.to_string())
            }
            ["ranking", "exact_place_bonus"] => Some(self.ranking.exact_place_bonus.to_string()),

            ["geocoding", "backend"] => Some(self.geocoding.backend.clone()),
            ["geocoding", "base_url"] => Some(self.geocoding.base_url.clone()),
            ["geocoding", "timeout_secs"] => Some(self.geocoding.timeout_secs.to_string()),
            ["geocoding", "max_concurrent_lookups"] => {
                Some(self.geocoding.max_concurrent_lookups.to_string())
            }
            ["geocoding", "match_radius_km"] => Some(self.geocoding.match_radius_km.to_string()),

            ["dispatch", "send_timeout_secs"] => Some(self.dispatch.send_timeout_secs.to_string()),
            ["dispatch", "default_country_code"] => {
                Some(self.dispatch.default_country_code.clone())
            }

            ["messaging", "provider"] => Some(self.messaging.provider.clone()),
            ["messaging", "api_url"] => Some(self.messaging.api_url.clone()),
            ["messaging", "account_sid"] => Some(self.messaging.account_sid.clone()),
            ["messaging", "auth_token"] => Some(masked(&self.messaging.auth_token)),
            ["messaging", "from"] => Some(self.messaging.from.clone()),
            ["messaging", "whatsapp"] => Some(self.messaging.whatsapp.to_string()),

            ["email", "provider"] => Some(self.email.provider.clone()),
            ["email", "endpoint"] => Some(self.email.endpoint.clone()),
            ["email", "api_key"] => Some(masked(&self.email.api_key)),
            ["email", "from"] => Some(self.email.from.clone()),

            ["server", "host"] => Some(self.server.host.clone()),
            ["server", "port"] => Some(self.server.port.to_string()),

            ["url", "default"] => Some(self.url.default.clone()),

            _ => None,
        }
    }

    /// Set a configuration value by key path
    ///
    /// Returns error if key is invalid or value type is wrong
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let parts: Vec<&str> = key.split('.').collect();

        match parts.as_slice() {
            ["ranking", "priority_weight"] => {
                self.ranking.priority_weight = parse_value(key, value)?;
            }
            ["ranking", "fallback_distance_km"] => {
                self.ranking.fallback_distance_km = parse_value(key, value)?;
            }
            ["ranking", "exact_place_bonus"] => {
                self.ranking.exact_place_bonus = parse_value(key, value)?;
            }

            ["geocoding", "backend"] => {
                self.geocoding.backend = value.to_string();
            }
            ["geocoding", "base_url"] => {
                self.geocoding.base_url = value.to_string();
            }
            ["geocoding", "timeout_secs"] => {
                self.geocoding.timeout_secs = parse_nonzero(key, value)?;
            }
            ["geocoding", "max_concurrent_lookups"] => {
                self.geocoding.max_concurrent_lookups = parse_nonzero(key, value)?;
            }
            ["geocoding", "match_radius_km"] => {
                self.geocoding.match_radius_km = parse_value(key, value)?;
            }

            ["dispatch", "send_timeout_secs"] => {
                self.dispatch.send_timeout_secs = parse_nonzero(key, value)?;
            }
            ["dispatch", "default_country_code"] => {
                self.dispatch.default_country_code = value.to_string();
            }

            ["messaging", "provider"] => {
                self.messaging.provider = value.to_string();
            }
            ["messaging", "api_url"] => {
                self.messaging.api_url = value.to_string();
            }
            ["messaging", "account_sid"] => {
                self.messaging.account_sid = value.to_string();
            }
            ["messaging", "auth_token"] => {
                self.messaging.auth_token = value.to_string();
            }
            ["messaging", "from"] => {
                self.messaging.from = value.to_string();
            }
            ["messaging", "whatsapp"] => {
                self.messaging.whatsapp = parse_value(key, value)?;
            }

            ["email", "provider"] => {
                self.email.provider = value.to_string();
            }
            ["email", "endpoint"] => {
                self.email.endpoint = value.to_string();
            }
            ["email", "api_key"] => {
                self.email.api_key = value.to_string();
            }
            ["email", "from"] => {
                self.email.from = value.to_string();
            }

            ["server", "host"] => {
                self.server.host = value.to_string();
            }
            ["server", "port"] => {
                self.server.port = parse_value(key, value)?;
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
            "ranking.priority_weight",
            "ranking.fallback_distance_km",
            "ranking.exact_place_bonus",
            "geocoding.backend",
            "geocoding.base_url",
            "geocoding.timeout_secs",
            "geocoding.max_concurrent_lookups",
            "geocoding.match_radius_km",
            "dispatch.send_timeout_secs",
            "dispatch.default_country_code",
            "messaging.provider",
            "messaging.api_url",
            "messaging.account_sid",
            "messaging.auth_token",
            "messaging.from",
            "messaging.whatsapp",
            "email.provider",
            "email.endpoint",
            "email.api_key",
            "email.from",
            "server.host",
            "server.port",
            "url.default",
        ]
    }

    /// Look up the map link template for a provider
    ///
    /// Templates carry `{lat}` and `{lng}` placeholders.
    pub fn url_template(&self, provider: Option<&str>) -> Result<&str> {
        let provider_name = provider.unwrap_or(&self.url.default);

        self.url
            .providers
            .get(provider_name)
            .map(String::as_str)
            .ok_or_else(|| Error::Config(format!("Unknown URL provider: {}", provider_name)))
    }

    /// Get server address as "host:port"
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.ranking.priority_weight, 100.0);
        assert_eq!(config.ranking.fallback_distance_km, 50.0);
        assert_eq!(config.ranking.exact_place_bonus, 25.0);
        assert_eq!(config.geocoding.backend, "nominatim");
        assert_eq!(config.geocoding.max_concurrent_lookups, 4);
        assert_eq!(config.dispatch.default_country_code, "+91");
        assert_eq!(config.messaging.provider, "console");
        assert_eq!(config.server.port, 5000);
    }

    #[test]
    fn test_get_set() {
        let mut config = Config::default();

        assert_eq!(config.get("geocoding.backend"), Some("nominatim".to_string()));

        config.set("geocoding.backend", "static").unwrap();
        assert_eq!(config.get("geocoding.backend"), Some("static".to_string()));

        config.set("ranking.fallback_distance_km", "75").unwrap();
        assert_eq!(config.get("ranking.fallback_distance_km"), Some("75".to_string()));
        assert_eq!(config.ranking.fallback_distance_km, 75.0);

        config.set("messaging.whatsapp", "false").unwrap();
        assert!(!config.messaging.whatsapp);
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
        assert!(config.set("ranking.priority_weight", "not_a_number").is_err());
        assert!(config.set("geocoding.max_concurrent_lookups", "0").is_err());
    }

    #[test]
    fn test_set_rejects_zero_timeouts() {
        let mut config = Config::default();

        let err = config.set("geocoding.timeout_secs", "0").unwrap_err();
        assert!(err.to_string().contains("geocoding.timeout_secs must be at least 1"));
        assert!(config.set("dispatch.send_timeout_secs", "0").is_err());
        assert_eq!(config.geocoding.timeout_secs, default_geo_timeout());
        assert_eq!(config.dispatch.send_timeout_secs, default_send_timeout());

        config.set("dispatch.send_timeout_secs", "3").unwrap();
        assert_eq!(config.dispatch.send_timeout(), Duration::from_secs(3));
    }

    #[test]
    fn test_get_masks_credentials() {
        let mut config = Config::default();
        assert_eq!(config.get("messaging.auth_token"), Some(String::new()));

        config.set("messaging.auth_token", "twilio-secret").unwrap();
        config.set("email.api_key", "mail-secret").unwrap();

        assert_eq!(config.get("messaging.auth_token"), Some("***".to_string()));
        assert_eq!(config.get("email.api_key"), Some("***".to_string()));
        assert_eq!(config.messaging.auth_token, "twilio-secret");
    }

    #[test]
    fn test_every_available_key_is_readable() {
        let config = Config::default();
        for key in Config::available_keys() {
            assert!(config.get(key).is_some(), "key {} not readable", key);
        }
    }

    #[test]
    fn test_url_template() {
        let mut config = Config::default();

        let template = config.url_template(Some("google")).unwrap();
        assert_eq!(template, "https://www.google.com/maps?q={lat},{lng}");

        config.set("url.default", "openstreetmap").unwrap();
        assert!(config.url_template(None).unwrap().contains("openstreetmap.org"));
    }

    #[test]
    fn test_url_template_unknown_provider() {
        let config = Config::default();
        assert!(config.url_template(Some("unknown")).is_err());
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.geocoding.backend = "static".to_string();
        config
            .geocoding
            .places
            .insert("Mumbai".to_string(), Coordinate::new(19.076, 72.8777));
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.geocoding.backend, "static");
        assert_eq!(
            loaded.geocoding.places.get("Mumbai"),
            Some(&Coordinate::new(19.076, 72.8777))
        );
    }

    #[test]
    fn test_load_creates_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");

        let config = Config::load_from(&path).unwrap();
        assert!(path.exists());
        assert_eq!(config.server.port, 5000);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let toml_str = r#"
            [ranking]
            exact_place_bonus = 40.0

            [geocoding.places]
            delhi = { lat = 28.6139, lng = 77.209 }
        "#;
        let config: Config = toml::from_str(toml_str).unwrap();

        assert_eq!(config.ranking.exact_place_bonus, 40.0);
        assert_eq!(config.ranking.priority_weight, 100.0);
        assert_eq!(config.geocoding.places.len(), 1);
        assert_eq!(config.dispatch.send_timeout_secs, 8);
    }

    #[test]
    fn test_serialization_format() {
        let config = Config::default();
        let toml = toml::to_string_pretty(&config).unwrap();

        assert!(toml.contains("[ranking]"));
        assert!(toml.contains("[geocoding]"));
        assert!(toml.contains("[dispatch]"));
        assert!(toml.contains("[url.providers]"));
    }

    #[test]
    fn test_server_addr() {
        let config = Config::default();
        assert_eq!(config.server_addr(), "127.0.0.1:5000");
    }
}
