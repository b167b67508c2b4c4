//! Centralized constants for the sos-relay crate
//!
//! This module consolidates constants that are used across multiple modules
//! to avoid duplication and ensure consistency.

/// Geographic constants
pub mod geo {
    /// Mean Earth radius in kilometers
    pub const EARTH_RADIUS_KM: f64 = 6371.0;
}

/// External API endpoints
pub mod api {
    /// OpenStreetMap Nominatim geocoding API
    pub const NOMINATIM_URL: &str = "https://nominatim.openstreetmap.org";

    /// Twilio REST API base
    pub const TWILIO_API_URL: &str = "https://api.twilio.com/2010-04-01";

    /// SendGrid-compatible mail send endpoint
    pub const MAIL_API_URL: &str = "https://api.sendgrid.com/v3/mail/send";

    /// User-Agent sent to upstream providers (Nominatim requires one)
    pub const USER_AGENT: &str = concat!("sos-relay/", env!("CARGO_PKG_VERSION"));
}
