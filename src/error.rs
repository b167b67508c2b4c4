//! Error types for sos-relay

use crate::dispatch::DeliveryReport;
use thiserror::Error;

/// Main error type for sos-relay operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("No emergency contacts provided")]
    EmptyContacts,

    #[error("Invalid contact: {0}")]
    InvalidContact(String),

    #[error("Invalid coordinates: {0}")]
    InvalidCoordinates(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Server error: {0}")]
    Server(String),

    #[error("Geo error: {0}")]
    Geo(String),

    #[error("Delivery error: {0}")]
    Delivery(String),

    #[error(
        "No recipient could be reached ({} attempted, {} failed)",
        .0.outcomes.len(),
        .0.failed_count
    )]
    TotalDeliveryFailure(DeliveryReport),
}

impl Error {
    /// Errors caused by the caller's input, rejected before any I/O
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            Error::EmptyContacts | Error::InvalidContact(_) | Error::InvalidCoordinates(_)
        )
    }
}

/// Result type alias for sos-relay operations
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_errors() {
        assert!(Error::EmptyContacts.is_input_error());
        assert!(Error::InvalidCoordinates("lat".to_string()).is_input_error());
        assert!(!Error::Delivery("down".to_string()).is_input_error());
    }

    #[test]
    fn test_json_error_converts() {
        let err: Error = serde_json::from_str::<u32>("nope").unwrap_err().into();
        assert!(matches!(err, Error::Json(_)));
        assert!(err.to_string().starts_with("JSON error:"));
    }
}
