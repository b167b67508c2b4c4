//! Geographic coordinates
//!
//! The `Coordinate` value type and great-circle distance.

pub mod distance;

pub use distance::distance_km;

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// A geographic coordinate (latitude, longitude) in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    #[serde(alias = "latitude")]
    pub lat: f64,
    #[serde(alias = "longitude", alias = "lon")]
    pub lng: f64,
}

impl Coordinate {
    /// Create new coordinates
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Create validated coordinates
    pub fn try_new(lat: f64, lng: f64) -> Result<Self> {
        let coord = Self::new(lat, lng);
        coord.validate()?;
        Ok(coord)
    }

    /// Validate that coordinates are finite and within valid ranges
    ///
    /// Latitude: -90 to 90
    /// Longitude: -180 to 180
    pub fn validate(&self) -> Result<()> {
        if !self.lat.is_finite() || !self.lng.is_finite() {
            return Err(Error::InvalidCoordinates(format!(
                "({}, {}) is not a finite coordinate",
                self.lat, self.lng
            )));
        }
        if !(-90.0..=90.0).contains(&self.lat) {
            return Err(Error::InvalidCoordinates(format!(
                "Latitude {} is out of range [-90, 90]",
                self.lat
            )));
        }
        if !(-180.0..=180.0).contains(&self.lng) {
            return Err(Error::InvalidCoordinates(format!(
                "Longitude {} is out of range [-180, 180]",
                self.lng
            )));
        }
        Ok(())
    }
}

impl std::fmt::Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.5}, {:.5}", self.lat, self.lng)
    }
}
