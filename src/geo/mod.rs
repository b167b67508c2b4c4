//! Geocoding module
//!
//! Provides place-name geocoding (forward and reverse) behind the
//! `GeoBackend` trait, a coordinate cache, and the `PlaceResolver` that
//! turns provider failures into absent results.

pub mod cache;
pub mod gazetteer;
pub mod nominatim;
pub mod resolver;

pub use cache::PlaceCache;
pub use gazetteer::StaticBackend;
pub use nominatim::NominatimBackend;
pub use resolver::PlaceResolver;

use crate::config::GeocodingConfig;
use crate::coord::Coordinate;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::future::Future;

/// Trait for geocoding backends
pub trait GeoBackend: Send + Sync {
    /// Short backend name (e.g., "nominatim")
    fn name(&self) -> &'static str;

    /// Geocode a place name to coordinates
    ///
    /// Returns the best match for the query, or None if not found
    fn geocode(&self, place: &str) -> impl Future<Output = Result<Option<Coordinate>>> + Send;

    /// Reverse geocode coordinates to a place name (city or locality)
    fn reverse_geocode(
        &self,
        coord: Coordinate,
    ) -> impl Future<Output = Result<Option<String>>> + Send;
}

/// Trim and lower-case a place name for comparison and cache keys
pub fn normalize_place(place: &str) -> String {
    place.trim().to_lowercase()
}

/// A normalized place name: trimmed and lower-cased
///
/// " Mumbai " and "mumbai" produce the same key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlaceKey(String);

impl PlaceKey {
    pub fn new(place: &str) -> Self {
        Self(normalize_place(place))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Display for PlaceKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Geocoding backend selected from configuration
#[derive(Debug)]
pub enum GeoProvider {
    Nominatim(NominatimBackend),
    Static(StaticBackend),
}

impl GeoProvider {
    /// Build the backend named by `geocoding.backend`
    pub fn from_config(config: &GeocodingConfig) -> Result<Self> {
        match config.backend.as_str() {
            "nominatim" => Ok(Self::Nominatim(NominatimBackend::new(
                &config.base_url,
                config.timeout(),
            )?)),
            "static" => Ok(Self::Static(StaticBackend::from_places(
                config.places.iter().map(|(name, coord)| (name.as_str(), *coord)),
                config.match_radius_km,
            ))),
            other => Err(Error::Config(format!("Unknown geocoding backend: {}", other))),
        }
    }
}

impl GeoBackend for GeoProvider {
    fn name(&self) -> &'static str {
        match self {
            Self::Nominatim(b) => b.name(),
            Self::Static(b) => b.name(),
        }
    }

    async fn geocode(&self, place: &str) -> Result<Option<Coordinate>> {
        match self {
            Self::Nominatim(b) => b.geocode(place).await,
            Self::Static(b) => b.geocode(place).await,
        }
    }

    async fn reverse_geocode(&self, coord: Coordinate) -> Result<Option<String>> {
        match self {
            Self::Nominatim(b) => b.reverse_geocode(coord).await,
            Self::Static(b) => b.reverse_geocode(coord).await,
        }
    }
}
