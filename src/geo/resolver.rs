//! Place resolution with caching and graceful degradation
//!
//! Wraps a `GeoBackend` so that provider errors, timeouts and misses all
//! come back as `None`. Callers fall back to default distances instead of
//! failing.

use crate::config::defaults::DEFAULT_GEO_TIMEOUT_SECS;
use crate::coord::Coordinate;
use crate::geo::{GeoBackend, PlaceCache, PlaceKey};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, warn};

/// Resolves places through a backend and a shared cache
#[derive(Debug)]
pub struct PlaceResolver<B> {
    backend: B,
    cache: Arc<PlaceCache>,
    lookup_timeout: Duration,
}

impl<B: GeoBackend> PlaceResolver<B> {
    pub fn new(backend: B, cache: Arc<PlaceCache>) -> Self {
        Self {
            backend,
            cache,
            lookup_timeout: Duration::from_secs(DEFAULT_GEO_TIMEOUT_SECS),
        }
    }

    /// Bound every backend call by `lookup_timeout`
    pub fn with_timeout(mut self, lookup_timeout: Duration) -> Self {
        self.lookup_timeout = lookup_timeout;
        self
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn cache(&self) -> &Arc<PlaceCache> {
        &self.cache
    }

    /// Resolve a coordinate to a place name, or None on any failure
    pub async fn reverse_resolve(&self, coord: Coordinate) -> Option<String> {
        match timeout(self.lookup_timeout, self.backend.reverse_geocode(coord)).await {
            Ok(Ok(Some(place))) => {
                let place = place.trim().to_string();
                if place.is_empty() {
                    None
                } else {
                    debug!(%coord, place = %place, "Reverse geocoded user location");
                    Some(place)
                }
            }
            Ok(Ok(None)) => {
                debug!(%coord, "No place found for coordinate");
                None
            }
            Ok(Err(e)) => {
                warn!(
                    %coord,
                    backend = self.backend.name(),
                    error = %e,
                    "Reverse geocoding failed"
                );
                None
            }
            Err(_) => {
                warn!(
                    %coord,
                    backend = self.backend.name(),
                    timeout_secs = self.lookup_timeout.as_secs_f64(),
                    "Reverse geocoding timed out"
                );
                None
            }
        }
    }

    /// Resolve a place name to a coordinate, consulting the cache first
    pub async fn forward_resolve(&self, place: &str) -> Option<Coordinate> {
        let key = PlaceKey::new(place);
        if key.is_empty() {
            return None;
        }
        self.forward_resolve_key(&key).await
    }

    /// Resolve an already-normalized place
    ///
    /// Successful lookups are cached; failures are not.
    pub async fn forward_resolve_key(&self, key: &PlaceKey) -> Option<Coordinate> {
        if let Some(coord) = self.cache.get(key) {
            debug!(place = %key, "Place cache hit");
            return Some(coord);
        }

        self.cache
            .get_or_fetch(key, || self.lookup(key))
            .await
    }

    async fn lookup(&self, key: &PlaceKey) -> Option<Coordinate> {
        debug!(place = %key, backend = self.backend.name(), "Place cache miss, querying backend");

        match timeout(self.lookup_timeout, self.backend.geocode(key.as_str())).await {
            Ok(Ok(Some(coord))) => match coord.validate() {
                Ok(()) => Some(coord),
                Err(e) => {
                    warn!(place = %key, error = %e, "Backend returned an invalid coordinate");
                    None
                }
            },
            Ok(Ok(None)) => {
                debug!(place = %key, "No coordinate found for place");
                None
            }
            Ok(Err(e)) => {
                warn!(place = %key, backend = self.backend.name(), error = %e, "Geocoding failed");
                None
            }
            Err(_) => {
                warn!(
                    place = %key,
                    backend = self.backend.name(),
                    timeout_secs = self.lookup_timeout.as_secs_f64(),
                    "Geocoding timed out"
                );
                None
            }
        }
    }
}
