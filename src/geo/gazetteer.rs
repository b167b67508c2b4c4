//! Static gazetteer backend
//!
//! Resolves places from a fixed table (the `[geocoding.places]` config
//! section). Useful offline and for deterministic deployments where the
//! set of contact places is known up front.

use crate::coord::{distance_km, Coordinate};
use crate::error::Result;
use crate::geo::{GeoBackend, PlaceKey};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Place table backend
#[derive(Debug, Default)]
pub struct StaticBackend {
    /// key -> (display name, coordinate)
    places: BTreeMap<PlaceKey, (String, Coordinate)>,
    match_radius_km: f64,
    lookups: AtomicUsize,
}

impl StaticBackend {
    /// Build from (name, coordinate) pairs
    pub fn from_places<'a>(
        places: impl IntoIterator<Item = (&'a str, Coordinate)>,
        match_radius_km: f64,
    ) -> Self {
        let places = places
            .into_iter()
            .map(|(name, coord)| (PlaceKey::new(name), (name.trim().to_string(), coord)))
            .collect();

        Self {
            places,
            match_radius_km,
            lookups: AtomicUsize::new(0),
        }
    }

    /// Number of geocode/reverse calls served
    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::Relaxed)
    }

    pub fn len(&self) -> usize {
        self.places.len()
    }

    pub fn is_empty(&self) -> bool {
        self.places.is_empty()
    }
}

impl GeoBackend for StaticBackend {
    fn name(&self) -> &'static str {
        "static"
    }

    async fn geocode(&self, place: &str) -> Result<Option<Coordinate>> {
        self.lookups.fetch_add(1, Ordering::Relaxed);
        Ok(self.places.get(&PlaceKey::new(place)).map(|(_, coord)| *coord))
    }

    async fn reverse_geocode(&self, coord: Coordinate) -> Result<Option<String>> {
        self.lookups.fetch_add(1, Ordering::Relaxed);

        let nearest = self
            .places
            .values()
            .map(|(name, known)| (name, distance_km(coord, *known)))
            .filter(|(_, d)| *d <= self.match_radius_km)
            .min_by(|a, b| a.1.total_cmp(&b.1));

        Ok(nearest.map(|(name, _)| name.clone()))
    }
}
