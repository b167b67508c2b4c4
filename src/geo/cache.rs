//! In-memory place coordinate cache
//!
//! Maps normalized place names to coordinates for the lifetime of the
//! cache. Each key has its own `OnceCell`, so concurrent lookups of the same
//! uncached place share one upstream call. Failed fetches are not kept:
//! the empty slot is removed and the next caller tries again.

use crate::coord::Coordinate;
use crate::geo::PlaceKey;
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::OnceCell;

type Slot = Arc<OnceCell<Coordinate>>;

/// Thread-safe place -> coordinate cache
#[derive(Debug, Default)]
pub struct PlaceCache {
    slots: Mutex<HashMap<PlaceKey, Slot>>,
}

impl PlaceCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a cache pre-populated with known places
    pub fn seeded<'a>(entries: impl IntoIterator<Item = (&'a str, Coordinate)>) -> Self {
        let cache = Self::new();
        for (place, coord) in entries {
            cache.put(&PlaceKey::new(place), coord);
        }
        cache
    }

    /// Get a cached coordinate
    pub fn get(&self, key: &PlaceKey) -> Option<Coordinate> {
        self.lock().get(key).and_then(|slot| slot.get().copied())
    }

    /// Store a coordinate. An entry, once written, is never replaced.
    pub fn put(&self, key: &PlaceKey, coord: Coordinate) {
        let _ = self.slot(key).set(coord);
    }

    /// Return the cached coordinate, or run `fetch` and cache its result
    ///
    /// Only one `fetch` runs at a time per key; callers arriving meanwhile
    /// wait for it. A `None` result is not cached.
    pub async fn get_or_fetch<F, Fut>(&self, key: &PlaceKey, fetch: F) -> Option<Coordinate>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Option<Coordinate>>,
    {
        let slot = self.slot(key);
        let coord = slot
            .get_or_try_init(move || async move { fetch().await.ok_or(()) })
            .await
            .ok()
            .copied();
        if coord.is_none() {
            self.release_empty(key, slot);
        }
        coord
    }

    /// Number of resolved places
    pub fn len(&self) -> usize {
        self.lock().values().filter(|slot| slot.initialized()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every entry
    pub fn clear(&self) {
        self.lock().clear();
    }

    fn slot(&self, key: &PlaceKey) -> Slot {
        Arc::clone(self.lock().entry(key.clone()).or_default())
    }

    /// Remove `slot` if it is still empty and no other caller holds it
    ///
    /// Every failing caller releases its handle under the lock, so the last
    /// one out sees only the map's reference.
    fn release_empty(&self, key: &PlaceKey, slot: Slot) {
        let mut slots = self.lock();
        let idle = slots
            .get(key)
            .is_some_and(|held| Arc::ptr_eq(held, &slot) && !held.initialized());
        drop(slot);
        if idle && slots.get(key).is_some_and(|held| Arc::strong_count(held) == 1) {
            slots.remove(key);
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<PlaceKey, Slot>> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
