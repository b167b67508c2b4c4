//! Contact ranking
//!
//! Scores every emergency contact by priority, distance from the user and
//! whether they share the user's place, then orders them best-first.
//!
//! ## Score
//!
//! `score = priority * priority_weight + distance_km - (exact place ? exact_place_bonus : 0)`
//!
//! With the default weights (100 / 50 km fallback / 25) priority dominates,
//! distance breaks ties within a priority band, and a same-place contact
//! beats a merely closer contact of the same priority.
//!
//! ## Degradation
//!
//! Distance falls back to `fallback_distance_km` when the user has no
//! coordinate, the user's place can't be resolved, the contact has no place,
//! or the contact's place can't be geocoded. None of these abort ranking.

pub mod contact;


pub use contact::{EmergencyContact, Ranking, ScoreBreakdown, ScoredContact};

use crate::config::defaults::DEFAULT_MAX_CONCURRENT_LOOKUPS;
use crate::config::RankingConfig;
use crate::coord::{distance_km, Coordinate};
use crate::error::{Error, Result};
use crate::geo::{GeoBackend, PlaceKey, PlaceResolver};
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

/// Reject inputs ranking can't work with, before any I/O
pub fn validate_contacts(contacts: &[EmergencyContact]) -> Result<()> {
    if contacts.is_empty() {
        return Err(Error::EmptyContacts);
    }
    contacts.iter().try_for_each(EmergencyContact::validate)
}

/// Scores and orders emergency contacts
#[derive(Debug)]
pub struct ContactRanker<B> {
    resolver: Arc<PlaceResolver<B>>,
    weights: RankingConfig,
    max_concurrent_lookups: usize,
}

impl<B: GeoBackend + 'static> ContactRanker<B> {
    pub fn new(resolver: Arc<PlaceResolver<B>>, weights: RankingConfig) -> Self {
        Self {
            resolver,
            weights,
            max_concurrent_lookups: DEFAULT_MAX_CONCURRENT_LOOKUPS,
        }
    }

    /// Cap on forward lookups in flight during one `rank` call
    pub fn with_max_concurrent_lookups(mut self, max: usize) -> Self {
        self.max_concurrent_lookups = max.max(1);
        self
    }

    pub fn resolver(&self) -> &Arc<PlaceResolver<B>> {
        &self.resolver
    }

    pub fn weights(&self) -> &RankingConfig {
        &self.weights
    }

    /// Rank contacts relative to the user's location
    ///
    /// Returns every contact, lowest score first. Equal scores keep their
    /// input order. Fails only for invalid input.
    pub async fn rank(
        &self,
        contacts: &[EmergencyContact],
        user: Option<Coordinate>,
    ) -> Result<Ranking> {
        validate_contacts(contacts)?;
        if let Some(coord) = user {
            coord.validate()?;
        }

        let fallback = (None, false);

        let (user_place, placements) = match user {
            None => {
                debug!("No user coordinate, ranking by priority only");
                (None, vec![fallback; contacts.len()])
            }
            Some(coord) => match self.resolver.reverse_resolve(coord).await {
                None => {
                    debug!(%coord, "User place unresolved, using fallback distance for everyone");
                    (None, vec![fallback; contacts.len()])
                }
                Some(place) => {
                    let placements = self.place_contacts(contacts, coord, &place).await;
                    (Some(place), placements)
                }
            },
        };

        let mut scored: Vec<ScoredContact> = contacts
            .iter()
            .zip(placements)
            .map(|(contact, (measured, exact))| self.score(contact, measured, exact))
            .collect();

        // Stable: equal scores keep input order
        scored.sort_by(|a, b| a.score.total_cmp(&b.score));

        for (position, entry) in scored.iter().enumerate() {
            debug!(
                position,
                contact = %entry.contact.name,
                priority = entry.contact.priority,
                distance_km = entry.distance_km,
                exact_place = entry.is_exact_place_match,
                score = entry.score,
                "Ranked contact"
            );
        }

        if let Some(best) = scored.first() {
            info!(
                contact = %best.contact.name,
                score = best.score,
                user_place = user_place.as_deref().unwrap_or("unknown"),
                candidates = scored.len(),
                "Selected emergency contact"
            );
        }

        Ok(Ranking {
            user_place,
            contacts: scored,
        })
    }

    /// Compute (measured distance, exact place match) for each contact
    ///
    /// A `None` distance means the fallback applies.
    async fn place_contacts(
        &self,
        contacts: &[EmergencyContact],
        user: Coordinate,
        user_place: &str,
    ) -> Vec<(Option<f64>, bool)> {
        let user_key = PlaceKey::new(user_place);

        let keys: Vec<Option<PlaceKey>> = contacts
            .iter()
            .map(|c| c.place.as_deref().map(PlaceKey::new).filter(|k| !k.is_empty()))
            .collect();

        let pending: BTreeSet<PlaceKey> = keys
            .iter()
            .flatten()
            .filter(|k| **k != user_key)
            .cloned()
            .collect();

        let resolved = self.resolve_places(pending).await;

        keys.iter()
            .map(|key| match key {
                None => (None, false),
                Some(key) if *key == user_key => (Some(0.0), true),
                Some(key) => (resolved.get(key).map(|coord| distance_km(user, *coord)), false),
            })
            .collect()
    }

    /// Forward-resolve distinct places concurrently, bounded by the lookup cap
    async fn resolve_places(&self, places: BTreeSet<PlaceKey>) -> HashMap<PlaceKey, Coordinate> {
        let limiter = Arc::new(Semaphore::new(self.max_concurrent_lookups));
        let mut lookups = JoinSet::new();

        for key in places {
            let resolver = Arc::clone(&self.resolver);
            let limiter = Arc::clone(&limiter);

            lookups.spawn(async move {
                let _permit = limiter.acquire_owned().await.ok()?;
                let coord = resolver.forward_resolve_key(&key).await?;
                Some((key, coord))
            });
        }

        let mut resolved = HashMap::new();
        while let Some(joined) = lookups.join_next().await {
            match joined {
                Ok(Some((key, coord))) => {
                    resolved.insert(key, coord);
                }
                Ok(None) => {}
                Err(e) => warn!(error = %e, "Place lookup task failed"),
            }
        }
        resolved
    }

    fn score(
        &self,
        contact: &EmergencyContact,
        measured: Option<f64>,
        exact: bool,
    ) -> ScoredContact {
        let distance_km = measured.unwrap_or(self.weights.fallback_distance_km);
        let breakdown = ScoreBreakdown {
            priority_score: f64::from(contact.priority) * self.weights.priority_weight,
            distance_score: distance_km,
            place_bonus: if exact {
                -self.weights.exact_place_bonus
            } else {
                0.0
            },
        };

        ScoredContact {
            contact: contact.clone(),
            distance_km,
            distance_is_fallback: measured.is_none(),
            is_exact_place_match: exact,
            score: breakdown.total(),
            breakdown,
        }
    }
}
