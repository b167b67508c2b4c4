//! Contact and score types

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

fn default_priority() -> u32 {
    1
}

/// A registered emergency contact
///
/// Lower `priority` numbers take precedence. `place` is a free-text city or
/// locality; records that call it `city` are accepted too.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmergencyContact {
    pub name: String,

    #[serde(default)]
    pub phone: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[serde(default)]
    pub relation: String,

    #[serde(default, alias = "city", skip_serializing_if = "Option::is_none")]
    pub place: Option<String>,

    #[serde(default = "default_priority")]
    pub priority: u32,
}

impl EmergencyContact {
    pub fn new(name: impl Into<String>, phone: impl Into<String>, priority: u32) -> Self {
        Self {
            name: name.into(),
            phone: phone.into(),
            email: None,
            relation: String::new(),
            place: None,
            priority,
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_place(mut self, place: impl Into<String>) -> Self {
        self.place = Some(place.into());
        self
    }

    pub fn with_relation(mut self, relation: impl Into<String>) -> Self {
        self.relation = relation.into();
        self
    }

    /// Phone number, if one is registered
    pub fn reachable_phone(&self) -> Option<&str> {
        Some(self.phone.trim()).filter(|p| !p.is_empty())
    }

    /// Email address, if one is registered
    pub fn reachable_email(&self) -> Option<&str> {
        self.email
            .as_deref()
            .map(str::trim)
            .filter(|e| !e.is_empty())
    }

    /// Check the contact's own invariants
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::InvalidContact("contact name is empty".to_string()));
        }
        if self.priority == 0 {
            return Err(Error::InvalidContact(format!(
                "priority for {} must be at least 1",
                self.name
            )));
        }
        Ok(())
    }
}

/// Per-term contributions to a contact's score
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub priority_score: f64,
    pub distance_score: f64,
    /// Zero, or the negated exact-place bonus
    pub place_bonus: f64,
}

impl ScoreBreakdown {
    pub fn total(&self) -> f64 {
        self.priority_score + self.distance_score + self.place_bonus
    }
}

/// A contact with its ranking inputs and score. Lower score ranks first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredContact {
    pub contact: EmergencyContact,
    pub distance_km: f64,
    /// `distance_km` is the configured fallback, not a measured distance
    #[serde(default)]
    pub distance_is_fallback: bool,
    pub is_exact_place_match: bool,
    pub score: f64,
    pub breakdown: ScoreBreakdown,
}

/// Contacts ordered best-first, plus the user's resolved place
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ranking {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_place: Option<String>,
    pub contacts: Vec<ScoredContact>,
}

impl Ranking {
    /// The top-ranked contact
    pub fn best(&self) -> Option<&ScoredContact> {
        self.contacts.first()
    }

    pub fn len(&self) -> usize {
        self.contacts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contacts.is_empty()
    }
}
