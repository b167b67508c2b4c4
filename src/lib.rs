//! sos-relay: Emergency contact ranking and SOS alert dispatch
//!
//! A library, CLI and HTTP API that picks the best emergency contact for a
//! user's location and notifies them over messaging and email.
//!
//! ## Features
//!
//! - Priority/distance/same-place contact scoring
//! - Forward and reverse geocoding (Nominatim or a static gazetteer) with a
//!   shared single-flight cache
//! - Concurrent alert fan-out with per-send timeouts and a delivery report
//! - HTTP API + CLI interface
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use sos_relay::config::Config;
//! use sos_relay::dispatch::SubjectInfo;
//! use sos_relay::engine::ConfiguredEngine;
//! use sos_relay::ranking::EmergencyContact;
//! use sos_relay::Coordinate;
//!
//! # async fn demo() -> sos_relay::Result<()> {
//! let engine = ConfiguredEngine::from_config(&Config::default())?;
//! let contacts = vec![
//!     EmergencyContact::new("Asha", "9876543210", 1).with_place("Mumbai"),
//!     EmergencyContact::new("Vikram", "9811111111", 2).with_place("Delhi"),
//! ];
//! let subject = SubjectInfo { name: "Ravi".to_string(), phone: None };
//!
//! let outcome = engine
//!     .select_and_notify(&contacts, Some(Coordinate::new(19.076, 72.8777)), subject, Vec::new())
//!     .await?;
//! println!("Alerted {}", outcome.ranking.best().map(|c| c.contact.name.as_str()).unwrap_or("-"));
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod constants;
pub mod coord;
pub mod dispatch;
pub mod engine;
pub mod error;
pub mod format;
pub mod geo;
pub mod ranking;
pub mod server;

// Re-export commonly used types
pub use config::Config;
pub use coord::Coordinate;
pub use dispatch::{DeliveryReport, SubjectInfo};
pub use engine::{AlertEngine, AlertOutcome, ConfiguredEngine};
pub use error::{Error, Result};
pub use ranking::{EmergencyContact, Ranking, ScoredContact};
