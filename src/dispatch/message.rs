//! Alert message text
//!
//! Builds the bodies sent to the primary contact and to ancillary
//! recipients. The primary contact's copy also explains why they were
//! picked, so they can judge how urgent it is for them.

use crate::coord::Coordinate;
use crate::dispatch::AlertEvent;
use std::fmt::Write;

/// Prefix `phone` with `country_code` unless it already carries one
///
/// Spaces, dashes and parentheses are stripped first.
pub fn normalize_phone(phone: &str, country_code: &str) -> String {
    let digits: String = phone
        .chars()
        .filter(|c| !c.is_whitespace() && !matches!(c, '-' | '(' | ')'))
        .collect();

    if digits.starts_with('+') {
        digits
    } else {
        format!("{}{}", country_code, digits)
    }
}

/// Formats alert messages
#[derive(Debug, Clone)]
pub struct MessageComposer {
    /// Map URL with `{lat}` / `{lng}` placeholders
    map_url_template: String,
}

impl MessageComposer {
    pub fn new(map_url_template: impl Into<String>) -> Self {
        Self {
            map_url_template: map_url_template.into(),
        }
    }

    pub fn map_link(&self, coord: Coordinate) -> String {
        self.map_url_template
            .replace("{lat}", &coord.lat.to_string())
            .replace("{lng}", &coord.lng.to_string())
    }

    /// Email subject line
    pub fn subject(&self, event: &AlertEvent) -> String {
        format!("SOS Alert: {} needs help", event.subject.name)
    }

    /// Body for the selected emergency contact
    pub fn primary_body(&self, event: &AlertEvent) -> String {
        let mut body = self.header(event);
        let primary = &event.primary;

        let place = primary
            .contact
            .place
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .unwrap_or("not registered");

        let _ = write!(
            body,
            "\nYou were selected as the emergency contact: priority {}, your place {}, ",
            primary.contact.priority, place
        );
        if primary.distance_is_fallback {
            body.push_str("distance unknown");
        } else {
            let _ = write!(body, "{:.1} km away", primary.distance_km);
        }
        if primary.is_exact_place_match {
            body.push_str(" (same place as the emergency)");
        }
        body.push('.');
        body
    }

    /// Body for ancillary recipients (insurance provider etc.)
    pub fn ancillary_body(&self, event: &AlertEvent) -> String {
        let mut body = self.header(event);
        let contact = &event.primary.contact;

        let _ = write!(body, "\nEmergency contact notified: {}", contact.name);
        if !contact.relation.trim().is_empty() {
            let _ = write!(body, " ({})", contact.relation.trim());
        }
        body.push('.');
        body
    }

    fn header(&self, event: &AlertEvent) -> String {
        let mut body = format!("🚨 SOS Alert: {} triggered an emergency!\n", event.subject.name);

        if let Some(phone) = event
            .subject
            .phone
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
        {
            let _ = writeln!(body, "📞 Phone: {}", phone);
        }

        match event.coordinate {
            Some(coord) => {
                let _ = writeln!(body, "📍 Location: {}", self.map_link(coord));
            }
            None => body.push_str("📍 Location: not available\n"),
        }

        if let Some(place) = &event.user_place {
            let _ = writeln!(body, "Near: {}", place);
        }

        body
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::{AncillaryRecipient, SubjectInfo};
    use crate::ranking::{EmergencyContact, ScoreBreakdown, ScoredContact};

    fn event(coordinate: Option<Coordinate>, exact: bool) -> AlertEvent {
        let contact = EmergencyContact::new("Asha", "9876543210", 1)
            .with_place("Mumbai")
            .with_relation("sister");
        let distance_km = if exact { 0.0 } else { 12.34 };

        AlertEvent {
            subject: SubjectInfo {
                name: "Ravi".to_string(),
                phone: Some("+919000000000".to_string()),
            },
            coordinate,
            user_place: coordinate.map(|_| "Mumbai".to_string()),
            primary: ScoredContact {
                contact,
                distance_km,
                distance_is_fallback: false,
                is_exact_place_match: exact,
                score: 0.0,
                breakdown: ScoreBreakdown {
                    priority_score: 100.0,
                    distance_score: distance_km,
                    place_bonus: 0.0,
                },
            },
            ancillary: vec![AncillaryRecipient::new("insurance", "claims@example.com")],
        }
    }

    fn composer() -> MessageComposer {
        MessageComposer::new("https://www.google.com/maps?q={lat},{lng}")
    }

    #[test]
    fn test_normalize_phone() {
        assert_eq!(normalize_phone("98765 43210", "+91"), "+919876543210");
        assert_eq!(normalize_phone("+1 (415) 523-8886", "+91"), "+14155238886");
        assert_eq!(normalize_phone("020-555", "+44"), "+44020555");
    }

    #[test]
    fn test_primary_body_with_location() {
        let body = composer().primary_body(&event(Some(Coordinate::new(19.076, 72.8777)), true));

        assert!(body.contains("Ravi triggered an emergency"));
        assert!(body.contains("Phone: +919000000000"));
        assert!(body.contains("https://www.google.com/maps?q=19.076,72.8777"));
        assert!(body.contains("Near: Mumbai"));
        assert!(body.contains("priority 1"));
        assert!(body.contains("your place Mumbai"));
        assert!(body.contains("0.0 km away (same place as the emergency)"));
    }

    #[test]
    fn test_primary_body_without_location() {
        let body = composer().primary_body(&event(None, false));

        assert!(body.contains("Location: not available"));
        assert!(!body.contains("Near:"));
        assert!(body.contains("12.3 km away."));
        assert!(!body.contains("same place"));
    }

    #[test]
    fn test_primary_body_fallback_distance() {
        let mut event = event(None, false);
        event.primary.distance_km = 50.0;
        event.primary.distance_is_fallback = true;

        let body = composer().primary_body(&event);

        assert!(body.contains("your place Mumbai, distance unknown."));
        assert!(!body.contains("km away"));
    }

    #[test]
    fn test_ancillary_body_omits_rationale() {
        let body = composer().ancillary_body(&event(Some(Coordinate::new(1.0, 2.0)), true));

        assert!(body.contains("Emergency contact notified: Asha (sister)."));
        assert!(!body.contains("priority"));
    }

    #[test]
    fn test_subject() {
        assert_eq!(composer().subject(&event(None, false)), "SOS Alert: Ravi needs help");
    }
}
