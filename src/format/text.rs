//! Human-readable text output formatter

use crate::dispatch::{DeliveryReport, DeliveryStatus};
use crate::engine::AlertOutcome;
use crate::error::Result;
use crate::format::OutputFormatter;
use crate::ranking::Ranking;
use std::fmt::Write;

/// Text formatter - outputs human-readable summary
pub struct TextFormatter;

impl OutputFormatter for TextFormatter {
    fn name(&self) -> &str {
        "text"
    }

    fn description(&self) -> &str {
        "Human-readable text"
    }

    fn format_ranking(&self, ranking: &Ranking) -> Result<String> {
        let mut output = String::new();

        let _ = writeln!(
            output,
            "User place: {}",
            ranking.user_place.as_deref().unwrap_or("unknown")
        );
        output.push_str("\nRanking:\n");

        for (position, entry) in ranking.contacts.iter().enumerate() {
            let _ = writeln!(
                output,
                "  {}. {} (priority {}, {}) score {:.1} = {:.0} + {:.1} km{}{}",
                position + 1,
                entry.contact.name,
                entry.contact.priority,
                entry.contact.place.as_deref().unwrap_or("no place"),
                entry.score,
                entry.breakdown.priority_score,
                entry.distance_km,
                if entry.distance_is_fallback { " (fallback)" } else { "" },
                if entry.is_exact_place_match {
                    format!(" - {:.0} same place", -entry.breakdown.place_bonus)
                } else {
                    String::new()
                }
            );
        }

        Ok(output)
    }

    fn format_report(&self, report: &DeliveryReport) -> Result<String> {
        let mut output = String::new();

        let _ = writeln!(
            output,
            "Alert {} ({})",
            report.alert_id,
            report.dispatched_at.to_rfc3339()
        );
        let _ = writeln!(
            output,
            "Delivered: {} sent, {} failed",
            report.succeeded_count, report.failed_count
        );

        for outcome in &report.outcomes {
            let mark = match outcome.status {
                DeliveryStatus::Sent => "sent",
                DeliveryStatus::Failed => "FAILED",
            };
            let _ = write!(output, "  [{}] {} {}", mark, outcome.channel, outcome.recipient);
            if let Some(error) = &outcome.error {
                let _ = write!(output, ": {}", error);
            }
            output.push('\n');
        }

        Ok(output)
    }

    fn format_outcome(&self, outcome: &AlertOutcome) -> Result<String> {
        let mut output = self.format_ranking(&outcome.ranking)?;
        output.push('\n');
        output.push_str(&self.format_report(&outcome.report)?);
        Ok(output)
    }
}
