//! JSON output formatter

use crate::dispatch::DeliveryReport;
use crate::engine::AlertOutcome;
use crate::error::Result;
use crate::format::OutputFormatter;
use crate::ranking::Ranking;

/// Pretty-printed JSON, the same shapes the HTTP API returns
pub struct JsonFormatter;

impl OutputFormatter for JsonFormatter {
    fn name(&self) -> &str {
        "json"
    }

    fn description(&self) -> &str {
        "Full JSON response"
    }

    fn format_ranking(&self, ranking: &Ranking) -> Result<String> {
        Ok(serde_json::to_string_pretty(ranking)?)
    }

    fn format_report(&self, report: &DeliveryReport) -> Result<String> {
        Ok(serde_json::to_string_pretty(report)?)
    }

    fn format_outcome(&self, outcome: &AlertOutcome) -> Result<String> {
        Ok(serde_json::to_string_pretty(outcome)?)
    }
}
