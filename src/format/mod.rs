//! Output formatters
//!
//! Renders rankings and alert outcomes for the CLI.

pub mod json;
pub mod text;

use crate::dispatch::DeliveryReport;
use crate::engine::AlertOutcome;
use crate::error::{Error, Result};
use crate::ranking::Ranking;
use serde::{Deserialize, Serialize};

/// Information about an output format
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormatInfo {
    pub name: String,
    pub description: String,
}

/// Trait for output formatters
pub trait OutputFormatter: Send + Sync {
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    /// Format a contact ranking
    fn format_ranking(&self, ranking: &Ranking) -> Result<String>;

    /// Format a delivery report on its own (e.g. after total failure)
    fn format_report(&self, report: &DeliveryReport) -> Result<String>;

    /// Format a dispatched alert
    fn format_outcome(&self, outcome: &AlertOutcome) -> Result<String>;
}

/// Get a formatter by name
pub fn get_formatter(name: &str) -> Option<Box<dyn OutputFormatter>> {
    match name.to_lowercase().as_str() {
        "json" => Some(Box::new(json::JsonFormatter)),
        "text" => Some(Box::new(text::TextFormatter)),
        _ => None,
    }
}

/// Get a formatter by name, listing the known formats if there is none
pub fn formatter(name: &str) -> Result<Box<dyn OutputFormatter>> {
    get_formatter(name).ok_or_else(|| {
        let known: Vec<String> = available_formats()
            .iter()
            .map(|f| format!("{} ({})", f.name, f.description))
            .collect();
        Error::Config(format!("Unknown format: {}. Available: {}", name, known.join(", ")))
    })
}

/// List all available formatters
pub fn available_formats() -> Vec<FormatInfo> {
    [&json::JsonFormatter as &dyn OutputFormatter, &text::TextFormatter]
        .into_iter()
        .map(|f| FormatInfo {
            name: f.name().to_string(),
            description: f.description().to_string(),
        })
        .collect()
}
