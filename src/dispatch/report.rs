//! Delivery outcomes and the aggregate report

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Notification channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryChannel {
    /// WhatsApp / SMS style messaging to a phone number
    Messaging,
    Email,
}

impl std::fmt::Display for DeliveryChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Messaging => write!(f, "messaging"),
            Self::Email => write!(f, "email"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryStatus {
    Sent,
    Failed,
}

/// Result of one send attempt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryOutcome {
    pub channel: DeliveryChannel,
    pub recipient: String,
    pub status: DeliveryStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DeliveryOutcome {
    pub fn sent(channel: DeliveryChannel, recipient: impl Into<String>) -> Self {
        Self {
            channel,
            recipient: recipient.into(),
            status: DeliveryStatus::Sent,
            error: None,
        }
    }

    pub fn failed(
        channel: DeliveryChannel,
        recipient: impl Into<String>,
        error: impl Into<String>,
    ) -> Self {
        Self {
            channel,
            recipient: recipient.into(),
            status: DeliveryStatus::Failed,
            error: Some(error.into()),
        }
    }

    pub fn is_sent(&self) -> bool {
        self.status == DeliveryStatus::Sent
    }
}

/// Every send attempted for one alert
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryReport {
    /// Correlates log lines for one alert; not persisted
    pub alert_id: Uuid,
    pub dispatched_at: DateTime<Utc>,
    pub outcomes: Vec<DeliveryOutcome>,
    pub succeeded_count: usize,
    pub failed_count: usize,
}

impl DeliveryReport {
    pub fn new(alert_id: Uuid, outcomes: Vec<DeliveryOutcome>) -> Self {
        let succeeded_count = outcomes.iter().filter(|o| o.is_sent()).count();
        let failed_count = outcomes.len() - succeeded_count;

        Self {
            alert_id,
            dispatched_at: Utc::now(),
            outcomes,
            succeeded_count,
            failed_count,
        }
    }

    /// True when nobody was reached
    pub fn is_total_failure(&self) -> bool {
        self.succeeded_count == 0
    }
}
