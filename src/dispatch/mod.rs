//! Alert delivery
//!
//! The dispatcher turns an alert into a set of independent sends (messaging
//! to the selected contact, email to the selected contact and to each
//! ancillary recipient), runs them concurrently with a per-send timeout and
//! collects one outcome per send into a `DeliveryReport`.

pub mod channel;
pub mod console;
pub mod email;
pub mod message;
pub mod report;
pub mod twilio;

pub use channel::{EmailChannel, Mailer, MessagingChannel, Messenger};
pub use console::ConsoleChannel;
pub use email::HttpEmailSender;
pub use message::{normalize_phone, MessageComposer};
pub use report::{DeliveryChannel, DeliveryOutcome, DeliveryReport, DeliveryStatus};
pub use twilio::TwilioMessenger;

use crate::config::defaults::{DEFAULT_COUNTRY_CODE, DEFAULT_SEND_TIMEOUT_SECS};
use crate::coord::Coordinate;
use crate::error::{Error, Result};
use crate::ranking::ScoredContact;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// The person who triggered the alert
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubjectInfo {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

/// Someone who gets a copy of every alert, e.g. an insurance provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AncillaryRecipient {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl AncillaryRecipient {
    pub fn new(label: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            label: Some(label.into()),
            email: Some(email.into()),
        }
    }
}

/// Everything needed to notify people about one emergency
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertEvent {
    pub subject: SubjectInfo,
    pub coordinate: Option<Coordinate>,
    pub user_place: Option<String>,
    /// Top-ranked contact
    pub primary: ScoredContact,
    pub ancillary: Vec<AncillaryRecipient>,
}

/// A single planned send
#[derive(Debug, Clone, PartialEq)]
pub enum Delivery {
    Message { to: String, body: String },
    Email { to: String, subject: String, body: String },
}

impl Delivery {
    pub fn channel(&self) -> DeliveryChannel {
        match self {
            Self::Message { .. } => DeliveryChannel::Messaging,
            Self::Email { .. } => DeliveryChannel::Email,
        }
    }

    pub fn recipient(&self) -> &str {
        match self {
            Self::Message { to, .. } | Self::Email { to, .. } => to,
        }
    }
}

/// Fans an alert out over the messaging and email channels
#[derive(Debug)]
pub struct AlertDispatcher<M, E> {
    messenger: Arc<M>,
    mailer: Arc<E>,
    composer: MessageComposer,
    send_timeout: Duration,
    default_country_code: String,
}

impl<M, E> AlertDispatcher<M, E>
where
    M: MessagingChannel + 'static,
    E: EmailChannel + 'static,
{
    pub fn new(messenger: M, mailer: E, composer: MessageComposer) -> Self {
        Self {
            messenger: Arc::new(messenger),
            mailer: Arc::new(mailer),
            composer,
            send_timeout: Duration::from_secs(DEFAULT_SEND_TIMEOUT_SECS),
            default_country_code: DEFAULT_COUNTRY_CODE.to_string(),
        }
    }

    pub fn with_send_timeout(mut self, timeout: Duration) -> Self {
        self.send_timeout = timeout;
        self
    }

    pub fn with_country_code(mut self, country_code: impl Into<String>) -> Self {
        self.default_country_code = country_code.into();
        self
    }

    pub fn messenger(&self) -> &M {
        &self.messenger
    }

    pub fn mailer(&self) -> &E {
        &self.mailer
    }

    pub fn send_timeout(&self) -> Duration {
        self.send_timeout
    }

    /// Sends for `event`, in reporting order
    ///
    /// Primary messaging first, then primary email, then ancillary emails.
    /// An address already planned (case-insensitive) is not mailed twice.
    pub fn plan(&self, event: &AlertEvent) -> Vec<Delivery> {
        let contact = &event.primary.contact;
        let mut deliveries = Vec::new();
        let mut mailed = HashSet::new();

        if let Some(phone) = contact.reachable_phone() {
            deliveries.push(Delivery::Message {
                to: normalize_phone(phone, &self.default_country_code),
                body: self.composer.primary_body(event),
            });
        }

        let subject = self.composer.subject(event);

        if let Some(email) = contact.reachable_email() {
            mailed.insert(email.to_lowercase());
            deliveries.push(Delivery::Email {
                to: email.to_string(),
                subject: subject.clone(),
                body: self.composer.primary_body(event),
            });
        }

        let ancillary_body = self.composer.ancillary_body(event);
        for recipient in &event.ancillary {
            let email = recipient
                .email
                .as_deref()
                .map(str::trim)
                .filter(|e| !e.is_empty());

            match email {
                Some(email) if mailed.insert(email.to_lowercase()) => {
                    deliveries.push(Delivery::Email {
                        to: email.to_string(),
                        subject: subject.clone(),
                        body: ancillary_body.clone(),
                    });
                }
                Some(email) => debug!(email = %email, "Skipping duplicate recipient"),
                None => debug!(label = ?recipient.label, "Ancillary recipient has no email"),
            }
        }

        deliveries
    }

    /// Attempt every planned send concurrently
    ///
    /// Returns `Error::TotalDeliveryFailure` when there was nobody to send
    /// to or every send failed. Partial failure is an `Ok` report.
    pub async fn dispatch(&self, event: &AlertEvent) -> Result<DeliveryReport> {
        let alert_id = Uuid::new_v4();
        let deliveries = self.plan(event);

        info!(
            %alert_id,
            contact = %event.primary.contact.name,
            sends = deliveries.len(),
            "Dispatching alert"
        );

        if deliveries.is_empty() {
            warn!(%alert_id, "No reachable recipients");
            return Err(Error::TotalDeliveryFailure(DeliveryReport::new(
                alert_id,
                Vec::new(),
            )));
        }

        let mut slots: Vec<Option<DeliveryOutcome>> = vec![None; deliveries.len()];
        let mut tasks = JoinSet::new();

        for (index, delivery) in deliveries.iter().cloned().enumerate() {
            let messenger = Arc::clone(&self.messenger);
            let mailer = Arc::clone(&self.mailer);
            let send_timeout = self.send_timeout;

            tasks.spawn(async move {
                let channel = delivery.channel();
                let result = tokio::time::timeout(send_timeout, async {
                    match &delivery {
                        Delivery::Message { to, body } => messenger.send_message(to, body).await,
                        Delivery::Email { to, subject, body } => {
                            mailer.send_email(to, subject, body).await
                        }
                    }
                })
                .await;

                let outcome = match result {
                    Ok(Ok(())) => DeliveryOutcome::sent(channel, delivery.recipient()),
                    Ok(Err(e)) => {
                        DeliveryOutcome::failed(channel, delivery.recipient(), e.to_string())
                    }
                    Err(_) => DeliveryOutcome::failed(
                        channel,
                        delivery.recipient(),
                        format!("timed out after {:?}", send_timeout),
                    ),
                };
                (index, outcome)
            });
        }

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, outcome)) => slots[index] = Some(outcome),
                Err(e) => warn!(%alert_id, error = %e, "Send task failed"),
            }
        }

        let outcomes: Vec<DeliveryOutcome> = slots
            .into_iter()
            .zip(&deliveries)
            .map(|(slot, delivery)| {
                slot.unwrap_or_else(|| {
                    DeliveryOutcome::failed(
                        delivery.channel(),
                        delivery.recipient(),
                        "send task aborted",
                    )
                })
            })
            .collect();

        for outcome in &outcomes {
            match &outcome.error {
                None => info!(
                    %alert_id,
                    channel = %outcome.channel,
                    to = %outcome.recipient,
                    "Sent"
                ),
                Some(error) => warn!(
                    %alert_id,
                    channel = %outcome.channel,
                    to = %outcome.recipient,
                    error = %error,
                    "Send failed"
                ),
            }
        }

        let report = DeliveryReport::new(alert_id, outcomes);
        if report.is_total_failure() {
            return Err(Error::TotalDeliveryFailure(report));
        }
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ranking::{EmergencyContact, ScoreBreakdown};
    use std::sync::Mutex;

    /// Records every send; optionally fails or stalls
    #[derive(Debug, Default)]
    struct Recorder {
        sent: Mutex<Vec<String>>,
        fail: bool,
        delay: Option<Duration>,
    }

    impl Recorder {
        fn failing() -> Self {
            Self {
                fail: true,
                ..Self::default()
            }
        }

        fn stalled(delay: Duration) -> Self {
            Self {
                delay: Some(delay),
                ..Self::default()
            }
        }

        async fn record(&self, to: &str) -> Result<()> {
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            if self.fail {
                return Err(Error::Delivery("provider unavailable".to_string()));
            }
            self.sent.lock().unwrap().push(to.to_string());
            Ok(())
        }

        fn sent(&self) -> Vec<String> {
            self.sent.lock().unwrap().clone()
        }
    }

    impl MessagingChannel for Recorder {
        fn name(&self) -> &'static str {
            "recorder"
        }

        async fn send_message(&self, phone: &str, _body: &str) -> Result<()> {
            self.record(phone).await
        }
    }

    impl EmailChannel for Recorder {
        fn name(&self) -> &'static str {
            "recorder"
        }

        async fn send_email(&self, address: &str, _subject: &str, _body: &str) -> Result<()> {
            self.record(address).await
        }
    }

    fn event(contact: EmergencyContact, ancillary: Vec<AncillaryRecipient>) -> AlertEvent {
        AlertEvent {
            subject: SubjectInfo {
                name: "Ravi".to_string(),
                phone: None,
            },
            coordinate: Some(Coordinate::new(19.076, 72.8777)),
            user_place: Some("mumbai".to_string()),
            primary: ScoredContact {
                contact,
                distance_km: 0.0,
                distance_is_fallback: false,
                is_exact_place_match: true,
                score: 75.0,
                breakdown: ScoreBreakdown {
                    priority_score: 100.0,
                    distance_score: 0.0,
                    place_bonus: -25.0,
                },
            },
            ancillary,
        }
    }

    fn dispatcher(messenger: Recorder, mailer: Recorder) -> AlertDispatcher<Recorder, Recorder> {
        AlertDispatcher::new(
            messenger,
            mailer,
            MessageComposer::new("https://www.google.com/maps?q={lat},{lng}"),
        )
    }

    fn asha() -> EmergencyContact {
        EmergencyContact::new("Asha", "98765 43210", 1)
            .with_email("asha@example.com")
            .with_place("Mumbai")
    }

    #[tokio::test]
    async fn test_all_channels_sent() {
        let dispatcher = dispatcher(Recorder::default(), Recorder::default());
        let event = event(
            asha(),
            vec![AncillaryRecipient::new("insurance", "claims@example.com")],
        );

        let report = dispatcher.dispatch(&event).await.unwrap();

        assert_eq!(report.succeeded_count, 3);
        assert_eq!(report.failed_count, 0);
        assert_eq!(dispatcher.messenger().sent(), vec!["+919876543210"]);

        let mut mailed = dispatcher.mailer().sent();
        mailed.sort();
        assert_eq!(mailed, vec!["asha@example.com", "claims@example.com"]);
    }

    #[tokio::test]
    async fn test_messaging_fails_email_succeeds() {
        let dispatcher = dispatcher(Recorder::failing(), Recorder::default());
        let event = event(asha(), Vec::new());

        let report = dispatcher.dispatch(&event).await.unwrap();

        assert_eq!(report.succeeded_count, 1);
        assert_eq!(report.failed_count, 1);

        let messaging = &report.outcomes[0];
        assert_eq!(messaging.channel, DeliveryChannel::Messaging);
        assert_eq!(messaging.status, DeliveryStatus::Failed);
        assert!(messaging.error.as_deref().unwrap().contains("provider unavailable"));

        let email = &report.outcomes[1];
        assert_eq!(email.channel, DeliveryChannel::Email);
        assert_eq!(email.status, DeliveryStatus::Sent);
    }

    #[tokio::test]
    async fn test_no_reachable_recipients() {
        let dispatcher = dispatcher(Recorder::default(), Recorder::default());
        let contact = EmergencyContact::new("Asha", "", 1);
        let event = event(contact, vec![AncillaryRecipient {
            label: Some("insurance".to_string()),
            email: None,
        }]);

        let err = dispatcher.dispatch(&event).await.unwrap_err();

        match err {
            Error::TotalDeliveryFailure(report) => {
                assert!(report.outcomes.is_empty());
                assert_eq!(report.succeeded_count, 0);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(dispatcher.messenger().sent().is_empty());
        assert!(dispatcher.mailer().sent().is_empty());
    }

    #[tokio::test]
    async fn test_every_send_failed() {
        let dispatcher = dispatcher(Recorder::failing(), Recorder::failing());
        let event = event(asha(), Vec::new());

        let err = dispatcher.dispatch(&event).await.unwrap_err();

        match err {
            Error::TotalDeliveryFailure(report) => {
                assert_eq!(report.outcomes.len(), 2);
                assert_eq!(report.failed_count, 2);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_send_timeout_recorded_as_failure() {
        let dispatcher = dispatcher(Recorder::default(), Recorder::stalled(Duration::from_secs(5)))
            .with_send_timeout(Duration::from_millis(50));
        let event = event(asha(), Vec::new());

        let report = dispatcher.dispatch(&event).await.unwrap();

        assert_eq!(report.succeeded_count, 1);
        let email = &report.outcomes[1];
        assert_eq!(email.status, DeliveryStatus::Failed);
        assert!(email.error.as_deref().unwrap().contains("timed out"));
    }

    #[test]
    fn test_plan_order_and_dedupe() {
        let dispatcher = dispatcher(Recorder::default(), Recorder::default());
        let event = event(
            asha(),
            vec![
                AncillaryRecipient::new("insurance", "claims@example.com"),
                AncillaryRecipient::new("duplicate", "ASHA@example.com"),
                AncillaryRecipient::new("again", " claims@example.com "),
            ],
        );

        let plan = dispatcher.plan(&event);
        let recipients: Vec<_> = plan.iter().map(Delivery::recipient).collect();

        assert_eq!(
            recipients,
            vec!["+919876543210", "asha@example.com", "claims@example.com"]
        );
        assert_eq!(plan[0].channel(), DeliveryChannel::Messaging);
    }

    #[test]
    fn test_plan_bodies() {
        let dispatcher = dispatcher(Recorder::default(), Recorder::default());
        let event = event(
            asha(),
            vec![AncillaryRecipient::new("insurance", "claims@example.com")],
        );

        let plan = dispatcher.plan(&event);

        match (&plan[1], &plan[2]) {
            (Delivery::Email { body: primary, .. }, Delivery::Email { body: ancillary, subject, .. }) => {
                assert!(primary.contains("selected as the emergency contact"));
                assert!(ancillary.contains("Emergency contact notified: Asha"));
                assert_eq!(subject, "SOS Alert: Ravi needs help");
            }
            other => panic!("unexpected plan: {other:?}"),
        }
    }

    #[test]
    fn test_custom_country_code() {
        let dispatcher =
            dispatcher(Recorder::default(), Recorder::default()).with_country_code("+44");
        let plan = dispatcher.plan(&event(EmergencyContact::new("Sam", "07700 900123", 1), Vec::new()));

        assert_eq!(plan.len(), 1);
        assert_eq!(plan[0].recipient(), "+4407700900123");
    }
}
