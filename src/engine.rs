//! Alert engine
//!
//! Ties ranking and dispatch together: validate the contacts, rank them
//! against the user's location, then notify the top-ranked contact and the
//! ancillary recipients.

use crate::config::Config;
use crate::coord::Coordinate;
use crate::dispatch::{
    AlertDispatcher, AlertEvent, AncillaryRecipient, ConsoleChannel, DeliveryReport,
    EmailChannel, Mailer, MessageComposer, MessagingChannel, Messenger, SubjectInfo,
};
use crate::error::{Error, Result};
use crate::geo::{GeoBackend, GeoProvider, PlaceCache, PlaceResolver};
use crate::ranking::{validate_contacts, ContactRanker, EmergencyContact, Ranking};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

/// Ranking used for an alert and what happened when it was sent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertOutcome {
    pub ranking: Ranking,
    pub report: DeliveryReport,
}

/// Engine wired from configuration
pub type ConfiguredEngine = AlertEngine<GeoProvider, Messenger, Mailer>;

#[derive(Debug)]
pub struct AlertEngine<B, M, E> {
    ranker: ContactRanker<B>,
    dispatcher: AlertDispatcher<M, E>,
}

impl ConfiguredEngine {
    /// Build providers, cache and weights from `config`
    pub fn from_config(config: &Config) -> Result<Self> {
        let timeout = config.dispatch.send_timeout();
        let messenger = Messenger::from_config(&config.messaging, timeout)?;
        let mailer = Mailer::from_config(&config.email, timeout)?;
        Self::with_channels(config, messenger, mailer)
    }

    /// Like `from_config`, but every send is logged instead of delivered
    pub fn dry_run(config: &Config) -> Result<Self> {
        Self::with_channels(
            config,
            Messenger::Console(ConsoleChannel),
            Mailer::Console(ConsoleChannel),
        )
    }

    fn with_channels(config: &Config, messenger: Messenger, mailer: Mailer) -> Result<Self> {
        let backend = GeoProvider::from_config(&config.geocoding)?;
        let resolver = PlaceResolver::new(backend, Arc::new(PlaceCache::new()))
            .with_timeout(config.geocoding.timeout());
        let ranker = ContactRanker::new(Arc::new(resolver), config.ranking)
            .with_max_concurrent_lookups(config.geocoding.max_concurrent_lookups);

        let composer = MessageComposer::new(config.url_template(None)?);
        let dispatcher = AlertDispatcher::new(messenger, mailer, composer)
            .with_send_timeout(config.dispatch.send_timeout())
            .with_country_code(config.dispatch.default_country_code.clone());

        Ok(Self::new(ranker, dispatcher))
    }
}

impl<B, M, E> AlertEngine<B, M, E>
where
    B: GeoBackend + 'static,
    M: MessagingChannel + 'static,
    E: EmailChannel + 'static,
{
    pub fn new(ranker: ContactRanker<B>, dispatcher: AlertDispatcher<M, E>) -> Self {
        Self { ranker, dispatcher }
    }

    pub fn ranker(&self) -> &ContactRanker<B> {
        &self.ranker
    }

    pub fn dispatcher(&self) -> &AlertDispatcher<M, E> {
        &self.dispatcher
    }

    /// Rank without notifying anyone
    pub async fn rank(
        &self,
        contacts: &[EmergencyContact],
        user: Option<Coordinate>,
    ) -> Result<Ranking> {
        self.ranker.rank(contacts, user).await
    }

    /// Pick the best contact for the user's location and alert them
    ///
    /// Input errors are returned before any lookup or send. When nobody
    /// could be reached the error carries the delivery report.
    pub async fn select_and_notify(
        &self,
        contacts: &[EmergencyContact],
        user: Option<Coordinate>,
        subject: SubjectInfo,
        ancillary: Vec<AncillaryRecipient>,
    ) -> Result<AlertOutcome> {
        validate_contacts(contacts)?;
        if let Some(coord) = user {
            coord.validate()?;
        }

        let ranking = self.ranker.rank(contacts, user).await?;
        let primary = ranking.best().cloned().ok_or(Error::EmptyContacts)?;

        let event = AlertEvent {
            subject,
            coordinate: user,
            user_place: ranking.user_place.clone(),
            primary,
            ancillary,
        };

        let report = self.dispatcher.dispatch(&event).await?;
        info!(
            alert_id = %report.alert_id,
            succeeded = report.succeeded_count,
            failed = report.failed_count,
            "Alert dispatched"
        );

        Ok(AlertOutcome { ranking, report })
    }
}
