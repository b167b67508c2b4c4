//! Delivery channel traits and the configured providers
//!
//! ## Flex Point
//! Adding a provider means implementing `MessagingChannel` or
//! `EmailChannel` and adding a variant to `Messenger` / `Mailer`.

use crate::config::{EmailConfig, MessagingConfig};
use crate::dispatch::console::ConsoleChannel;
use crate::dispatch::email::HttpEmailSender;
use crate::dispatch::twilio::TwilioMessenger;
use crate::error::{Error, Result};
use std::future::Future;
use std::time::Duration;

/// Chat-style messaging to a phone number
pub trait MessagingChannel: Send + Sync {
    fn name(&self) -> &'static str;

    /// Send `body` to `phone` (E.164, including country code)
    fn send_message(&self, phone: &str, body: &str) -> impl Future<Output = Result<()>> + Send;
}

/// Email delivery
pub trait EmailChannel: Send + Sync {
    fn name(&self) -> &'static str;

    fn send_email(
        &self,
        address: &str,
        subject: &str,
        body: &str,
    ) -> impl Future<Output = Result<()>> + Send;
}

/// Messaging provider selected from configuration
#[derive(Debug)]
pub enum Messenger {
    Twilio(TwilioMessenger),
    Console(ConsoleChannel),
}

impl Messenger {
    /// Build the provider named by `messaging.provider`
    pub fn from_config(config: &MessagingConfig, timeout: Duration) -> Result<Self> {
        match config.provider.as_str() {
            "twilio" => Ok(Self::Twilio(TwilioMessenger::new(config, timeout)?)),
            "console" => Ok(Self::Console(ConsoleChannel)),
            other => Err(Error::Config(format!("Unknown messaging provider: {}", other))),
        }
    }
}

impl MessagingChannel for Messenger {
    fn name(&self) -> &'static str {
        match self {
            Self::Twilio(m) => m.name(),
            Self::Console(c) => MessagingChannel::name(c),
        }
    }

    async fn send_message(&self, phone: &str, body: &str) -> Result<()> {
        match self {
            Self::Twilio(m) => m.send_message(phone, body).await,
            Self::Console(c) => c.send_message(phone, body).await,
        }
    }
}

/// Email provider selected from configuration
#[derive(Debug)]
pub enum Mailer {
    Http(HttpEmailSender),
    Console(ConsoleChannel),
}

impl Mailer {
    /// Build the provider named by `email.provider`
    pub fn from_config(config: &EmailConfig, timeout: Duration) -> Result<Self> {
        match config.provider.as_str() {
            "http" => Ok(Self::Http(HttpEmailSender::new(config, timeout)?)),
            "console" => Ok(Self::Console(ConsoleChannel)),
            other => Err(Error::Config(format!("Unknown email provider: {}", other))),
        }
    }
}

impl EmailChannel for Mailer {
    fn name(&self) -> &'static str {
        match self {
            Self::Http(m) => m.name(),
            Self::Console(c) => EmailChannel::name(c),
        }
    }

    async fn send_email(&self, address: &str, subject: &str, body: &str) -> Result<()> {
        match self {
            Self::Http(m) => m.send_email(address, subject, body).await,
            Self::Console(c) => c.send_email(address, subject, body).await,
        }
    }
}
