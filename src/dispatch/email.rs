//! HTTP email backend
//!
//! Posts plain-text mail to a JSON mail API using the SendGrid v3
//! `mail/send` request shape with bearer authentication.

use crate::config::EmailConfig;
use crate::constants::api::USER_AGENT;
use crate::dispatch::EmailChannel;
use crate::error::{Error, Result};
use serde::Serialize;
use std::time::Duration;

/// HTTP mail API backend
#[derive(Debug, Clone)]
pub struct HttpEmailSender {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    from: String,
}

#[derive(Debug, Serialize)]
struct MailRequest<'a> {
    personalizations: [Personalization<'a>; 1],
    from: Address<'a>,
    subject: &'a str,
    content: [Content<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Personalization<'a> {
    to: [Address<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Address<'a> {
    email: &'a str,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    #[serde(rename = "type")]
    kind: &'a str,
    value: &'a str,
}

impl<'a> MailRequest<'a> {
    fn plain_text(from: &'a str, to: &'a str, subject: &'a str, body: &'a str) -> Self {
        Self {
            personalizations: [Personalization {
                to: [Address { email: to }],
            }],
            from: Address { email: from },
            subject,
            content: [Content {
                kind: "text/plain",
                value: body,
            }],
        }
    }
}

impl HttpEmailSender {
    /// Create a backend from config; API key and sender address are required
    pub fn new(config: &EmailConfig, timeout: Duration) -> Result<Self> {
        if config.api_key.trim().is_empty() {
            return Err(Error::Config("email.api_key is required for HTTP email".to_string()));
        }
        if config.from.trim().is_empty() {
            return Err(Error::Config("email.from is required for HTTP email".to_string()));
        }

        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Delivery(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            api_key: config.api_key.clone(),
            from: config.from.clone(),
        })
    }
}

impl EmailChannel for HttpEmailSender {
    fn name(&self) -> &'static str {
        "http"
    }

    async fn send_email(&self, address: &str, subject: &str, body: &str) -> Result<()> {
        let request = MailRequest::plain_text(&self.from, address, subject, body);

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Delivery(format!("Mail API request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(Error::Delivery(format!(
                "Mail API returned status {}: {}",
                status,
                detail.trim()
            )));
        }

        Ok(())
    }
}
