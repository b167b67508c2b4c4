//! Twilio messaging backend
//!
//! Sends through Twilio's Programmable Messaging REST API. With
//! `messaging.whatsapp = true` both numbers get the `whatsapp:` prefix and
//! the message goes out over WhatsApp instead of SMS.

use crate::config::MessagingConfig;
use crate::constants::api::USER_AGENT;
use crate::dispatch::MessagingChannel;
use crate::error::{Error, Result};
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

/// Twilio messaging backend
#[derive(Debug, Clone)]
pub struct TwilioMessenger {
    client: reqwest::Client,
    api_url: String,
    account_sid: String,
    auth_token: String,
    from: String,
    whatsapp: bool,
}

/// Twilio error body
///
/// Example: `{"code": 21211, "message": "The 'To' number is not a valid phone number.", "status": 400}`
#[derive(Debug, Deserialize)]
struct TwilioError {
    #[serde(default)]
    code: Option<u32>,
    #[serde(default)]
    message: Option<String>,
}

/// Successful create response (only the fields we log)
#[derive(Debug, Deserialize)]
struct TwilioMessage {
    sid: String,
    #[serde(default)]
    status: Option<String>,
}

impl TwilioMessenger {
    /// Create a backend from config; account SID, auth token and sender are required
    pub fn new(config: &MessagingConfig, timeout: Duration) -> Result<Self> {
        for (key, value) in [
            ("messaging.account_sid", &config.account_sid),
            ("messaging.auth_token", &config.auth_token),
            ("messaging.from", &config.from),
        ] {
            if value.trim().is_empty() {
                return Err(Error::Config(format!("{} is required for Twilio", key)));
            }
        }

        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Delivery(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_url: config.api_url.trim_end_matches('/').to_string(),
            account_sid: config.account_sid.clone(),
            auth_token: config.auth_token.clone(),
            from: config.from.clone(),
            whatsapp: config.whatsapp,
        })
    }

    /// Address as Twilio expects it for the configured transport
    fn address(&self, phone: &str) -> String {
        if self.whatsapp {
            format!("whatsapp:{}", phone)
        } else {
            phone.to_string()
        }
    }

    fn messages_url(&self) -> String {
        format!("{}/Accounts/{}/Messages.json", self.api_url, self.account_sid)
    }
}

impl MessagingChannel for TwilioMessenger {
    fn name(&self) -> &'static str {
        "twilio"
    }

    async fn send_message(&self, phone: &str, body: &str) -> Result<()> {
        let to = self.address(phone);
        let from = self.address(&self.from);

        let response = self
            .client
            .post(self.messages_url())
            .basic_auth(&self.account_sid, Some(&self.auth_token))
            .form(&[("To", to.as_str()), ("From", from.as_str()), ("Body", body)])
            .send()
            .await
            .map_err(|e| Error::Delivery(format!("Twilio request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let detail = match response.json::<TwilioError>().await {
                Ok(TwilioError {
                    code: Some(code),
                    message: Some(message),
                }) => format!("{} (code {})", message, code),
                Ok(TwilioError {
                    message: Some(message),
                    ..
                }) => message,
                _ => "no error detail".to_string(),
            };
            return Err(Error::Delivery(format!(
                "Twilio returned status {}: {}",
                status, detail
            )));
        }

        if let Ok(message) = response.json::<TwilioMessage>().await {
            debug!(
                sid = %message.sid,
                status = ?message.status,
                to = %to,
                "Twilio accepted message"
            );
        }
        Ok(())
    }
}
