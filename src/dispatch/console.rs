//! Console delivery
//!
//! Logs messages instead of sending them. Used when no provider
//! credentials are configured, and by `--dry-run`.

use crate::dispatch::{EmailChannel, MessagingChannel};
use crate::error::Result;
use tracing::info;

#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleChannel;

impl MessagingChannel for ConsoleChannel {
    fn name(&self) -> &'static str {
        "console"
    }

    async fn send_message(&self, phone: &str, body: &str) -> Result<()> {
        info!(channel = "messaging", to = %phone, body = %body, "Console delivery");
        Ok(())
    }
}

impl EmailChannel for ConsoleChannel {
    fn name(&self) -> &'static str {
        "console"
    }

    async fn send_email(&self, address: &str, subject: &str, body: &str) -> Result<()> {
        info!(
            channel = "email",
            to = %address,
            subject = %subject,
            body = %body,
            "Console delivery"
        );
        Ok(())
    }
}
