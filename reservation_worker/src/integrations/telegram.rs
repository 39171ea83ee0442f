use std::time::Duration;

use async_trait::async_trait;
use log::*;
use reqwest::Client;
use reservation_engine::notify::{NotificationSink, NotifyError, Recipient};
use serde_json::json;

use crate::{config::TelegramConfig, errors::WorkerError};

const TELEGRAM_TIMEOUT: Duration = Duration::from_secs(10);

/// Delivers notifications as Telegram messages, one `sendMessage` call per recipient chat.
///
/// The bot token is part of the request URL, so request errors are stripped of their URL before
/// they are logged or reported.
pub struct TelegramSink {
    config: TelegramConfig,
    client: Client,
}

impl TelegramSink {
    pub fn new(config: TelegramConfig) -> Result<Self, WorkerError> {
        let client = Client::builder()
            .timeout(TELEGRAM_TIMEOUT)
            .build()
            .map_err(|e| WorkerError::InitializeError(format!("Could not build the Telegram HTTP client. {e}")))?;
        Ok(Self { config, client })
    }
}

#[async_trait]
impl NotificationSink for TelegramSink {
    fn name(&self) -> &str {
        "telegram"
    }

    async fn notify(&self, recipients: &[Recipient], message: &str) -> Result<(), NotifyError> {
        let url = format!("{}/bot{}/sendMessage", self.config.api_url, self.config.bot_token.reveal());
        let mut failures = Vec::new();
        for recipient in recipients {
            let body =
                json!({ "chat_id": recipient.0, "text": message, "disable_notification": self.config.silent });
            match self.client.post(&url).json(&body).send().await {
                Ok(response) if response.status().is_success() => {
                    trace!("📨️ Telegram message delivered to chat {recipient}");
                },
                Ok(response) => {
                    failures.push(format!("chat {recipient}: HTTP {}", response.status()));
                },
                Err(e) => {
                    failures.push(format!("chat {recipient}: {}", e.without_url()));
                },
            }
        }
        if failures.is_empty() {
            Ok(())
        } else {
            Err(NotifyError(failures.join("; ")))
        }
    }
}
