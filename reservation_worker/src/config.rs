//! Worker configuration, read from `PRG_*` environment variables.
//!
//! Every knob falls back to a sensible default with a log line; the only thing that genuinely
//! cannot be defaulted is the PIX provider credential set, and a worker started without it will
//! fail on the first provider call rather than at startup.
use std::env;

use chrono::Duration;
use log::*;
use pix_tools::PixConfig;
use prg_common::{helpers::parse_boolean_flag, Secret};
use reservation_engine::{db_url, notify::Recipient, reconcile::DEFAULT_UNPAID_TIMEOUT, ReconcileConfig};

const DEFAULT_RECONCILE_INTERVAL: std::time::Duration = std::time::Duration::from_secs(60);
const DEFAULT_PROVIDER_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(15);
const DEFAULT_MAX_IN_FLIGHT: usize = 8;
const DEFAULT_TELEGRAM_API_URL: &str = "https://api.telegram.org";

#[derive(Clone, Debug)]
pub struct WorkerConfig {
    pub database_url: String,
    /// Wall-clock gap between reconciliation passes.
    pub reconcile_interval: std::time::Duration,
    pub reconcile: ReconcileConfig,
    /// The chat ids every notification goes to.
    pub recipients: Vec<Recipient>,
    pub telegram: TelegramConfig,
    pub pix: PixConfig,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            database_url: String::default(),
            reconcile_interval: DEFAULT_RECONCILE_INTERVAL,
            reconcile: ReconcileConfig::default(),
            recipients: Vec::new(),
            telegram: TelegramConfig::default(),
            pix: PixConfig::default(),
        }
    }
}

impl WorkerConfig {
    pub fn from_env_or_default() -> Self {
        let database_url = db_url();
        let reconcile_interval = env::var("PRG_RECONCILE_INTERVAL_SECS")
            .map_err(|_| {
                info!(
                    "🪛️ PRG_RECONCILE_INTERVAL_SECS is not set. Using the default value of {}s.",
                    DEFAULT_RECONCILE_INTERVAL.as_secs()
                )
            })
            .and_then(|s| {
                s.parse::<u64>()
                    .map(std::time::Duration::from_secs)
                    .map_err(|e| warn!("🪛️ Invalid value for PRG_RECONCILE_INTERVAL_SECS. {e}"))
            })
            .ok()
            .unwrap_or(DEFAULT_RECONCILE_INTERVAL);
        let unpaid_timeout = env::var("PRG_UNPAID_RESERVATION_TIMEOUT")
            .map_err(|_| {
                info!(
                    "🪛️ PRG_UNPAID_RESERVATION_TIMEOUT is not set. Using the default value of {} minutes.",
                    DEFAULT_UNPAID_TIMEOUT.num_minutes()
                )
            })
            .and_then(|s| {
                s.parse::<i64>()
                    .map(Duration::minutes)
                    .map_err(|e| warn!("🪛️ Invalid value for PRG_UNPAID_RESERVATION_TIMEOUT. {e}"))
            })
            .ok()
            .unwrap_or(DEFAULT_UNPAID_TIMEOUT);
        let provider_timeout = env::var("PRG_PROVIDER_TIMEOUT_SECS")
            .map_err(|_| {
                info!(
                    "🪛️ PRG_PROVIDER_TIMEOUT_SECS is not set. Using the default value of {}s.",
                    DEFAULT_PROVIDER_TIMEOUT.as_secs()
                )
            })
            .and_then(|s| {
                s.parse::<u64>()
                    .map(std::time::Duration::from_secs)
                    .map_err(|e| warn!("🪛️ Invalid value for PRG_PROVIDER_TIMEOUT_SECS. {e}"))
            })
            .ok()
            .unwrap_or(DEFAULT_PROVIDER_TIMEOUT);
        let max_in_flight = env::var("PRG_MAX_IN_FLIGHT")
            .map_err(|_| info!("🪛️ PRG_MAX_IN_FLIGHT is not set. Using the default value of {DEFAULT_MAX_IN_FLIGHT}."))
            .and_then(|s| s.parse::<usize>().map_err(|e| warn!("🪛️ Invalid value for PRG_MAX_IN_FLIGHT. {e}")))
            .ok()
            .unwrap_or(DEFAULT_MAX_IN_FLIGHT);
        let reconcile = ReconcileConfig { unpaid_timeout, provider_timeout, max_in_flight };
        let recipients = parse_recipients(env::var("PRG_NOTIFY_RECIPIENTS").ok());
        let telegram = TelegramConfig::from_env_or_default();
        let pix = PixConfig::new_from_env_or_default();
        Self { database_url, reconcile_interval, reconcile, recipients, telegram, pix }
    }
}

/// Splits the `PRG_NOTIFY_RECIPIENTS` value into chat ids, dropping empty entries.
pub fn parse_recipients(value: Option<String>) -> Vec<Recipient> {
    let Some(value) = value else {
        warn!("🪛️ PRG_NOTIFY_RECIPIENTS is not set. Notifications will only be written to the log.");
        return Vec::new();
    };
    value.split(',').map(str::trim).filter(|s| !s.is_empty()).map(Recipient::from).collect()
}

#[derive(Clone, Debug)]
pub struct TelegramConfig {
    pub api_url: String,
    pub bot_token: Secret<String>,
    /// Deliver messages silently (no client-side notification sound).
    pub silent: bool,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self { api_url: DEFAULT_TELEGRAM_API_URL.to_string(), bot_token: Secret::default(), silent: false }
    }
}

impl TelegramConfig {
    pub fn from_env_or_default() -> Self {
        let api_url = env::var("PRG_TELEGRAM_API_URL").ok().unwrap_or_else(|| DEFAULT_TELEGRAM_API_URL.to_string());
        let bot_token = env::var("PRG_TELEGRAM_BOT_TOKEN").map(Secret::new).unwrap_or_else(|_| {
            warn!("🪛️ PRG_TELEGRAM_BOT_TOKEN is not set. Telegram notifications are disabled.");
            Secret::default()
        });
        let silent = parse_boolean_flag(env::var("PRG_TELEGRAM_SILENT").ok(), false);
        Self { api_url, bot_token, silent }
    }

    pub fn is_configured(&self) -> bool {
        !self.bot_token.reveal().is_empty()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn recipient_lists_are_split_and_trimmed() {
        let recipients = parse_recipients(Some("111, 222 ,,333".to_string()));
        assert_eq!(recipients, [Recipient::from("111"), Recipient::from("222"), Recipient::from("333")]);
    }

    #[test]
    fn a_missing_recipient_list_is_empty() {
        assert!(parse_recipients(None).is_empty());
    }

    #[test]
    fn telegram_is_only_configured_with_a_token() {
        let mut config = TelegramConfig::default();
        assert!(!config.is_configured());
        config.bot_token = Secret::new("123:abc".to_string());
        assert!(config.is_configured());
    }
}
