//! Fire-and-forget notification dispatch.
//!
//! State transitions must never wait on, or fail because of, a messaging outage. The engine hands
//! [`Notification`]s to a [`Notifier`], which drops them onto a bounded queue and returns
//! immediately; a [`NotificationDispatcher`] drains the queue on its own task and hands each
//! message to every attached [`NotificationSink`]. Delivery failures are logged and go no
//! further.
mod dispatch;

use std::fmt::Display;

use async_trait::async_trait;
use log::*;
use thiserror::Error;

pub use dispatch::{channel, NotificationDispatcher, Notifier, DEFAULT_NOTIFY_BUFFER};

//--------------------------------------      Recipient        -------------------------------------------------------
/// Where a notification goes: a chat id, phone number, or similar address understood by the sink
/// that delivers it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recipient(pub String);

impl<S: Into<String>> From<S> for Recipient {
    fn from(s: S) -> Self {
        Self(s.into())
    }
}

impl Display for Recipient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

//--------------------------------------   NotificationSink    -------------------------------------------------------
/// A delivery channel for operator-facing messages.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    /// Short name used in logs when delivery fails.
    fn name(&self) -> &str;

    /// Delivers `message` to every recipient. Implementations should bound their own time (e.g.
    /// client timeouts); the dispatcher does not race them against a deadline.
    async fn notify(&self, recipients: &[Recipient], message: &str) -> Result<(), NotifyError>;
}

#[derive(Debug, Clone, Error)]
#[error("Notification delivery failed: {0}")]
pub struct NotifyError(pub String);

/// Sink that just writes messages to the log. Attached as a default so notifications are never
/// silently lost when no real delivery channel is configured.
pub struct LogSink;

#[async_trait]
impl NotificationSink for LogSink {
    fn name(&self) -> &str {
        "log"
    }

    async fn notify(&self, recipients: &[Recipient], message: &str) -> Result<(), NotifyError> {
        info!("📨️ [{} recipient(s)] {message}", recipients.len());
        Ok(())
    }
}

//--------------------------------------     Notification      -------------------------------------------------------
/// A rendered message about a reservation state change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub subject: String,
    pub body: String,
}

impl Notification {
    pub fn new<S: Into<String>, B: Into<String>>(subject: S, body: B) -> Self {
        Self { subject: subject.into(), body: body.into() }
    }

    /// The single text blob handed to sinks.
    pub fn rendered(&self) -> String {
        if self.body.is_empty() {
            self.subject.clone()
        } else {
            format!("{}\n{}", self.subject, self.body)
        }
    }
}
