use std::sync::Arc;

use log::*;
use tokio::sync::mpsc;

use super::{Notification, NotificationSink, Recipient};

pub const DEFAULT_NOTIFY_BUFFER: usize = 32;

/// Builds a connected [`Notifier`] / [`NotificationDispatcher`] pair.
///
/// `recipients` is the fixed administrator list every notification goes to.
pub fn channel(buffer_size: usize, recipients: Vec<Recipient>) -> (Notifier, NotificationDispatcher) {
    let (sender, receiver) = mpsc::channel(buffer_size);
    let dispatcher = NotificationDispatcher { receiver, recipients, sinks: Vec::new() };
    (Notifier { sender }, dispatcher)
}

/// Cheap-to-clone handle for queueing notifications.
#[derive(Clone)]
pub struct Notifier {
    sender: mpsc::Sender<Notification>,
}

impl Notifier {
    /// Queues a notification without waiting. When the queue is full, or the dispatcher is gone,
    /// the message is dropped with an error log. Callers never block and never fail.
    pub fn send(&self, notification: Notification) {
        if let Err(e) = self.sender.try_send(notification) {
            error!("📨️ Dropping notification: {e}");
        }
    }
}

/// Drains queued notifications and hands them to every attached sink.
pub struct NotificationDispatcher {
    receiver: mpsc::Receiver<Notification>,
    recipients: Vec<Recipient>,
    sinks: Vec<Arc<dyn NotificationSink>>,
}

impl NotificationDispatcher {
    pub fn attach_sink(&mut self, sink: Arc<dyn NotificationSink>) -> &mut Self {
        self.sinks.push(sink);
        self
    }

    pub fn recipients(&self) -> &[Recipient] {
        &self.recipients
    }

    /// Runs until every [`Notifier`] handle has been dropped and the queue is empty, delivering
    /// messages in arrival order. A sink failure is logged and the dispatcher carries on with the
    /// next sink and the next message.
    pub async fn run(mut self) {
        debug!("📨️ Notification dispatcher started with {} sink(s)", self.sinks.len());
        while let Some(notification) = self.receiver.recv().await {
            let message = notification.rendered();
            trace!("📨️ Dispatching notification: {}", notification.subject);
            for sink in &self.sinks {
                if let Err(e) = sink.notify(&self.recipients, &message).await {
                    error!("📨️ Sink '{}' could not deliver a notification: {e}", sink.name());
                }
            }
        }
        debug!("📨️ Notification dispatcher has shut down");
    }
}

#[cfg(test)]
mod test {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::notify::NotifyError;

    struct MemorySink {
        delivered: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait]
    impl NotificationSink for MemorySink {
        fn name(&self) -> &str {
            "memory"
        }

        async fn notify(&self, recipients: &[Recipient], message: &str) -> Result<(), NotifyError> {
            self.delivered.lock().unwrap().push(format!("{}|{message}", recipients.len()));
            Ok(())
        }
    }

    struct FlakySink;

    #[async_trait]
    impl NotificationSink for FlakySink {
        fn name(&self) -> &str {
            "flaky"
        }

        async fn notify(&self, _recipients: &[Recipient], _message: &str) -> Result<(), NotifyError> {
            Err(NotifyError("simulated outage".to_string()))
        }
    }

    #[tokio::test]
    async fn delivers_in_order_and_drains_on_shutdown() {
        let _ = env_logger::try_init();
        let delivered = Arc::new(Mutex::new(Vec::new()));
        let (notifier, mut dispatcher) = channel(8, vec![Recipient::from("sala-dos-admins")]);
        dispatcher.attach_sink(Arc::new(MemorySink { delivered: Arc::clone(&delivered) }));
        let handle = tokio::spawn(dispatcher.run());
        notifier.send(Notification::new("Reserva paga", "Quadra 1 - 19:00"));
        notifier.send(Notification::new("Reserva cancelada por falta de pagamento", ""));
        drop(notifier);
        handle.await.unwrap();
        let delivered = delivered.lock().unwrap();
        assert_eq!(delivered.len(), 2);
        assert_eq!(delivered[0], "1|Reserva paga\nQuadra 1 - 19:00");
        assert_eq!(delivered[1], "1|Reserva cancelada por falta de pagamento");
    }

    #[tokio::test]
    async fn a_failing_sink_does_not_block_the_others() {
        let _ = env_logger::try_init();
        let delivered = Arc::new(Mutex::new(Vec::new()));
        let (notifier, mut dispatcher) = channel(8, vec![Recipient::from("ops")]);
        dispatcher
            .attach_sink(Arc::new(FlakySink))
            .attach_sink(Arc::new(MemorySink { delivered: Arc::clone(&delivered) }));
        let handle = tokio::spawn(dispatcher.run());
        notifier.send(Notification::new("Reserva paga", ""));
        drop(notifier);
        handle.await.unwrap();
        assert_eq!(delivered.lock().unwrap().as_slice(), ["1|Reserva paga"]);
    }
}
