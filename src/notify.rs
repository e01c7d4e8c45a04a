//! User-facing notifications.
//!
//! Operations report failures here in addition to logging them. A UI hooks
//! in through `ChannelNotifier`; headless callers use `LogNotifier`.

use tokio::sync::mpsc;

/// A message meant for the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    Error(String),
    Info(String),
}

/// Sink for user-facing messages.
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);

    fn error(&self, message: &str) {
        self.notify(Notification::Error(message.to_string()));
    }

    fn info(&self, message: &str) {
        self.notify(Notification::Info(message.to_string()));
    }
}

/// Writes notifications to the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notification: Notification) {
        match notification {
            Notification::Error(message) => tracing::error!(notification = %message, "User notification"),
            Notification::Info(message) => tracing::info!(notification = %message, "User notification"),
        }
    }
}

/// Forwards notifications over an unbounded channel.
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
    tx: mpsc::UnboundedSender<Notification>,
}

impl ChannelNotifier {
    /// Create the notifier and the receiving end for the UI.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Notification>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl Notifier for ChannelNotifier {
    fn notify(&self, notification: Notification) {
        if self.tx.send(notification).is_err() {
            tracing::debug!("Notification receiver dropped");
        }
    }
}
