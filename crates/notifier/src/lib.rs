//! Notification Delivery
//!
//! Fire-and-forget delivery of per-alert and digest notifications:
//! - Individual alert and recovery messages
//! - Throttled and recovery digests
//! - Error-burst reports
//!
//! Senders never surface transport failures to the caller; those are logged.

mod message;
mod smtp;

pub use message::Notification;
pub use smtp::{SmtpConfig, SmtpNotifier};

use thiserror::Error;
use tracing::info;

/// Notification error types
#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("Invalid address {address}: {reason}")]
    InvalidAddress { address: String, reason: String },

    #[error("Message composition failed: {0}")]
    Compose(String),

    #[error("Transport setup failed: {0}")]
    Transport(String),
}

/// Capability to hand a notification off for delivery.
///
/// `dispatch` returns once the message is queued; delivery itself runs in
/// the background and its failures are only logged.
pub trait Notifier: Send + Sync {
    fn dispatch(&self, notification: Notification) -> Result<(), NotifyError>;
}

/// Notifier that only writes notifications to the log.
///
/// Used when no SMTP server is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn dispatch(&self, notification: Notification) -> Result<(), NotifyError> {
        info!(
            to = notification.recipient(),
            subject = %notification.subject(),
            "notification (no smtp server configured)"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_notifier_accepts_everything() {
        let notifier = LogNotifier;
        let result = notifier.dispatch(Notification::EncounteredErrors {
            errors: 3,
            recipient: "ops@example.com".into(),
        });
        assert!(result.is_ok());
    }
}
