//! SMTP delivery via lettre

use crate::message::Notification;
use crate::{Notifier, NotifyError};
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use std::sync::Arc;
use tracing::{debug, error, info};

/// Port that is spoken in plain SMTP; every other port uses implicit TLS
const PLAIN_SMTP_PORT: u16 = 25;

/// SMTP configuration
#[derive(Debug, Clone)]
pub struct SmtpConfig {
    /// SMTP server host
    pub server: String,
    /// SMTP server port
    pub port: u16,
    /// Login user (no authentication when empty)
    pub user: String,
    /// Login password
    pub password: String,
    /// Sender address
    pub from: String,
    /// Whether watcher error reports (error bursts, recovery digests) are mailed
    pub email_on_error: bool,
}

impl Default for SmtpConfig {
    fn default() -> Self {
        Self {
            server: "localhost".to_string(),
            port: PLAIN_SMTP_PORT,
            user: String::new(),
            password: String::new(),
            from: "hound@localhost".to_string(),
            email_on_error: false,
        }
    }
}

/// Notifier that mails every notification through one SMTP relay
pub struct SmtpNotifier {
    config: SmtpConfig,
    transport: Arc<AsyncSmtpTransport<Tokio1Executor>>,
}

impl SmtpNotifier {
    /// Create a new SMTP notifier
    pub fn new(config: SmtpConfig) -> Result<Self, NotifyError> {
        let builder = if config.port == PLAIN_SMTP_PORT {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.server)
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&config.server)
                .map_err(|e| NotifyError::Transport(e.to_string()))?
        };

        let mut builder = builder.port(config.port);
        if !config.user.is_empty() {
            builder = builder.credentials(Credentials::new(
                config.user.clone(),
                config.password.clone(),
            ));
        }

        info!(
            "SMTP notifier using {}:{} (error mail {})",
            config.server,
            config.port,
            if config.email_on_error { "on" } else { "off" }
        );

        Ok(Self {
            transport: Arc::new(builder.build()),
            config,
        })
    }

    fn compose(&self, notification: &Notification) -> Result<Message, NotifyError> {
        let from = parse_mailbox(&self.config.from)?;
        let to = parse_mailbox(notification.recipient())?;

        Message::builder()
            .from(from)
            .to(to)
            .subject(notification.subject())
            .header(ContentType::TEXT_PLAIN)
            .body(notification.body())
            .map_err(|e| NotifyError::Compose(e.to_string()))
    }
}

fn parse_mailbox(address: &str) -> Result<Mailbox, NotifyError> {
    address
        .parse()
        .map_err(|e: lettre::address::AddressError| NotifyError::InvalidAddress {
            address: address.to_string(),
            reason: e.to_string(),
        })
}

impl Notifier for SmtpNotifier {
    fn dispatch(&self, notification: Notification) -> Result<(), NotifyError> {
        if notification.is_error_report() && !self.config.email_on_error {
            debug!(subject = %notification.subject(), "error mail disabled, not sending");
            return Ok(());
        }

        let message = self.compose(&notification)?;
        let transport = Arc::clone(&self.transport);
        let subject = notification.subject();
        let to = notification.recipient().to_string();

        debug!(%to, %subject, "sending mail");
        tokio::spawn(async move {
            if let Err(e) = transport.send(message).await {
                error!(%to, %subject, error = %e, "error sending mail");
            }
        });

        Ok(())
    }
}
