//! SMTP mail transport using Lettre.

use crate::error::{Result, RmaError};
use crate::providers::{EmailMessage, MailTransport};
use lettre::message::Mailbox;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

/// SMTP connection settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmtpSettings {
    /// Relay host name.
    pub host: String,
    /// Relay port (587 for STARTTLS).
    pub port: u16,
    /// Login user; no authentication when empty.
    pub username: String,
    /// Login password.
    pub password: String,
    /// Upgrade the connection with STARTTLS.
    pub starttls: bool,
}

impl SmtpSettings {
    /// Settings for a STARTTLS relay on port 587 without credentials.
    #[must_use]
    pub const fn new(host: String) -> Self {
        Self {
            host,
            port: 587,
            username: String::new(),
            password: String::new(),
            starttls: true,
        }
    }

    /// Set the port.
    #[must_use]
    pub const fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set login credentials.
    #[must_use]
    pub fn with_credentials(mut self, username: String, password: String) -> Self {
        self.username = username;
        self.password = password;
        self
    }

    /// Enable or disable STARTTLS.
    #[must_use]
    pub const fn with_starttls(mut self, starttls: bool) -> Self {
        self.starttls = starttls;
        self
    }
}

/// SMTP mail transport.
///
/// Holds one pooled async transport; every batch reuses its connections.
///
/// # Examples
///
/// ```no_run
/// use rma_desk_core::providers::{SmtpMailTransport, SmtpSettings};
///
/// # fn example() -> rma_desk_core::Result<()> {
/// let transport = SmtpMailTransport::new(
///     &SmtpSettings::new("smtp.example.com".to_string())
///         .with_credentials("user".to_string(), "app-password".to_string()),
/// )?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct SmtpMailTransport {
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpMailTransport {
    /// Create a new SMTP transport.
    ///
    /// # Errors
    ///
    /// Returns error if the relay host cannot be resolved into TLS parameters.
    pub fn new(settings: &SmtpSettings) -> Result<Self> {
        let builder = if settings.starttls {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&settings.host)
                .map_err(|e| RmaError::EmailError(format!("SMTP relay error: {e}")))?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&settings.host)
        };

        let builder = builder.port(settings.port);
        let builder = if settings.username.is_empty() {
            builder
        } else {
            builder.credentials(Credentials::new(
                settings.username.clone(),
                settings.password.clone(),
            ))
        };

        tracing::info!(
            host = %settings.host,
            port = settings.port,
            starttls = settings.starttls,
            "SMTP transport configured"
        );

        Ok(Self {
            transport: builder.build(),
        })
    }
}

fn build_message(message: &EmailMessage) -> Result<Message> {
    let from: Mailbox = message
        .from
        .parse()
        .map_err(|e| RmaError::EmailError(format!("Invalid from address: {e}")))?;

    let mut builder = Message::builder().from(from).subject(&message.subject);
    for recipient in &message.to {
        let to: Mailbox = recipient
            .parse()
            .map_err(|e| RmaError::EmailError(format!("Invalid to address {recipient:?}: {e}")))?;
        builder = builder.to(to);
    }

    builder
        .header(ContentType::TEXT_PLAIN)
        .body(message.body.clone())
        .map_err(|e| RmaError::EmailError(format!("Failed to build email: {e}")))
}

/// SMTP failure that still reports how much of the batch went out.
fn send_failure(sent: usize, total: usize, error: &impl std::fmt::Display) -> RmaError {
    RmaError::EmailError(format!(
        "Failed to send email via SMTP after {sent} of {total} delivered: {error}"
    ))
}

impl MailTransport for SmtpMailTransport {
    async fn send_batch(&self, messages: Vec<EmailMessage>) -> Result<usize> {
        let built = messages
            .iter()
            .map(build_message)
            .collect::<Result<Vec<_>>>()?;

        let total = built.len();
        let mut sent = 0;
        for message in built {
            self.transport
                .send(message)
                .await
                .map_err(|e| send_failure(sent, total, &e))?;
            sent += 1;
        }

        Ok(sent)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn message(to: &str) -> EmailMessage {
        EmailMessage {
            from: "Shop <rma@example.com>".to_string(),
            to: vec![to.to_string()],
            subject: "[Shop] Subject".to_string(),
            body: "Body".to_string(),
        }
    }

    #[test]
    fn test_build_message_accepts_named_sender() {
        assert!(build_message(&message("ada@example.com")).is_ok());
    }

    #[test]
    fn test_build_message_rejects_bad_recipient() {
        let err = build_message(&message("not an address")).unwrap_err();
        assert!(matches!(err, RmaError::EmailError(_)));
    }

    #[test]
    fn test_send_failure_keeps_partial_count() {
        let err = send_failure(1, 2, &"connection reset");
        assert_eq!(
            err.to_string(),
            "Email error: Failed to send email via SMTP after 1 of 2 delivered: connection reset"
        );
    }

    #[test]
    fn test_build_message_requires_recipient() {
        let mut empty = message("ada@example.com");
        empty.to.clear();
        assert!(build_message(&empty).is_err());
    }
}
