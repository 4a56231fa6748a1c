//! Mail transport trait.

use crate::error::Result;
use crate::providers::{ConsoleMailTransport, SmtpMailTransport};
use serde::{Deserialize, Serialize};
use std::future::Future;

/// A plain-text email ready for delivery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailMessage {
    /// `From` header value.
    pub from: String,
    /// Recipients.
    pub to: Vec<String>,
    /// Subject line.
    pub subject: String,
    /// Plain-text body.
    pub body: String,
}

/// Mail transport.
///
/// Abstracts over delivery backends (SMTP relay, console, test recorder).
pub trait MailTransport: Send + Sync {
    /// Deliver several messages as one unit.
    ///
    /// Every message is built before the first one is sent, so a malformed
    /// address fails the whole batch without partial delivery.
    ///
    /// Returns the number of messages delivered.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - An address cannot be parsed
    /// - The relay rejects a message
    /// - The connection fails
    fn send_batch(&self, messages: Vec<EmailMessage>) -> impl Future<Output = Result<usize>> + Send;

    /// Deliver a single message.
    ///
    /// # Errors
    ///
    /// Same as [`MailTransport::send_batch`].
    fn send(&self, message: EmailMessage) -> impl Future<Output = Result<usize>> + Send {
        self.send_batch(vec![message])
    }
}

/// Transport chosen at startup by `MAIL_TRANSPORT`.
#[derive(Clone)]
pub enum AnyMailTransport {
    /// Log messages instead of sending them.
    Console(ConsoleMailTransport),
    /// Deliver through an SMTP relay.
    Smtp(SmtpMailTransport),
}

impl MailTransport for AnyMailTransport {
    async fn send_batch(&self, messages: Vec<EmailMessage>) -> Result<usize> {
        match self {
            Self::Console(transport) => transport.send_batch(messages).await,
            Self::Smtp(transport) => transport.send_batch(messages).await,
        }
    }
}
