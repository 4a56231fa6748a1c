//! Console mail transport for development.

use crate::error::Result;
use crate::providers::{EmailMessage, MailTransport};
use tracing::info;

/// Console mail transport.
///
/// Logs every message instead of sending it. Used when
/// `MAIL_TRANSPORT=console`, the development default.
#[derive(Clone, Debug, Default)]
pub struct ConsoleMailTransport;

impl ConsoleMailTransport {
    /// Create a new console transport.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl MailTransport for ConsoleMailTransport {
    async fn send_batch(&self, messages: Vec<EmailMessage>) -> Result<usize> {
        for message in &messages {
            info!(
                from = %message.from,
                to = ?message.to,
                subject = %message.subject,
                "📧 Email (Development Mode)"
            );
            println!("\n╔══════════════════════════════════════════════════════════════╗");
            println!("║ To: {:<57}║", message.to.join(", "));
            println!("║ Subject: {:<52}║", message.subject);
            println!("╚══════════════════════════════════════════════════════════════╝");
            println!("{}\n", message.body);
        }

        Ok(messages.len())
    }
}
