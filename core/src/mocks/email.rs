//! Recording mail transport for testing.

use crate::error::{Result, RmaError};
use crate::providers::{EmailMessage, MailTransport};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// Mail transport that records batches instead of sending them.
///
/// Clones share the same outbox.
#[derive(Debug, Clone, Default)]
pub struct RecordingMailTransport {
    batches: Arc<Mutex<Vec<Vec<EmailMessage>>>>,
    should_fail: Arc<AtomicBool>,
}

impl RecordingMailTransport {
    /// Create a transport that succeeds.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a transport whose sends fail.
    #[must_use]
    pub fn failing() -> Self {
        let transport = Self::default();
        transport.set_failing(true);
        transport
    }

    /// Toggle failure mode.
    pub fn set_failing(&self, fail: bool) {
        self.should_fail.store(fail, Ordering::SeqCst);
    }

    /// Every delivered batch, in order.
    #[must_use]
    pub fn batches(&self) -> Vec<Vec<EmailMessage>> {
        self.batches.lock().map(|b| b.clone()).unwrap_or_default()
    }

    /// Every delivered message, flattened.
    #[must_use]
    pub fn sent(&self) -> Vec<EmailMessage> {
        self.batches().into_iter().flatten().collect()
    }
}

impl MailTransport for RecordingMailTransport {
    async fn send_batch(&self, messages: Vec<EmailMessage>) -> Result<usize> {
        if self.should_fail.load(Ordering::SeqCst) {
            return Err(RmaError::EmailError("simulated SMTP failure".to_string()));
        }

        let count = messages.len();
        self.batches
            .lock()
            .map_err(|_| RmaError::EmailError("outbox lock poisoned".to_string()))?
            .push(messages);
        Ok(count)
    }
}
