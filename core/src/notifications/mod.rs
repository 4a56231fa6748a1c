//! Notification service.
//!
//! Renders and dispatches the two notification flows from a cached request
//! snapshot, then always deletes the snapshot. Failures never propagate:
//! each call returns a [`DeliveryReport`] and emits one structured event.

pub mod templates;

use crate::config::NotificationConfig;
use crate::error::{Result, RmaError};
use crate::providers::{EmailMessage, MailTransport, SiteMetaRepository, SnapshotCache, SnapshotKey};
use crate::site::SiteInfo;
use crate::state::{RmaId, RmaNumber, RmaRequest};
use serde::Serialize;
use std::sync::Arc;
use templates::{
    ADMIN_CREATION_TEMPLATE, CUSTOMER_CREATION_TEMPLATE, CUSTOMER_INSTRUCTIONS_TEMPLATE,
    NotificationContext, TemplateRenderer,
};

/// Which flow produced a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    /// Admin and customer notices on creation.
    Creation,
    /// Return instructions on approval.
    StatusSent,
}

/// Outcome of one notification attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct DeliveryReport {
    /// Flow.
    pub kind: NotificationKind,
    /// Request id.
    pub request_id: RmaId,
    /// RMA number, when the snapshot was found.
    pub rma_number: Option<RmaNumber>,
    /// Every address the dispatch targeted.
    pub recipients: Vec<String>,
    /// Messages delivered, or why nothing was.
    pub outcome: std::result::Result<usize, RmaError>,
}

impl DeliveryReport {
    /// Whether the dispatch succeeded.
    #[must_use]
    pub const fn is_delivered(&self) -> bool {
        self.outcome.is_ok()
    }
}

/// Subject of the admin creation notice.
#[must_use]
pub fn admin_creation_subject(site_name: &str, sku: &str) -> String {
    format!("[{site_name}] New RMA Submitted for Product SKU #{sku}")
}

/// Subject of the customer creation notice.
#[must_use]
pub fn customer_creation_subject(site_name: &str, sku: &str) -> String {
    format!("[{site_name}] We Have Received Your RMA for Product SKU #{sku}")
}

/// Subject of the return instructions.
#[must_use]
pub fn instructions_subject(site_name: &str, sku: &str, rma_number: RmaNumber) -> String {
    format!("[{site_name}] Instruction to Return Product with SKU #{sku} for RMA {rma_number}")
}

/// Messages composed for one flow.
struct Composed {
    rma_number: RmaNumber,
    messages: Vec<EmailMessage>,
}

/// Notification service.
///
/// # Type Parameters
///
/// - `C`: Snapshot cache
/// - `M`: Mail transport
/// - `S`: Site metadata repository
#[derive(Clone)]
pub struct NotificationService<C, M, S> {
    snapshots: C,
    mail: M,
    site: SiteInfo<S>,
    templates: TemplateRenderer,
    config: Arc<NotificationConfig>,
}

impl<C, M, S> NotificationService<C, M, S>
where
    C: SnapshotCache,
    M: MailTransport,
    S: SiteMetaRepository,
{
    /// Create a notification service.
    #[must_use]
    pub fn new(
        snapshots: C,
        mail: M,
        site: SiteInfo<S>,
        templates: TemplateRenderer,
        config: NotificationConfig,
    ) -> Self {
        Self {
            snapshots,
            mail,
            site,
            templates,
            config: Arc::new(config),
        }
    }

    /// Send the admin and customer creation notices in one batch.
    pub async fn notify_creation(&self, request_id: RmaId) -> DeliveryReport {
        let key = SnapshotKey::for_request(request_id);
        let composed = self.compose_creation(&key).await;
        self.dispatch(NotificationKind::Creation, request_id, &key, composed)
            .await
    }

    /// Send the return instructions to the customer.
    pub async fn notify_status_sent(&self, request_id: RmaId) -> DeliveryReport {
        let key = SnapshotKey::for_request(request_id);
        let composed = self.compose_instructions(&key).await;
        self.dispatch(NotificationKind::StatusSent, request_id, &key, composed)
            .await
    }

    async fn load_snapshot(&self, key: &SnapshotKey) -> Result<RmaRequest> {
        self.snapshots
            .get(key)
            .await?
            .ok_or_else(|| RmaError::SnapshotMissing {
                key: key.to_string(),
            })
    }

    async fn compose_creation(&self, key: &SnapshotKey) -> Result<Composed> {
        let request = self.load_snapshot(key).await?;
        let site = self.site.get().await?;
        let context = NotificationContext::for_creation(&request, &site);
        let from = self.config.from_header();

        let mut messages = Vec::with_capacity(2);

        if self.config.admin_recipients.is_empty() {
            tracing::warn!(
                rma_number = %request.rma_number,
                "No administrator recipients configured; admin notice skipped"
            );
        } else {
            messages.push(EmailMessage {
                from: from.clone(),
                to: self.config.admin_recipients.clone(),
                subject: admin_creation_subject(&site.name, &request.product_sku),
                body: self.templates.render(ADMIN_CREATION_TEMPLATE, &context)?,
            });
        }

        messages.push(EmailMessage {
            from,
            to: vec![request.email.clone()],
            subject: customer_creation_subject(&site.name, &request.product_sku),
            body: self.templates.render(CUSTOMER_CREATION_TEMPLATE, &context)?,
        });

        Ok(Composed {
            rma_number: request.rma_number,
            messages,
        })
    }

    async fn compose_instructions(&self, key: &SnapshotKey) -> Result<Composed> {
        let request = self.load_snapshot(key).await?;
        let site = self.site.get().await?;
        let context = NotificationContext::for_instructions(&request, &site);

        let message = EmailMessage {
            from: self.config.from_header(),
            to: vec![request.email.clone()],
            subject: instructions_subject(&site.name, &request.product_sku, request.rma_number),
            body: self.templates.render(CUSTOMER_INSTRUCTIONS_TEMPLATE, &context)?,
        };

        Ok(Composed {
            rma_number: request.rma_number,
            messages: vec![message],
        })
    }

    async fn dispatch(
        &self,
        kind: NotificationKind,
        request_id: RmaId,
        key: &SnapshotKey,
        composed: Result<Composed>,
    ) -> DeliveryReport {
        let (rma_number, recipients, outcome) = match composed {
            Ok(Composed {
                rma_number,
                messages,
            }) => {
                let recipients = messages
                    .iter()
                    .flat_map(|message| message.to.iter().cloned())
                    .collect();
                (
                    Some(rma_number),
                    recipients,
                    self.mail.send_batch(messages).await,
                )
            }
            Err(error) => (None, Vec::new(), Err(error)),
        };

        if let Err(error) = self.snapshots.delete(key).await {
            tracing::warn!(key = %key, error = %error, "Failed to evict request snapshot");
        }

        let report = DeliveryReport {
            kind,
            request_id,
            rma_number,
            recipients,
            outcome,
        };
        log_report(&report);
        report
    }
}

fn log_report(report: &DeliveryReport) {
    let rma_number = report.rma_number.map(|n| n.to_string()).unwrap_or_default();
    match &report.outcome {
        Ok(sent) => tracing::info!(
            kind = ?report.kind,
            request_id = %report.request_id,
            rma_number = %rma_number,
            recipients = ?report.recipients,
            sent,
            "RMA notification sent"
        ),
        Err(error) => tracing::error!(
            kind = ?report.kind,
            request_id = %report.request_id,
            rma_number = %rma_number,
            recipients = ?report.recipients,
            error = %error,
            "RMA notification failed"
        ),
    }
}
