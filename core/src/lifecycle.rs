//! Request lifecycle controller.
//!
//! The imperative shell around [`RmaReducer`]:
//!
//! ```text
//! submit:  duplicate check → insert_numbered → reduce(RequestCreated)
//!          → CacheSnapshot → spawn NotifyCreation
//! update:  load → reduce(ApplyAdminChanges)
//!          → [CacheSnapshot → PersistChanges → spawn NotifyStatusSent]
//! ```
//!
//! Notifications run on spawned Tokio tasks. Callers get an [`EffectHandle`]
//! they may await (tests) or drop (HTTP handlers).

use crate::actions::RmaAction;
use crate::config::{LifecycleConfig, NotificationConfig};
use crate::effects::RmaEffect;
use crate::environment::{Clock, RmaEnvironment};
use crate::error::{Result, RmaError};
use crate::notifications::templates::TemplateRenderer;
use crate::notifications::{DeliveryReport, NotificationService};
use crate::providers::{
    MailTransport, RmaPage, RmaRepository, RmaSearch, SiteMetaRepository, SnapshotCache,
    SnapshotKey,
};
use crate::reducer::{Reducer, RmaReducer, RmaState};
use crate::site::SiteInfo;
use crate::state::{RmaId, RmaRequest, RmaSubmission, RmaUpdate};
use smallvec::SmallVec;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Pending notification tasks started by one lifecycle call.
#[derive(Debug, Default)]
#[must_use = "drop the handle explicitly to send notifications in the background"]
pub struct EffectHandle {
    tasks: Vec<JoinHandle<DeliveryReport>>,
}

impl EffectHandle {
    /// Number of notifications started.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Whether no notification was started.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Wait for every notification and collect the reports.
    ///
    /// A task that panicked or was cancelled is logged and left out.
    pub async fn wait(self) -> Vec<DeliveryReport> {
        let mut reports = Vec::with_capacity(self.tasks.len());
        for task in self.tasks {
            match task.await {
                Ok(report) => reports.push(report),
                Err(error) => tracing::error!(error = %error, "Notification task failed"),
            }
        }
        reports
    }
}

/// Result of a successful submission.
#[derive(Debug)]
pub struct Submitted {
    /// The persisted request.
    pub request: RmaRequest,
    /// Creation notices in flight.
    pub notification: EffectHandle,
}

/// Result of a staff edit.
#[derive(Debug)]
pub struct Updated {
    /// The request after the edit.
    pub request: RmaRequest,
    /// Whether anything was written.
    pub persisted: bool,
    /// Return instructions in flight, if the status changed to `rma_sent`.
    pub notification: EffectHandle,
}

/// Request lifecycle controller.
///
/// # Type Parameters
///
/// - `R`: Request repository
/// - `C`: Snapshot cache
/// - `M`: Mail transport
/// - `S`: Site metadata repository
#[derive(Clone)]
pub struct LifecycleController<R, C, M, S> {
    repository: R,
    snapshots: C,
    site: SiteInfo<S>,
    notifications: NotificationService<C, M, S>,
    clock: Arc<dyn Clock>,
    config: LifecycleConfig,
    reducer: RmaReducer,
}

impl<R, C, M, S> LifecycleController<R, C, M, S>
where
    R: RmaRepository + Clone + 'static,
    C: SnapshotCache + Clone + 'static,
    M: MailTransport + Clone + 'static,
    S: SiteMetaRepository + Clone + 'static,
{
    /// Create a controller from an environment.
    #[must_use]
    pub fn new(
        env: RmaEnvironment<R, C, M, S>,
        templates: TemplateRenderer,
        notification_config: NotificationConfig,
        config: LifecycleConfig,
    ) -> Self {
        let notifications = NotificationService::new(
            env.snapshots.clone(),
            env.mail,
            env.site.clone(),
            templates,
            notification_config,
        );

        Self {
            repository: env.repository,
            snapshots: env.snapshots,
            site: env.site,
            notifications,
            clock: env.clock,
            config,
            reducer: RmaReducer::new(),
        }
    }

    /// Cached site metadata.
    #[must_use]
    pub const fn site(&self) -> &SiteInfo<S> {
        &self.site
    }

    /// Create a request from a validated submission.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - The email, order reference and SKU triple already exists
    /// - The last stored RMA number is malformed
    /// - The store fails
    pub async fn submit(&self, submission: RmaSubmission) -> Result<Submitted> {
        let key = submission.duplicate_key();
        if self.repository.duplicate_exists(&key).await? {
            tracing::info!(
                email = %key.email,
                order_ref = %key.order_ref,
                product_sku = %key.product_sku,
                "Duplicate RMA submission rejected"
            );
            return Err(RmaError::DuplicateRequest);
        }

        let request = self
            .repository
            .insert_numbered(submission, self.clock.now())
            .await?;

        tracing::info!(
            request_id = %request.id,
            rma_number = %request.rma_number,
            "RMA request created"
        );

        let mut state = RmaState::default();
        let effects = self.reducer.reduce(
            &mut state,
            RmaAction::RequestCreated {
                request: Box::new(request.clone()),
            },
            &self.config,
        );
        let notification = self.execute(effects).await?;

        Ok(Submitted {
            request,
            notification,
        })
    }

    /// Apply staff edits to a request.
    ///
    /// # Errors
    ///
    /// Returns error if the request does not exist or the save fails. A
    /// failed save evicts the snapshot and sends nothing.
    pub async fn update(&self, id: RmaId, update: RmaUpdate) -> Result<Updated> {
        let current = self.find(id).await?;

        let mut state = RmaState::loaded(current);
        let effects = self.reducer.reduce(
            &mut state,
            RmaAction::ApplyAdminChanges { update },
            &self.config,
        );
        let persisted = effects.iter().any(|effect| !matches!(effect, RmaEffect::None));
        let notification = self.execute(effects).await?;

        let request = state.current.ok_or(RmaError::NotFound(id.get()))?;
        if persisted {
            tracing::info!(
                request_id = %id,
                rma_number = %request.rma_number,
                status = %request.status,
                notified = !notification.is_empty(),
                "RMA request updated"
            );
        }

        Ok(Updated {
            request,
            persisted,
            notification,
        })
    }

    /// Load one request.
    ///
    /// # Errors
    ///
    /// Returns [`RmaError::NotFound`] or a store error.
    pub async fn find(&self, id: RmaId) -> Result<RmaRequest> {
        self.repository
            .get(id)
            .await?
            .ok_or(RmaError::NotFound(id.get()))
    }

    /// Admin list.
    ///
    /// # Errors
    ///
    /// Returns error if the store cannot be queried.
    pub async fn search(&self, query: &RmaSearch) -> Result<RmaPage> {
        self.repository.search(query).await
    }

    /// Execute effects in order, stopping at the first failure.
    async fn execute(&self, effects: SmallVec<[RmaEffect; 4]>) -> Result<EffectHandle> {
        let mut queue: VecDeque<RmaEffect> = effects.into_iter().collect();
        let mut handle = EffectHandle::default();
        let mut cached: Option<SnapshotKey> = None;

        while let Some(effect) = queue.pop_front() {
            match effect {
                RmaEffect::None => {}
                RmaEffect::Sequential(inner) => {
                    for effect in inner.into_iter().rev() {
                        queue.push_front(effect);
                    }
                }
                RmaEffect::CacheSnapshot { request, ttl } => {
                    let key = SnapshotKey::for_request(request.id);
                    match self.snapshots.put(&key, &request, ttl).await {
                        Ok(()) => cached = Some(key),
                        Err(error) => tracing::warn!(
                            key = %key,
                            error = %error,
                            "Snapshot write failed; notification will report it missing"
                        ),
                    }
                }
                RmaEffect::PersistChanges { request } => {
                    if let Err(error) = self.repository.save_admin_changes(&request).await {
                        tracing::error!(
                            request_id = %request.id,
                            error = %error,
                            "Saving admin changes failed"
                        );
                        if let Some(key) = cached.take() {
                            if let Err(evict) = self.snapshots.delete(&key).await {
                                tracing::warn!(key = %key, error = %evict, "Snapshot eviction failed");
                            }
                        }
                        return Err(error);
                    }
                }
                RmaEffect::NotifyCreation { request_id } => {
                    let service = self.notifications.clone();
                    handle.tasks.push(tokio::spawn(async move {
                        service.notify_creation(request_id).await
                    }));
                }
                RmaEffect::NotifyStatusSent { request_id } => {
                    let service = self.notifications.clone();
                    handle.tasks.push(tokio::spawn(async move {
                        service.notify_status_sent(request_id).await
                    }));
                }
            }
        }

        Ok(handle)
    }
}
