//! Application state for Axum handlers.
//!
//! Handlers are generic over [`Providers`], the bundle of storage and mail
//! backends, so the same router serves production (`PostgreSQL`, Redis,
//! SMTP) and tests (in-memory).

use rma_desk_core::LifecycleController;
use rma_desk_core::notifications::templates::TemplateRenderer;
use rma_desk_core::providers::{MailTransport, RmaRepository, SiteMetaRepository, SnapshotCache};
use std::sync::Arc;

/// Backends wired into the lifecycle controller.
pub trait Providers: Send + Sync + 'static {
    /// Request repository.
    type Repository: RmaRepository + Clone + 'static;
    /// Snapshot cache.
    type Snapshots: SnapshotCache + Clone + 'static;
    /// Mail transport.
    type Mail: MailTransport + Clone + 'static;
    /// Site metadata repository.
    type Sites: SiteMetaRepository + Clone + 'static;
}

/// Lifecycle controller over a provider bundle.
pub type Controller<P> = LifecycleController<
    <P as Providers>::Repository,
    <P as Providers>::Snapshots,
    <P as Providers>::Mail,
    <P as Providers>::Sites,
>;

/// Application state shared across all HTTP handlers.
///
/// Cloned for each request; every field is a handle.
pub struct AppState<P: Providers> {
    /// Request lifecycle controller.
    pub controller: Controller<P>,

    /// Page template renderer.
    pub pages: TemplateRenderer,

    /// Bearer token for the admin API; `None` disables it.
    pub admin_token: Option<Arc<str>>,
}

impl<P: Providers> Clone for AppState<P> {
    fn clone(&self) -> Self {
        Self {
            controller: self.controller.clone(),
            pages: self.pages.clone(),
            admin_token: self.admin_token.clone(),
        }
    }
}

impl<P: Providers> AppState<P> {
    /// Create a new application state with the admin API disabled.
    #[must_use]
    pub const fn new(controller: Controller<P>, pages: TemplateRenderer) -> Self {
        Self {
            controller,
            pages,
            admin_token: None,
        }
    }

    /// Enable the admin API with a bearer token.
    ///
    /// A blank token leaves it disabled.
    #[must_use]
    pub fn with_admin_token(mut self, token: impl Into<String>) -> Self {
        let token = token.into();
        self.admin_token = (!token.trim().is_empty()).then(|| Arc::from(token));
        self
    }
}
