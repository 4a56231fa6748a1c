//! Lifecycle environment.
//!
//! Bundles the injected providers so the controller and notification
//! service share one set of dependencies.

use crate::providers::{MailTransport, RmaRepository, SiteMetaRepository, SnapshotCache};
use crate::site::SiteInfo;
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// Clock trait for time abstraction.
///
/// Injected so tests can pin creation timestamps.
pub trait Clock: Send + Sync {
    /// Get the current time
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// RMA environment.
///
/// # Type Parameters
///
/// - `R`: Request repository
/// - `C`: Snapshot cache
/// - `M`: Mail transport
/// - `S`: Site metadata repository
#[derive(Clone)]
pub struct RmaEnvironment<R, C, M, S>
where
    R: RmaRepository + Clone,
    C: SnapshotCache + Clone,
    M: MailTransport + Clone,
    S: SiteMetaRepository + Clone,
{
    /// Request repository (`PostgreSQL`).
    pub repository: R,

    /// Snapshot cache (`Redis`).
    pub snapshots: C,

    /// Mail transport.
    pub mail: M,

    /// Cached site metadata.
    pub site: SiteInfo<S>,

    /// Time source.
    pub clock: Arc<dyn Clock>,
}

impl<R, C, M, S> RmaEnvironment<R, C, M, S>
where
    R: RmaRepository + Clone,
    C: SnapshotCache + Clone,
    M: MailTransport + Clone,
    S: SiteMetaRepository + Clone,
{
    /// Create an environment using the system clock.
    #[must_use]
    pub fn new(repository: R, snapshots: C, mail: M, site: SiteInfo<S>) -> Self {
        Self {
            repository,
            snapshots,
            mail,
            site,
            clock: Arc::new(SystemClock),
        }
    }

    /// Replace the clock.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }
}
