//! Transient request snapshots.

use crate::error::Result;
use crate::state::{RmaId, RmaRequest};
use std::fmt;
use std::future::Future;
use std::time::Duration;

/// Cache key of a request snapshot, `rma:{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SnapshotKey(String);

impl SnapshotKey {
    /// Key for a request id.
    #[must_use]
    pub fn for_request(id: RmaId) -> Self {
        Self(format!("rma:{id}"))
    }

    /// Key as a string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SnapshotKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Short-lived copy of a request handed from the lifecycle to notifications.
///
/// Relies on single-key atomicity only.
pub trait SnapshotCache: Send + Sync {
    /// Store a snapshot for `ttl`.
    ///
    /// # Errors
    ///
    /// Returns error if the cache is unreachable or serialization fails.
    fn put(
        &self,
        key: &SnapshotKey,
        request: &RmaRequest,
        ttl: Duration,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Read a snapshot; `None` when absent or expired.
    ///
    /// # Errors
    ///
    /// Returns error if the cache is unreachable or the payload is corrupt.
    fn get(&self, key: &SnapshotKey) -> impl Future<Output = Result<Option<RmaRequest>>> + Send;

    /// Remove a snapshot. Removing an absent key succeeds.
    ///
    /// # Errors
    ///
    /// Returns error if the cache is unreachable.
    fn delete(&self, key: &SnapshotKey) -> impl Future<Output = Result<()>> + Send;
}
