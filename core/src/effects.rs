//! Lifecycle effects.
//!
//! Effects are **values**, not execution. The reducer returns them and
//! [`crate::lifecycle::LifecycleController`] interprets them.

use crate::state::{RmaId, RmaRequest};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Lifecycle effect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RmaEffect {
    /// No effect.
    None,

    /// Execute effects in order; stop at the first failure.
    Sequential(Vec<RmaEffect>),

    /// Write the request snapshot under `rma:{id}`.
    ///
    /// # Executor Responsibility
    ///
    /// A failed write is logged and does not stop the lifecycle; the
    /// notification then reports the missing snapshot.
    CacheSnapshot {
        /// Record to cache.
        request: Box<RmaRequest>,
        /// Time-to-live.
        ttl: Duration,
    },

    /// Persist the staff-editable fields.
    ///
    /// # Executor Responsibility
    ///
    /// On failure, evict any snapshot written earlier in the same sequence
    /// and skip the remaining effects.
    PersistChanges {
        /// Record with the applied edits.
        request: Box<RmaRequest>,
    },

    /// Send the admin and customer creation notices.
    NotifyCreation {
        /// Request id (snapshot key).
        request_id: RmaId,
    },

    /// Send the return instructions to the customer.
    NotifyStatusSent {
        /// Request id (snapshot key).
        request_id: RmaId,
    },
}

impl RmaEffect {
    /// Whether this effect, or any nested one, sends email.
    #[must_use]
    pub fn notifies(&self) -> bool {
        match self {
            Self::NotifyCreation { .. } | Self::NotifyStatusSent { .. } => true,
            Self::Sequential(effects) => effects.iter().any(Self::notifies),
            Self::None | Self::CacheSnapshot { .. } | Self::PersistChanges { .. } => false,
        }
    }
}
