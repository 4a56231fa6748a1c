//! Error types for the RMA lifecycle.

use crate::validation::ValidationErrors;
use thiserror::Error;

/// Result type alias for RMA operations.
pub type Result<T> = std::result::Result<T, RmaError>;

/// Error taxonomy for the RMA lifecycle.
///
/// Only the user-facing variants prevent persistence. Cache misses and
/// delivery failures are reported by the notification service and never
/// roll back a persisted record.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RmaError {
    // ═══════════════════════════════════════════════════════════
    // Validation Errors
    // ═══════════════════════════════════════════════════════════

    /// An RMA request already exists for the same email, order reference and SKU.
    #[error(
        "An RMA request already exists for this product SKU with the same email and order reference."
    )]
    DuplicateRequest,

    /// One or more submitted fields are invalid.
    #[error("Invalid submission: {0}")]
    Validation(ValidationErrors),

    /// Status string is not one of the known statuses.
    #[error("Unknown RMA status: {0}")]
    UnknownStatus(String),

    // ═══════════════════════════════════════════════════════════
    // Integrity Errors
    // ═══════════════════════════════════════════════════════════

    /// The most recent RMA number does not have the `RMA-NNNNN` shape.
    #[error("Malformed RMA number in store: {found:?}")]
    MalformedRmaNumber {
        /// The identifier that failed to parse.
        found: String,
    },

    /// The numeric part of the RMA number cannot be incremented further.
    #[error("RMA number sequence exhausted after {last}")]
    RmaNumberExhausted {
        /// Last issued identifier.
        last: String,
    },

    // ═══════════════════════════════════════════════════════════
    // Lifecycle Errors
    // ═══════════════════════════════════════════════════════════

    /// The transient snapshot was never written or has expired.
    #[error("Request snapshot missing or expired: {key}")]
    SnapshotMissing {
        /// Cache key that was looked up.
        key: String,
    },

    /// Requested RMA does not exist.
    #[error("RMA request {0} not found")]
    NotFound(i64),

    // ═══════════════════════════════════════════════════════════
    // System Errors
    // ═══════════════════════════════════════════════════════════

    /// Database operation failed.
    #[error("Database error: {0}")]
    DatabaseError(String),

    /// Cache operation failed.
    #[error("Cache error: {0}")]
    CacheError(String),

    /// Email could not be built or delivered.
    #[error("Email error: {0}")]
    EmailError(String),

    /// Template lookup or rendering failed.
    #[error("Template error: {0}")]
    TemplateError(String),

    /// Serialization failed.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Internal error (should not be exposed to users).
    #[error("Internal error: {0}")]
    InternalError(String),
}

impl RmaError {
    /// Returns `true` if this error should be shown to the submitting user.
    ///
    /// # Examples
    ///
    /// ```
    /// # use rma_desk_core::RmaError;
    /// assert!(RmaError::DuplicateRequest.is_user_error());
    /// assert!(!RmaError::CacheError("down".into()).is_user_error());
    /// ```
    #[must_use]
    pub const fn is_user_error(&self) -> bool {
        matches!(
            self,
            Self::DuplicateRequest | Self::Validation(_) | Self::UnknownStatus(_)
        )
    }

    /// Returns `true` if this error signals corrupted stored data.
    #[must_use]
    pub const fn is_integrity_error(&self) -> bool {
        matches!(
            self,
            Self::MalformedRmaNumber { .. } | Self::RmaNumberExhausted { .. }
        )
    }
}

impl From<minijinja::Error> for RmaError {
    fn from(err: minijinja::Error) -> Self {
        Self::TemplateError(err.to_string())
    }
}

impl From<serde_json::Error> for RmaError {
    fn from(err: serde_json::Error) -> Self {
        Self::SerializationError(err.to_string())
    }
}
