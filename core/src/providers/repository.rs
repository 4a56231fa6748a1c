//! RMA request persistence.

use crate::error::Result;
use crate::state::{DuplicateKey, RmaId, RmaRequest, RmaStatus, RmaSubmission};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::future::Future;

/// Admin list page size.
pub const PAGE_SIZE: u32 = 20;

/// Admin list query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RmaSearch {
    /// Case-insensitive substring matched against RMA number, order
    /// reference, SKU and email.
    #[serde(default)]
    pub q: Option<String>,

    /// Status filter.
    #[serde(default)]
    pub status: Option<RmaStatus>,

    /// One-based page number.
    #[serde(default)]
    pub page: Option<u32>,
}

impl RmaSearch {
    /// One-based page, never zero.
    #[must_use]
    pub fn page(&self) -> u32 {
        self.page.unwrap_or(1).max(1)
    }

    /// Row offset of the page.
    #[must_use]
    pub fn offset(&self) -> u64 {
        u64::from(self.page() - 1) * u64::from(PAGE_SIZE)
    }

    /// Trimmed search term, `None` when blank.
    #[must_use]
    pub fn term(&self) -> Option<&str> {
        self.q.as_deref().map(str::trim).filter(|q| !q.is_empty())
    }

    /// Whether a request matches the term and status filter.
    ///
    /// Used by in-memory stores; SQL stores express the same predicate.
    #[must_use]
    pub fn matches(&self, request: &RmaRequest) -> bool {
        if self.status.is_some_and(|status| status != request.status) {
            return false;
        }
        let Some(term) = self.term() else {
            return true;
        };
        let term = term.to_lowercase();
        [
            request.rma_number.to_string(),
            request.order_ref.clone(),
            request.product_sku.clone(),
            request.email.clone(),
        ]
        .iter()
        .any(|field| field.to_lowercase().contains(&term))
    }
}

/// One page of admin results, newest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RmaPage {
    /// Requests on this page.
    pub items: Vec<RmaRequest>,
    /// Total matching requests.
    pub total: u64,
    /// One-based page number.
    pub page: u32,
    /// Page size.
    pub per_page: u32,
}

/// RMA request repository.
///
/// Implementations must serialize [`RmaRepository::insert_numbered`] so
/// that concurrent submissions never read the same last identifier.
pub trait RmaRepository: Send + Sync {
    /// RMA number of the most recently created request (highest id).
    ///
    /// Returned raw so a malformed stored value can be reported.
    ///
    /// # Errors
    ///
    /// Returns error if the store cannot be queried.
    fn latest_rma_number(&self) -> impl Future<Output = Result<Option<String>>> + Send;

    /// Whether a request with the same email, order reference and SKU exists.
    ///
    /// # Errors
    ///
    /// Returns error if the store cannot be queried.
    fn duplicate_exists(&self, key: &DuplicateKey) -> impl Future<Output = Result<bool>> + Send;

    /// Assign the next RMA number and insert the request, as one serialized step.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - The triple already exists ([`crate::RmaError::DuplicateRequest`])
    /// - The last stored identifier is malformed
    /// - The store fails
    fn insert_numbered(
        &self,
        submission: RmaSubmission,
        created_at: DateTime<Utc>,
    ) -> impl Future<Output = Result<RmaRequest>> + Send;

    /// Load one request.
    ///
    /// # Errors
    ///
    /// Returns error if the store cannot be queried.
    fn get(&self, id: RmaId) -> impl Future<Output = Result<Option<RmaRequest>>> + Send;

    /// Persist the staff-editable fields (`status`, `rma_instructions`).
    ///
    /// # Errors
    ///
    /// Returns [`crate::RmaError::NotFound`] if the request vanished, or a
    /// store error.
    fn save_admin_changes(&self, request: &RmaRequest) -> impl Future<Output = Result<()>> + Send;

    /// Admin list, ordered by creation time descending.
    ///
    /// # Errors
    ///
    /// Returns error if the store cannot be queried.
    fn search(&self, query: &RmaSearch) -> impl Future<Output = Result<RmaPage>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_defaults_to_first() {
        let search = RmaSearch::default();
        assert_eq!(search.page(), 1);
        assert_eq!(search.offset(), 0);

        let third = RmaSearch {
            page: Some(3),
            ..RmaSearch::default()
        };
        assert_eq!(third.offset(), 40);

        let zero = RmaSearch {
            page: Some(0),
            ..RmaSearch::default()
        };
        assert_eq!(zero.page(), 1);
    }

    #[test]
    fn blank_term_is_ignored() {
        let search = RmaSearch {
            q: Some("   ".to_string()),
            ..RmaSearch::default()
        };
        assert_eq!(search.term(), None);
    }
}
