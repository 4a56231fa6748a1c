//! In-memory request repository.

use crate::error::{Result, RmaError};
use crate::identifier::next_identifier;
use crate::providers::repository::PAGE_SIZE;
use crate::providers::{RmaPage, RmaRepository, RmaSearch};
use crate::state::{DuplicateKey, RmaId, RmaRequest, RmaSubmission};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Mutex;

#[derive(Debug, Default)]
struct Rows {
    next_id: i64,
    requests: Vec<RmaRequest>,
    legacy_number: Option<String>,
}

impl Rows {
    fn latest(&self) -> Option<String> {
        if let Some(raw) = &self.legacy_number {
            return Some(raw.clone());
        }
        self.requests
            .iter()
            .max_by_key(|r| r.id)
            .map(|r| r.rma_number.to_string())
    }
}

/// In-memory request repository.
///
/// Numbering and insertion happen under one lock, matching the advisory
/// lock of the SQL store. Clones share the same rows.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRmaRepository {
    rows: Arc<Mutex<Rows>>,
    fail_saves: Arc<AtomicBool>,
}

impl InMemoryRmaRepository {
    /// Create an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a row as-is, bypassing numbering. For seeding legacy data.
    pub async fn seed(&self, mut request: RmaRequest) -> RmaRequest {
        let mut rows = self.rows.lock().await;
        rows.next_id += 1;
        request.id = RmaId::new(rows.next_id);
        rows.requests.push(request.clone());
        request
    }

    /// Pretend the most recent row carries `raw` as its RMA number.
    ///
    /// Lets tests reproduce rows written by older systems with another
    /// numbering scheme. Cleared by the next successful insert.
    pub async fn seed_raw_number(&self, raw: &str) {
        self.rows.lock().await.legacy_number = Some(raw.to_string());
    }

    /// Make every subsequent [`RmaRepository::save_admin_changes`] fail.
    pub fn fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::SeqCst);
    }

    /// Number of stored requests.
    pub async fn len(&self) -> usize {
        self.rows.lock().await.requests.len()
    }

    /// Whether nothing is stored.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Every stored request, oldest first.
    pub async fn all(&self) -> Vec<RmaRequest> {
        self.rows.lock().await.requests.clone()
    }
}

impl RmaRepository for InMemoryRmaRepository {
    async fn latest_rma_number(&self) -> Result<Option<String>> {
        let rows = self.rows.lock().await;
        Ok(rows.latest())
    }

    async fn duplicate_exists(&self, key: &DuplicateKey) -> Result<bool> {
        let rows = self.rows.lock().await;
        Ok(rows.requests.iter().any(|r| r.duplicate_key() == *key))
    }

    async fn insert_numbered(
        &self,
        submission: RmaSubmission,
        created_at: DateTime<Utc>,
    ) -> Result<RmaRequest> {
        let mut rows = self.rows.lock().await;

        let key = submission.duplicate_key();
        if rows.requests.iter().any(|r| r.duplicate_key() == key) {
            return Err(RmaError::DuplicateRequest);
        }

        let rma_number = next_identifier(rows.latest().as_deref())?;
        rows.next_id += 1;
        rows.legacy_number = None;
        let request = submission.into_request(RmaId::new(rows.next_id), rma_number, created_at);
        rows.requests.push(request.clone());
        Ok(request)
    }

    async fn get(&self, id: RmaId) -> Result<Option<RmaRequest>> {
        let rows = self.rows.lock().await;
        Ok(rows.requests.iter().find(|r| r.id == id).cloned())
    }

    async fn save_admin_changes(&self, request: &RmaRequest) -> Result<()> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(RmaError::DatabaseError("simulated save failure".to_string()));
        }

        let mut rows = self.rows.lock().await;
        let stored = rows
            .requests
            .iter_mut()
            .find(|r| r.id == request.id)
            .ok_or(RmaError::NotFound(request.id.get()))?;
        stored.status = request.status;
        stored.rma_instructions.clone_from(&request.rma_instructions);
        Ok(())
    }

    async fn search(&self, query: &RmaSearch) -> Result<RmaPage> {
        let rows = self.rows.lock().await;
        let mut matching: Vec<&RmaRequest> =
            rows.requests.iter().filter(|r| query.matches(r)).collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        let offset = usize::try_from(query.offset()).unwrap_or(usize::MAX);
        let items = matching
            .iter()
            .skip(offset)
            .take(PAGE_SIZE as usize)
            .map(|r| (*r).clone())
            .collect();

        Ok(RmaPage {
            items,
            total: matching.len() as u64,
            page: query.page(),
            per_page: PAGE_SIZE,
        })
    }
}
