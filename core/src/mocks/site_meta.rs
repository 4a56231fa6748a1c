//! In-memory site metadata repository.

use crate::error::{Result, RmaError};
use crate::providers::SiteMetaRepository;
use crate::state::SiteMetadata;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// In-memory site metadata repository.
///
/// Counts loads so tests can observe cache hits.
#[derive(Debug, Clone, Default)]
pub struct InMemorySiteMetaRepository {
    sites: Arc<Mutex<HashMap<i64, SiteMetadata>>>,
    loads: Arc<AtomicUsize>,
}

impl InMemorySiteMetaRepository {
    /// Create an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a repository holding one record.
    #[must_use]
    pub fn with_site(metadata: SiteMetadata) -> Self {
        let repository = Self::default();
        repository.upsert(metadata);
        repository
    }

    /// Store or replace a record.
    pub fn upsert(&self, metadata: SiteMetadata) {
        if let Ok(mut sites) = self.sites.lock() {
            sites.insert(metadata.site_id, metadata);
        }
    }

    /// Number of `get_or_create` calls.
    #[must_use]
    pub fn loads(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }
}

impl SiteMetaRepository for InMemorySiteMetaRepository {
    async fn get_or_create(&self, site_id: i64) -> Result<SiteMetadata> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        let mut sites = self
            .sites
            .lock()
            .map_err(|_| RmaError::DatabaseError("site lock poisoned".to_string()))?;
        Ok(sites
            .entry(site_id)
            .or_insert_with(|| SiteMetadata::with_defaults(site_id))
            .clone())
    }
}
