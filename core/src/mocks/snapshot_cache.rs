//! In-memory snapshot cache.

use crate::environment::{Clock, SystemClock};
use crate::error::{Result, RmaError};
use crate::providers::{SnapshotCache, SnapshotKey};
use crate::state::RmaRequest;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Debug, Clone)]
struct Entry {
    request: RmaRequest,
    expires_at: DateTime<Utc>,
}

/// In-memory snapshot cache.
///
/// Expiry is evaluated against the injected clock on every read. Clones
/// share the same entries.
#[derive(Clone)]
pub struct InMemorySnapshotCache {
    entries: Arc<Mutex<HashMap<String, Entry>>>,
    clock: Arc<dyn Clock>,
    fail_writes: Arc<AtomicBool>,
    writes: Arc<Mutex<Vec<String>>>,
}

impl Default for InMemorySnapshotCache {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemorySnapshotCache {
    /// Create an empty cache on the system clock.
    #[must_use]
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Create an empty cache on the given clock.
    #[must_use]
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Arc::new(Mutex::new(HashMap::new())),
            clock,
            fail_writes: Arc::new(AtomicBool::new(false)),
            writes: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Make every subsequent `put` fail.
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Drop every entry, as if all TTLs had elapsed.
    pub fn expire_all(&self) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.clear();
        }
    }

    /// Whether a live entry exists for the key.
    #[must_use]
    pub fn contains(&self, key: &SnapshotKey) -> bool {
        let now = self.clock.now();
        self.entries
            .lock()
            .map(|entries| entries.get(key.as_str()).is_some_and(|e| e.expires_at > now))
            .unwrap_or(false)
    }

    /// Keys written so far, in order.
    #[must_use]
    pub fn writes(&self) -> Vec<String> {
        self.writes.lock().map(|w| w.clone()).unwrap_or_default()
    }

    fn poisoned() -> RmaError {
        RmaError::CacheError("snapshot cache lock poisoned".to_string())
    }
}

impl SnapshotCache for InMemorySnapshotCache {
    async fn put(&self, key: &SnapshotKey, request: &RmaRequest, ttl: Duration) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(RmaError::CacheError("simulated cache outage".to_string()));
        }

        let ttl = chrono::Duration::from_std(ttl)
            .map_err(|e| RmaError::CacheError(format!("Invalid TTL: {e}")))?;
        let entry = Entry {
            request: request.clone(),
            expires_at: self.clock.now() + ttl,
        };

        self.entries
            .lock()
            .map_err(|_| Self::poisoned())?
            .insert(key.to_string(), entry);
        self.writes
            .lock()
            .map_err(|_| Self::poisoned())?
            .push(key.to_string());
        Ok(())
    }

    async fn get(&self, key: &SnapshotKey) -> Result<Option<RmaRequest>> {
        let now = self.clock.now();
        let mut entries = self.entries.lock().map_err(|_| Self::poisoned())?;

        match entries.get(key.as_str()) {
            Some(entry) if entry.expires_at > now => Ok(Some(entry.request.clone())),
            Some(_) => {
                entries.remove(key.as_str());
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn delete(&self, key: &SnapshotKey) -> Result<()> {
        self.entries
            .lock()
            .map_err(|_| Self::poisoned())?
            .remove(key.as_str());
        Ok(())
    }
}
