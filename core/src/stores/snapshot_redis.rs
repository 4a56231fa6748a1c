//! Redis-based snapshot cache.
//!
//! Snapshots are stored as JSON under `rma:{id}` with `SETEX`, so Redis
//! drops them after the TTL even if the notifier never runs.
//!
//! # Example
//!
//! ```no_run
//! use rma_desk_core::stores::RedisSnapshotCache;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let cache = RedisSnapshotCache::new("redis://127.0.0.1:6379").await?;
//! # Ok(())
//! # }
//! ```

use crate::error::{Result, RmaError};
use crate::providers::{SnapshotCache, SnapshotKey};
use crate::state::RmaRequest;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client};
use std::time::Duration;

/// `Redis` snapshot cache.
///
/// Each clone shares the same `ConnectionManager`.
#[derive(Clone)]
pub struct RedisSnapshotCache {
    conn_manager: ConnectionManager,
}

impl RedisSnapshotCache {
    /// Connect to `Redis`.
    ///
    /// # Errors
    ///
    /// Returns error if the URL is malformed or the connection fails.
    pub async fn new(redis_url: &str) -> Result<Self> {
        let client = Client::open(redis_url)
            .map_err(|e| RmaError::CacheError(format!("Failed to create Redis client: {e}")))?;

        let conn_manager = ConnectionManager::new(client).await.map_err(|e| {
            RmaError::CacheError(format!("Failed to create Redis connection manager: {e}"))
        })?;

        tracing::info!("RedisSnapshotCache initialized successfully");

        Ok(Self { conn_manager })
    }

    /// Seconds to pass to `SETEX`; Redis rejects zero.
    fn ttl_seconds(ttl: Duration) -> u64 {
        ttl.as_secs().max(1)
    }
}

impl SnapshotCache for RedisSnapshotCache {
    async fn put(&self, key: &SnapshotKey, request: &RmaRequest, ttl: Duration) -> Result<()> {
        let mut conn = self.conn_manager.clone();
        let payload = serde_json::to_vec(request)?;
        let ttl_seconds = Self::ttl_seconds(ttl);

        let (): () = conn
            .set_ex(key.as_str(), payload, ttl_seconds)
            .await
            .map_err(|e| RmaError::CacheError(format!("Failed to store snapshot: {e}")))?;

        tracing::debug!(
            key = %key,
            rma_number = %request.rma_number,
            ttl_seconds,
            "Stored request snapshot"
        );

        Ok(())
    }

    async fn get(&self, key: &SnapshotKey) -> Result<Option<RmaRequest>> {
        let mut conn = self.conn_manager.clone();

        let payload: Option<Vec<u8>> = conn
            .get(key.as_str())
            .await
            .map_err(|e| RmaError::CacheError(format!("Failed to read snapshot: {e}")))?;

        payload
            .map(|bytes| serde_json::from_slice(&bytes).map_err(RmaError::from))
            .transpose()
    }

    async fn delete(&self, key: &SnapshotKey) -> Result<()> {
        let mut conn = self.conn_manager.clone();

        let _: u64 = conn
            .del(key.as_str())
            .await
            .map_err(|e| RmaError::CacheError(format!("Failed to delete snapshot: {e}")))?;

        tracing::debug!(key = %key, "Deleted request snapshot");
        Ok(())
    }
}
