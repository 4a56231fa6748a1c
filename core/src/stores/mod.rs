//! Production store implementations backed by `Redis`.

pub mod snapshot_redis;

pub use snapshot_redis::RedisSnapshotCache;
