//! In-memory provider implementations for testing.
//!
//! Each mock shares its state between clones, so a test can keep one
//! handle for assertions while the controller owns another.

pub mod email;
pub mod repository;
pub mod site_meta;
pub mod snapshot_cache;

pub use email::RecordingMailTransport;
pub use repository::InMemoryRmaRepository;
pub use site_meta::InMemorySiteMetaRepository;
pub use snapshot_cache::InMemorySnapshotCache;
