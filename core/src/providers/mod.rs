//! RMA providers.
//!
//! This module defines traits for every external dependency of the
//! lifecycle: persistence, the transient snapshot cache, mail delivery and
//! site metadata. The controller and notification service depend on these
//! traits; the server wires in concrete implementations.
//!
//! ```text
//! ┌──────────────────────┐     ┌──────────────────┐
//! │ LifecycleController  │────▶│ RmaRepository    │  PostgreSQL / in-memory
//! │                      │────▶│ SnapshotCache    │  Redis / in-memory
//! └──────────┬───────────┘     └──────────────────┘
//!            │ spawn
//!            ▼
//! ┌──────────────────────┐     ┌──────────────────┐
//! │ NotificationService  │────▶│ MailTransport    │  SMTP / console / recording
//! │                      │────▶│ SiteMetaRepo     │  via SiteInfo (moka)
//! └──────────────────────┘     └──────────────────┘
//! ```

pub mod console_email;
pub mod email;
pub mod repository;
pub mod site_meta;
pub mod smtp_email;
pub mod snapshot_cache;

pub use console_email::ConsoleMailTransport;
pub use email::{AnyMailTransport, EmailMessage, MailTransport};
pub use repository::{PAGE_SIZE, RmaPage, RmaRepository, RmaSearch};
pub use site_meta::SiteMetaRepository;
pub use smtp_email::{SmtpMailTransport, SmtpSettings};
pub use snapshot_cache::{SnapshotCache, SnapshotKey};
