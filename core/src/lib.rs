//! # RMA Desk Core
//!
//! Return Merchandise Authorization lifecycle and notification coordination.
//!
//! ## Architecture
//!
//! - **State**: [`state::RmaRequest`] and its identifier/status types
//! - **Actions**: [`actions::RmaAction`] (`RequestCreated`, `ApplyAdminChanges`)
//! - **Reducer**: [`reducer::RmaReducer`], pure `(State, Action, Config) → Effects`
//! - **Effects**: [`effects::RmaEffect`] descriptions, executed by
//!   [`lifecycle::LifecycleController`]
//! - **Providers**: traits for persistence, snapshot cache, mail and site metadata
//!
//! ## Creation flow
//!
//! ```text
//! submission → duplicate check → next RMA number + insert (serialized)
//!            → snapshot rma:{id} → notify admin + customer → evict snapshot
//! ```
//!
//! ## Approval flow
//!
//! ```text
//! staff edit → status changed to rma_sent? → snapshot → save → notify customer
//!            → evict snapshot
//! ```

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod actions;
pub mod config;
pub mod effects;
pub mod environment;
pub mod error;
pub mod identifier;
pub mod lifecycle;
pub mod notifications;
pub mod providers;
pub mod reducer;
pub mod site;
pub mod state;
pub mod stores;
pub mod validation;

#[cfg(feature = "test-utils")]
pub mod mocks;

pub use error::{Result, RmaError};
pub use lifecycle::{EffectHandle, LifecycleController, Submitted, Updated};
pub use notifications::{DeliveryReport, NotificationKind, NotificationService};
pub use state::{RmaId, RmaNumber, RmaRequest, RmaStatus, RmaSubmission, RmaUpdate, SiteMetadata};
