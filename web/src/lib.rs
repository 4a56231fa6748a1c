//! Axum web surface for RMA Desk.
//!
//! The HTTP layer is the imperative shell around the lifecycle controller:
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │         Imperative Shell (Axum)         │  ← form parsing, HTML, JSON
//! │  - Validation and page rendering        │  ← admin bearer token
//! ├─────────────────────────────────────────┤
//! │         Lifecycle Controller            │
//! │  - Reducer decides effects              │  ← snapshot, persist, notify
//! │  - Notifications on background tasks    │
//! └─────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use rma_desk_web::{AppState, build_router, pages::page_renderer};
//!
//! let state = AppState::<ProductionProviders>::new(controller, page_renderer(None)?)
//!     .with_admin_token(token);
//! let app = build_router(state);
//! axum::serve(listener, app).await?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod app;
pub mod config;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod pages;
pub mod router;
pub mod state;

pub use config::Config;
pub use error::AppError;
pub use extractors::{BearerToken, RequireAdmin};
pub use middleware::{NO_INDEX, ROBOTS_TAG_HEADER, no_index_layer};
pub use router::build_router;
pub use state::{AppState, Controller, Providers};
