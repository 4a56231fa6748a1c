//! HTTP request handlers.
//!
//! - [`rma_form`]: customer-facing form
//! - [`admin`]: staff JSON API
//! - [`health`]: liveness

pub mod admin;
pub mod health;
pub mod rma_form;

pub use health::health_check;
