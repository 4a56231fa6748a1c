//! `PostgreSQL` storage for RMA Desk.
//!
//! This crate implements the repository traits from `rma-desk-core` on top
//! of sqlx:
//!
//! - [`PostgresRmaRepository`]: RMA requests, with serialized number assignment
//! - [`PostgresSiteMetaRepository`]: per-site metadata, created lazily
//!
//! # Example
//!
//! ```no_run
//! use rma_desk_postgres::{PostgresRmaRepository, PostgresSiteMetaRepository, connect, migrate};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let pool = connect("postgres://localhost/rma", 10).await?;
//! migrate(&pool).await?;
//!
//! let requests = PostgresRmaRepository::new(pool.clone());
//! let sites = PostgresSiteMetaRepository::new(pool);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod rma_repository;
mod site_meta_repository;

pub use rma_repository::PostgresRmaRepository;
pub use site_meta_repository::PostgresSiteMetaRepository;

use rma_desk_core::{Result, RmaError};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

/// Open a connection pool.
///
/// # Errors
///
/// Returns error if the database is unreachable.
pub async fn connect(database_url: &str, max_connections: u32) -> Result<PgPool> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await
        .map_err(|e| RmaError::DatabaseError(format!("Failed to connect: {e}")))
}

/// Run the embedded migrations.
///
/// # Errors
///
/// Returns error if migrations fail.
pub async fn migrate(pool: &PgPool) -> Result<()> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .map_err(|e| RmaError::DatabaseError(format!("Migration failed: {e}")))?;
    tracing::info!("Database migrations applied");
    Ok(())
}
