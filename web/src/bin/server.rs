//! RMA Desk server.
//!
//! # Usage
//!
//! ```bash
//! # Start PostgreSQL and Redis, then
//! DATABASE_URL=postgres://... ADMIN=ops@example.com cargo run --bin rma-desk-server
//! ```

use rma_desk_web::app::build_state;
use rma_desk_web::{Config, build_router};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,rma_desk=debug,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting RMA Desk server...");

    let config = Config::from_env();
    tracing::info!(
        bind = %config.bind_address(),
        site_id = config.site.site_id,
        admins = config.email.admins.len(),
        "Configuration loaded"
    );

    let state = build_state(&config).await?;
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(config.bind_address()).await?;
    tracing::info!(addr = %listener.local_addr()?, "RMA Desk is listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutting down gracefully...");
        })
        .await?;

    Ok(())
}
