//! Production wiring: `PostgreSQL`, Redis and SMTP or console mail.

use crate::config::{Config, MailTransportKind};
use crate::pages::page_renderer;
use crate::state::{AppState, Providers};
use anyhow::Context as _;
use rma_desk_core::LifecycleController;
use rma_desk_core::environment::RmaEnvironment;
use rma_desk_core::notifications::templates::TemplateRenderer;
use rma_desk_core::providers::{AnyMailTransport, ConsoleMailTransport, SmtpMailTransport};
use rma_desk_core::site::SiteInfo;
use rma_desk_core::stores::RedisSnapshotCache;
use rma_desk_postgres::{PostgresRmaRepository, PostgresSiteMetaRepository};

/// Production provider bundle.
pub struct ProductionProviders;

impl Providers for ProductionProviders {
    type Repository = PostgresRmaRepository;
    type Snapshots = RedisSnapshotCache;
    type Mail = AnyMailTransport;
    type Sites = PostgresSiteMetaRepository;
}

/// Mail transport selected by `MAIL_TRANSPORT`.
///
/// # Errors
///
/// Returns error if the SMTP relay settings are invalid.
pub fn mail_transport(config: &Config) -> anyhow::Result<AnyMailTransport> {
    match config.email.transport {
        MailTransportKind::Console => Ok(AnyMailTransport::Console(ConsoleMailTransport::new())),
        MailTransportKind::Smtp => {
            let transport = SmtpMailTransport::new(&config.smtp_settings())
                .context("Failed to configure SMTP transport")?;
            Ok(AnyMailTransport::Smtp(transport))
        }
    }
}

/// Connect every backend and build the application state.
///
/// Runs database migrations.
///
/// # Errors
///
/// Returns error if a backend is unreachable or templates fail to compile.
pub async fn build_state(config: &Config) -> anyhow::Result<AppState<ProductionProviders>> {
    let pool = rma_desk_postgres::connect(&config.postgres.url, config.postgres.max_connections)
        .await
        .context("Failed to connect to PostgreSQL")?;
    rma_desk_postgres::migrate(&pool).await?;
    tracing::info!("✓ PostgreSQL ready");

    let snapshots = RedisSnapshotCache::new(&config.redis.url)
        .await
        .context("Failed to connect to Redis")?;
    tracing::info!("✓ Redis ready");

    let mail = mail_transport(config)?;
    tracing::info!(transport = ?config.email.transport, "✓ Mail transport ready");

    let templates_dir = config.rma.templates_dir.as_deref();
    let env = RmaEnvironment::new(
        PostgresRmaRepository::new(pool.clone()),
        snapshots,
        mail,
        SiteInfo::new(PostgresSiteMetaRepository::new(pool), config.site_config()),
    );
    let controller = LifecycleController::new(
        env,
        TemplateRenderer::emails(templates_dir)?,
        config.notification_config(),
        config.lifecycle_config(),
    );

    let state = AppState::new(controller, page_renderer(templates_dir)?);
    Ok(match &config.rma.admin_api_token {
        Some(token) => state.with_admin_token(token.clone()),
        None => {
            tracing::warn!("ADMIN_API_TOKEN not set; admin API disabled");
            state
        }
    })
}
