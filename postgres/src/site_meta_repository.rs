//! PostgreSQL site metadata repository.

use rma_desk_core::providers::SiteMetaRepository;
use rma_desk_core::state::SiteMetadata;
use rma_desk_core::{Result, RmaError};
use sqlx::{PgPool, Row};

/// PostgreSQL site metadata repository.
///
/// Missing sites are created with [`SiteMetadata::with_defaults`] on first read.
#[derive(Clone)]
pub struct PostgresSiteMetaRepository {
    pool: PgPool,
}

impl PostgresSiteMetaRepository {
    /// Create a new repository.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl SiteMetaRepository for PostgresSiteMetaRepository {
    async fn get_or_create(&self, site_id: i64) -> Result<SiteMetadata> {
        let defaults = SiteMetadata::with_defaults(site_id);

        let inserted = sqlx::query(
            r"
            INSERT INTO site_meta (
                site_id, name, domain, title, description, keywords, logo_url,
                social_logo_url, return_address, facebook, x_twitter, linkedin, instagram
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            ON CONFLICT (site_id) DO NOTHING
            ",
        )
        .bind(defaults.site_id)
        .bind(&defaults.name)
        .bind(&defaults.domain)
        .bind(&defaults.title)
        .bind(&defaults.description)
        .bind(&defaults.keywords)
        .bind(&defaults.logo)
        .bind(&defaults.og_image)
        .bind(&defaults.return_address)
        .bind(&defaults.facebook)
        .bind(&defaults.x_twitter)
        .bind(&defaults.linkedin)
        .bind(&defaults.instagram)
        .execute(&self.pool)
        .await
        .map_err(|e| RmaError::DatabaseError(format!("Failed to create site metadata: {e}")))?;

        if inserted.rows_affected() > 0 {
            tracing::info!(site_id, "Created default site metadata");
        }

        let row = sqlx::query(
            r"
            SELECT site_id, name, domain, title, description, keywords, logo_url,
                   social_logo_url, return_address, facebook, x_twitter, linkedin, instagram
            FROM site_meta
            WHERE site_id = $1
            ",
        )
        .bind(site_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| RmaError::DatabaseError(format!("Failed to load site metadata: {e}")))?;

        let get_err = |e: sqlx::Error| RmaError::DatabaseError(format!("Failed to read row: {e}"));

        Ok(SiteMetadata {
            site_id: row.try_get("site_id").map_err(get_err)?,
            name: row.try_get("name").map_err(get_err)?,
            title: row.try_get("title").map_err(get_err)?,
            domain: row.try_get("domain").map_err(get_err)?,
            description: row.try_get("description").map_err(get_err)?,
            keywords: row.try_get("keywords").map_err(get_err)?,
            logo: row.try_get("logo_url").map_err(get_err)?,
            og_image: row.try_get("social_logo_url").map_err(get_err)?,
            return_address: row.try_get("return_address").map_err(get_err)?,
            facebook: row.try_get("facebook").map_err(get_err)?,
            x_twitter: row.try_get("x_twitter").map_err(get_err)?,
            linkedin: row.try_get("linkedin").map_err(get_err)?,
            instagram: row.try_get("instagram").map_err(get_err)?,
        })
    }
}
