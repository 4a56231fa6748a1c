//! Cached site metadata lookup.
//!
//! Metadata is read through [`SiteMetaRepository::get_or_create`] on a miss
//! and kept in a process-wide `moka` cache. Entries expire after the
//! configured TTL and are never invalidated otherwise, so edits become
//! visible within one TTL.

use crate::config::SiteConfig;
use crate::error::Result;
use crate::providers::SiteMetaRepository;
use crate::state::SiteMetadata;
use moka::sync::Cache;

/// Page title used by the RMA form.
pub const RMA_PAGE_TITLE: &str = "RMA request";

/// Page description used by the RMA form.
pub const RMA_PAGE_DESCRIPTION: &str = "Effortless manage your return with our RMA System!";

/// Cached site metadata.
#[derive(Clone)]
pub struct SiteInfo<S> {
    repository: S,
    site_id: i64,
    cache: Cache<i64, SiteMetadata>,
}

impl<S: SiteMetaRepository> SiteInfo<S> {
    /// Create a lookup for the configured site.
    #[must_use]
    pub fn new(repository: S, config: SiteConfig) -> Self {
        let cache = Cache::builder()
            .max_capacity(16)
            .time_to_live(config.cache_ttl)
            .build();

        Self {
            repository,
            site_id: config.site_id,
            cache,
        }
    }

    /// Metadata of the configured site.
    ///
    /// # Errors
    ///
    /// Returns error if the metadata is not cached and cannot be loaded.
    pub async fn get(&self) -> Result<SiteMetadata> {
        if let Some(cached) = self.cache.get(&self.site_id) {
            return Ok(cached);
        }

        let metadata = self.repository.get_or_create(self.site_id).await?;
        tracing::debug!(site_id = self.site_id, name = %metadata.name, "Site metadata loaded");
        self.cache.insert(self.site_id, metadata.clone());
        Ok(metadata)
    }

    /// Metadata for the RMA form page, with its own title and description.
    ///
    /// The cached record is left untouched.
    ///
    /// # Errors
    ///
    /// Same as [`SiteInfo::get`].
    pub async fn rma_page_metadata(&self) -> Result<SiteMetadata> {
        let mut metadata = self.get().await?;
        metadata.title = RMA_PAGE_TITLE.to_string();
        metadata.description = RMA_PAGE_DESCRIPTION.to_string();
        Ok(metadata)
    }
}

#[cfg(all(test, feature = "test-utils"))]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::mocks::InMemorySiteMetaRepository;

    #[tokio::test]
    async fn test_missing_site_is_created_with_defaults() {
        let repository = InMemorySiteMetaRepository::new();
        let site = SiteInfo::new(repository.clone(), SiteConfig::new(3));

        let metadata = site.get().await.unwrap();
        assert_eq!(metadata.site_id, 3);
        assert_eq!(metadata.instagram, "#");
    }

    #[tokio::test]
    async fn test_second_lookup_is_served_from_cache() {
        let repository = InMemorySiteMetaRepository::new();
        let site = SiteInfo::new(repository.clone(), SiteConfig::default());

        site.get().await.unwrap();
        let mut renamed = SiteMetadata::with_defaults(1);
        renamed.name = "Renamed".to_string();
        repository.upsert(renamed);

        // Stale until the TTL elapses.
        assert_eq!(site.get().await.unwrap().name, "example.com");
        assert_eq!(repository.loads(), 1);
    }

    #[tokio::test]
    async fn test_rma_page_overrides_do_not_touch_cache() {
        let mut stored = SiteMetadata::with_defaults(1);
        stored.title = "Shop".to_string();
        let site = SiteInfo::new(
            InMemorySiteMetaRepository::with_site(stored),
            SiteConfig::default(),
        );

        let page = site.rma_page_metadata().await.unwrap();
        assert_eq!(page.title, RMA_PAGE_TITLE);
        assert_eq!(page.description, RMA_PAGE_DESCRIPTION);
        assert_eq!(site.get().await.unwrap().title, "Shop");
    }
}
