//! Site metadata persistence.

use crate::error::Result;
use crate::state::SiteMetadata;
use std::future::Future;

/// Site metadata repository.
pub trait SiteMetaRepository: Send + Sync {
    /// Load the metadata of a site, creating the default record if absent.
    ///
    /// # Errors
    ///
    /// Returns error if the store cannot be queried or written.
    fn get_or_create(&self, site_id: i64) -> impl Future<Output = Result<SiteMetadata>> + Send;
}
