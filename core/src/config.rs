//! Lifecycle and notification configuration.
//!
//! Values are supplied by the application (see the server's `Config::from_env`).

use std::time::Duration;

/// Default lifetime of a request snapshot (15 minutes).
pub const DEFAULT_SNAPSHOT_TTL: Duration = Duration::from_secs(900);

/// Default lifetime of cached site metadata (1 hour).
pub const DEFAULT_SITE_CACHE_TTL: Duration = Duration::from_secs(3600);

/// Request lifecycle configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LifecycleConfig {
    /// How long a request snapshot stays readable.
    ///
    /// Default: 15 minutes
    pub snapshot_ttl: Duration,
}

impl LifecycleConfig {
    /// Create configuration with default values.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            snapshot_ttl: DEFAULT_SNAPSHOT_TTL,
        }
    }

    /// Set snapshot time-to-live.
    #[must_use]
    pub const fn with_snapshot_ttl(mut self, ttl: Duration) -> Self {
        self.snapshot_ttl = ttl;
        self
    }
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Email notification configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationConfig {
    /// Staff addresses that receive the creation notice.
    pub admin_recipients: Vec<String>,

    /// Sender address.
    pub from_email: String,

    /// Sender display name. Empty means the bare address is used.
    pub from_name: String,
}

impl NotificationConfig {
    /// Create configuration with the given sender address.
    #[must_use]
    pub const fn new(from_email: String) -> Self {
        Self {
            admin_recipients: Vec::new(),
            from_email,
            from_name: String::new(),
        }
    }

    /// Set administrator recipients.
    #[must_use]
    pub fn with_admin_recipients(mut self, recipients: Vec<String>) -> Self {
        self.admin_recipients = recipients;
        self
    }

    /// Set sender display name.
    #[must_use]
    pub fn with_from_name(mut self, name: impl Into<String>) -> Self {
        self.from_name = name.into();
        self
    }

    /// `From` header value.
    #[must_use]
    pub fn from_header(&self) -> String {
        if self.from_name.is_empty() {
            self.from_email.clone()
        } else {
            format!("{} <{}>", self.from_name, self.from_email)
        }
    }
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self::new("webmaster@localhost".to_string())
    }
}

/// Site metadata lookup configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SiteConfig {
    /// Site whose metadata is served.
    pub site_id: i64,

    /// Cache lifetime.
    ///
    /// Default: 1 hour
    pub cache_ttl: Duration,
}

impl SiteConfig {
    /// Create configuration for a site.
    #[must_use]
    pub const fn new(site_id: i64) -> Self {
        Self {
            site_id,
            cache_ttl: DEFAULT_SITE_CACHE_TTL,
        }
    }

    /// Set cache lifetime.
    #[must_use]
    pub const fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self::new(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lifecycle_config_defaults() {
        let config = LifecycleConfig::default();
        assert_eq!(config.snapshot_ttl, Duration::from_secs(900));
    }

    #[test]
    fn test_lifecycle_config_builder() {
        let config = LifecycleConfig::new().with_snapshot_ttl(Duration::from_secs(30));
        assert_eq!(config.snapshot_ttl, Duration::from_secs(30));
    }

    #[test]
    fn test_notification_from_header() {
        let config = NotificationConfig::new("rma@example.com".to_string());
        assert_eq!(config.from_header(), "rma@example.com");

        let named = config.with_from_name("ED Systems");
        assert_eq!(named.from_header(), "ED Systems <rma@example.com>");
    }

    #[test]
    fn test_site_config_defaults() {
        let config = SiteConfig::default();
        assert_eq!(config.site_id, 1);
        assert_eq!(config.cache_ttl, Duration::from_secs(3600));
    }
}
