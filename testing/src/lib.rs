//! # RMA Desk Testing
//!
//! Testing utilities and helpers for RMA Desk.
//!
//! This crate provides:
//! - A fixed clock for deterministic timestamps
//! - Fixtures for submissions, requests and site metadata
//! - [`TestHarness`], a lifecycle controller wired to in-memory providers
//! - [`ReducerTest`], a Given-When-Then reducer harness
//!
//! ## Example
//!
//! ```
//! use rma_desk_testing::{TestHarness, fixtures::submission};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let harness = TestHarness::new();
//! let submitted = harness.controller.submit(submission().build()).await.unwrap();
//! let reports = submitted.notification.wait().await;
//!
//! assert_eq!(submitted.request.rma_number.to_string(), "RMA-00001");
//! assert!(reports[0].is_delivered());
//! assert_eq!(harness.mail.sent().len(), 2);
//! # }
//! ```

use chrono::{DateTime, Utc};
use rma_desk_core::environment::Clock;


pub use reducer_test::{ReducerTest, assertions};

/// Mock implementations of Environment traits
pub mod mocks {
    use super::{Clock, DateTime, Utc};

    /// Fixed clock for deterministic tests
    ///
    /// Always returns the same time, making tests reproducible.
    ///
    /// # Example
    ///
    /// ```
    /// use rma_desk_testing::mocks::FixedClock;
    /// use rma_desk_core::environment::Clock;
    /// use chrono::Utc;
    ///
    /// let clock = FixedClock::new(Utc::now());
    /// let time1 = clock.now();
    /// let time2 = clock.now();
    /// assert_eq!(time1, time2); // Always the same!
    /// ```
    #[derive(Debug, Clone)]
    pub struct FixedClock {
        time: DateTime<Utc>,
    }

    impl FixedClock {
        /// Create a new fixed clock with the given time
        #[must_use]
        pub const fn new(time: DateTime<Utc>) -> Self {
            Self { time }
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.time
        }
    }

    /// Create a default fixed clock for tests (2025-01-01 00:00:00 UTC)
    ///
    /// # Panics
    ///
    /// This function will panic if the hardcoded timestamp fails to parse,
    /// which should never happen in practice.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn test_clock() -> FixedClock {
        FixedClock::new(
            DateTime::parse_from_rfc3339("2025-01-01T00:00:00Z")
                .expect("hardcoded timestamp should always parse")
                .with_timezone(&Utc),
        )
    }
}

/// Fixtures for domain values.
pub mod fixtures {
    use super::mocks::test_clock;
    use rma_desk_core::environment::Clock;
    use rma_desk_core::state::{RmaId, RmaNumber, RmaRequest, RmaSubmission, SiteMetadata};

    /// Site name used by [`site_metadata`].
    pub const SITE_NAME: &str = "ED Systems";

    /// Administrator address used by the harness.
    pub const ADMIN_EMAIL: &str = "admin@edsystems.test";

    /// Builder for valid submissions.
    #[derive(Debug, Clone)]
    pub struct SubmissionBuilder {
        submission: RmaSubmission,
    }

    impl SubmissionBuilder {
        /// Set the customer email.
        #[must_use]
        pub fn email(mut self, email: &str) -> Self {
            self.submission.email = email.to_string();
            self
        }

        /// Set the order reference.
        #[must_use]
        pub fn order_ref(mut self, order_ref: &str) -> Self {
            self.submission.order_ref = order_ref.to_string();
            self
        }

        /// Set the product SKU.
        #[must_use]
        pub fn product_sku(mut self, sku: &str) -> Self {
            self.submission.product_sku = sku.to_string();
            self
        }

        /// Set the phone number.
        #[must_use]
        pub fn phone(mut self, phone: &str) -> Self {
            self.submission.phone = Some(phone.to_string());
            self
        }

        /// Finish.
        #[must_use]
        pub fn build(self) -> RmaSubmission {
            self.submission
        }
    }

    /// A valid submission with distinct defaults.
    #[must_use]
    pub fn submission() -> SubmissionBuilder {
        SubmissionBuilder {
            submission: RmaSubmission {
                customer_name: "Ada Lovelace".to_string(),
                email: "ada@example.com".to_string(),
                phone: None,
                order_ref: "ORD-1001".to_string(),
                product_sku: "ED-SKU-42".to_string(),
                reason_for_return: "Arrived with a cracked housing".to_string(),
            },
        }
    }

    /// A pending request numbered after its id.
    #[must_use]
    pub fn pending_request(id: i64, submission: RmaSubmission) -> RmaRequest {
        let sequence = u32::try_from(id).unwrap_or(u32::MAX);
        submission.into_request(
            RmaId::new(id),
            RmaNumber::from_sequence(sequence),
            test_clock().now(),
        )
    }

    /// Site metadata named [`SITE_NAME`].
    #[must_use]
    pub fn site_metadata() -> SiteMetadata {
        let mut metadata = SiteMetadata::with_defaults(1);
        metadata.name = SITE_NAME.to_string();
        metadata.domain = "edsystems.test".to_string();
        metadata
    }
}

/// Lifecycle controller wired to in-memory providers.
pub mod harness {
    use super::fixtures::{ADMIN_EMAIL, site_metadata};
    use super::mocks::test_clock;
    use rma_desk_core::LifecycleController;
    use rma_desk_core::config::{LifecycleConfig, NotificationConfig, SiteConfig};
    use rma_desk_core::environment::RmaEnvironment;
    use rma_desk_core::mocks::{
        InMemoryRmaRepository, InMemorySiteMetaRepository, InMemorySnapshotCache,
        RecordingMailTransport,
    };
    use rma_desk_core::notifications::templates::TemplateRenderer;
    use rma_desk_core::site::SiteInfo;
    use std::sync::Arc;

    /// Controller type used by the harness.
    pub type TestController = LifecycleController<
        InMemoryRmaRepository,
        InMemorySnapshotCache,
        RecordingMailTransport,
        InMemorySiteMetaRepository,
    >;

    /// Controller plus handles on every in-memory provider.
    #[derive(Clone)]
    pub struct TestHarness {
        /// Request rows.
        pub repository: InMemoryRmaRepository,
        /// Snapshot cache.
        pub snapshots: InMemorySnapshotCache,
        /// Outbox.
        pub mail: RecordingMailTransport,
        /// Site metadata rows.
        pub sites: InMemorySiteMetaRepository,
        /// The controller under test.
        pub controller: TestController,
    }

    impl Default for TestHarness {
        fn default() -> Self {
            Self::new()
        }
    }

    impl TestHarness {
        /// Harness with one administrator recipient.
        #[must_use]
        pub fn new() -> Self {
            Self::with_admins(vec![ADMIN_EMAIL.to_string()])
        }

        /// Harness with the given administrator recipients.
        ///
        /// # Panics
        ///
        /// Panics if the built-in email templates fail to compile.
        #[must_use]
        #[allow(clippy::expect_used)]
        pub fn with_admins(admins: Vec<String>) -> Self {
            let clock = Arc::new(test_clock());
            let repository = InMemoryRmaRepository::new();
            let snapshots = InMemorySnapshotCache::with_clock(clock.clone());
            let mail = RecordingMailTransport::new();
            let sites = InMemorySiteMetaRepository::with_site(site_metadata());

            let env = RmaEnvironment::new(
                repository.clone(),
                snapshots.clone(),
                mail.clone(),
                SiteInfo::new(sites.clone(), SiteConfig::default()),
            )
            .with_clock(clock);

            let controller = LifecycleController::new(
                env,
                TemplateRenderer::emails(None).expect("built-in templates compile"),
                NotificationConfig::new("rma@edsystems.test".to_string())
                    .with_from_name("ED Systems RMA")
                    .with_admin_recipients(admins),
                LifecycleConfig::default(),
            );

            Self {
                repository,
                snapshots,
                mail,
                sites,
                controller,
            }
        }
    }
}

/// Initialize a test log subscriber once per process.
///
/// Honors `RUST_LOG`; output goes through the test writer so it is only
/// shown for failing tests.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Property-based testing strategies.
pub mod properties {
    use proptest::prelude::*;

    /// Strategy for RMA sequence values that fit the 5-digit format.
    pub fn five_digit_sequence() -> impl Strategy<Value = u32> {
        1u32..=99_999
    }

    /// Strategy for strings with surrounding whitespace.
    pub fn padded_text() -> impl Strategy<Value = String> {
        ("[ \t]{0,3}", "[A-Za-z0-9]{1,20}", "[ \t]{0,3}")
            .prop_map(|(lead, body, trail)| format!("{lead}{body}{trail}"))
    }
}

// Re-export commonly used items
pub use harness::{TestController, TestHarness};
pub use mocks::{FixedClock, test_clock};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_clock() {
        let clock = test_clock();
        let time1 = clock.now();
        let time2 = clock.now();
        assert_eq!(time1, time2);
    }

    #[test]
    fn test_pending_request_fixture() {
        let request = fixtures::pending_request(42, fixtures::submission().build());
        assert_eq!(request.rma_number.to_string(), "RMA-00042");
        assert_eq!(request.created_at, test_clock().now());
    }
}
