//! RMA domain state.
//!
//! This module defines the records that flow through the lifecycle: the
//! persisted [`RmaRequest`], its identifier and status, the validated
//! [`RmaSubmission`] that creates it, and the per-site [`SiteMetadata`].

use crate::error::{Result, RmaError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Token inside instructions text replaced by the RMA number at send time.
pub const RMA_NUMBER_PLACEHOLDER: &str = "$rma_number";

/// Instructions stored on every new request until staff edit them.
pub const DEFAULT_RMA_INSTRUCTIONS: &str = "1. Carefully pack the item in its original packaging, including all accessories and documentation.\n\
2. Clearly mark the RMA number '$rma_number' on the outside of the package.\n\
3. Ship the package to the following address.\n\
4. Once the return is processed, we will notify you of the status and any further steps, if necessary.";

/// Prefix of every RMA number.
pub const RMA_NUMBER_PREFIX: &str = "RMA-";

/// Store-assigned request id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RmaId(pub i64);

impl RmaId {
    /// Create a new request id.
    #[must_use]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Get the inner value.
    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for RmaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Human-readable RMA number, `RMA-` followed by at least five digits.
///
/// # Examples
///
/// ```
/// # use rma_desk_core::state::RmaNumber;
/// let number = RmaNumber::parse("RMA-00041").unwrap();
/// assert_eq!(number.sequence(), 41);
/// assert_eq!(number.next().unwrap().to_string(), "RMA-00042");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RmaNumber(u32);

impl RmaNumber {
    /// First number issued on an empty store.
    pub const FIRST: Self = Self(1);

    /// Build from a numeric sequence value.
    #[must_use]
    pub const fn from_sequence(sequence: u32) -> Self {
        Self(sequence)
    }

    /// Numeric suffix.
    #[must_use]
    pub const fn sequence(self) -> u32 {
        self.0
    }

    /// Parse a stored identifier.
    ///
    /// Only the `RMA-NNNNN` shape is accepted: the prefix, then at least five
    /// ASCII digits and nothing else.
    ///
    /// # Errors
    ///
    /// Returns [`RmaError::MalformedRmaNumber`] when the value does not match.
    pub fn parse(value: &str) -> Result<Self> {
        let malformed = || RmaError::MalformedRmaNumber {
            found: value.to_string(),
        };

        let digits = value.strip_prefix(RMA_NUMBER_PREFIX).ok_or_else(malformed)?;
        if digits.len() < 5 || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(malformed());
        }

        digits.parse::<u32>().map(Self).map_err(|_| malformed())
    }

    /// The number issued after this one.
    ///
    /// # Errors
    ///
    /// Returns [`RmaError::RmaNumberExhausted`] when the sequence would overflow.
    pub fn next(self) -> Result<Self> {
        self.0
            .checked_add(1)
            .map(Self)
            .ok_or_else(|| RmaError::RmaNumberExhausted {
                last: self.to_string(),
            })
    }
}

impl fmt::Display for RmaNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{RMA_NUMBER_PREFIX}{:05}", self.0)
    }
}

impl Serialize for RmaNumber {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for RmaNumber {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

/// Request status, changed only by staff.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RmaStatus {
    /// Initial status of every submission.
    #[default]
    Pending,
    /// The returned item arrived.
    ProductReceived,
    /// Return instructions were issued to the customer.
    RmaSent,
}

impl RmaStatus {
    /// All statuses in lifecycle order.
    pub const ALL: [Self; 3] = [Self::Pending, Self::ProductReceived, Self::RmaSent];

    /// Stored representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::ProductReceived => "product_received",
            Self::RmaSent => "rma_sent",
        }
    }

    /// Display label used by the admin surface.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::ProductReceived => "Product Received",
            Self::RmaSent => "RMA Sent",
        }
    }

    /// Parse the stored representation.
    ///
    /// # Errors
    ///
    /// Returns [`RmaError::UnknownStatus`] for anything else.
    pub fn parse(value: &str) -> Result<Self> {
        match value {
            "pending" => Ok(Self::Pending),
            "product_received" => Ok(Self::ProductReceived),
            "rma_sent" => Ok(Self::RmaSent),
            other => Err(RmaError::UnknownStatus(other.to_string())),
        }
    }

    /// Whether moving from `previous` to `next` sends the return instructions.
    ///
    /// Only an actual change into [`RmaStatus::RmaSent`] qualifies, so a
    /// re-save with the same status never notifies twice.
    #[must_use]
    pub const fn triggers_customer_notification(previous: Self, next: Self) -> bool {
        match (previous, next) {
            (Self::RmaSent, _) => false,
            (Self::Pending | Self::ProductReceived, Self::RmaSent) => true,
            (Self::Pending | Self::ProductReceived, Self::Pending | Self::ProductReceived) => false,
        }
    }
}

impl fmt::Display for RmaStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A persisted return request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RmaRequest {
    /// Store-assigned id.
    pub id: RmaId,
    /// Name on the order.
    pub customer_name: String,
    /// Email the order was placed with.
    pub email: String,
    /// Optional phone number.
    pub phone: Option<String>,
    /// Order reference.
    pub order_ref: String,
    /// SKU of the returned product.
    pub product_sku: String,
    /// Free-text reason.
    pub reason_for_return: String,
    /// Identifier assigned at creation.
    pub rma_number: RmaNumber,
    /// Instructions template, may contain [`RMA_NUMBER_PLACEHOLDER`].
    pub rma_instructions: String,
    /// Current status.
    pub status: RmaStatus,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

impl RmaRequest {
    /// Instructions with every placeholder replaced by the RMA number.
    ///
    /// # Examples
    ///
    /// ```
    /// # use rma_desk_core::state::{RmaNumber, RmaRequest};
    /// # use rma_desk_core::state::{RmaSubmission, RmaId};
    /// # use chrono::Utc;
    /// let submission = RmaSubmission {
    ///     customer_name: "Ada".into(),
    ///     email: "ada@example.com".into(),
    ///     phone: None,
    ///     order_ref: "ORD-1".into(),
    ///     product_sku: "SKU-1".into(),
    ///     reason_for_return: "Broken".into(),
    /// };
    /// let request = submission.into_request(RmaId::new(7), RmaNumber::from_sequence(7), Utc::now());
    /// assert!(request.rendered_instructions().contains("RMA-00007"));
    /// ```
    #[must_use]
    pub fn rendered_instructions(&self) -> String {
        self.rma_instructions
            .replace(RMA_NUMBER_PLACEHOLDER, &self.rma_number.to_string())
    }

    /// Key identifying duplicate submissions.
    #[must_use]
    pub fn duplicate_key(&self) -> DuplicateKey {
        DuplicateKey {
            email: self.email.clone(),
            order_ref: self.order_ref.clone(),
            product_sku: self.product_sku.clone(),
        }
    }
}

/// A validated customer submission, not yet numbered or persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RmaSubmission {
    /// Name on the order.
    pub customer_name: String,
    /// Email the order was placed with.
    pub email: String,
    /// Optional phone number.
    pub phone: Option<String>,
    /// Order reference.
    pub order_ref: String,
    /// SKU of the returned product.
    pub product_sku: String,
    /// Free-text reason.
    pub reason_for_return: String,
}

impl RmaSubmission {
    /// Key identifying duplicate submissions.
    #[must_use]
    pub fn duplicate_key(&self) -> DuplicateKey {
        DuplicateKey {
            email: self.email.clone(),
            order_ref: self.order_ref.clone(),
            product_sku: self.product_sku.clone(),
        }
    }

    /// Turn the submission into a pending request with default instructions.
    #[must_use]
    pub fn into_request(
        self,
        id: RmaId,
        rma_number: RmaNumber,
        created_at: DateTime<Utc>,
    ) -> RmaRequest {
        RmaRequest {
            id,
            customer_name: self.customer_name,
            email: self.email,
            phone: self.phone,
            order_ref: self.order_ref,
            product_sku: self.product_sku,
            reason_for_return: self.reason_for_return,
            rma_number,
            rma_instructions: DEFAULT_RMA_INSTRUCTIONS.to_string(),
            status: RmaStatus::Pending,
            created_at,
        }
    }
}

/// The `(email, order_ref, product_sku)` triple that must be unique.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DuplicateKey {
    /// Customer email.
    pub email: String,
    /// Order reference.
    pub order_ref: String,
    /// Product SKU.
    pub product_sku: String,
}

/// Staff edits. Everything else on a request is read-only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RmaUpdate {
    /// New status.
    #[serde(default)]
    pub status: Option<RmaStatus>,
    /// New instructions template.
    #[serde(default)]
    pub rma_instructions: Option<String>,
}

impl RmaUpdate {
    /// Update that only changes the status.
    #[must_use]
    pub const fn status(status: RmaStatus) -> Self {
        Self {
            status: Some(status),
            rma_instructions: None,
        }
    }

    /// Set the instructions template.
    #[must_use]
    pub fn with_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.rma_instructions = Some(instructions.into());
        self
    }
}

/// Site-wide metadata used by pages and emails.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteMetadata {
    /// Site id this record belongs to.
    pub site_id: i64,
    /// Display name, used in email subjects.
    pub name: String,
    /// Page title.
    pub title: String,
    /// Domain name.
    pub domain: String,
    /// Meta description.
    pub description: String,
    /// Meta keywords.
    pub keywords: String,
    /// Logo URL.
    pub logo: String,
    /// Social sharing image URL.
    pub og_image: String,
    /// Where customers ship returns.
    pub return_address: String,
    /// Facebook link.
    pub facebook: String,
    /// X (Twitter) link.
    pub x_twitter: String,
    /// `LinkedIn` link.
    pub linkedin: String,
    /// Instagram link.
    pub instagram: String,
}

impl SiteMetadata {
    /// Default return address for new sites.
    pub const DEFAULT_RETURN_ADDRESS: &'static str =
        "E.D. Systems Tech Center\n3798 Oleander Ave #2\nFort Pierce, Florida 34982\nUnited States.";

    /// Record created lazily for a site without metadata.
    #[must_use]
    pub fn with_defaults(site_id: i64) -> Self {
        Self {
            site_id,
            name: "example.com".to_string(),
            title: String::new(),
            domain: "example.com".to_string(),
            description: String::new(),
            keywords: String::new(),
            logo: String::new(),
            og_image: String::new(),
            return_address: Self::DEFAULT_RETURN_ADDRESS.to_string(),
            facebook: "#".to_string(),
            x_twitter: "#".to_string(),
            linkedin: "#".to_string(),
            instagram: "#".to_string(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn rma_number_formats_with_five_digits() {
        assert_eq!(RmaNumber::from_sequence(42).to_string(), "RMA-00042");
        assert_eq!(RmaNumber::from_sequence(100_000).to_string(), "RMA-100000");
    }

    #[test]
    fn rma_number_rejects_other_shapes() {
        for bad in ["", "RMA-", "RMA-123", "rma-00001", "RMA-0000a", "RMA-00001 ", "X-00001"] {
            assert!(
                matches!(RmaNumber::parse(bad), Err(RmaError::MalformedRmaNumber { .. })),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn rma_number_overflow_is_reported() {
        let last = RmaNumber::from_sequence(u32::MAX);
        assert!(matches!(last.next(), Err(RmaError::RmaNumberExhausted { .. })));
    }

    #[test]
    fn rma_number_serializes_as_string() {
        let json = serde_json::to_string(&RmaNumber::from_sequence(3)).unwrap();
        assert_eq!(json, "\"RMA-00003\"");
        let back: RmaNumber = serde_json::from_str(&json).unwrap();
        assert_eq!(back.sequence(), 3);
    }

    #[test]
    fn status_round_trips_through_storage_form() {
        for status in RmaStatus::ALL {
            assert_eq!(RmaStatus::parse(status.as_str()).unwrap(), status);
        }
        assert!(RmaStatus::parse("approved").is_err());
    }

    #[test]
    fn status_labels() {
        assert_eq!(RmaStatus::ProductReceived.label(), "Product Received");
        assert_eq!(RmaStatus::RmaSent.label(), "RMA Sent");
    }

    #[test]
    fn only_change_into_rma_sent_notifies() {
        use RmaStatus::{Pending, ProductReceived, RmaSent};
        assert!(RmaStatus::triggers_customer_notification(Pending, RmaSent));
        assert!(RmaStatus::triggers_customer_notification(ProductReceived, RmaSent));
        assert!(!RmaStatus::triggers_customer_notification(RmaSent, RmaSent));
        assert!(!RmaStatus::triggers_customer_notification(Pending, ProductReceived));
        assert!(!RmaStatus::triggers_customer_notification(RmaSent, Pending));
    }

    #[test]
    fn placeholder_is_replaced_everywhere() {
        let submission = RmaSubmission {
            customer_name: "Ada".into(),
            email: "ada@example.com".into(),
            phone: None,
            order_ref: "ORD-1".into(),
            product_sku: "SKU-1".into(),
            reason_for_return: "Broken".into(),
        };
        let mut request =
            submission.into_request(RmaId::new(7), RmaNumber::from_sequence(7), Utc::now());
        request.rma_instructions = "$rma_number / $rma_number".to_string();

        let rendered = request.rendered_instructions();
        assert_eq!(rendered, "RMA-00007 / RMA-00007");
        assert!(!rendered.contains(RMA_NUMBER_PLACEHOLDER));
    }

    #[test]
    fn default_site_metadata() {
        let meta = SiteMetadata::with_defaults(1);
        assert_eq!(meta.facebook, "#");
        assert!(meta.return_address.starts_with("E.D. Systems Tech Center"));
        assert!(meta.title.is_empty());
    }
}
