//! Customer form validation.
//!
//! Raw form strings are trimmed and checked field by field. All problems are
//! collected so the form can show them together.

use crate::state::RmaSubmission;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Maximum lengths, in characters.
pub mod limits {
    /// Customer name.
    pub const CUSTOMER_NAME: usize = 120;
    /// Email address.
    pub const EMAIL: usize = 254;
    /// Phone number.
    pub const PHONE: usize = 20;
    /// Order reference.
    pub const ORDER_REF: usize = 155;
    /// Product SKU.
    pub const PRODUCT_SKU: usize = 150;
}

/// Raw form input as posted by the browser.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RmaFormInput {
    /// Customer name.
    #[serde(default)]
    pub customer_name: String,
    /// Email.
    #[serde(default)]
    pub email: String,
    /// Phone.
    #[serde(default)]
    pub phone: String,
    /// Order reference.
    #[serde(default)]
    pub order_ref: String,
    /// Product SKU.
    #[serde(default)]
    pub product_sku: String,
    /// Reason for return.
    #[serde(default)]
    pub reason_for_return: String,
}

/// Field errors keyed by field name, plus errors not tied to one field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationErrors {
    /// Per-field messages.
    pub fields: BTreeMap<String, Vec<String>>,
    /// Form-level messages.
    pub non_field: Vec<String>,
}

impl ValidationErrors {
    /// Add a message for a field.
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.fields
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    /// Add a form-level message.
    pub fn add_non_field(&mut self, message: impl Into<String>) {
        self.non_field.push(message.into());
    }

    /// Whether nothing was reported.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.non_field.is_empty()
    }

    /// Messages for one field.
    #[must_use]
    pub fn field(&self, name: &str) -> &[String] {
        self.fields.get(name).map_or(&[], Vec::as_slice)
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts: Vec<String> = self.non_field.clone();
        for (field, messages) in &self.fields {
            for message in messages {
                parts.push(format!("{field}: {message}"));
            }
        }
        f.write_str(&parts.join("; "))
    }
}

impl RmaFormInput {
    /// Validate into a submission.
    ///
    /// # Errors
    ///
    /// Returns every field problem found.
    pub fn validate(&self) -> Result<RmaSubmission, ValidationErrors> {
        let mut errors = ValidationErrors::default();

        let customer_name = required(&mut errors, "customer_name", &self.customer_name, limits::CUSTOMER_NAME);
        let email = required(&mut errors, "email", &self.email, limits::EMAIL);
        if !email.is_empty() && !is_valid_email(&email) {
            errors.add("email", "Enter a valid email address.");
        }
        let phone = self.phone.trim().to_string();
        check_length(&mut errors, "phone", &phone, limits::PHONE);
        let order_ref = required(&mut errors, "order_ref", &self.order_ref, limits::ORDER_REF);
        let product_sku = required(&mut errors, "product_sku", &self.product_sku, limits::PRODUCT_SKU);
        let reason_for_return =
            required(&mut errors, "reason_for_return", &self.reason_for_return, usize::MAX);

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(RmaSubmission {
            customer_name,
            email,
            phone: (!phone.is_empty()).then_some(phone),
            order_ref,
            product_sku,
            reason_for_return,
        })
    }
}

fn required(errors: &mut ValidationErrors, field: &str, raw: &str, max: usize) -> String {
    let value = raw.trim().to_string();
    if value.is_empty() {
        errors.add(field, "This field is required.");
    } else {
        check_length(errors, field, &value, max);
    }
    value
}

fn check_length(errors: &mut ValidationErrors, field: &str, value: &str, max: usize) {
    let len = value.chars().count();
    if len > max {
        errors.add(
            field,
            format!("Ensure this value has at most {max} characters (it has {len})."),
        );
    }
}

/// Email check shared with the mail transport.
///
/// The address must parse as a [`lettre::Address`], so anything accepted here
/// can be delivered to. The domain must also be dotted, with non-empty
/// labels.
#[must_use]
pub fn is_valid_email(value: &str) -> bool {
    let Ok(address) = value.parse::<lettre::Address>() else {
        return false;
    };
    let labels: Vec<&str> = address.domain().split('.').collect();
    labels.len() >= 2
        && labels.iter().all(|label| {
            !label.is_empty()
                && !label.starts_with('-')
                && !label.ends_with('-')
                && label.chars().all(|c| c.is_alphanumeric() || c == '-')
        })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn input() -> RmaFormInput {
        RmaFormInput {
            customer_name: "  Ada Lovelace ".into(),
            email: "ada@example.com".into(),
            phone: String::new(),
            order_ref: "ORD-100".into(),
            product_sku: "SKU-9".into(),
            reason_for_return: "Arrived cracked".into(),
        }
    }

    #[test]
    fn valid_input_is_trimmed() {
        let submission = input().validate().unwrap();
        assert_eq!(submission.customer_name, "Ada Lovelace");
        assert_eq!(submission.phone, None);
    }

    #[test]
    fn missing_fields_are_all_reported() {
        let errors = RmaFormInput::default().validate().unwrap_err();
        for field in ["customer_name", "email", "order_ref", "product_sku", "reason_for_return"] {
            assert_eq!(errors.field(field), ["This field is required.".to_string()]);
        }
        assert!(errors.field("phone").is_empty());
    }

    #[test]
    fn overlong_fields_are_rejected() {
        let mut raw = input();
        raw.customer_name = "x".repeat(121);
        raw.phone = "1".repeat(21);
        let errors = raw.validate().unwrap_err();
        assert_eq!(errors.field("customer_name").len(), 1);
        assert_eq!(errors.field("phone").len(), 1);
    }

    #[test]
    fn invalid_email_is_rejected() {
        let mut raw = input();
        raw.email = "not-an-email".into();
        let errors = raw.validate().unwrap_err();
        assert_eq!(errors.field("email"), ["Enter a valid email address.".to_string()]);
    }

    #[test]
    fn email_syntax() {
        assert!(is_valid_email("a.b+c@mail.example.co"));
        assert!(!is_valid_email("a@b"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("a@@example.com"));
        assert!(!is_valid_email("a b@example.com"));
        assert!(!is_valid_email("a@example..com"));
    }

    #[test]
    fn email_rejects_addresses_the_transport_cannot_send_to() {
        for bad in [
            "a<b@example.com",
            "a,b@example.com",
            "a(b)@example.com",
            "a\"b@example.com",
        ] {
            assert!(!is_valid_email(bad), "{bad}");
            assert!(bad.parse::<lettre::Address>().is_err(), "{bad}");
        }

        let mut raw = input();
        raw.email = "a<b@example.com".into();
        let errors = raw.validate().unwrap_err();
        assert_eq!(errors.field("email"), ["Enter a valid email address.".to_string()]);
    }
}
