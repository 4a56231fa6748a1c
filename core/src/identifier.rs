//! RMA number generation.
//!
//! The next number is derived from the most recently created request:
//! parse its numeric suffix, add one, format as `RMA-NNNNN`. An empty store
//! starts at `RMA-00001`. A malformed stored value is an integrity error and
//! aborts creation.
//!
//! [`next_identifier`] is the pure step. Stores call it inside their
//! serialized insert (see [`RmaRepository::insert_numbered`]) so the read and
//! the insert cannot interleave with another submission.

use crate::error::Result;
use crate::providers::RmaRepository;
use crate::state::RmaNumber;

/// Compute the number following `last`.
///
/// # Errors
///
/// Returns error if `last` is malformed or its sequence is exhausted.
///
/// # Examples
///
/// ```
/// # use rma_desk_core::identifier::next_identifier;
/// assert_eq!(next_identifier(None).unwrap().to_string(), "RMA-00001");
/// assert_eq!(next_identifier(Some("RMA-00041")).unwrap().to_string(), "RMA-00042");
/// assert!(next_identifier(Some("legacy")).is_err());
/// ```
pub fn next_identifier(last: Option<&str>) -> Result<RmaNumber> {
    match last {
        None => Ok(RmaNumber::FIRST),
        Some(raw) => RmaNumber::parse(raw)?.next(),
    }
}

/// Read the latest number from the repository and compute the next one.
///
/// Not serialized on its own; use it for previews and diagnostics, and
/// [`RmaRepository::insert_numbered`] for actual assignment.
///
/// # Errors
///
/// Returns error if the store fails or holds a malformed identifier.
pub async fn generate_identifier<R: RmaRepository>(repository: &R) -> Result<RmaNumber> {
    let last = repository.latest_rma_number().await?;
    let next = next_identifier(last.as_deref());
    if let Err(error) = &next {
        tracing::error!(last = ?last, error = %error, "Cannot derive next RMA number");
    }
    next
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::RmaError;
    use proptest::prelude::*;

    #[test]
    fn test_empty_store_starts_at_one() {
        assert_eq!(next_identifier(None).unwrap().to_string(), "RMA-00001");
    }

    #[test]
    fn test_increments_last() {
        assert_eq!(
            next_identifier(Some("RMA-00041")).unwrap().to_string(),
            "RMA-00042"
        );
        assert_eq!(
            next_identifier(Some("RMA-99999")).unwrap().to_string(),
            "RMA-100000"
        );
    }

    #[test]
    fn test_malformed_last_fails_loudly() {
        let err = next_identifier(Some("RMA-12")).unwrap_err();
        assert!(err.is_integrity_error());
        assert_eq!(
            err,
            RmaError::MalformedRmaNumber {
                found: "RMA-12".to_string()
            }
        );
    }

    proptest! {
        #[test]
        fn prop_next_is_successor(n in 0u32..u32::MAX) {
            let last = RmaNumber::from_sequence(n).to_string();
            let next = next_identifier(Some(&last)).unwrap();
            prop_assert_eq!(next.sequence(), n + 1);
        }

        #[test]
        fn prop_format_parses_back(n in 1u32..=u32::MAX) {
            let formatted = RmaNumber::from_sequence(n).to_string();
            prop_assert!(formatted.starts_with("RMA-"));
            prop_assert!(formatted.len() >= 9);
            prop_assert_eq!(RmaNumber::parse(&formatted).unwrap().sequence(), n);
        }
    }
}
