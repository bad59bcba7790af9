//! Document status derivation.

use super::types::{DocumentStatus, Installment};

/// Derives a document's status from its installments.
///
/// - no installment settled → `Pending`
/// - some but not all settled → `PartiallySettled`
/// - every installment settled → `Settled`
///
/// Cancellation is not derivable; it is recorded explicitly and overrides
/// whatever this returns.
#[must_use]
pub fn derive_status(installments: &[Installment]) -> DocumentStatus {
    let settled = installments.iter().filter(|i| i.is_settled()).count();

    if settled == 0 {
        DocumentStatus::Pending
    } else if settled == installments.len() {
        DocumentStatus::Settled
    } else {
        DocumentStatus::PartiallySettled
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::types::InstallmentStatus;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn installments(settled: &[bool]) -> Vec<Installment> {
        let due = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
        settled
            .iter()
            .zip(1..)
            .map(|(paid, n)| {
                let mut i = Installment::pending(n, dec!(10), due);
                if *paid {
                    i.status = InstallmentStatus::Settled;
                }
                i
            })
            .collect()
    }

    #[test]
    fn test_none_settled_is_pending() {
        assert_eq!(derive_status(&installments(&[false, false])), DocumentStatus::Pending);
    }

    #[test]
    fn test_some_settled_is_partial() {
        assert_eq!(
            derive_status(&installments(&[true, false, false])),
            DocumentStatus::PartiallySettled
        );
        assert_eq!(
            derive_status(&installments(&[false, false, true])),
            DocumentStatus::PartiallySettled
        );
    }

    #[test]
    fn test_all_settled_is_settled() {
        assert_eq!(derive_status(&installments(&[true])), DocumentStatus::Settled);
        assert_eq!(
            derive_status(&installments(&[true, true, true])),
            DocumentStatus::Settled
        );
    }

    #[test]
    fn test_empty_is_pending() {
        assert_eq!(derive_status(&[]), DocumentStatus::Pending);
    }
}
