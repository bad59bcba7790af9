//! Property-based tests for settlement arithmetic.

use proptest::prelude::*;
use rust_decimal::Decimal;

use super::calculator::InstallmentCalculator;

/// Strategy for currency amounts from 0.00 to 1,000,000.00.
fn amount() -> impl Strategy<Value = Decimal> {
    (0i64..100_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Receivable arithmetic is the payable arithmetic with a zero fine.
    #[test]
    fn prop_receivable_equals_payable_without_fine(
        base in amount(),
        interest in amount(),
        discount in amount(),
    ) {
        prop_assert_eq!(
            InstallmentCalculator::receivable_final_amount(base, interest, discount),
            InstallmentCalculator::payable_final_amount(base, interest, Decimal::ZERO, discount)
        );
    }

    /// Summing per-installment adjustments matches adjusting the total once.
    #[test]
    fn prop_net_total_is_additive(
        parts in prop::collection::vec((amount(), amount(), amount(), amount()), 1..24),
    ) {
        let per_installment: Decimal = parts
            .iter()
            .map(|(b, i, f, d)| InstallmentCalculator::payable_final_amount(*b, *i, *f, *d))
            .sum();

        let total: Decimal = parts.iter().map(|p| p.0).sum();
        let interest: Decimal = parts.iter().map(|p| p.1).sum();
        let fine: Decimal = parts.iter().map(|p| p.2).sum();
        let discount: Decimal = parts.iter().map(|p| p.3).sum();

        prop_assert_eq!(
            InstallmentCalculator::net_total(total, interest, fine, discount),
            per_installment
        );
    }

    /// Shares always reconcile exactly with the total and keep cent precision.
    #[test]
    fn prop_split_evenly_reconciles(total in amount(), count in 1u32..60) {
        let shares = InstallmentCalculator::split_evenly(total, count);
        prop_assert_eq!(shares.len(), count as usize);
        prop_assert_eq!(shares.iter().copied().sum::<Decimal>(), total);
        for share in &shares {
            prop_assert!(share.scale() <= 2);
        }
    }
}
