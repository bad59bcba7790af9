//! Installment and document amount calculations.
//!
//! Inputs are not validated: negative values flow through the arithmetic
//! unchanged and are the caller's responsibility.

use rust_decimal::{Decimal, RoundingStrategy};

/// Decimal places used for currency amounts.
pub const CURRENCY_SCALE: u32 = 2;

/// Decimal places kept by stored amounts (`NUMERIC(19, 4)`).
pub const STORED_SCALE: u32 = 4;

/// Stateless calculator for settlement amounts.
pub struct InstallmentCalculator;

impl InstallmentCalculator {
    /// Final amount of a payable installment: `base + interest + fine - discount`.
    #[must_use]
    pub fn payable_final_amount(
        base: Decimal,
        interest: Decimal,
        fine: Decimal,
        discount: Decimal,
    ) -> Decimal {
        base + interest + fine - discount
    }

    /// Final amount of a receivable installment: `base + interest - discount`.
    ///
    /// Receivables carry no fine.
    #[must_use]
    pub fn receivable_final_amount(base: Decimal, interest: Decimal, discount: Decimal) -> Decimal {
        base + interest - discount
    }

    /// Net total of a document: `total + interest + fine - discount`.
    #[must_use]
    pub fn net_total(total: Decimal, interest: Decimal, fine: Decimal, discount: Decimal) -> Decimal {
        total + interest + fine - discount
    }

    /// Splits `total` into `count` shares rounded to cents.
    ///
    /// Every share but the last is `total / count` rounded half away from
    /// zero; the last one absorbs the remainder so the shares always sum to
    /// `total`. Returns an empty vector when `count` is 0.
    #[must_use]
    pub fn split_evenly(total: Decimal, count: u32) -> Vec<Decimal> {
        if count == 0 {
            return Vec::new();
        }

        let share = (total / Decimal::from(count))
            .round_dp_with_strategy(CURRENCY_SCALE, RoundingStrategy::MidpointAwayFromZero);
        let leading = count - 1;
        let last = total - share * Decimal::from(leading);

        let mut shares = vec![share; leading as usize];
        shares.push(last);
        shares
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    #[rstest]
    #[case(dec!(1000.00), dec!(50.00), dec!(20.00), dec!(0), dec!(1070.00))]
    #[case(dec!(1000.00), dec!(0), dec!(0), dec!(100.00), dec!(900.00))]
    #[case(dec!(500.00), dec!(25.50), dec!(10.00), dec!(15.50), dec!(520.00))]
    #[case(dec!(4000.00), dec!(0), dec!(0), dec!(0), dec!(4000.00))]
    fn test_payable_final_amount(
        #[case] base: Decimal,
        #[case] interest: Decimal,
        #[case] fine: Decimal,
        #[case] discount: Decimal,
        #[case] expected: Decimal,
    ) {
        assert_eq!(
            InstallmentCalculator::payable_final_amount(base, interest, fine, discount),
            expected
        );
    }

    #[test]
    fn test_receivable_final_amount_has_no_fine() {
        assert_eq!(
            InstallmentCalculator::receivable_final_amount(dec!(800.00), dec!(40.00), dec!(20.00)),
            dec!(820.00)
        );
    }

    #[test]
    fn test_net_total() {
        assert_eq!(
            InstallmentCalculator::net_total(dec!(12000.00), dec!(0), dec!(0), dec!(100.00)),
            dec!(11900.00)
        );
        assert_eq!(
            InstallmentCalculator::net_total(dec!(800.00), dec!(40.00), dec!(0), dec!(20.00)),
            dec!(820.00)
        );
    }

    #[test]
    fn test_negative_inputs_flow_through() {
        assert_eq!(
            InstallmentCalculator::payable_final_amount(dec!(100), dec!(-10), dec!(0), dec!(-5)),
            dec!(95)
        );
    }

    #[test]
    fn test_split_evenly_exact() {
        assert_eq!(
            InstallmentCalculator::split_evenly(dec!(12000.00), 3),
            vec![dec!(4000.00), dec!(4000.00), dec!(4000.00)]
        );
    }

    #[test]
    fn test_split_evenly_remainder_goes_to_last() {
        assert_eq!(
            InstallmentCalculator::split_evenly(dec!(100.00), 3),
            vec![dec!(33.33), dec!(33.33), dec!(33.34)]
        );
        assert_eq!(
            InstallmentCalculator::split_evenly(dec!(100.00), 6),
            vec![
                dec!(16.67),
                dec!(16.67),
                dec!(16.67),
                dec!(16.67),
                dec!(16.67),
                dec!(16.65)
            ]
        );
    }

    #[test]
    fn test_split_evenly_zero_count() {
        assert!(InstallmentCalculator::split_evenly(dec!(10), 0).is_empty());
    }
}
