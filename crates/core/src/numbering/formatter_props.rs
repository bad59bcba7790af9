//! Property-based tests for document code formatting.

use proptest::prelude::*;

use super::formatter::DocumentNumberFormatter;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// A rendered code always parses back to the value it was rendered from.
    #[test]
    fn prop_parse_inverts_format(
        prefix in "[A-Z]{1,4}-",
        seq in 0u64..10_000_000_000,
        width in 1usize..12,
    ) {
        let code = DocumentNumberFormatter::format(&prefix, seq, width);
        prop_assert_eq!(DocumentNumberFormatter::parse_suffix(&prefix, &code), Some(seq));
    }

    /// The numeric part is never shorter than the requested width.
    #[test]
    fn prop_width_is_minimum_length(seq in 0u64..1_000_000_000, width in 1usize..12) {
        let code = DocumentNumberFormatter::format("X-", seq, width);
        prop_assert!(code.len() - 2 >= width);
    }

    /// Zero padding preserves numeric ordering under string comparison
    /// as long as values fit the width.
    #[test]
    fn prop_padding_preserves_order(a in 0u64..1_000_000, b in 0u64..1_000_000) {
        let left = DocumentNumberFormatter::format("CP-", a, 6);
        let right = DocumentNumberFormatter::format("CP-", b, 6);
        prop_assert_eq!(a.cmp(&b), left.cmp(&right));
    }
}
