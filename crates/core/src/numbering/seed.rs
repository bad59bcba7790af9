//! Counter seeding from existing document codes.
//!
//! Seeding uses the largest numeric suffix among existing codes, never the
//! most recently created document: imported documents can be out of
//! creation order.

use super::formatter::DocumentNumberFormatter;

/// Result of a seeding request against a counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedOutcome {
    /// The counter did not exist and was created with this value.
    Seeded(i64),
    /// The counter already existed; its current value is reported untouched.
    AlreadyInitialized(i64),
}

impl SeedOutcome {
    /// Counter value after the request.
    #[must_use]
    pub const fn value(self) -> i64 {
        match self {
            Self::Seeded(v) | Self::AlreadyInitialized(v) => v,
        }
    }
}

/// Computes the seed for a counter: the largest numeric suffix among
/// `codes` carrying `prefix`, or 0 when none match.
pub fn seed_value<'a, I>(prefix: &str, codes: I) -> u64
where
    I: IntoIterator<Item = &'a str>,
{
    codes
        .into_iter()
        .filter_map(|code| DocumentNumberFormatter::parse_suffix(prefix, code))
        .max()
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_uses_max_suffix_not_last_code() {
        // Creation order: 000120 was imported after 000455.
        let codes = ["CP-000001", "CP-000455", "CP-000120"];
        assert_eq!(seed_value("CP-", codes), 455);
    }

    #[test]
    fn test_seed_ignores_foreign_and_malformed_codes() {
        let codes = ["CR-009999", "CP-00A001", "legacy-77", "CP-000010"];
        assert_eq!(seed_value("CP-", codes), 10);
    }

    #[test]
    fn test_seed_empty_collection_is_zero() {
        assert_eq!(seed_value("CP-", std::iter::empty()), 0);
    }

    #[test]
    fn test_seed_outcome_value() {
        assert_eq!(SeedOutcome::Seeded(5).value(), 5);
        assert_eq!(SeedOutcome::AlreadyInitialized(9).value(), 9);
    }
}
