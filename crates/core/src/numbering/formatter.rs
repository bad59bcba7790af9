//! Rendering of counter values into human-readable document codes.

use varejo_shared::config::NumberingConfig;

use super::sequence::SequenceKind;

/// Zero-padding width used when none is configured.
pub const DEFAULT_WIDTH: usize = 6;

/// Stateless formatter for `{prefix}{zero-padded seq}` codes.
pub struct DocumentNumberFormatter;

impl DocumentNumberFormatter {
    /// Renders `seq` with `prefix`, zero-padded to `width` digits.
    ///
    /// Values with more digits than `width` are rendered in full.
    ///
    /// ```
    /// use varejo_core::numbering::DocumentNumberFormatter;
    /// assert_eq!(DocumentNumberFormatter::format("CP-", 123, 6), "CP-000123");
    /// ```
    #[must_use]
    pub fn format(prefix: &str, seq: u64, width: usize) -> String {
        format!("{prefix}{seq:0width$}")
    }

    /// Extracts the numeric suffix of `code` when it carries `prefix`.
    ///
    /// Returns `None` for codes with another prefix or a non-numeric suffix.
    #[must_use]
    pub fn parse_suffix(prefix: &str, code: &str) -> Option<u64> {
        let digits = code.trim().strip_prefix(prefix)?;
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        digits.parse().ok()
    }
}

/// Prefix and width resolved for one sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumberingScheme {
    /// Sequence the scheme renders.
    pub kind: SequenceKind,
    /// Code prefix.
    pub prefix: String,
    /// Zero-padding width.
    pub width: usize,
}

impl NumberingScheme {
    /// Scheme with the built-in prefix and default width.
    #[must_use]
    pub fn default_for(kind: SequenceKind) -> Self {
        Self {
            kind,
            prefix: kind.default_prefix().to_string(),
            width: DEFAULT_WIDTH,
        }
    }

    /// Scheme honouring prefix and width overrides from configuration.
    #[must_use]
    pub fn from_config(kind: SequenceKind, config: &NumberingConfig) -> Self {
        Self {
            kind,
            prefix: config
                .prefix_for(kind.counter_name(), kind.default_prefix())
                .to_string(),
            width: config.width,
        }
    }

    /// Renders a counter value.
    #[must_use]
    pub fn render(&self, seq: u64) -> String {
        DocumentNumberFormatter::format(&self.prefix, seq, self.width)
    }

    /// Parses the numeric part of a code rendered by this scheme.
    #[must_use]
    pub fn parse(&self, code: &str) -> Option<u64> {
        DocumentNumberFormatter::parse_suffix(&self.prefix, code)
    }
}
