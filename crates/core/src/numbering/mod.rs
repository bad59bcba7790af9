//! Document numbering.
//!
//! Named counters live in storage; this module only knows which sequences
//! exist, how their values are rendered into document codes, and how a
//! counter is seeded from codes that already exist.
//!
//! # Modules
//!
//! - `sequence` - Known sequences with counter names and default prefixes
//! - `formatter` - Rendering and parsing of `{prefix}{zero-padded seq}` codes
//! - `seed` - Counter seeding from existing document codes

pub mod formatter;
pub mod seed;
pub mod sequence;

#[cfg(test)]
mod formatter_props;

pub use formatter::{DEFAULT_WIDTH, DocumentNumberFormatter, NumberingScheme};
pub use seed::{SeedOutcome, seed_value};
pub use sequence::SequenceKind;
