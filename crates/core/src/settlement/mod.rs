//! Settlement arithmetic for installments and documents.
//!
//! All amounts are `rust_decimal::Decimal`; no floating point anywhere.

pub mod calculator;

#[cfg(test)]
mod calculator_props;

pub use calculator::{CURRENCY_SCALE, InstallmentCalculator, STORED_SCALE};
