//! Core business logic for Varejo.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! All domain types, validation rules, and calculations live here.
//!
//! # Modules
//!
//! - `numbering` - Sequence kinds, document code formatting and counter seeding
//! - `settlement` - Installment and document amount arithmetic
//! - `audit` - Append-only change history
//! - `document` - Payable/receivable documents and their installment state machine

pub mod audit;
pub mod document;
pub mod numbering;
pub mod settlement;
