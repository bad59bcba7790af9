//! Accounts payable and receivable documents.
//!
//! This module implements the installment ledger:
//! - Document, installment and status types
//! - Installment schedules (single, split, explicit)
//! - Status derivation from installments
//! - Ledger service for create/edit/liquidate/cancel transitions
//! - Listing filters and dashboard summaries
//! - Error types for ledger operations

pub mod error;
pub mod filter;
pub mod schedule;
pub mod service;
pub mod status;
pub mod summary;
pub mod types;

#[cfg(test)]
mod service_props;

pub use error::{LedgerError, ValidationError};
pub use filter::DocumentFilter;
pub use schedule::{
    DueInterval, InstallmentPlan, ScheduledInstallment, check_precision, validate_installments,
};
pub use service::{
    CancellationOutcome, DocumentEdit, LedgerService, NewDocument, SettlementInput,
    SettlementOutcome,
};
pub use status::derive_status;
pub use summary::{LedgerSummary, StatusCounts};
pub use types::{
    Cancellation, CounterpartyKind, Document, DocumentKind, DocumentStatus, Installment,
    InstallmentStatus, PaymentMethod,
};
