//! Ledger error types.
//!
//! Every failure is reported to the caller as a typed value; nothing is
//! retried or swallowed here.

use rust_decimal::Decimal;
use thiserror::Error;
use varejo_shared::AppError;
use varejo_shared::types::{CounterpartyId, DocumentId};

use super::types::{CounterpartyKind, DocumentStatus};

/// Input rejected before any state changes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Description missing or blank.
    #[error("Description is required")]
    DescriptionRequired,

    /// Declared total is zero or negative.
    #[error("Total amount must be positive, got {0}")]
    NonPositiveTotal(Decimal),

    /// Amount has more decimal places than storage keeps.
    #[error("{field} {amount} has more than {max_scale} decimal places")]
    ExcessivePrecision {
        /// Which amount.
        field: &'static str,
        /// Offending amount.
        amount: Decimal,
        /// Decimal places allowed.
        max_scale: u32,
    },

    /// Schedule has no installments.
    #[error("At least one installment is required")]
    EmptySchedule,

    /// Installment amount is zero or negative.
    #[error("Installment {number} must have a positive amount, got {amount}")]
    NonPositiveInstallment {
        /// Installment number.
        number: u32,
        /// Offending amount.
        amount: Decimal,
    },

    /// Installment numbers repeat within a document.
    #[error("Installment number {0} appears more than once")]
    DuplicateInstallmentNumber(u32),

    /// Installment base amounts do not add up to the declared total.
    #[error("Installments sum to {scheduled} but the declared total is {declared}")]
    ScheduleTotalMismatch {
        /// Declared document total.
        declared: Decimal,
        /// Sum of installment amounts.
        scheduled: Decimal,
    },

    /// A due date could not be computed (calendar overflow).
    #[error("Due date for installment {0} is out of range")]
    DueDateOutOfRange(u32),

    /// Counterparty exists but is of the wrong kind for this document.
    #[error("Counterparty must be a {expected}, found {found}")]
    CounterpartyKindMismatch {
        /// Kind required by the document.
        expected: CounterpartyKind,
        /// Kind of the referenced counterparty.
        found: CounterpartyKind,
    },

    /// A fine was given for a receivable installment.
    #[error("Receivable installments do not accept a fine")]
    FineNotApplicable,

    /// Cancellation reason missing or blank.
    #[error("Cancellation reason is required")]
    CancellationReasonRequired,
}

/// Errors surfaced by payable/receivable ledger operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Document does not exist.
    #[error("Document {0} not found")]
    DocumentNotFound(DocumentId),

    /// No document carries this code.
    #[error("Document {0} not found")]
    DocumentNumberNotFound(String),

    /// Installment does not exist in the document.
    #[error("Installment {number} not found in document {document}")]
    InstallmentNotFound {
        /// Document searched.
        document: DocumentId,
        /// Installment number requested.
        number: u32,
    },

    /// Counterparty does not exist (or was deleted).
    #[error("Counterparty {0} not found")]
    CounterpartyNotFound(CounterpartyId),

    /// Installment was already settled.
    #[error("Installment {number} of document {document} is already paid")]
    AlreadyPaid {
        /// Document.
        document: DocumentId,
        /// Installment number.
        number: u32,
    },

    /// Document is cancelled and cannot be mutated.
    #[error("Document {0} is cancelled")]
    DocumentCancelled(DocumentId),

    /// Transition not allowed from the current status.
    #[error("Invalid status transition from {from} to {to}")]
    InvalidTransition {
        /// The current status.
        from: DocumentStatus,
        /// The attempted target status.
        to: DocumentStatus,
    },

    /// Input failed validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Optimistic-concurrency retries exhausted.
    #[error("Document {document} was modified concurrently; gave up after {attempts} attempts")]
    ConcurrencyConflict {
        /// Document.
        document: DocumentId,
        /// Attempts made.
        attempts: u32,
    },

    /// Persisted document could not be decoded into domain types.
    #[error("Document {id} is corrupt: {reason}")]
    CorruptDocument {
        /// Document.
        id: DocumentId,
        /// What failed to decode.
        reason: String,
    },

    /// Document code could not be issued.
    #[error("Numbering error: {0}")]
    Numbering(String),

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),
}

impl LedgerError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Validation(_) => 400,

            Self::DocumentNotFound(_)
            | Self::DocumentNumberNotFound(_)
            | Self::InstallmentNotFound { .. }
            | Self::CounterpartyNotFound(_) => 404,

            Self::ConcurrencyConflict { .. } => 409,

            Self::AlreadyPaid { .. }
            | Self::DocumentCancelled(_)
            | Self::InvalidTransition { .. } => 422,

            Self::CorruptDocument { .. } | Self::Numbering(_) | Self::Database(_) => 500,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::DocumentNotFound(_) | Self::DocumentNumberNotFound(_) => "DOCUMENT_NOT_FOUND",
            Self::InstallmentNotFound { .. } => "INSTALLMENT_NOT_FOUND",
            Self::CounterpartyNotFound(_) => "COUNTERPARTY_NOT_FOUND",
            Self::AlreadyPaid { .. } => "ALREADY_PAID",
            Self::DocumentCancelled(_) => "DOCUMENT_CANCELLED",
            Self::InvalidTransition { .. } => "INVALID_TRANSITION",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::ConcurrencyConflict { .. } => "CONCURRENCY_CONFLICT",
            Self::CorruptDocument { .. } => "CORRUPT_DOCUMENT",
            Self::Numbering(_) => "NUMBERING_ERROR",
            Self::Database(_) => "DATABASE_ERROR",
        }
    }
}

impl From<LedgerError> for AppError {
    fn from(err: LedgerError) -> Self {
        let message = err.to_string();
        match err {
            LedgerError::DocumentNotFound(_)
            | LedgerError::DocumentNumberNotFound(_)
            | LedgerError::InstallmentNotFound { .. }
            | LedgerError::CounterpartyNotFound(_) => Self::NotFound(message),
            LedgerError::Validation(_) => Self::Validation(message),
            LedgerError::AlreadyPaid { .. }
            | LedgerError::DocumentCancelled(_)
            | LedgerError::InvalidTransition { .. } => Self::BusinessRule(message),
            LedgerError::ConcurrencyConflict { .. } => Self::Conflict(message),
            LedgerError::Database(_) => Self::Database(message),
            LedgerError::CorruptDocument { .. } | LedgerError::Numbering(_) => {
                Self::Internal(message)
            }
        }
    }
}
