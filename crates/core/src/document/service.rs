//! Ledger service for payable/receivable state transitions.
//!
//! Every transition validates first and mutates only after all checks
//! pass, so a failed call leaves the document untouched. Persistence and
//! atomicity belong to the storage layer.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde_json::Value;
use varejo_shared::types::{CounterpartyId, DocumentId, UserId};

use super::error::{LedgerError, ValidationError};
use super::schedule::{InstallmentPlan, check_precision};
use super::status::derive_status;
use super::types::{
    Cancellation, Document, DocumentKind, DocumentStatus, Installment, InstallmentStatus,
    PaymentMethod,
};
use crate::audit::{AuditAction, AuditTrail, FieldChange};
use crate::settlement::InstallmentCalculator;

/// Input for opening a new document.
#[derive(Debug, Clone)]
pub struct NewDocument {
    /// Payable or receivable.
    pub kind: DocumentKind,
    /// Supplier or client, if any.
    pub counterparty_id: Option<CounterpartyId>,
    /// Description.
    pub description: String,
    /// Category.
    pub category: Option<String>,
    /// Notes.
    pub notes: Option<String>,
    /// External fiscal reference.
    pub fiscal_reference: Option<String>,
    /// Issue date.
    pub issue_date: NaiveDate,
    /// Declared total; installments must sum to it.
    pub total_amount: Decimal,
    /// Payment plan.
    pub plan: InstallmentPlan,
    /// Creator.
    pub created_by: UserId,
}

/// Changes to descriptive fields.
///
/// `None` leaves a field alone; `Some(None)` clears an optional field.
#[derive(Debug, Clone, Default)]
pub struct DocumentEdit {
    /// New description.
    pub description: Option<String>,
    /// New category.
    pub category: Option<Option<String>>,
    /// New notes.
    pub notes: Option<Option<String>>,
    /// New fiscal reference.
    pub fiscal_reference: Option<Option<String>>,
}

/// Settlement details for one installment.
#[derive(Debug, Clone)]
pub struct SettlementInput {
    /// Settlement date.
    pub paid_at: NaiveDate,
    /// Payment method.
    pub payment_method: PaymentMethod,
    /// Amount reported by the caller; defaults to the computed final amount.
    pub paid_amount: Option<Decimal>,
    /// Interest.
    pub interest: Decimal,
    /// Fine (payables only).
    pub fine: Decimal,
    /// Discount.
    pub discount: Decimal,
    /// Note.
    pub note: Option<String>,
}

impl SettlementInput {
    /// Settlement with no adjustments.
    #[must_use]
    pub fn new(paid_at: NaiveDate, payment_method: PaymentMethod) -> Self {
        Self {
            paid_at,
            payment_method,
            paid_amount: None,
            interest: Decimal::ZERO,
            fine: Decimal::ZERO,
            discount: Decimal::ZERO,
            note: None,
        }
    }

    /// Sets the interest.
    #[must_use]
    pub fn with_interest(mut self, interest: Decimal) -> Self {
        self.interest = interest;
        self
    }

    /// Sets the fine.
    #[must_use]
    pub fn with_fine(mut self, fine: Decimal) -> Self {
        self.fine = fine;
        self
    }

    /// Sets the discount.
    #[must_use]
    pub fn with_discount(mut self, discount: Decimal) -> Self {
        self.discount = discount;
        self
    }

    /// Sets the amount reported as paid.
    #[must_use]
    pub fn with_paid_amount(mut self, paid_amount: Decimal) -> Self {
        self.paid_amount = Some(paid_amount);
        self
    }

    /// Sets a note.
    #[must_use]
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }
}

/// What a settlement changed, for counterparty bookkeeping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettlementOutcome {
    /// Installment settled.
    pub installment_number: u32,
    /// Its base amount (leaves the open balance).
    pub base_amount: Decimal,
    /// Its final amount (enters the settled total).
    pub final_amount: Decimal,
    /// Settlement date.
    pub paid_at: NaiveDate,
    /// Document status after the settlement.
    pub status: DocumentStatus,
}

/// What a cancellation reverts, for counterparty bookkeeping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CancellationOutcome {
    /// Base amount that was still open.
    pub outstanding_amount: Decimal,
    /// Final amount that had been settled.
    pub settled_amount: Decimal,
    /// Status before cancelling.
    pub previous_status: DocumentStatus,
}

/// Stateless service implementing the document state machine.
pub struct LedgerService;

impl LedgerService {
    /// Validates a creation request and builds its installments.
    ///
    /// Called before a document number is issued so that invalid requests
    /// do not consume sequence values.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::Validation` if the description is blank, the
    /// total is not positive or the plan does not reconcile.
    pub fn prepare(input: &NewDocument) -> Result<Vec<Installment>, LedgerError> {
        if input.description.trim().is_empty() {
            return Err(ValidationError::DescriptionRequired.into());
        }
        if input.total_amount <= Decimal::ZERO {
            return Err(ValidationError::NonPositiveTotal(input.total_amount).into());
        }
        check_precision("total amount", input.total_amount)?;

        Ok(input.plan.build(input.total_amount)?)
    }

    /// Opens a document in `Pending` with its creation audit entry.
    #[must_use]
    pub fn open(
        input: NewDocument,
        installments: Vec<Installment>,
        numero: String,
        now: DateTime<Utc>,
    ) -> Document {
        let mut document = Document {
            id: DocumentId::new(),
            kind: input.kind,
            numero,
            counterparty_id: input.counterparty_id,
            description: input.description.trim().to_string(),
            category: input.category,
            notes: input.notes,
            fiscal_reference: input.fiscal_reference,
            issue_date: input.issue_date,
            total_amount: input.total_amount,
            settled_amount: Decimal::ZERO,
            total_interest: Decimal::ZERO,
            total_fine: Decimal::ZERO,
            total_discount: Decimal::ZERO,
            status: DocumentStatus::Pending,
            installments,
            cancellation: None,
            history: Vec::new(),
            created_by: input.created_by,
            created_at: now,
            updated_by: None,
            updated_at: now,
            version: 0,
        };
        Self::recompute(&mut document);

        let changes = vec![
            FieldChange::new("numero", Value::Null, document.numero.as_str()),
            FieldChange::new("valor_total", Value::Null, document.total_amount),
            FieldChange::new("parcelas", Value::Null, document.installments.len()),
            FieldChange::new("status", Value::Null, document.status_label()),
        ];
        AuditTrail::record(
            &mut document.history,
            input.created_by,
            AuditAction::Create,
            changes,
            now,
        );

        document
    }

    /// Applies descriptive changes.
    ///
    /// Returns `Ok(false)` without recording anything when no field
    /// actually changes.
    ///
    /// # Errors
    ///
    /// - `DocumentCancelled` if the document is cancelled
    /// - `Validation(DescriptionRequired)` if the new description is blank
    pub fn edit(
        document: &mut Document,
        edit: DocumentEdit,
        actor: UserId,
        now: DateTime<Utc>,
    ) -> Result<bool, LedgerError> {
        if document.is_cancelled() {
            return Err(LedgerError::DocumentCancelled(document.id));
        }

        let description = edit.description.map(|d| d.trim().to_string());
        if description.as_deref().is_some_and(str::is_empty) {
            return Err(ValidationError::DescriptionRequired.into());
        }

        let mut changes = Vec::new();
        if let Some(description) = description
            && description != document.description
        {
            changes.push(FieldChange::new(
                "descricao",
                document.description.as_str(),
                description.as_str(),
            ));
            document.description = description;
        }
        replace_optional(&mut document.category, edit.category, "categoria", &mut changes);
        replace_optional(&mut document.notes, edit.notes, "observacoes", &mut changes);
        replace_optional(
            &mut document.fiscal_reference,
            edit.fiscal_reference,
            "documento_fiscal",
            &mut changes,
        );

        if changes.is_empty() {
            return Ok(false);
        }

        AuditTrail::record(&mut document.history, actor, AuditAction::Edit, changes, now);
        document.updated_by = Some(actor);
        document.updated_at = now;
        Ok(true)
    }

    /// Settles one installment.
    ///
    /// # Errors
    ///
    /// - `DocumentCancelled` if the document is cancelled
    /// - `InstallmentNotFound` if no installment has `number`
    /// - `AlreadyPaid` if the installment is already settled
    /// - `Validation(FineNotApplicable)` for a fine on a receivable
    /// - `Validation(ExcessivePrecision)` for an amount beyond 4 decimal places
    pub fn liquidate(
        document: &mut Document,
        number: u32,
        input: &SettlementInput,
        actor: UserId,
        now: DateTime<Utc>,
    ) -> Result<SettlementOutcome, LedgerError> {
        if document.is_cancelled() {
            return Err(LedgerError::DocumentCancelled(document.id));
        }

        let index = document
            .installments
            .iter()
            .position(|i| i.number == number)
            .ok_or(LedgerError::InstallmentNotFound {
                document: document.id,
                number,
            })?;

        if document.installments[index].is_settled() {
            return Err(LedgerError::AlreadyPaid {
                document: document.id,
                number,
            });
        }

        let kind = document.kind;
        if kind == DocumentKind::Receivable && !input.fine.is_zero() {
            return Err(ValidationError::FineNotApplicable.into());
        }
        check_precision("interest", input.interest)?;
        check_precision("fine", input.fine)?;
        check_precision("discount", input.discount)?;
        if let Some(paid_amount) = input.paid_amount {
            check_precision("paid amount", paid_amount)?;
        }

        let base_amount = document.installments[index].amount;
        let final_amount = match kind {
            DocumentKind::Payable => InstallmentCalculator::payable_final_amount(
                base_amount,
                input.interest,
                input.fine,
                input.discount,
            ),
            DocumentKind::Receivable => InstallmentCalculator::receivable_final_amount(
                base_amount,
                input.interest,
                input.discount,
            ),
        };

        let previous_status = document.status;
        let previous_settled = document.settled_amount;

        let installment = &mut document.installments[index];
        installment.status = InstallmentStatus::Settled;
        installment.paid_amount = Some(input.paid_amount.unwrap_or(final_amount));
        installment.paid_at = Some(input.paid_at);
        installment.interest = input.interest;
        installment.fine = input.fine;
        installment.discount = input.discount;
        installment.final_amount = Some(final_amount);
        installment.payment_method = Some(input.payment_method);
        installment.note.clone_from(&input.note);

        Self::recompute(document);

        let mut changes = vec![
            FieldChange::new(
                format!("parcelas[{number}].status"),
                InstallmentStatus::Pending.label(kind),
                InstallmentStatus::Settled.label(kind),
            ),
            FieldChange::new(
                format!("parcelas[{number}].valor_final"),
                Value::Null,
                final_amount,
            ),
            FieldChange::new(settled_field(kind), previous_settled, document.settled_amount),
        ];
        if previous_status != document.status {
            changes.push(FieldChange::new(
                "status",
                previous_status.label(kind),
                document.status_label(),
            ));
        }
        AuditTrail::record(&mut document.history, actor, AuditAction::Settle, changes, now);
        document.updated_by = Some(actor);
        document.updated_at = now;

        Ok(SettlementOutcome {
            installment_number: number,
            base_amount,
            final_amount,
            paid_at: input.paid_at,
            status: document.status,
        })
    }

    /// Cancels a document. Terminal.
    ///
    /// # Errors
    ///
    /// - `DocumentCancelled` if already cancelled
    /// - `Validation(CancellationReasonRequired)` if the reason is blank
    /// - `InvalidTransition` if the document is fully settled
    pub fn cancel(
        document: &mut Document,
        reason: &str,
        actor: UserId,
        now: DateTime<Utc>,
    ) -> Result<CancellationOutcome, LedgerError> {
        if document.is_cancelled() {
            return Err(LedgerError::DocumentCancelled(document.id));
        }

        let reason = reason.trim();
        if reason.is_empty() {
            return Err(ValidationError::CancellationReasonRequired.into());
        }

        if document.status == DocumentStatus::Settled {
            return Err(LedgerError::InvalidTransition {
                from: document.status,
                to: DocumentStatus::Cancelled,
            });
        }

        let outcome = CancellationOutcome {
            outstanding_amount: document.outstanding_amount(),
            settled_amount: document.settled_amount,
            previous_status: document.status,
        };

        document.status = DocumentStatus::Cancelled;
        document.cancellation = Some(Cancellation {
            reason: reason.to_string(),
            cancelled_by: actor,
            cancelled_at: now,
        });

        let changes = vec![
            FieldChange::new(
                "status",
                outcome.previous_status.label(document.kind),
                document.status_label(),
            ),
            FieldChange::new("cancelada", false, true),
            FieldChange::new("motivo_cancelamento", Value::Null, reason),
        ];
        AuditTrail::record(&mut document.history, actor, AuditAction::Cancel, changes, now);
        document.updated_by = Some(actor);
        document.updated_at = now;

        Ok(outcome)
    }

    /// Recomputes totals and status from the installments.
    ///
    /// The only place a document's status is derived. A cancelled status
    /// is kept as is.
    pub fn recompute(document: &mut Document) {
        let mut settled_amount = Decimal::ZERO;
        let mut interest = Decimal::ZERO;
        let mut fine = Decimal::ZERO;
        let mut discount = Decimal::ZERO;

        for installment in document.installments.iter().filter(|i| i.is_settled()) {
            settled_amount += installment.final_amount.unwrap_or(Decimal::ZERO);
            interest += installment.interest;
            fine += installment.fine;
            discount += installment.discount;
        }

        document.total_amount = document.installments.iter().map(|i| i.amount).sum();
        document.settled_amount = settled_amount;
        document.total_interest = interest;
        document.total_fine = fine;
        document.total_discount = discount;

        if !document.is_cancelled() {
            document.status = derive_status(&document.installments);
        }
    }
}

/// Audit field holding the settled total for a document kind.
const fn settled_field(kind: DocumentKind) -> &'static str {
    match kind {
        DocumentKind::Payable => "valor_pago",
        DocumentKind::Receivable => "valor_recebido",
    }
}

fn replace_optional(
    current: &mut Option<String>,
    requested: Option<Option<String>>,
    field: &str,
    changes: &mut Vec<FieldChange>,
) {
    let Some(requested) = requested else {
        return;
    };
    let requested = requested
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty());
    if requested != *current {
        changes.push(FieldChange::new(field, current.as_deref(), requested.as_deref()));
        *current = requested;
    }
}
