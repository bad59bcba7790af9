//! Payable/receivable document domain types.
//!
//! Installments and audit entries are embedded in the document and
//! persisted as JSON arrays; their serde names define that layout.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use varejo_shared::types::{CounterpartyId, DocumentId, UserId};

use crate::audit::AuditEntry;
use crate::numbering::SequenceKind;
use crate::settlement::InstallmentCalculator;

/// Whether a document is money owed by the business or to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DocumentKind {
    /// Accounts payable (`contas_pagar`), owed to a supplier.
    #[serde(rename = "pagar")]
    Payable,
    /// Accounts receivable (`contas_receber`), owed by a client.
    #[serde(rename = "receber")]
    Receivable,
}

impl DocumentKind {
    /// Returns the string representation of the kind.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Payable => "pagar",
            Self::Receivable => "receber",
        }
    }

    /// Parses a kind from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pagar" => Some(Self::Payable),
            "receber" => Some(Self::Receivable),
            _ => None,
        }
    }

    /// Sequence that numbers documents of this kind.
    #[must_use]
    pub const fn sequence(&self) -> SequenceKind {
        match self {
            Self::Payable => SequenceKind::Payable,
            Self::Receivable => SequenceKind::Receivable,
        }
    }

    /// Kind of counterparty documents of this kind may reference.
    #[must_use]
    pub const fn counterparty_kind(&self) -> CounterpartyKind {
        match self {
            Self::Payable => CounterpartyKind::Supplier,
            Self::Receivable => CounterpartyKind::Client,
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Supplier or client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CounterpartyKind {
    /// Supplier, referenced by payables.
    #[serde(rename = "fornecedor")]
    Supplier,
    /// Client, referenced by receivables.
    #[serde(rename = "cliente")]
    Client,
}

impl CounterpartyKind {
    /// Returns the string representation of the kind.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Supplier => "fornecedor",
            Self::Client => "cliente",
        }
    }

    /// Parses a kind from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "fornecedor" => Some(Self::Supplier),
            "cliente" => Some(Self::Client),
            _ => None,
        }
    }
}

impl fmt::Display for CounterpartyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Aggregate status of a document.
///
/// Valid transitions:
/// - Pending → PartiallySettled / Settled (settlement)
/// - PartiallySettled → Settled (settlement)
/// - Pending / PartiallySettled → Cancelled (cancel)
///
/// Settled and Cancelled are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentStatus {
    /// No installment settled yet.
    Pending,
    /// Some, but not all, installments settled.
    PartiallySettled,
    /// Every installment settled.
    Settled,
    /// Cancelled; no further mutation allowed.
    Cancelled,
}

impl DocumentStatus {
    /// Every status.
    pub const ALL: [Self; 4] = [
        Self::Pending,
        Self::PartiallySettled,
        Self::Settled,
        Self::Cancelled,
    ];

    /// Persisted name for the status of a document of `kind`.
    ///
    /// Payables use `pago_*`, receivables `recebido_*`.
    #[must_use]
    pub const fn label(&self, kind: DocumentKind) -> &'static str {
        match (self, kind) {
            (Self::Pending, _) => "pendente",
            (Self::PartiallySettled, DocumentKind::Payable) => "pago_parcial",
            (Self::PartiallySettled, DocumentKind::Receivable) => "recebido_parcial",
            (Self::Settled, DocumentKind::Payable) => "pago_total",
            (Self::Settled, DocumentKind::Receivable) => "recebido_total",
            (Self::Cancelled, _) => "cancelado",
        }
    }

    /// Parses any payable or receivable status name.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pendente" => Some(Self::Pending),
            "pago_parcial" | "recebido_parcial" => Some(Self::PartiallySettled),
            "pago_total" | "recebido_total" => Some(Self::Settled),
            "cancelado" => Some(Self::Cancelled),
            _ => None,
        }
    }

    /// Returns true if no further transition is possible.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Settled | Self::Cancelled)
    }
}

impl fmt::Display for DocumentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label(DocumentKind::Payable))
    }
}

/// Status of a single installment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InstallmentStatus {
    /// Not settled yet.
    #[serde(rename = "pendente")]
    Pending,
    /// Settled; immutable from now on.
    #[serde(rename = "pago", alias = "recebido")]
    Settled,
}

impl InstallmentStatus {
    /// Name shown for an installment of a document of `kind`.
    #[must_use]
    pub const fn label(&self, kind: DocumentKind) -> &'static str {
        match (self, kind) {
            (Self::Pending, _) => "pendente",
            (Self::Settled, DocumentKind::Payable) => "pago",
            (Self::Settled, DocumentKind::Receivable) => "recebido",
        }
    }
}

/// How an installment was settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Cash.
    Dinheiro,
    /// PIX instant transfer.
    Pix,
    /// Credit card.
    CartaoCredito,
    /// Debit card.
    CartaoDebito,
    /// Bank slip.
    Boleto,
    /// Bank transfer.
    Transferencia,
    /// Cheque.
    Cheque,
}

impl PaymentMethod {
    /// Returns the string representation of the method.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Dinheiro => "dinheiro",
            Self::Pix => "pix",
            Self::CartaoCredito => "cartao_credito",
            Self::CartaoDebito => "cartao_debito",
            Self::Boleto => "boleto",
            Self::Transferencia => "transferencia",
            Self::Cheque => "cheque",
        }
    }
}

/// One scheduled payment or receipt within a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Installment {
    /// 1-based position, unique within the document.
    #[serde(rename = "numero_parcela")]
    pub number: u32,
    /// Base amount.
    #[serde(rename = "valor")]
    pub amount: Decimal,
    /// Due date.
    #[serde(rename = "data_vencimento")]
    pub due_date: NaiveDate,
    /// Settlement status.
    pub status: InstallmentStatus,
    /// Amount reported as paid by the caller.
    #[serde(rename = "valor_pago", default)]
    pub paid_amount: Option<Decimal>,
    /// Settlement date.
    #[serde(rename = "data_pagamento", default)]
    pub paid_at: Option<NaiveDate>,
    /// Interest applied on settlement.
    #[serde(rename = "juros", default)]
    pub interest: Decimal,
    /// Fine applied on settlement (payables only).
    #[serde(rename = "multa", default)]
    pub fine: Decimal,
    /// Discount granted on settlement.
    #[serde(rename = "desconto", default)]
    pub discount: Decimal,
    /// Settled amount after interest, fine and discount.
    #[serde(rename = "valor_final", default)]
    pub final_amount: Option<Decimal>,
    /// How it was settled.
    #[serde(rename = "forma_pagamento", default)]
    pub payment_method: Option<PaymentMethod>,
    /// Free-form note recorded on settlement.
    #[serde(rename = "observacao", default)]
    pub note: Option<String>,
}

impl Installment {
    /// Creates an unsettled installment.
    #[must_use]
    pub fn pending(number: u32, amount: Decimal, due_date: NaiveDate) -> Self {
        Self {
            number,
            amount,
            due_date,
            status: InstallmentStatus::Pending,
            paid_amount: None,
            paid_at: None,
            interest: Decimal::ZERO,
            fine: Decimal::ZERO,
            discount: Decimal::ZERO,
            final_amount: None,
            payment_method: None,
            note: None,
        }
    }

    /// Returns true once the installment has been settled.
    #[must_use]
    pub fn is_settled(&self) -> bool {
        self.status == InstallmentStatus::Settled
    }

    /// Returns true if unsettled and past its due date on `today`.
    #[must_use]
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        !self.is_settled() && self.due_date < today
    }
}

/// Cancellation details of a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cancellation {
    /// Reason given by the actor.
    pub reason: String,
    /// Who cancelled.
    pub cancelled_by: UserId,
    /// When.
    pub cancelled_at: DateTime<Utc>,
}

/// An accounts-payable or accounts-receivable document.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// Identifier.
    pub id: DocumentId,
    /// Payable or receivable.
    pub kind: DocumentKind,
    /// Formatted sequence code, immutable once assigned.
    pub numero: String,
    /// Supplier or client, optional for manual entries.
    pub counterparty_id: Option<CounterpartyId>,
    /// Description.
    pub description: String,
    /// Expense/revenue category.
    pub category: Option<String>,
    /// Free-form notes.
    pub notes: Option<String>,
    /// External fiscal reference (supplier invoice, receipt number).
    pub fiscal_reference: Option<String>,
    /// Issue date.
    pub issue_date: NaiveDate,
    /// Sum of installment base amounts.
    pub total_amount: Decimal,
    /// Sum of final amounts over settled installments.
    pub settled_amount: Decimal,
    /// Interest collected over settled installments.
    pub total_interest: Decimal,
    /// Fines collected over settled installments.
    pub total_fine: Decimal,
    /// Discounts granted over settled installments.
    pub total_discount: Decimal,
    /// Aggregate status.
    pub status: DocumentStatus,
    /// Payment plan, ordered by installment number.
    pub installments: Vec<Installment>,
    /// Set once the document is cancelled.
    pub cancellation: Option<Cancellation>,
    /// Change history, oldest first.
    pub history: Vec<AuditEntry>,
    /// Creator.
    pub created_by: UserId,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last actor to mutate the document.
    pub updated_by: Option<UserId>,
    /// Last mutation time.
    pub updated_at: DateTime<Utc>,
    /// Optimistic-concurrency token, bumped by storage on every write.
    pub version: i64,
}

impl Document {
    /// Returns true once the document is cancelled.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.status == DocumentStatus::Cancelled
    }

    /// Persisted status name.
    #[must_use]
    pub fn status_label(&self) -> &'static str {
        self.status.label(self.kind)
    }

    /// Finds an installment by its number.
    #[must_use]
    pub fn installment(&self, number: u32) -> Option<&Installment> {
        self.installments.iter().find(|i| i.number == number)
    }

    /// Sum of base amounts still unsettled.
    #[must_use]
    pub fn outstanding_amount(&self) -> Decimal {
        self.installments
            .iter()
            .filter(|i| !i.is_settled())
            .map(|i| i.amount)
            .sum()
    }

    /// `total + interest + fine - discount` over the settled adjustments.
    #[must_use]
    pub fn net_total(&self) -> Decimal {
        InstallmentCalculator::net_total(
            self.total_amount,
            self.total_interest,
            self.total_fine,
            self.total_discount,
        )
    }

    /// Earliest due date among unsettled installments.
    #[must_use]
    pub fn next_due_date(&self) -> Option<NaiveDate> {
        self.installments
            .iter()
            .filter(|i| !i.is_settled())
            .map(|i| i.due_date)
            .min()
    }

    /// Unsettled installments past due on `today`. Empty once cancelled.
    pub fn overdue_installments(&self, today: NaiveDate) -> impl Iterator<Item = &Installment> {
        let cancelled = self.is_cancelled();
        self.installments
            .iter()
            .filter(move |i| !cancelled && i.is_overdue(today))
    }
}
