//! Dashboard figures over a set of documents.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::types::{Document, DocumentKind, DocumentStatus};

/// Number of documents in each status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCounts {
    /// `pendente`.
    pub pending: u64,
    /// `pago_parcial` / `recebido_parcial`.
    pub partially_settled: u64,
    /// `pago_total` / `recebido_total`.
    pub settled: u64,
    /// `cancelado`.
    pub cancelled: u64,
}

impl StatusCounts {
    fn bump(&mut self, status: DocumentStatus) {
        match status {
            DocumentStatus::Pending => self.pending += 1,
            DocumentStatus::PartiallySettled => self.partially_settled += 1,
            DocumentStatus::Settled => self.settled += 1,
            DocumentStatus::Cancelled => self.cancelled += 1,
        }
    }

    /// Total across statuses.
    #[must_use]
    pub const fn total(&self) -> u64 {
        self.pending + self.partially_settled + self.settled + self.cancelled
    }
}

/// KPIs for one document kind on a given day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerSummary {
    /// Payable or receivable.
    pub kind: DocumentKind,
    /// Reference day for overdue detection.
    pub today: NaiveDate,
    /// Unsettled base amount over non-cancelled documents.
    pub open_amount: Decimal,
    /// Part of `open_amount` already past due.
    pub overdue_amount: Decimal,
    /// Overdue installments.
    pub overdue_installments: u64,
    /// Final amount settled over non-cancelled documents.
    pub settled_amount: Decimal,
    /// Interest collected.
    pub total_interest: Decimal,
    /// Fines collected.
    pub total_fine: Decimal,
    /// Discounts granted.
    pub total_discount: Decimal,
    /// Documents per status, cancelled included.
    pub counts: StatusCounts,
}

impl LedgerSummary {
    /// Aggregates `documents` of `kind`; documents of the other kind are ignored.
    #[must_use]
    pub fn summarize<'a, I>(kind: DocumentKind, documents: I, today: NaiveDate) -> Self
    where
        I: IntoIterator<Item = &'a Document>,
    {
        let mut summary = Self {
            kind,
            today,
            open_amount: Decimal::ZERO,
            overdue_amount: Decimal::ZERO,
            overdue_installments: 0,
            settled_amount: Decimal::ZERO,
            total_interest: Decimal::ZERO,
            total_fine: Decimal::ZERO,
            total_discount: Decimal::ZERO,
            counts: StatusCounts::default(),
        };

        for document in documents.into_iter().filter(|d| d.kind == kind) {
            summary.counts.bump(document.status);
            if document.is_cancelled() {
                continue;
            }

            summary.open_amount += document.outstanding_amount();
            summary.settled_amount += document.settled_amount;
            summary.total_interest += document.total_interest;
            summary.total_fine += document.total_fine;
            summary.total_discount += document.total_discount;

            for installment in document.overdue_installments(today) {
                summary.overdue_amount += installment.amount;
                summary.overdue_installments += 1;
            }
        }

        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::schedule::{DueInterval, InstallmentPlan};
    use crate::document::service::{LedgerService, NewDocument, SettlementInput};
    use crate::document::types::PaymentMethod;
    use chrono::Utc;
    use rust_decimal_macros::dec;
    use varejo_shared::types::UserId;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn document(kind: DocumentKind, total: Decimal, count: u32) -> Document {
        let input = NewDocument {
            kind,
            counterparty_id: None,
            description: "Aluguel".to_string(),
            category: None,
            notes: None,
            fiscal_reference: None,
            issue_date: date(2026, 1, 1),
            total_amount: total,
            plan: InstallmentPlan::Split {
                count,
                first_due_date: date(2026, 1, 10),
                interval: DueInterval::Monthly,
            },
            created_by: UserId::new(),
        };
        let installments = LedgerService::prepare(&input).unwrap();
        LedgerService::open(input, installments, "CP-000001".into(), Utc::now())
    }

    #[test]
    fn test_summary_of_empty_set() {
        let summary = LedgerSummary::summarize(DocumentKind::Payable, [], date(2026, 1, 1));
        assert_eq!(summary.open_amount, Decimal::ZERO);
        assert_eq!(summary.counts.total(), 0);
    }

    #[test]
    fn test_summary_figures() {
        let actor = UserId::new();
        let today = date(2026, 2, 15);

        // Due 10/01, 10/02, 10/03: two overdue on `today`.
        let open = document(DocumentKind::Payable, dec!(300.00), 3);

        let mut partial = document(DocumentKind::Payable, dec!(200.00), 2);
        LedgerService::liquidate(
            &mut partial,
            1,
            &SettlementInput::new(date(2026, 1, 12), PaymentMethod::Boleto)
                .with_fine(dec!(2.00))
                .with_interest(dec!(1.00)),
            actor,
            Utc::now(),
        )
        .unwrap();

        let mut cancelled = document(DocumentKind::Payable, dec!(999.00), 1);
        LedgerService::cancel(&mut cancelled, "duplicado", actor, Utc::now()).unwrap();

        let receivable = document(DocumentKind::Receivable, dec!(50.00), 1);

        let documents = [open, partial, cancelled, receivable];
        let summary = LedgerSummary::summarize(DocumentKind::Payable, &documents, today);

        assert_eq!(summary.open_amount, dec!(400.00));
        assert_eq!(summary.overdue_amount, dec!(300.00));
        assert_eq!(summary.overdue_installments, 3);
        assert_eq!(summary.settled_amount, dec!(103.00));
        assert_eq!(summary.total_fine, dec!(2.00));
        assert_eq!(summary.total_interest, dec!(1.00));
        assert_eq!(
            summary.counts,
            StatusCounts {
                pending: 1,
                partially_settled: 1,
                settled: 0,
                cancelled: 1,
            }
        );
    }
}
