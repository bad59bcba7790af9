//! Property-based tests for LedgerService.

use chrono::{NaiveDate, Utc};
use proptest::prelude::*;
use rust_decimal::Decimal;
use varejo_shared::types::UserId;

use crate::document::error::LedgerError;
use crate::document::schedule::{DueInterval, InstallmentPlan};
use crate::document::service::{LedgerService, NewDocument, SettlementInput};
use crate::document::status::derive_status;
use crate::document::types::{Document, DocumentKind, DocumentStatus, PaymentMethod};

fn arb_kind() -> impl Strategy<Value = DocumentKind> {
    prop_oneof![Just(DocumentKind::Payable), Just(DocumentKind::Receivable)]
}

/// Totals in cents, 100.00 ..= 100000.00, large enough that every split
/// share stays positive.
fn arb_amount() -> impl Strategy<Value = Decimal> {
    (10_000i64..=10_000_000).prop_map(|cents| Decimal::new(cents, 2))
}

/// Adjustments in cents, 0.00 ..= 500.00.
fn arb_adjustment() -> impl Strategy<Value = Decimal> {
    (0i64..=50_000).prop_map(|cents| Decimal::new(cents, 2))
}

fn open(kind: DocumentKind, total: Decimal, count: u32) -> Document {
    let first_due_date = NaiveDate::from_ymd_opt(2026, 1, 31).unwrap();
    let input = NewDocument {
        kind,
        counterparty_id: None,
        description: "Parcelamento".to_string(),
        category: None,
        notes: None,
        fiscal_reference: None,
        issue_date: first_due_date,
        total_amount: total,
        plan: InstallmentPlan::Split {
            count,
            first_due_date,
            interval: DueInterval::Monthly,
        },
        created_by: UserId::new(),
    };
    let installments = LedgerService::prepare(&input).unwrap();
    LedgerService::open(input, installments, "CP-000001".into(), Utc::now())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// After any sequence of settlements the status equals the derived one
    /// and the settled amount equals the sum of final amounts.
    #[test]
    fn prop_settlements_keep_invariants(
        kind in arb_kind(),
        total in arb_amount(),
        count in 1u32..=12,
        order in proptest::collection::vec(1u32..=12, 0..24),
        interest in arb_adjustment(),
        discount in arb_adjustment(),
    ) {
        let mut document = open(kind, total, count);
        let actor = UserId::new();
        let paid_at = NaiveDate::from_ymd_opt(2026, 6, 1).unwrap();
        let input = SettlementInput::new(paid_at, PaymentMethod::Transferencia)
            .with_interest(interest)
            .with_discount(discount);

        for number in order {
            let before = document.clone();
            match LedgerService::liquidate(&mut document, number, &input, actor, Utc::now()) {
                Ok(_) => prop_assert_eq!(document.history.len(), before.history.len() + 1),
                Err(LedgerError::AlreadyPaid { .. } | LedgerError::InstallmentNotFound { .. }) => {
                    prop_assert_eq!(&document, &before);
                }
                Err(other) => prop_assert!(false, "unexpected error: {other}"),
            }

            prop_assert_eq!(document.status, derive_status(&document.installments));
            let settled: Decimal = document
                .installments
                .iter()
                .filter(|i| i.is_settled())
                .filter_map(|i| i.final_amount)
                .sum();
            prop_assert_eq!(document.settled_amount, settled);
            prop_assert_eq!(document.total_amount, total);
        }
    }

    /// Split schedules always reconcile with the declared total.
    #[test]
    fn prop_split_schedule_reconciles(total in arb_amount(), count in 1u32..=48) {
        let document = open(DocumentKind::Payable, total, count);
        let sum: Decimal = document.installments.iter().map(|i| i.amount).sum();
        prop_assert_eq!(sum, total);
        prop_assert_eq!(document.installments.len(), count as usize);
    }

    /// Once cancelled, no operation changes the document.
    #[test]
    fn prop_cancellation_is_terminal(
        kind in arb_kind(),
        total in arb_amount(),
        count in 1u32..=6,
        settle_first in any::<bool>(),
        number in 1u32..=6,
    ) {
        let mut document = open(kind, total, count);
        let actor = UserId::new();
        let input = SettlementInput::new(
            NaiveDate::from_ymd_opt(2026, 2, 1).unwrap(),
            PaymentMethod::Dinheiro,
        );
        if settle_first && count > 1 {
            LedgerService::liquidate(&mut document, 1, &input, actor, Utc::now()).unwrap();
        }
        LedgerService::cancel(&mut document, "desistencia", actor, Utc::now()).unwrap();
        let frozen = document.clone();

        let settle = LedgerService::liquidate(&mut document, number, &input, actor, Utc::now());
        prop_assert!(matches!(settle, Err(LedgerError::DocumentCancelled(_))));
        let cancel = LedgerService::cancel(&mut document, "outra vez", actor, Utc::now());
        prop_assert!(matches!(cancel, Err(LedgerError::DocumentCancelled(_))));
        prop_assert_eq!(&document, &frozen);
        prop_assert_eq!(document.status, DocumentStatus::Cancelled);
    }
}
