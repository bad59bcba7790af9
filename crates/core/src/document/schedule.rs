//! Installment schedules.

use chrono::{Days, Months, NaiveDate};
use rust_decimal::Decimal;
use std::collections::HashSet;

use super::error::ValidationError;
use super::types::Installment;
use crate::settlement::{InstallmentCalculator, STORED_SCALE};

/// Spacing between due dates of a split plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DueInterval {
    /// Same day of each following month (clamped to month end).
    Monthly,
    /// Fixed number of days.
    Days(u32),
}

/// One installment of an explicit plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduledInstallment {
    /// Base amount.
    pub amount: Decimal,
    /// Due date.
    pub due_date: NaiveDate,
}

/// How a document's total is spread over installments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallmentPlan {
    /// One installment for the whole total.
    Single {
        /// Due date.
        due_date: NaiveDate,
    },
    /// `count` installments of (almost) equal amounts.
    Split {
        /// Number of installments.
        count: u32,
        /// Due date of the first installment.
        first_due_date: NaiveDate,
        /// Spacing between due dates.
        interval: DueInterval,
    },
    /// Caller-provided amounts and due dates, numbered in the given order.
    Explicit(Vec<ScheduledInstallment>),
}

impl InstallmentPlan {
    /// Builds the pending installments for `total`.
    ///
    /// # Errors
    ///
    /// Returns an error if the plan is empty, an amount is not positive,
    /// a due date overflows the calendar, or the amounts do not sum to
    /// `total`.
    pub fn build(&self, total: Decimal) -> Result<Vec<Installment>, ValidationError> {
        let installments = match self {
            Self::Single { due_date } => vec![Installment::pending(1, total, *due_date)],
            Self::Split {
                count,
                first_due_date,
                interval,
            } => {
                if *count == 0 {
                    return Err(ValidationError::EmptySchedule);
                }
                InstallmentCalculator::split_evenly(total, *count)
                    .into_iter()
                    .zip(1..)
                    .map(|(amount, number)| {
                        let due = due_date_for(*first_due_date, *interval, number - 1)
                            .ok_or(ValidationError::DueDateOutOfRange(number))?;
                        Ok(Installment::pending(number, amount, due))
                    })
                    .collect::<Result<Vec<_>, ValidationError>>()?
            }
            Self::Explicit(items) => items
                .iter()
                .zip(1..)
                .map(|(item, number)| Installment::pending(number, item.amount, item.due_date))
                .collect(),
        };

        validate_schedule(total, &installments)?;
        Ok(installments)
    }
}

/// Due date of the installment at zero-based `index`.
fn due_date_for(first: NaiveDate, interval: DueInterval, index: u32) -> Option<NaiveDate> {
    match interval {
        DueInterval::Monthly => first.checked_add_months(Months::new(index)),
        DueInterval::Days(days) => {
            first.checked_add_days(Days::new(u64::from(days) * u64::from(index)))
        }
    }
}

/// Checks that a schedule is non-empty, positive, uniquely numbered and
/// reconciles with `total`.
///
/// # Errors
///
/// Returns the first rule violated.
pub fn validate_schedule(
    total: Decimal,
    installments: &[Installment],
) -> Result<(), ValidationError> {
    validate_installments(installments)?;

    for installment in installments {
        if installment.amount <= Decimal::ZERO {
            return Err(ValidationError::NonPositiveInstallment {
                number: installment.number,
                amount: installment.amount,
            });
        }
        check_precision("installment amount", installment.amount)?;
    }

    let scheduled: Decimal = installments.iter().map(|i| i.amount).sum();
    if scheduled != total {
        return Err(ValidationError::ScheduleTotalMismatch {
            declared: total,
            scheduled,
        });
    }

    Ok(())
}

/// Rejects amounts the `NUMERIC(19, 4)` columns would round.
///
/// Trailing zeros do not count: `1.50000` is accepted.
///
/// # Errors
///
/// Returns `ExcessivePrecision` naming `field`.
pub fn check_precision(field: &'static str, amount: Decimal) -> Result<(), ValidationError> {
    if amount.normalize().scale() > STORED_SCALE {
        return Err(ValidationError::ExcessivePrecision {
            field,
            amount,
            max_scale: STORED_SCALE,
        });
    }
    Ok(())
}

/// Structural checks applied to installments loaded from storage.
///
/// # Errors
///
/// Returns an error if the list is empty or numbers repeat.
pub fn validate_installments(installments: &[Installment]) -> Result<(), ValidationError> {
    if installments.is_empty() {
        return Err(ValidationError::EmptySchedule);
    }

    let mut seen = HashSet::with_capacity(installments.len());
    for installment in installments {
        if !seen.insert(installment.number) {
            return Err(ValidationError::DuplicateInstallmentNumber(installment.number));
        }
    }

    Ok(())
}
