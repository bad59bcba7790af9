//! Counterparty repository: suppliers and clients.
//!
//! Only the statistics maintained by the ledger live here, plus the
//! minimal create/delete needed to reference counterparties.

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QuerySelect, Set,
};
use varejo_core::document::{CounterpartyKind, LedgerError, ValidationError};
use varejo_shared::types::CounterpartyId;

use crate::entities::counterparties;

/// Input for creating a counterparty.
#[derive(Debug, Clone)]
pub struct NewCounterparty {
    /// Supplier or client.
    pub kind: CounterpartyKind,
    /// Display name.
    pub name: String,
    /// CNPJ/CPF.
    pub tax_id: Option<String>,
}

/// Changes to a counterparty's ledger statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BalanceDelta {
    /// Added to `open_balance`.
    pub open_balance: Decimal,
    /// Added to `total_settled`.
    pub total_settled: Decimal,
    /// Settlement date to fold into `last_settlement_at`.
    pub settled_on: Option<NaiveDate>,
}

impl BalanceDelta {
    /// Returns true if applying it changes nothing.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.open_balance.is_zero() && self.total_settled.is_zero() && self.settled_on.is_none()
    }
}

/// Repository for suppliers and clients.
#[derive(Debug, Clone)]
pub struct CounterpartyRepository {
    db: DatabaseConnection,
}

impl CounterpartyRepository {
    /// Creates a new counterparty repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a counterparty with zeroed statistics.
    ///
    /// # Errors
    ///
    /// Returns an error if the database insert fails.
    pub async fn create(
        &self,
        input: NewCounterparty,
    ) -> Result<counterparties::Model, LedgerError> {
        let now = Utc::now().into();

        counterparties::ActiveModel {
            id: Set(CounterpartyId::new().into_inner()),
            kind: Set(input.kind.as_str().to_string()),
            name: Set(input.name),
            tax_id: Set(input.tax_id),
            total_settled: Set(Decimal::ZERO),
            open_balance: Set(Decimal::ZERO),
            last_settlement_at: Set(None),
            deleted_at: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&self.db)
        .await
        .map_err(|e| LedgerError::Database(e.to_string()))
    }

    /// Finds a counterparty by ID, deleted or not.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find(
        &self,
        id: CounterpartyId,
    ) -> Result<Option<counterparties::Model>, LedgerError> {
        counterparties::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await
            .map_err(|e| LedgerError::Database(e.to_string()))
    }

    /// Soft-deletes a counterparty. New documents can no longer reference it.
    ///
    /// # Errors
    ///
    /// Returns `CounterpartyNotFound` if it does not exist or is already
    /// deleted.
    pub async fn soft_delete(&self, id: CounterpartyId) -> Result<(), LedgerError> {
        let now = Utc::now();
        let result = counterparties::Entity::update_many()
            .col_expr(counterparties::Column::DeletedAt, Expr::value(now))
            .col_expr(counterparties::Column::UpdatedAt, Expr::value(now))
            .filter(counterparties::Column::Id.eq(id.into_inner()))
            .filter(counterparties::Column::DeletedAt.is_null())
            .exec(&self.db)
            .await
            .map_err(|e| LedgerError::Database(e.to_string()))?;

        if result.rows_affected == 0 {
            return Err(LedgerError::CounterpartyNotFound(id));
        }
        Ok(())
    }

    /// Checks that a counterparty is active and of the expected kind,
    /// without locking it.
    pub(crate) async fn check_active<C: ConnectionTrait>(
        conn: &C,
        id: CounterpartyId,
        expected: CounterpartyKind,
    ) -> Result<counterparties::Model, LedgerError> {
        Self::load_active(conn, id, expected, false).await
    }

    /// Like `check_active`, but takes a row lock held until the enclosing
    /// transaction ends, so the counterparty cannot be deleted underneath
    /// the caller.
    pub(crate) async fn require_active<C: ConnectionTrait>(
        conn: &C,
        id: CounterpartyId,
        expected: CounterpartyKind,
    ) -> Result<counterparties::Model, LedgerError> {
        Self::load_active(conn, id, expected, true).await
    }

    async fn load_active<C: ConnectionTrait>(
        conn: &C,
        id: CounterpartyId,
        expected: CounterpartyKind,
        lock: bool,
    ) -> Result<counterparties::Model, LedgerError> {
        let mut query = counterparties::Entity::find_by_id(id.into_inner());
        if lock {
            query = query.lock_exclusive();
        }

        let model = query
            .one(conn)
            .await
            .map_err(|e| LedgerError::Database(e.to_string()))?
            .filter(|m| m.deleted_at.is_none())
            .ok_or(LedgerError::CounterpartyNotFound(id))?;

        let found = CounterpartyKind::parse(&model.kind).ok_or_else(|| {
            LedgerError::Database(format!("Unknown counterparty kind: {}", model.kind))
        })?;
        if found != expected {
            return Err(ValidationError::CounterpartyKindMismatch { expected, found }.into());
        }

        Ok(model)
    }

    /// Applies `delta` with relative updates, so concurrent writers to the
    /// same counterparty never overwrite each other.
    pub(crate) async fn apply_delta<C: ConnectionTrait>(
        conn: &C,
        id: CounterpartyId,
        delta: BalanceDelta,
    ) -> Result<(), LedgerError> {
        if delta.is_zero() {
            return Ok(());
        }

        let mut update = counterparties::Entity::update_many()
            .col_expr(
                counterparties::Column::OpenBalance,
                Expr::col(counterparties::Column::OpenBalance).add(delta.open_balance),
            )
            .col_expr(
                counterparties::Column::TotalSettled,
                Expr::col(counterparties::Column::TotalSettled).add(delta.total_settled),
            )
            .col_expr(counterparties::Column::UpdatedAt, Expr::value(Utc::now()));

        if let Some(day) = delta.settled_on {
            update = update.col_expr(
                counterparties::Column::LastSettlementAt,
                Expr::cust_with_values(
                    "GREATEST(COALESCE(last_settlement_at, $1), $2)",
                    [day, day],
                ),
            );
        }

        let result = update
            .filter(counterparties::Column::Id.eq(id.into_inner()))
            .exec(conn)
            .await
            .map_err(|e| LedgerError::Database(e.to_string()))?;

        if result.rows_affected == 0 {
            return Err(LedgerError::CounterpartyNotFound(id));
        }
        Ok(())
    }
}
