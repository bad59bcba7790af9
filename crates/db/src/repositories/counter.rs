//! Counter repository: named sequences backed by the `counters` table.
//!
//! Every increment is a single `INSERT ... ON CONFLICT ... RETURNING`
//! statement, so concurrent callers always receive distinct consecutive
//! values. Nothing is cached in process.

use sea_orm::{ConnectionTrait, DatabaseConnection, DbBackend, DbErr, EntityTrait, Statement};
use tracing::{debug, info};
use varejo_core::numbering::{NumberingScheme, SeedOutcome, seed_value};

use crate::entities::counters;

const NEXT_SQL: &str = r"
INSERT INTO counters (name, seq) VALUES ($1, 1)
ON CONFLICT (name) DO UPDATE SET seq = counters.seq + 1, updated_at = now()
RETURNING seq
";

const SEED_SQL: &str = r"
INSERT INTO counters (name, seq) VALUES ($1, $2)
ON CONFLICT (name) DO NOTHING
RETURNING seq
";

/// Error types for counter operations.
#[derive(Debug, thiserror::Error)]
pub enum CounterError {
    /// Counter names must be non-empty.
    #[error("Counter name must not be empty")]
    EmptyName,

    /// The database returned no row for an increment or seed.
    #[error("Counter {0} returned no value")]
    NoValue(String),

    /// Seed value does not fit the counter column.
    #[error("Seed value {value} for counter {name} is out of range")]
    SeedOutOfRange {
        /// Counter name.
        name: String,
        /// Requested seed.
        value: u64,
    },

    /// Counter returned a negative value.
    #[error("Counter {name} holds a negative value {seq}")]
    NegativeValue {
        /// Counter name.
        name: String,
        /// Value read.
        seq: i64,
    },

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Repository for named sequence counters.
#[derive(Debug, Clone)]
pub struct CounterRepository {
    db: DatabaseConnection,
}

impl CounterRepository {
    /// Creates a new counter repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Increments `name` and returns the new value.
    ///
    /// A missing counter is created, so the first call returns 1.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is empty or the statement fails.
    pub async fn next(&self, name: &str) -> Result<i64, CounterError> {
        check_name(name)?;

        let row = self
            .db
            .query_one(Statement::from_sql_and_values(
                DbBackend::Postgres,
                NEXT_SQL,
                [name.into()],
            ))
            .await?
            .ok_or_else(|| CounterError::NoValue(name.to_string()))?;
        let seq: i64 = row.try_get("", "seq")?;

        debug!(counter = name, seq, "sequence value issued");
        Ok(seq)
    }

    /// Issues the next code of a numbering scheme, e.g. `CP-000124`.
    ///
    /// # Errors
    ///
    /// Returns an error if the increment fails.
    pub async fn issue(&self, scheme: &NumberingScheme) -> Result<String, CounterError> {
        let name = scheme.kind.counter_name();
        let seq = self.next(name).await?;
        let value = u64::try_from(seq).map_err(|_| CounterError::NegativeValue {
            name: name.to_string(),
            seq,
        })?;
        Ok(scheme.render(value))
    }

    /// Reads the current value without incrementing.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn current(&self, name: &str) -> Result<Option<i64>, CounterError> {
        let counter = counters::Entity::find_by_id(name.to_string())
            .one(&self.db)
            .await?;
        Ok(counter.map(|c| c.seq))
    }

    /// Creates `name` with `value` unless it already exists.
    ///
    /// An existing counter is left untouched and its current value is
    /// reported, so repeated calls are harmless.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is empty, the value does not fit, or
    /// the statement fails.
    pub async fn seed_value(&self, name: &str, value: u64) -> Result<SeedOutcome, CounterError> {
        check_name(name)?;
        let seq = i64::try_from(value).map_err(|_| CounterError::SeedOutOfRange {
            name: name.to_string(),
            value,
        })?;

        let inserted = self
            .db
            .query_one(Statement::from_sql_and_values(
                DbBackend::Postgres,
                SEED_SQL,
                [name.into(), seq.into()],
            ))
            .await?;

        if let Some(row) = inserted {
            let seq: i64 = row.try_get("", "seq")?;
            info!(counter = name, seq, "counter seeded");
            return Ok(SeedOutcome::Seeded(seq));
        }

        let existing = self
            .current(name)
            .await?
            .ok_or_else(|| CounterError::NoValue(name.to_string()))?;
        info!(counter = name, seq = existing, "counter already initialized");
        Ok(SeedOutcome::AlreadyInitialized(existing))
    }

    /// Seeds `name` from existing document codes.
    ///
    /// The seed is the largest numeric suffix among `codes` carrying
    /// `prefix` (0 when none do).
    ///
    /// # Errors
    ///
    /// Returns an error if seeding fails.
    pub async fn seed<'a, I>(
        &self,
        name: &str,
        prefix: &str,
        codes: I,
    ) -> Result<SeedOutcome, CounterError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let value = seed_value(prefix, codes);
        self.seed_value(name, value).await
    }
}

fn check_name(name: &str) -> Result<(), CounterError> {
    if name.trim().is_empty() {
        return Err(CounterError::EmptyName);
    }
    Ok(())
}
