//! Document repository for payables and receivables.
//!
//! State transitions are computed by `LedgerService`; this repository
//! makes them durable. Each mutation locks the document row, applies the
//! transition and writes it back inside a transaction that also updates
//! the counterparty statistics, so concurrent writers to one document run
//! one after another. The write is still a compare-and-swap on `version`;
//! should it ever miss, the whole attempt is retried up to `max_retries`
//! times.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionTrait,
};
use tracing::{debug, info, warn};
use varejo_core::audit::AuditEntry;
use varejo_core::document::{
    Cancellation, Document, DocumentEdit, DocumentFilter, DocumentKind, DocumentStatus,
    Installment, LedgerError, LedgerService, LedgerSummary, NewDocument, SettlementInput,
    derive_status, validate_installments,
};
use varejo_core::numbering::{NumberingScheme, SeedOutcome};
use varejo_shared::config::{LedgerConfig, NumberingConfig};
use varejo_shared::types::{CounterpartyId, DocumentId, PageRequest, PageResponse, UserId};

use super::counter::CounterRepository;
use super::counterparty::{BalanceDelta, CounterpartyRepository};
use crate::entities::financial_documents;

/// Outcome of applying a transition to a loaded document.
enum Write {
    /// Nothing changed; skip the write.
    Skip,
    /// Persist the document and apply the counterparty delta.
    Persist(BalanceDelta),
}

/// Repository for payable and receivable documents.
#[derive(Debug, Clone)]
pub struct DocumentRepository {
    db: DatabaseConnection,
    counters: CounterRepository,
    numbering: NumberingConfig,
    max_retries: u32,
}

impl DocumentRepository {
    /// Creates a repository with default numbering and retry settings.
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self::with_config(db, NumberingConfig::default(), &LedgerConfig::default())
    }

    /// Creates a repository honouring configured prefixes, width and retries.
    #[must_use]
    pub fn with_config(
        db: DatabaseConnection,
        numbering: NumberingConfig,
        ledger: &LedgerConfig,
    ) -> Self {
        Self {
            counters: CounterRepository::new(db.clone()),
            db,
            numbering,
            max_retries: ledger.max_retries.max(1),
        }
    }

    /// Numbering scheme used for documents of `kind`.
    #[must_use]
    pub fn scheme(&self, kind: DocumentKind) -> NumberingScheme {
        NumberingScheme::from_config(kind.sequence(), &self.numbering)
    }

    // ========================================================================
    // Creation
    // ========================================================================

    /// Creates a document in `pendente`.
    ///
    /// Input and counterparty are validated before a number is issued. The
    /// number comes from its own atomic statement, so a failure after that
    /// point leaves a gap in the sequence but never a duplicate.
    ///
    /// # Errors
    ///
    /// - `Validation` for bad input or a counterparty of the wrong kind
    /// - `CounterpartyNotFound` for a missing or deleted counterparty
    /// - `Numbering` if the counter cannot be incremented
    /// - `Database` if persisting fails
    pub async fn create(&self, input: NewDocument) -> Result<Document, LedgerError> {
        let installments = LedgerService::prepare(&input)?;
        let expected_kind = input.kind.counterparty_kind();
        if let Some(counterparty) = input.counterparty_id {
            CounterpartyRepository::check_active(&self.db, counterparty, expected_kind).await?;
        }

        let numero = self
            .counters
            .issue(&self.scheme(input.kind))
            .await
            .map_err(|e| LedgerError::Numbering(e.to_string()))?;

        let document = LedgerService::open(input, installments, numero, Utc::now());
        let model = to_active_model(&document)?;

        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| LedgerError::Database(e.to_string()))?;

        if let Some(counterparty) = document.counterparty_id {
            CounterpartyRepository::require_active(&txn, counterparty, expected_kind).await?;
        }

        financial_documents::Entity::insert(model)
            .exec(&txn)
            .await
            .map_err(|e| LedgerError::Database(e.to_string()))?;

        if let Some(counterparty) = document.counterparty_id {
            let delta = BalanceDelta {
                open_balance: document.total_amount,
                ..BalanceDelta::default()
            };
            CounterpartyRepository::apply_delta(&txn, counterparty, delta).await?;
        }

        txn.commit()
            .await
            .map_err(|e| LedgerError::Database(e.to_string()))?;

        info!(
            document = %document.id,
            numero = %document.numero,
            kind = %document.kind,
            total = %document.total_amount,
            installments = document.installments.len(),
            "document created"
        );
        Ok(document)
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Loads a document.
    ///
    /// # Errors
    ///
    /// Returns `DocumentNotFound` if it does not exist, `CorruptDocument`
    /// if the stored row does not decode.
    pub async fn get(&self, id: DocumentId) -> Result<Document, LedgerError> {
        let model = financial_documents::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await
            .map_err(|e| LedgerError::Database(e.to_string()))?
            .ok_or(LedgerError::DocumentNotFound(id))?;

        to_domain(model)
    }

    /// Loads a document by its code, e.g. `CP-000124`.
    ///
    /// # Errors
    ///
    /// Returns `DocumentNumberNotFound` if no document carries the code.
    pub async fn find_by_numero(&self, numero: &str) -> Result<Document, LedgerError> {
        let model = financial_documents::Entity::find()
            .filter(financial_documents::Column::Numero.eq(numero))
            .one(&self.db)
            .await
            .map_err(|e| LedgerError::Database(e.to_string()))?
            .ok_or_else(|| LedgerError::DocumentNumberNotFound(numero.to_string()))?;

        to_domain(model)
    }

    /// All documents referencing a counterparty, cancelled ones included,
    /// oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or a row does not decode.
    pub async fn for_counterparty(&self, id: CounterpartyId) -> Result<Vec<Document>, LedgerError> {
        financial_documents::Entity::find()
            .filter(financial_documents::Column::CounterpartyId.eq(id.into_inner()))
            .order_by_asc(financial_documents::Column::CreatedAt)
            .order_by_asc(financial_documents::Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| LedgerError::Database(e.to_string()))?
            .into_iter()
            .map(to_domain)
            .collect()
    }

    /// Lists documents matching `filter`, newest first.
    ///
    /// Due-date bounds apply to the next open due date.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or a row does not decode.
    pub async fn list(
        &self,
        filter: &DocumentFilter,
        page: PageRequest,
    ) -> Result<PageResponse<Document>, LedgerError> {
        let mut query = financial_documents::Entity::find();

        if let Some(kind) = filter.kind {
            query = query.filter(financial_documents::Column::Kind.eq(kind.as_str()));
        }
        if let Some(status) = filter.status {
            let labels = [
                status.label(DocumentKind::Payable),
                status.label(DocumentKind::Receivable),
            ];
            query = query.filter(financial_documents::Column::Status.is_in(labels));
        }
        if let Some(counterparty) = filter.counterparty_id {
            query = query
                .filter(financial_documents::Column::CounterpartyId.eq(counterparty.into_inner()));
        }
        if !filter.admits_cancelled() {
            query = query.filter(financial_documents::Column::Cancelled.eq(false));
        }
        if let Some(from) = filter.due_from {
            query = query.filter(financial_documents::Column::NextDueDate.gte(from));
        }
        if let Some(until) = filter.due_until {
            query = query.filter(financial_documents::Column::NextDueDate.lte(until));
        }

        let total = query
            .clone()
            .count(&self.db)
            .await
            .map_err(|e| LedgerError::Database(e.to_string()))?;

        let documents = query
            .order_by_desc(financial_documents::Column::CreatedAt)
            .order_by_desc(financial_documents::Column::Id)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await
            .map_err(|e| LedgerError::Database(e.to_string()))?
            .into_iter()
            .map(to_domain)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(PageResponse::new(documents, page, total))
    }

    /// Dashboard figures for one kind on `today`.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or a row does not decode.
    pub async fn summary(
        &self,
        kind: DocumentKind,
        today: NaiveDate,
    ) -> Result<LedgerSummary, LedgerError> {
        let documents = financial_documents::Entity::find()
            .filter(financial_documents::Column::Kind.eq(kind.as_str()))
            .all(&self.db)
            .await
            .map_err(|e| LedgerError::Database(e.to_string()))?
            .into_iter()
            .map(to_domain)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(LedgerSummary::summarize(kind, &documents, today))
    }

    /// Codes of all documents starting with `prefix`.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn numbers_with_prefix(&self, prefix: &str) -> Result<Vec<String>, LedgerError> {
        financial_documents::Entity::find()
            .select_only()
            .column(financial_documents::Column::Numero)
            .filter(financial_documents::Column::Numero.starts_with(prefix))
            .into_tuple::<String>()
            .all(&self.db)
            .await
            .map_err(|e| LedgerError::Database(e.to_string()))
    }

    /// Seeds the counter of `kind` from the codes already stored.
    ///
    /// Idempotent: an initialized counter is reported, never lowered.
    ///
    /// # Errors
    ///
    /// Returns an error if reading codes or seeding fails.
    pub async fn seed_counter(&self, kind: DocumentKind) -> Result<SeedOutcome, LedgerError> {
        let scheme = self.scheme(kind);
        let codes = self.numbers_with_prefix(&scheme.prefix).await?;

        self.counters
            .seed(
                scheme.kind.counter_name(),
                &scheme.prefix,
                codes.iter().map(String::as_str),
            )
            .await
            .map_err(|e| LedgerError::Numbering(e.to_string()))
    }

    // ========================================================================
    // Transitions
    // ========================================================================

    /// Edits descriptive fields. A no-change edit writes nothing.
    ///
    /// # Errors
    ///
    /// - `DocumentNotFound`
    /// - `DocumentCancelled`
    /// - `Validation` for a blank description
    /// - `ConcurrencyConflict` when retries are exhausted
    pub async fn edit(
        &self,
        id: DocumentId,
        edit: DocumentEdit,
        actor: UserId,
    ) -> Result<Document, LedgerError> {
        let document = self
            .mutate(id, |document, now| {
                let changed = LedgerService::edit(document, edit.clone(), actor, now)?;
                Ok(if changed {
                    Write::Persist(BalanceDelta::default())
                } else {
                    Write::Skip
                })
            })
            .await?;

        debug!(document = %id, version = document.version, "document edit applied");
        Ok(document)
    }

    /// Settles one installment.
    ///
    /// The installment, document totals, status, audit entry and
    /// counterparty statistics are committed together.
    ///
    /// # Errors
    ///
    /// - `DocumentNotFound`
    /// - `DocumentCancelled`
    /// - `InstallmentNotFound`
    /// - `AlreadyPaid`, including when a concurrent caller settled it first
    /// - `Validation` for a fine on a receivable
    /// - `ConcurrencyConflict` when retries are exhausted
    pub async fn liquidate(
        &self,
        id: DocumentId,
        number: u32,
        input: SettlementInput,
        actor: UserId,
    ) -> Result<Document, LedgerError> {
        let document = self
            .mutate(id, |document, now| {
                let outcome = LedgerService::liquidate(document, number, &input, actor, now)?;
                Ok(Write::Persist(BalanceDelta {
                    open_balance: -outcome.base_amount,
                    total_settled: outcome.final_amount,
                    settled_on: Some(outcome.paid_at),
                }))
            })
            .await?;

        info!(
            document = %id,
            numero = %document.numero,
            installment = number,
            settled = %document.settled_amount,
            status = document.status_label(),
            "installment settled"
        );
        Ok(document)
    }

    /// Cancels a document and reverts its counterparty effects.
    ///
    /// # Errors
    ///
    /// - `DocumentNotFound`
    /// - `DocumentCancelled` if already cancelled
    /// - `InvalidTransition` if fully settled
    /// - `Validation` for a blank reason
    /// - `ConcurrencyConflict` when retries are exhausted
    pub async fn cancel(
        &self,
        id: DocumentId,
        reason: &str,
        actor: UserId,
    ) -> Result<Document, LedgerError> {
        let document = self
            .mutate(id, |document, now| {
                let outcome = LedgerService::cancel(document, reason, actor, now)?;
                Ok(Write::Persist(BalanceDelta {
                    open_balance: -outcome.outstanding_amount,
                    total_settled: -outcome.settled_amount,
                    settled_on: None,
                }))
            })
            .await?;

        info!(
            document = %id,
            numero = %document.numero,
            reason,
            "document cancelled"
        );
        Ok(document)
    }

    /// Lock, apply, compare-and-swap; retried if the swap misses.
    ///
    /// Errors from `apply` are returned as-is without retrying. An early
    /// return drops the transaction, which rolls it back.
    async fn mutate<F>(&self, id: DocumentId, mut apply: F) -> Result<Document, LedgerError>
    where
        F: FnMut(&mut Document, DateTime<Utc>) -> Result<Write, LedgerError>,
    {
        for attempt in 1..=self.max_retries {
            let txn = self
                .db
                .begin()
                .await
                .map_err(|e| LedgerError::Database(e.to_string()))?;

            let model = financial_documents::Entity::find_by_id(id.into_inner())
                .lock_exclusive()
                .one(&txn)
                .await
                .map_err(|e| LedgerError::Database(e.to_string()))?
                .ok_or(LedgerError::DocumentNotFound(id))?;
            let mut document = to_domain(model)?;
            let expected = document.version;

            let delta = match apply(&mut document, Utc::now())? {
                Write::Skip => return Ok(document),
                Write::Persist(delta) => delta,
            };
            document.version = expected + 1;

            let result = financial_documents::Entity::update_many()
                .set(to_active_model(&document)?)
                .filter(financial_documents::Column::Id.eq(id.into_inner()))
                .filter(financial_documents::Column::Version.eq(expected))
                .exec(&txn)
                .await
                .map_err(|e| LedgerError::Database(e.to_string()))?;

            if result.rows_affected == 0 {
                txn.rollback()
                    .await
                    .map_err(|e| LedgerError::Database(e.to_string()))?;
                warn!(document = %id, attempt, version = expected, "document changed concurrently, retrying");
                continue;
            }

            if let Some(counterparty) = document.counterparty_id {
                CounterpartyRepository::apply_delta(&txn, counterparty, delta).await?;
            }

            txn.commit()
                .await
                .map_err(|e| LedgerError::Database(e.to_string()))?;
            return Ok(document);
        }

        warn!(document = %id, attempts = self.max_retries, "giving up after concurrent modifications");
        Err(LedgerError::ConcurrencyConflict {
            document: id,
            attempts: self.max_retries,
        })
    }
}

// ============================================================================
// Row mapping
// ============================================================================

fn to_active_model(document: &Document) -> Result<financial_documents::ActiveModel, LedgerError> {
    let corrupt = |e: serde_json::Error| LedgerError::CorruptDocument {
        id: document.id,
        reason: e.to_string(),
    };
    let installments = serde_json::to_value(&document.installments).map_err(corrupt)?;
    let history = serde_json::to_value(&document.history).map_err(corrupt)?;
    let cancellation = document.cancellation.as_ref();
    let next_due_date = if document.is_cancelled() {
        None
    } else {
        document.next_due_date()
    };

    Ok(financial_documents::ActiveModel {
        id: Set(document.id.into_inner()),
        kind: Set(document.kind.as_str().to_string()),
        numero: Set(document.numero.clone()),
        counterparty_id: Set(document.counterparty_id.map(CounterpartyId::into_inner)),
        description: Set(document.description.clone()),
        category: Set(document.category.clone()),
        notes: Set(document.notes.clone()),
        fiscal_reference: Set(document.fiscal_reference.clone()),
        issue_date: Set(document.issue_date),
        total_amount: Set(document.total_amount),
        settled_amount: Set(document.settled_amount),
        total_interest: Set(document.total_interest),
        total_fine: Set(document.total_fine),
        total_discount: Set(document.total_discount),
        status: Set(document.status_label().to_string()),
        next_due_date: Set(next_due_date),
        installments: Set(installments),
        history: Set(history),
        cancelled: Set(document.is_cancelled()),
        cancellation_reason: Set(cancellation.map(|c| c.reason.clone())),
        cancelled_by: Set(cancellation.map(|c| c.cancelled_by.into_inner())),
        cancelled_at: Set(cancellation.map(|c| c.cancelled_at.into())),
        created_by: Set(document.created_by.into_inner()),
        created_at: Set(document.created_at.into()),
        updated_by: Set(document.updated_by.map(UserId::into_inner)),
        updated_at: Set(document.updated_at.into()),
        version: Set(document.version),
    })
}

/// Decodes a row, rejecting anything the domain types cannot represent.
fn to_domain(model: financial_documents::Model) -> Result<Document, LedgerError> {
    let id = DocumentId::from_uuid(model.id);
    let corrupt = |reason: String| LedgerError::CorruptDocument { id, reason };

    let kind = DocumentKind::parse(&model.kind)
        .ok_or_else(|| corrupt(format!("unknown kind {:?}", model.kind)))?;
    let status = DocumentStatus::parse(&model.status)
        .ok_or_else(|| corrupt(format!("unknown status {:?}", model.status)))?;
    if status.label(kind) != model.status {
        return Err(corrupt(format!(
            "status {:?} does not belong to kind {kind}",
            model.status
        )));
    }

    let installments: Vec<Installment> = serde_json::from_value(model.installments)
        .map_err(|e| corrupt(format!("installments: {e}")))?;
    validate_installments(&installments).map_err(|e| corrupt(e.to_string()))?;
    let history: Vec<AuditEntry> =
        serde_json::from_value(model.history).map_err(|e| corrupt(format!("history: {e}")))?;

    let cancellation = if model.cancelled {
        Some(Cancellation {
            reason: model.cancellation_reason.unwrap_or_default(),
            cancelled_by: model
                .cancelled_by
                .map(UserId::from_uuid)
                .ok_or_else(|| corrupt("cancelled without actor".to_string()))?,
            cancelled_at: model
                .cancelled_at
                .map(|at| at.with_timezone(&Utc))
                .ok_or_else(|| corrupt("cancelled without timestamp".to_string()))?,
        })
    } else {
        None
    };

    let cancelled_status = status == DocumentStatus::Cancelled;
    if model.cancelled != cancelled_status {
        return Err(corrupt("cancellation flag and status disagree".to_string()));
    }
    if !cancelled_status && status != derive_status(&installments) {
        return Err(corrupt(format!(
            "status {:?} does not match installments",
            model.status
        )));
    }

    let settled_amount: Decimal = installments
        .iter()
        .filter(|i| i.is_settled())
        .filter_map(|i| i.final_amount)
        .sum();
    if settled_amount != model.settled_amount {
        return Err(corrupt(format!(
            "settled amount {} does not match installments ({settled_amount})",
            model.settled_amount
        )));
    }

    Ok(Document {
        id,
        kind,
        numero: model.numero,
        counterparty_id: model.counterparty_id.map(CounterpartyId::from_uuid),
        description: model.description,
        category: model.category,
        notes: model.notes,
        fiscal_reference: model.fiscal_reference,
        issue_date: model.issue_date,
        total_amount: model.total_amount,
        settled_amount: model.settled_amount,
        total_interest: model.total_interest,
        total_fine: model.total_fine,
        total_discount: model.total_discount,
        status,
        installments,
        cancellation,
        history,
        created_by: UserId::from_uuid(model.created_by),
        created_at: model.created_at.with_timezone(&Utc),
        updated_by: model.updated_by.map(UserId::from_uuid),
        updated_at: model.updated_at.with_timezone(&Utc),
        version: model.version,
    })
}
