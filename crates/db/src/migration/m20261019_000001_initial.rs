//! Initial database migration.
//!
//! Creates the counter, counterparty and financial document tables.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        // ============================================================
        // PART 1: DOCUMENT NUMBERING
        // ============================================================
        db.execute_unprepared(COUNTERS_SQL).await?;

        // ============================================================
        // PART 2: SUPPLIERS AND CLIENTS
        // ============================================================
        db.execute_unprepared(COUNTERPARTIES_SQL).await?;

        // ============================================================
        // PART 3: PAYABLES AND RECEIVABLES
        // ============================================================
        db.execute_unprepared(FINANCIAL_DOCUMENTS_SQL).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(DROP_ALL_SQL).await?;
        Ok(())
    }
}

// ============================================================
// SQL CONSTANTS
// ============================================================

const COUNTERS_SQL: &str = r"
-- One row per named sequence. Rows are never deleted and seq never decreases.
CREATE TABLE counters (
    name VARCHAR(64) PRIMARY KEY,
    seq BIGINT NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_counter_seq_non_negative CHECK (seq >= 0)
);
";

const COUNTERPARTIES_SQL: &str = r"
CREATE TABLE counterparties (
    id UUID PRIMARY KEY,
    kind VARCHAR(16) NOT NULL,
    name VARCHAR(255) NOT NULL,
    tax_id VARCHAR(32),
    total_settled NUMERIC(19, 4) NOT NULL DEFAULT 0,
    open_balance NUMERIC(19, 4) NOT NULL DEFAULT 0,
    last_settlement_at DATE,
    deleted_at TIMESTAMPTZ,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_counterparty_kind CHECK (kind IN ('fornecedor', 'cliente'))
);

CREATE INDEX idx_counterparties_kind ON counterparties(kind) WHERE deleted_at IS NULL;
";

const FINANCIAL_DOCUMENTS_SQL: &str = r"
-- Payables (kind = 'pagar') and receivables (kind = 'receber').
-- Installments and change history are embedded JSONB arrays.
CREATE TABLE financial_documents (
    id UUID PRIMARY KEY,
    kind VARCHAR(16) NOT NULL,
    numero VARCHAR(32) NOT NULL,
    counterparty_id UUID REFERENCES counterparties(id),
    description TEXT NOT NULL,
    category VARCHAR(100),
    notes TEXT,
    fiscal_reference VARCHAR(100),
    issue_date DATE NOT NULL,
    total_amount NUMERIC(19, 4) NOT NULL,
    settled_amount NUMERIC(19, 4) NOT NULL DEFAULT 0,
    total_interest NUMERIC(19, 4) NOT NULL DEFAULT 0,
    total_fine NUMERIC(19, 4) NOT NULL DEFAULT 0,
    total_discount NUMERIC(19, 4) NOT NULL DEFAULT 0,
    status VARCHAR(20) NOT NULL,
    next_due_date DATE,
    installments JSONB NOT NULL DEFAULT '[]',
    history JSONB NOT NULL DEFAULT '[]',
    cancelled BOOLEAN NOT NULL DEFAULT false,
    cancellation_reason TEXT,
    cancelled_by UUID,
    cancelled_at TIMESTAMPTZ,
    created_by UUID NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_by UUID,
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    version BIGINT NOT NULL DEFAULT 0,
    CONSTRAINT uq_financial_documents_numero UNIQUE (numero),
    CONSTRAINT chk_document_kind CHECK (kind IN ('pagar', 'receber')),
    CONSTRAINT chk_document_status CHECK (status IN (
        'pendente', 'pago_parcial', 'pago_total',
        'recebido_parcial', 'recebido_total', 'cancelado'
    )),
    CONSTRAINT chk_document_total_positive CHECK (total_amount > 0),
    CONSTRAINT chk_cancellation_fields CHECK (
        (cancelled AND status = 'cancelado' AND cancellation_reason IS NOT NULL)
        OR (NOT cancelled AND status <> 'cancelado')
    )
);

-- Listing by kind and status
CREATE INDEX idx_financial_documents_kind_status ON financial_documents(kind, status);

-- Documents of a supplier or client
CREATE INDEX idx_financial_documents_counterparty ON financial_documents(counterparty_id)
    WHERE counterparty_id IS NOT NULL;

-- Due-date filters over open documents
CREATE INDEX idx_financial_documents_next_due ON financial_documents(kind, next_due_date)
    WHERE NOT cancelled;

-- Prefix scans when seeding counters
CREATE INDEX idx_financial_documents_numero_prefix
    ON financial_documents(numero text_pattern_ops);
";

const DROP_ALL_SQL: &str = r"
DROP TABLE IF EXISTS financial_documents CASCADE;
DROP TABLE IF EXISTS counterparties CASCADE;
DROP TABLE IF EXISTS counters CASCADE;
";
