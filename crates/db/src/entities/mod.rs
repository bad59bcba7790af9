//! `SeaORM` entity definitions.

pub mod counterparties;
pub mod counters;
pub mod financial_documents;
