//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the application.

pub mod counter;
pub mod counterparty;
pub mod document;

pub use counter::{CounterError, CounterRepository};
pub use counterparty::{BalanceDelta, CounterpartyRepository, NewCounterparty};
pub use document::DocumentRepository;
