//! Append-only change history for documents.
//!
//! # Modules
//!
//! - `types` - Audit entry, action and field change types
//! - `trail` - Appending entries to a history

pub mod trail;
pub mod types;

pub use trail::AuditTrail;
pub use types::{AuditAction, AuditEntry, AuditValue, FieldChange};
