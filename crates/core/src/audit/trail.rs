//! Appending audit entries.

use chrono::{DateTime, Utc};
use varejo_shared::types::UserId;

use super::types::{AuditAction, AuditEntry, FieldChange};

/// Stateless helper that appends entries to a history.
///
/// Entries are only ever pushed to the end; nothing here rewrites or
/// removes existing entries.
pub struct AuditTrail;

impl AuditTrail {
    /// Appends a new entry to `history` and returns a reference to it.
    pub fn record(
        history: &mut Vec<AuditEntry>,
        actor: UserId,
        action: AuditAction,
        changes: Vec<FieldChange>,
        at: DateTime<Utc>,
    ) -> &AuditEntry {
        history.push(AuditEntry {
            timestamp: at,
            user_id: actor,
            field_changes: changes,
            action_type: action,
        });
        &history[history.len() - 1]
    }
}
