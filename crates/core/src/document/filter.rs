//! Listing criteria for documents.

use chrono::NaiveDate;
use varejo_shared::types::CounterpartyId;

use super::types::{Document, DocumentKind, DocumentStatus};

/// Criteria for listing documents. Empty criteria match every
/// non-cancelled document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentFilter {
    /// Restrict to one kind.
    pub kind: Option<DocumentKind>,
    /// Restrict to one status.
    pub status: Option<DocumentStatus>,
    /// Restrict to one supplier or client.
    pub counterparty_id: Option<CounterpartyId>,
    /// Next open due date on or after this day.
    pub due_from: Option<NaiveDate>,
    /// Next open due date on or before this day.
    pub due_until: Option<NaiveDate>,
    /// Include cancelled documents. Implied by `status == Cancelled`.
    pub include_cancelled: bool,
}

impl DocumentFilter {
    /// Filter for one kind.
    #[must_use]
    pub fn kind(kind: DocumentKind) -> Self {
        Self {
            kind: Some(kind),
            ..Self::default()
        }
    }

    /// Returns true if cancelled documents can match.
    #[must_use]
    pub fn admits_cancelled(&self) -> bool {
        self.include_cancelled || self.status == Some(DocumentStatus::Cancelled)
    }

    /// Evaluates the filter against a loaded document.
    ///
    /// A due-date bound excludes documents with nothing left to settle.
    #[must_use]
    pub fn matches(&self, document: &Document) -> bool {
        if self.kind.is_some_and(|k| k != document.kind) {
            return false;
        }
        if self.status.is_some_and(|s| s != document.status) {
            return false;
        }
        if self.counterparty_id.is_some() && self.counterparty_id != document.counterparty_id {
            return false;
        }
        if document.is_cancelled() && !self.admits_cancelled() {
            return false;
        }
        if self.due_from.is_some() || self.due_until.is_some() {
            let Some(due) = document.next_due_date() else {
                return false;
            };
            if self.due_from.is_some_and(|from| due < from)
                || self.due_until.is_some_and(|until| due > until)
            {
                return false;
            }
        }
        true
    }
}
