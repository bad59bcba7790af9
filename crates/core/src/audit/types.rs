//! Audit domain types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use varejo_shared::types::UserId;

/// Kind of mutation recorded by an audit entry.
///
/// Settlement has a single canonical name, `pagar`, for both payables and
/// receivables. The retired `liquidar` name is not accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuditAction {
    /// Document created.
    #[serde(rename = "criar")]
    Create,
    /// Descriptive fields edited.
    #[serde(rename = "editar")]
    Edit,
    /// Installment settled.
    #[serde(rename = "pagar")]
    Settle,
    /// Document cancelled.
    #[serde(rename = "cancelar")]
    Cancel,
}

impl AuditAction {
    /// Returns the string representation of the action.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "criar",
            Self::Edit => "editar",
            Self::Settle => "pagar",
            Self::Cancel => "cancelar",
        }
    }

    /// Parses an action from its canonical name.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "criar" => Some(Self::Create),
            "editar" => Some(Self::Edit),
            "pagar" => Some(Self::Settle),
            "cancelar" => Some(Self::Cancel),
            _ => None,
        }
    }
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One changed field: name, value before, value after.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldChange {
    /// Field path, e.g. `descricao` or `parcelas[2].status`.
    #[serde(rename = "campo")]
    pub field: String,
    /// Value before the change (`null` when the field was unset).
    #[serde(rename = "anterior")]
    pub old: Value,
    /// Value after the change.
    #[serde(rename = "novo")]
    pub new: Value,
}

impl FieldChange {
    /// Builds a change from a pair of audit values.
    pub fn new<O: AuditValue, N: AuditValue>(field: impl Into<String>, old: O, new: N) -> Self {
        Self {
            field: field.into(),
            old: old.into_value(),
            new: new.into_value(),
        }
    }
}

/// Values that can be recorded in a field change.
///
/// Conversions are infallible; amounts are stored as decimal strings, the
/// same representation documents use for them.
pub trait AuditValue {
    /// Converts into the JSON value stored in the history.
    fn into_value(self) -> Value;
}

impl AuditValue for Value {
    fn into_value(self) -> Value {
        self
    }
}

impl AuditValue for bool {
    fn into_value(self) -> Value {
        Value::Bool(self)
    }
}

impl AuditValue for usize {
    fn into_value(self) -> Value {
        Value::from(self)
    }
}

impl AuditValue for &str {
    fn into_value(self) -> Value {
        Value::String(self.to_string())
    }
}

impl AuditValue for String {
    fn into_value(self) -> Value {
        Value::String(self)
    }
}

impl AuditValue for Decimal {
    fn into_value(self) -> Value {
        Value::String(self.to_string())
    }
}

impl<T: AuditValue> AuditValue for Option<T> {
    fn into_value(self) -> Value {
        self.map_or(Value::Null, AuditValue::into_value)
    }
}

/// Immutable record of a mutation applied to a document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    /// When the mutation happened.
    pub timestamp: DateTime<Utc>,
    /// Who performed it.
    pub user_id: UserId,
    /// Fields changed by the mutation, in the order they were changed.
    pub field_changes: Vec<FieldChange>,
    /// What kind of mutation it was.
    pub action_type: AuditAction,
}
