//! Known document sequences.

use std::fmt;

/// A named sequence backed by one persistent counter row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SequenceKind {
    /// Accounts payable documents.
    Payable,
    /// Accounts receivable documents.
    Receivable,
    /// Sales.
    Sale,
    /// Issued invoices.
    Invoice,
    /// Budgets / quotes.
    Quote,
}

impl SequenceKind {
    /// Every known sequence.
    pub const ALL: [Self; 5] = [
        Self::Payable,
        Self::Receivable,
        Self::Sale,
        Self::Invoice,
        Self::Quote,
    ];

    /// Name of the counter row in storage.
    #[must_use]
    pub const fn counter_name(self) -> &'static str {
        match self {
            Self::Payable => "contas_pagar",
            Self::Receivable => "contas_receber",
            Self::Sale => "vendas",
            Self::Invoice => "notas_fiscais",
            Self::Quote => "orcamentos",
        }
    }

    /// Prefix used when no override is configured.
    #[must_use]
    pub const fn default_prefix(self) -> &'static str {
        match self {
            Self::Payable => "CP-",
            Self::Receivable => "CR-",
            Self::Sale => "VD-",
            Self::Invoice => "NF-",
            Self::Quote => "ORC-",
        }
    }

    /// Looks a sequence up by its counter name.
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.counter_name() == name.trim())
    }
}

impl fmt::Display for SequenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.counter_name())
    }
}
