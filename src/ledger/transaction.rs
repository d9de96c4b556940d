use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::money::Money;

/// A single wallet entry. The `id` is positional and owned by the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    #[serde(default)]
    pub id: u32,
    pub category: String,
    pub amount: Money,
    pub kind: TransactionKind,
    pub timestamp: DateTime<Utc>,
}

impl Transaction {
    pub fn new(
        category: impl Into<String>,
        amount: Money,
        kind: TransactionKind,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id: 0,
            category: category.into(),
            amount,
            kind,
            timestamp,
        }
    }

    pub fn namespace(&self) -> Namespace {
        self.kind.namespace()
    }

    /// True if this entry belongs to `category` within `namespace`.
    pub fn is_in(&self, category: &str, namespace: Namespace) -> bool {
        self.category == category && self.namespace() == namespace
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionKind {
    Income,
    OutcomePlanned,
    OutcomeSpent,
}

impl TransactionKind {
    pub fn namespace(self) -> Namespace {
        match self {
            TransactionKind::Income => Namespace::Income,
            TransactionKind::OutcomePlanned | TransactionKind::OutcomeSpent => Namespace::Outcome,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TransactionKind::Income => "Income",
            TransactionKind::OutcomePlanned => "Planned outcome",
            TransactionKind::OutcomeSpent => "Spent outcome",
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Category names are unique per namespace; planned and spent outcomes share one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Namespace {
    Income,
    Outcome,
}

impl Namespace {
    pub fn as_str(self) -> &'static str {
        match self {
            Namespace::Income => "income",
            Namespace::Outcome => "outcome",
        }
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Namespace::Income => f.write_str("Income"),
            Namespace::Outcome => f.write_str("Outcome"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownNamespace(pub String);

impl fmt::Display for UnknownNamespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown category type `{}` (expected income or outcome)", self.0)
    }
}

impl std::error::Error for UnknownNamespace {}

impl FromStr for Namespace {
    type Err = UnknownNamespace;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim();
        if normalized.eq_ignore_ascii_case("income") {
            Ok(Namespace::Income)
        } else if normalized.eq_ignore_ascii_case("outcome") {
            Ok(Namespace::Outcome)
        } else {
            Err(UnknownNamespace(normalized.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcome_kinds_share_a_namespace() {
        assert_eq!(TransactionKind::OutcomePlanned.namespace(), Namespace::Outcome);
        assert_eq!(TransactionKind::OutcomeSpent.namespace(), Namespace::Outcome);
        assert_eq!(TransactionKind::Income.namespace(), Namespace::Income);
    }

    #[test]
    fn namespace_parses_case_insensitively() {
        assert_eq!("Income".parse::<Namespace>().unwrap(), Namespace::Income);
        assert_eq!(" OUTCOME ".parse::<Namespace>().unwrap(), Namespace::Outcome);
        assert!("expense".parse::<Namespace>().is_err());
    }
}
