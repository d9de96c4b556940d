//! Business logic helpers for category management.
//!
//! Categories are not stored on their own: a name exists in a namespace as long
//! as one transaction of that namespace carries it.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::core::services::budget_service::{BudgetService, CategoryBudgetStatus};
use crate::errors::{Result, WalletError};
use crate::ledger::{Clock, Namespace, SystemClock, TransactionKind, TransactionLedger};
use crate::money::Money;

/// Result of probing both namespaces for a category name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryPresence {
    Absent,
    IncomeOnly,
    OutcomeOnly,
    Both,
}

impl CategoryPresence {
    pub fn contains(self, namespace: Namespace) -> bool {
        matches!(
            (self, namespace),
            (CategoryPresence::Both, _)
                | (CategoryPresence::IncomeOnly, Namespace::Income)
                | (CategoryPresence::OutcomeOnly, Namespace::Outcome)
        )
    }
}

/// One row of a category listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum CategoryRow {
    Income { category: String, total: Money },
    Outcome(CategoryBudgetStatus),
}

/// Provides validated category operations on top of [`TransactionLedger`].
pub struct CategoryService;

impl CategoryService {
    pub fn has_category(ledger: &TransactionLedger, name: &str, namespace: Namespace) -> bool {
        ledger.has_category(name, namespace)
    }

    pub fn presence(ledger: &TransactionLedger, name: &str) -> CategoryPresence {
        match (
            ledger.has_category(name, Namespace::Income),
            ledger.has_category(name, Namespace::Outcome),
        ) {
            (false, false) => CategoryPresence::Absent,
            (true, false) => CategoryPresence::IncomeOnly,
            (false, true) => CategoryPresence::OutcomeOnly,
            (true, true) => CategoryPresence::Both,
        }
    }

    /// Picks the namespace an existing category lives in.
    ///
    /// An explicit namespace must contain the name. Without one, a name present in
    /// both namespaces is ambiguous and the caller has to ask.
    pub fn resolve_namespace(
        ledger: &TransactionLedger,
        name: &str,
        explicit: Option<Namespace>,
    ) -> Result<Namespace> {
        let presence = Self::presence(ledger, name);
        match (explicit, presence) {
            (_, CategoryPresence::Absent) => Err(WalletError::CategoryNotFound(name.to_string())),
            (Some(namespace), presence) if presence.contains(namespace) => Ok(namespace),
            (Some(_), _) => Err(WalletError::CategoryNotFound(name.to_string())),
            (None, CategoryPresence::IncomeOnly) => Ok(Namespace::Income),
            (None, CategoryPresence::OutcomeOnly) => Ok(Namespace::Outcome),
            (None, CategoryPresence::Both) => Err(WalletError::AmbiguousCategory(name.to_string())),
        }
    }

    /// Creates an empty category by recording a zero-amount transaction.
    pub fn add(ledger: &mut TransactionLedger, name: &str, namespace: Namespace) -> Result<u32> {
        Self::add_at(ledger, name, namespace, SystemClock.now())
    }

    pub fn add_at(
        ledger: &mut TransactionLedger,
        name: &str,
        namespace: Namespace,
        timestamp: DateTime<Utc>,
    ) -> Result<u32> {
        Self::ensure_free(ledger, name, namespace)?;
        let kind = match namespace {
            Namespace::Income => TransactionKind::Income,
            Namespace::Outcome => TransactionKind::OutcomeSpent,
        };
        ledger.add_at(name, Money::ZERO, kind, timestamp)
    }

    /// Renames `old_name` within `namespace`, refusing names already taken there.
    ///
    /// With `namespace == None` the rename spans both namespaces and the new name
    /// must be free in each of them.
    pub fn edit(
        ledger: &mut TransactionLedger,
        old_name: &str,
        namespace: Option<Namespace>,
        new_name: &str,
    ) -> Result<usize> {
        if new_name.trim().is_empty() {
            return Err(WalletError::InvalidInput(
                "category name must not be empty".into(),
            ));
        }
        match namespace {
            Some(namespace) => Self::ensure_free(ledger, new_name, namespace)?,
            None => {
                Self::ensure_free(ledger, new_name, Namespace::Income)?;
                Self::ensure_free(ledger, new_name, Namespace::Outcome)?;
            }
        }
        Ok(ledger.rename_category(old_name, new_name, namespace))
    }

    /// Drops every transaction of the category; outcome spans planned and spent.
    pub fn remove(ledger: &mut TransactionLedger, name: &str, namespace: Namespace) -> usize {
        ledger.remove_by_filter(|txn| txn.is_in(name, namespace))
    }

    /// Per-category rows, income first, each namespace in ledger order.
    pub fn list(
        ledger: &TransactionLedger,
        namespace: Option<Namespace>,
        warning_percent: u8,
    ) -> Vec<CategoryRow> {
        let mut rows = Vec::new();
        if namespace.map_or(true, |ns| ns == Namespace::Income) {
            let totals = BudgetService::income_by_category(ledger);
            rows.extend(ledger.income_categories().into_iter().map(|category| {
                let total = totals.get(&category).copied().unwrap_or_default();
                CategoryRow::Income { category, total }
            }));
        }
        if namespace.map_or(true, |ns| ns == Namespace::Outcome) {
            rows.extend(ledger.outcome_categories().into_iter().map(|category| {
                CategoryRow::Outcome(BudgetService::category_status(
                    ledger,
                    &category,
                    warning_percent,
                ))
            }));
        }
        rows
    }

    fn ensure_free(ledger: &TransactionLedger, name: &str, namespace: Namespace) -> Result<()> {
        if ledger.has_category(name, namespace) {
            Err(WalletError::CategoryAlreadyExists {
                name: name.to_string(),
                namespace,
            })
        } else {
            Ok(())
        }
    }
}
