use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{
    clock::{Clock, SystemClock},
    transaction::{Namespace, Transaction, TransactionKind},
};
use crate::errors::{Result, WalletError};
use crate::money::Money;

/// Ordered transactions of one wallet.
///
/// Ids are positional: after every structural change they read `1..=N` in ledger
/// order. Deserialising a ledger renumbers it, so the invariant holds for any data
/// handed over by a persistence collaborator.
///
/// The amounts of all transactions together fit in a [`Money`], so every total
/// and per-category sum the budget engine computes is exact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "LedgerRecord", into = "LedgerRecord")]
pub struct TransactionLedger {
    transactions: Vec<Transaction>,
    next_id: u32,
}

#[derive(Serialize, Deserialize)]
struct LedgerRecord {
    #[serde(default)]
    transactions: Vec<Transaction>,
}

impl TryFrom<LedgerRecord> for TransactionLedger {
    type Error = WalletError;

    fn try_from(record: LedgerRecord) -> Result<Self> {
        let mut ledger = TransactionLedger::new();
        ledger.replace_all(record.transactions)?;
        Ok(ledger)
    }
}

impl From<TransactionLedger> for LedgerRecord {
    fn from(ledger: TransactionLedger) -> Self {
        Self {
            transactions: ledger.transactions,
        }
    }
}

impl Default for TransactionLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl TransactionLedger {
    pub fn new() -> Self {
        Self {
            transactions: Vec::new(),
            next_id: 1,
        }
    }

    /// Appends a transaction stamped with the system clock and returns its id.
    pub fn add(
        &mut self,
        category: impl Into<String>,
        amount: Money,
        kind: TransactionKind,
    ) -> Result<u32> {
        self.add_at(category, amount, kind, SystemClock.now())
    }

    /// Appends a transaction stamped with an explicit timestamp.
    pub fn add_at(
        &mut self,
        category: impl Into<String>,
        amount: Money,
        kind: TransactionKind,
        timestamp: DateTime<Utc>,
    ) -> Result<u32> {
        self.push(Transaction::new(category, amount, kind, timestamp))
    }

    /// Validates and appends a prepared transaction, overwriting its id.
    pub fn push(&mut self, mut transaction: Transaction) -> Result<u32> {
        if transaction.amount.is_negative()
            || volume(&self.transactions, transaction.amount).is_none()
        {
            tracing::debug!(
                category = %transaction.category,
                amount = %transaction.amount,
                "rejected amount"
            );
            return Err(WalletError::InvalidAmount);
        }
        if transaction.category.trim().is_empty() {
            return Err(WalletError::InvalidInput(
                "category name must not be empty".into(),
            ));
        }
        let id = self.next_id;
        transaction.id = id;
        tracing::debug!(id, category = %transaction.category, kind = ?transaction.kind, "transaction added");
        self.transactions.push(transaction);
        self.next_id += 1;
        Ok(id)
    }

    /// Removes every transaction matching `predicate`, then renumbers.
    pub fn remove_by_filter<F>(&mut self, mut predicate: F) -> usize
    where
        F: FnMut(&Transaction) -> bool,
    {
        let before = self.transactions.len();
        self.transactions.retain(|txn| !predicate(txn));
        let removed = before - self.transactions.len();
        self.renumber();
        tracing::debug!(removed, "transactions removed by filter");
        removed
    }

    /// Removes the transaction with `id`, then renumbers.
    pub fn remove_by_id(&mut self, id: u32) -> Result<()> {
        let position = self
            .transactions
            .iter()
            .position(|txn| txn.id == id)
            .filter(|_| id > 0)
            .ok_or_else(|| WalletError::TransactionNotFound(id.to_string()))?;
        self.transactions.remove(position);
        self.renumber();
        tracing::debug!(id, "transaction removed");
        Ok(())
    }

    /// Removes a transaction addressed by a raw, user-supplied id token.
    ///
    /// Blank, non-numeric and non-positive tokens are reported as not found.
    pub fn remove_by_id_token(&mut self, token: &str) -> Result<u32> {
        let trimmed = token.trim();
        let id = trimmed
            .parse::<u32>()
            .ok()
            .filter(|id| *id > 0)
            .ok_or_else(|| WalletError::TransactionNotFound(trimmed.to_string()))?;
        self.remove_by_id(id)?;
        Ok(id)
    }

    /// Relabels `old_name` as `new_name` for transactions in `filter` (or in both
    /// namespaces when `None`). Collision checks belong to the caller.
    pub fn rename_category(
        &mut self,
        old_name: &str,
        new_name: &str,
        filter: Option<Namespace>,
    ) -> usize {
        let mut renamed = 0;
        for txn in self
            .transactions
            .iter_mut()
            .filter(|txn| txn.category == old_name)
            .filter(|txn| filter.map_or(true, |ns| txn.namespace() == ns))
        {
            txn.category = new_name.to_string();
            renamed += 1;
        }
        tracing::debug!(old_name, new_name, renamed, "category renamed");
        renamed
    }

    /// Reassigns ids `1..=N` in current order.
    pub fn renumber(&mut self) {
        for (idx, txn) in self.transactions.iter_mut().enumerate() {
            txn.id = idx as u32 + 1;
        }
        self.next_id = self.transactions.len() as u32 + 1;
    }

    /// Replaces the whole ledger, e.g. when hydrating from collaborator data.
    ///
    /// Incoming ids are ignored; entries keep their category, amount, kind and
    /// timestamp and are renumbered in the given order. Negative amounts, or a
    /// set whose amounts overflow together, fail with `InvalidAmount` and leave
    /// the ledger as it was.
    pub fn replace_all(&mut self, transactions: Vec<Transaction>) -> Result<()> {
        if transactions.iter().any(|txn| txn.amount.is_negative())
            || volume(&transactions, Money::ZERO).is_none()
        {
            return Err(WalletError::InvalidAmount);
        }
        self.transactions = transactions;
        self.renumber();
        Ok(())
    }

    /// Returns an owned copy; mutating it never touches the ledger.
    pub fn snapshot(&self) -> Vec<Transaction> {
        self.transactions.clone()
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn get(&self, id: u32) -> Option<&Transaction> {
        self.transactions.iter().find(|txn| txn.id == id)
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    pub fn next_id(&self) -> u32 {
        self.next_id
    }

    /// True if at least one transaction of `namespace` carries `name`.
    pub fn has_category(&self, name: &str, namespace: Namespace) -> bool {
        self.transactions.iter().any(|txn| txn.is_in(name, namespace))
    }

    /// Distinct category names of `namespace`, in first-seen ledger order.
    pub fn categories(&self, namespace: Namespace) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for txn in self.transactions.iter().filter(|txn| txn.namespace() == namespace) {
            if !names.iter().any(|name| name == &txn.category) {
                names.push(txn.category.clone());
            }
        }
        names
    }

    pub fn income_categories(&self) -> Vec<String> {
        self.categories(Namespace::Income)
    }

    pub fn outcome_categories(&self) -> Vec<String> {
        self.categories(Namespace::Outcome)
    }
}

/// Sum of every amount plus `extra`, or `None` once it leaves the `Money` range.
fn volume(transactions: &[Transaction], extra: Money) -> Option<Money> {
    transactions
        .iter()
        .try_fold(extra, |total, txn| total.checked_add(txn.amount))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ids(ledger: &TransactionLedger) -> Vec<u32> {
        ledger.transactions().iter().map(|txn| txn.id).collect()
    }

    #[test]
    fn ids_follow_insertion_order() {
        let mut ledger = TransactionLedger::new();
        assert_eq!(ledger.add("Salary", Money::from_major(100), TransactionKind::Income).unwrap(), 1);
        assert_eq!(ledger.add("Food", Money::from_major(5), TransactionKind::OutcomeSpent).unwrap(), 2);
        assert_eq!(ledger.add("Food", Money::from_major(9), TransactionKind::OutcomePlanned).unwrap(), 3);
        assert_eq!(ids(&ledger), vec![1, 2, 3]);
        assert_eq!(ledger.next_id(), 4);
    }

    #[test]
    fn negative_amount_leaves_ledger_untouched() {
        let mut ledger = TransactionLedger::new();
        ledger.add("Salary", Money::from_major(1), TransactionKind::Income).unwrap();
        let err = ledger
            .add("Salary", Money::from_minor(-1), TransactionKind::Income)
            .expect_err("negative amount");
        assert!(matches!(err, WalletError::InvalidAmount));
        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger.next_id(), 2);
    }

    #[test]
    fn amount_overflowing_the_ledger_total_is_rejected() {
        let mut ledger = TransactionLedger::new();
        ledger
            .add("A", Money::from_minor(i64::MAX), TransactionKind::Income)
            .unwrap();
        let err = ledger
            .add("B", Money::from_minor(1), TransactionKind::OutcomeSpent)
            .expect_err("sum leaves the money range");
        assert!(matches!(err, WalletError::InvalidAmount));
        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger.next_id(), 2);
    }

    #[test]
    fn replace_all_rejects_overflowing_data() {
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let big = |name: &str| {
            Transaction::new(name, Money::from_minor(i64::MAX), TransactionKind::Income, at)
        };
        let mut ledger = TransactionLedger::new();
        ledger.add("kept", Money::from_major(1), TransactionKind::Income).unwrap();
        let err = ledger.replace_all(vec![big("a"), big("b")]).expect_err("overflow");
        assert!(matches!(err, WalletError::InvalidAmount));
        assert_eq!(ledger.transactions()[0].category, "kept");

        let json = serde_json::json!({
            "transactions": [
                {"category": "a", "amount": i64::MAX, "kind": "Income", "timestamp": at.to_rfc3339()},
                {"category": "b", "amount": 1, "kind": "Income", "timestamp": at.to_rfc3339()},
            ]
        });
        assert!(serde_json::from_value::<TransactionLedger>(json).is_err());
    }

    #[test]
    fn blank_category_is_rejected() {
        let mut ledger = TransactionLedger::new();
        let err = ledger
            .add("  ", Money::from_major(1), TransactionKind::Income)
            .expect_err("blank category");
        assert!(matches!(err, WalletError::InvalidInput(_)));
        assert!(ledger.is_empty());
    }

    #[test]
    fn removal_renumbers_and_next_id_follows() {
        let mut ledger = TransactionLedger::new();
        for name in ["a", "b", "c", "d"] {
            ledger.add(name, Money::from_major(1), TransactionKind::Income).unwrap();
        }
        ledger.remove_by_id(2).unwrap();
        assert_eq!(ids(&ledger), vec![1, 2, 3]);
        assert_eq!(ledger.get(2).unwrap().category, "c");

        let id = ledger.add("e", Money::from_major(1), TransactionKind::Income).unwrap();
        assert_eq!(id, 4);
    }

    #[test]
    fn remove_by_id_token_rejects_non_numeric_and_missing() {
        let mut ledger = TransactionLedger::new();
        ledger.add("a", Money::from_major(1), TransactionKind::Income).unwrap();
        for token in ["", "abc", "0", "-1", "7"] {
            let err = ledger.remove_by_id_token(token).expect_err(token);
            assert!(matches!(err, WalletError::TransactionNotFound(_)), "{token}: {err:?}");
        }
        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger.remove_by_id_token(" 1 ").unwrap(), 1);
        assert!(ledger.is_empty());
    }

    #[test]
    fn rename_respects_namespace_filter() {
        let mut ledger = TransactionLedger::new();
        ledger.add("Food", Money::from_major(1), TransactionKind::Income).unwrap();
        ledger.add("Food", Money::from_major(2), TransactionKind::OutcomePlanned).unwrap();
        ledger.add("Food", Money::from_major(3), TransactionKind::OutcomeSpent).unwrap();

        let renamed = ledger.rename_category("Food", "Groceries", Some(Namespace::Outcome));
        assert_eq!(renamed, 2);
        assert!(ledger.has_category("Food", Namespace::Income));
        assert!(!ledger.has_category("Food", Namespace::Outcome));
        assert_eq!(ids(&ledger), vec![1, 2, 3]);

        let renamed = ledger.rename_category("Groceries", "Market", None);
        assert_eq!(renamed, 2);
    }

    #[test]
    fn snapshot_is_detached() {
        let mut ledger = TransactionLedger::new();
        ledger.add("a", Money::from_major(1), TransactionKind::Income).unwrap();
        let mut copy = ledger.snapshot();
        copy[0].category = "changed".into();
        copy.clear();
        assert_eq!(ledger.transactions()[0].category, "a");
    }

    #[test]
    fn deserialising_renumbers_ids() {
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let json = format!(
            r#"{{"transactions":[
                {{"id":7,"category":"Salary","amount":1000,"kind":"Income","timestamp":"{at}"}},
                {{"id":7,"category":"Food","amount":250,"kind":"OutcomeSpent","timestamp":"{at}"}}
            ]}}"#,
            at = at.to_rfc3339()
        );
        let ledger: TransactionLedger = serde_json::from_str(&json).unwrap();
        assert_eq!(ids(&ledger), vec![1, 2]);
        assert_eq!(ledger.next_id(), 3);
        assert_eq!(ledger.transactions()[1].timestamp, at);
        assert_eq!(ledger.transactions()[1].amount, Money::from_minor(250));
    }

    #[test]
    fn categories_are_listed_in_first_seen_order() {
        let mut ledger = TransactionLedger::new();
        ledger.add("Rent", Money::from_major(1), TransactionKind::OutcomePlanned).unwrap();
        ledger.add("Salary", Money::from_major(1), TransactionKind::Income).unwrap();
        ledger.add("Food", Money::from_major(1), TransactionKind::OutcomeSpent).unwrap();
        ledger.add("Rent", Money::from_major(1), TransactionKind::OutcomeSpent).unwrap();
        assert_eq!(ledger.outcome_categories(), vec!["Rent", "Food"]);
        assert_eq!(ledger.income_categories(), vec!["Salary"]);
    }
}
