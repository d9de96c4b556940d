//! Budget aggregation and threshold checks over a [`TransactionLedger`].
//!
//! Planned outcome is **last-write-wins** per category: every `OutcomePlanned`
//! transaction replaces the category's ceiling instead of adding to it. Spent
//! outcome and income are additive sums. Keep the two paths separate; folding
//! planned figures into a sum silently changes every budget in the wallet.

use std::collections::HashMap;
use std::fmt;

use serde::Serialize;

use crate::ledger::{Namespace, TransactionKind, TransactionLedger};
use crate::money::Money;

/// Spent share of the planned figure at which a category starts warning.
pub const DEFAULT_WARNING_PERCENT: u8 = 80;

/// Stateless budgeting utilities that operate over ledger snapshots.
pub struct BudgetService;

impl BudgetService {
    pub fn total_income(ledger: &TransactionLedger) -> Money {
        Self::total_of(ledger, TransactionKind::Income)
    }

    /// Sum of the current (last-write-wins) planned figure of every category.
    pub fn total_outcome_planned(ledger: &TransactionLedger) -> Money {
        Self::planned_outcome_by_category(ledger).values().sum()
    }

    pub fn total_outcome_spent(ledger: &TransactionLedger) -> Money {
        Self::total_of(ledger, TransactionKind::OutcomeSpent)
    }

    pub fn income_by_category(ledger: &TransactionLedger) -> HashMap<String, Money> {
        Self::sum_by_category(ledger, TransactionKind::Income)
    }

    pub fn spent_outcome_by_category(ledger: &TransactionLedger) -> HashMap<String, Money> {
        Self::sum_by_category(ledger, TransactionKind::OutcomeSpent)
    }

    /// Planned ceiling per category. Later planned entries overwrite earlier ones.
    pub fn planned_outcome_by_category(ledger: &TransactionLedger) -> HashMap<String, Money> {
        let mut planned = HashMap::new();
        for txn in ledger
            .transactions()
            .iter()
            .filter(|txn| txn.kind == TransactionKind::OutcomePlanned)
        {
            planned.insert(txn.category.clone(), txn.amount);
        }
        planned
    }

    pub fn planned_for(ledger: &TransactionLedger, category: &str) -> Money {
        ledger
            .transactions()
            .iter()
            .rev()
            .find(|txn| txn.kind == TransactionKind::OutcomePlanned && txn.category == category)
            .map(|txn| txn.amount)
            .unwrap_or(Money::ZERO)
    }

    pub fn spent_for(ledger: &TransactionLedger, category: &str) -> Money {
        ledger
            .transactions()
            .iter()
            .filter(|txn| txn.kind == TransactionKind::OutcomeSpent && txn.category == category)
            .map(|txn| txn.amount)
            .sum()
    }

    /// Planned minus spent; a missing side counts as zero.
    pub fn remaining_budget(ledger: &TransactionLedger, category: &str) -> Money {
        Self::planned_for(ledger, category) - Self::spent_for(ledger, category)
    }

    pub fn is_budget_exceeded(ledger: &TransactionLedger, category: &str) -> bool {
        Self::remaining_budget(ledger, category).is_negative()
    }

    /// Spent is within `[80%, 100%)` of a positive planned figure.
    pub fn is_budget_warning(ledger: &TransactionLedger, category: &str) -> bool {
        Self::is_budget_warning_at(ledger, category, DEFAULT_WARNING_PERCENT)
    }

    /// Spent is within `[percent, 100%)` of a positive planned figure.
    pub fn is_budget_warning_at(ledger: &TransactionLedger, category: &str, percent: u8) -> bool {
        let planned = Self::planned_for(ledger, category);
        let spent = Self::spent_for(ledger, category);
        in_warning_band(planned, spent, percent)
    }

    /// Pre-check for recording `amount` against `category`.
    ///
    /// A spend crosses the line when a positive ceiling exists and spent would
    /// exceed it. A new planned figure crosses it when current spend is already
    /// above `planned + amount`.
    pub fn would_exceed_category_budget(
        ledger: &TransactionLedger,
        category: &str,
        amount: Money,
        is_planned: bool,
    ) -> bool {
        let planned = Self::planned_for(ledger, category);
        let spent = Self::spent_for(ledger, category);
        // `amount` is not in the ledger yet; a sum past the range is past any budget.
        if is_planned {
            planned
                .checked_add(amount)
                .map_or(false, |ceiling| spent > ceiling)
        } else {
            planned.is_positive() && spent.checked_add(amount).map_or(true, |total| total > planned)
        }
    }

    /// Pre-check against the wallet's total income.
    pub fn would_exceed_total_income(
        ledger: &TransactionLedger,
        amount: Money,
        is_planned: bool,
    ) -> bool {
        let income = Self::total_income(ledger);
        let outcome = if is_planned {
            Self::total_outcome_planned(ledger)
        } else {
            Self::total_outcome_spent(ledger)
        };
        outcome.checked_add(amount).map_or(true, |total| total > income)
    }

    pub fn is_budget_exceeded_planned(ledger: &TransactionLedger) -> bool {
        Self::total_income(ledger) < Self::total_outcome_planned(ledger)
    }

    pub fn is_budget_exceeded_spent(ledger: &TransactionLedger) -> bool {
        Self::total_income(ledger) < Self::total_outcome_spent(ledger)
    }

    /// Planned, spent and remaining figures for one outcome category.
    pub fn category_status(
        ledger: &TransactionLedger,
        category: &str,
        warning_percent: u8,
    ) -> CategoryBudgetStatus {
        let planned = Self::planned_for(ledger, category);
        let spent = Self::spent_for(ledger, category);
        let remaining = planned - spent;
        let state = if remaining.is_negative() {
            BudgetState::Exceeded
        } else if in_warning_band(planned, spent, warning_percent) {
            BudgetState::Warning
        } else {
            BudgetState::Ok
        };
        CategoryBudgetStatus {
            category: category.to_string(),
            planned,
            spent,
            remaining,
            state,
        }
    }

    /// Every per-category and whole-wallet alert currently raised by the ledger.
    pub fn wallet_alerts(ledger: &TransactionLedger, warning_percent: u8) -> Vec<BudgetAlert> {
        let mut alerts: Vec<BudgetAlert> = ledger
            .categories(Namespace::Outcome)
            .into_iter()
            .filter_map(|category| Self::category_alert(ledger, &category, warning_percent))
            .collect();
        alerts.extend(Self::total_alerts(ledger));
        alerts
    }

    /// Alert for a single outcome category, exceeded taking precedence over warning.
    pub fn category_alert(
        ledger: &TransactionLedger,
        category: &str,
        warning_percent: u8,
    ) -> Option<BudgetAlert> {
        match Self::category_status(ledger, category, warning_percent).state {
            BudgetState::Exceeded => Some(BudgetAlert::CategoryExceeded(category.to_string())),
            BudgetState::Warning => Some(BudgetAlert::CategoryWarning(category.to_string())),
            BudgetState::Ok => None,
        }
    }

    /// Whole-wallet alerts evaluated after every mutating operation.
    pub fn total_alerts(ledger: &TransactionLedger) -> Vec<BudgetAlert> {
        let mut alerts = Vec::new();
        if Self::is_budget_exceeded_planned(ledger) {
            alerts.push(BudgetAlert::PlannedExceedsIncome);
        }
        if Self::is_budget_exceeded_spent(ledger) {
            alerts.push(BudgetAlert::SpentExceedsIncome);
        }
        alerts
    }

    fn total_of(ledger: &TransactionLedger, kind: TransactionKind) -> Money {
        ledger
            .transactions()
            .iter()
            .filter(|txn| txn.kind == kind)
            .map(|txn| txn.amount)
            .sum()
    }

    fn sum_by_category(ledger: &TransactionLedger, kind: TransactionKind) -> HashMap<String, Money> {
        let mut sums: HashMap<String, Money> = HashMap::new();
        for txn in ledger.transactions().iter().filter(|txn| txn.kind == kind) {
            *sums.entry(txn.category.clone()).or_default() += txn.amount;
        }
        sums
    }
}

fn in_warning_band(planned: Money, spent: Money, percent: u8) -> bool {
    if !planned.is_positive() {
        return false;
    }
    let planned = i128::from(planned.minor());
    let spent = i128::from(spent.minor());
    spent * 100 >= planned * i128::from(percent) && spent < planned
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BudgetState {
    Ok,
    Warning,
    Exceeded,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryBudgetStatus {
    pub category: String,
    pub planned: Money,
    pub spent: Money,
    pub remaining: Money,
    pub state: BudgetState,
}

/// Advisory conditions raised by the budget engine; never blocks on its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum BudgetAlert {
    CategoryWarning(String),
    CategoryExceeded(String),
    PlannedExceedsIncome,
    SpentExceedsIncome,
}

impl fmt::Display for BudgetAlert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BudgetAlert::CategoryWarning(category) => {
                write!(f, "Spending in `{category}` reached the warning threshold of its budget")
            }
            BudgetAlert::CategoryExceeded(category) => {
                write!(f, "Spending in `{category}` exceeds its budget")
            }
            BudgetAlert::PlannedExceedsIncome => {
                f.write_str("Planned category budgets exceed total income")
            }
            BudgetAlert::SpentExceedsIncome => f.write_str("Spending exceeds total income"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ledger_with(entries: &[(&str, i64, TransactionKind)]) -> TransactionLedger {
        let mut ledger = TransactionLedger::new();
        for (category, minor, kind) in entries {
            ledger.add(*category, Money::from_minor(*minor), *kind).unwrap();
        }
        ledger
    }

    #[test]
    fn pre_checks_survive_amounts_at_the_money_limit() {
        let max = Money::from_minor(i64::MAX);
        let ledger = ledger_with(&[
            ("Salary", i64::MAX - 10, TransactionKind::Income),
            ("Food", 5, TransactionKind::OutcomePlanned),
            ("Food", 3, TransactionKind::OutcomeSpent),
        ]);
        assert!(BudgetService::would_exceed_category_budget(&ledger, "Food", max, false));
        assert!(!BudgetService::would_exceed_category_budget(&ledger, "Food", max, true));
        assert!(BudgetService::would_exceed_total_income(&ledger, max, false));
        assert!(BudgetService::would_exceed_total_income(&ledger, max, true));
        assert!(!BudgetService::would_exceed_total_income(
            &ledger,
            Money::from_minor(1),
            false
        ));
    }

    #[test]
    fn planned_is_last_write_wins() {
        let ledger = ledger_with(&[
            ("X", 100, TransactionKind::OutcomePlanned),
            ("X", 80, TransactionKind::OutcomePlanned),
        ]);
        let planned = BudgetService::planned_outcome_by_category(&ledger);
        assert_eq!(planned.get("X"), Some(&Money::from_minor(80)));
        assert_eq!(BudgetService::total_outcome_planned(&ledger), Money::from_minor(80));
    }

    #[test]
    fn spent_and_income_are_additive() {
        let ledger = ledger_with(&[
            ("X", 100, TransactionKind::OutcomeSpent),
            ("X", 80, TransactionKind::OutcomeSpent),
            ("Salary", 500, TransactionKind::Income),
            ("Salary", 300, TransactionKind::Income),
            ("Gift", 200, TransactionKind::Income),
        ]);
        let spent = BudgetService::spent_outcome_by_category(&ledger);
        assert_eq!(spent.get("X"), Some(&Money::from_minor(180)));
        let income = BudgetService::income_by_category(&ledger);
        assert_eq!(income.get("Salary"), Some(&Money::from_minor(800)));
        assert_eq!(income.get("Gift"), Some(&Money::from_minor(200)));
        assert_eq!(BudgetService::total_income(&ledger), Money::from_minor(1000));
    }

    #[test]
    fn warning_band_has_inclusive_lower_and_exclusive_upper_bound() {
        let at_80 = ledger_with(&[
            ("X", 1000, TransactionKind::OutcomePlanned),
            ("X", 800, TransactionKind::OutcomeSpent),
        ]);
        assert!(BudgetService::is_budget_warning(&at_80, "X"));

        let below = ledger_with(&[
            ("X", 1000, TransactionKind::OutcomePlanned),
            ("X", 799, TransactionKind::OutcomeSpent),
        ]);
        assert!(!BudgetService::is_budget_warning(&below, "X"));

        let full = ledger_with(&[
            ("X", 1000, TransactionKind::OutcomePlanned),
            ("X", 1000, TransactionKind::OutcomeSpent),
        ]);
        assert!(!BudgetService::is_budget_warning(&full, "X"));
        assert!(!BudgetService::is_budget_exceeded(&full, "X"));
    }

    #[test]
    fn warning_needs_positive_plan() {
        let ledger = ledger_with(&[("X", 0, TransactionKind::OutcomePlanned)]);
        assert!(!BudgetService::is_budget_warning(&ledger, "X"));
        assert!(!BudgetService::is_budget_warning(&ledger, "missing"));
    }

    #[test]
    fn exceeded_when_remaining_is_negative() {
        let ledger = ledger_with(&[
            ("Food", 50_000, TransactionKind::OutcomePlanned),
            ("Food", 60_000, TransactionKind::OutcomeSpent),
        ]);
        assert_eq!(BudgetService::remaining_budget(&ledger, "Food"), Money::from_minor(-10_000));
        assert!(BudgetService::is_budget_exceeded(&ledger, "Food"));
        assert_eq!(
            BudgetService::category_status(&ledger, "Food", DEFAULT_WARNING_PERCENT).state,
            BudgetState::Exceeded
        );
    }

    #[test]
    fn spend_precheck_requires_positive_plan() {
        let no_plan = ledger_with(&[("Food", 900, TransactionKind::OutcomeSpent)]);
        assert!(!BudgetService::would_exceed_category_budget(
            &no_plan,
            "Food",
            Money::from_minor(10_000),
            false
        ));

        let planned = ledger_with(&[
            ("Food", 1000, TransactionKind::OutcomePlanned),
            ("Food", 900, TransactionKind::OutcomeSpent),
        ]);
        assert!(!BudgetService::would_exceed_category_budget(
            &planned,
            "Food",
            Money::from_minor(100),
            false
        ));
        assert!(BudgetService::would_exceed_category_budget(
            &planned,
            "Food",
            Money::from_minor(101),
            false
        ));
    }

    #[test]
    fn planned_precheck_compares_spend_to_plan_plus_amount() {
        let ledger = ledger_with(&[
            ("Food", 100, TransactionKind::OutcomePlanned),
            ("Food", 500, TransactionKind::OutcomeSpent),
        ]);
        assert!(BudgetService::would_exceed_category_budget(
            &ledger,
            "Food",
            Money::from_minor(399),
            true
        ));
        assert!(!BudgetService::would_exceed_category_budget(
            &ledger,
            "Food",
            Money::from_minor(400),
            true
        ));
    }

    #[test]
    fn total_income_prechecks() {
        let ledger = ledger_with(&[
            ("Salary", 1000, TransactionKind::Income),
            ("Rent", 600, TransactionKind::OutcomePlanned),
            ("Rent", 700, TransactionKind::OutcomeSpent),
        ]);
        assert!(!BudgetService::would_exceed_total_income(&ledger, Money::from_minor(300), false));
        assert!(BudgetService::would_exceed_total_income(&ledger, Money::from_minor(301), false));
        assert!(!BudgetService::would_exceed_total_income(&ledger, Money::from_minor(400), true));
        assert!(BudgetService::would_exceed_total_income(&ledger, Money::from_minor(401), true));
    }

    #[test]
    fn wallet_alerts_cover_categories_and_totals() {
        let ledger = ledger_with(&[
            ("Salary", 1000, TransactionKind::Income),
            ("Food", 500, TransactionKind::OutcomePlanned),
            ("Food", 450, TransactionKind::OutcomeSpent),
            ("Rent", 700, TransactionKind::OutcomePlanned),
            ("Rent", 800, TransactionKind::OutcomeSpent),
        ]);
        let alerts = BudgetService::wallet_alerts(&ledger, DEFAULT_WARNING_PERCENT);
        assert_eq!(
            alerts,
            vec![
                BudgetAlert::CategoryWarning("Food".into()),
                BudgetAlert::CategoryExceeded("Rent".into()),
                BudgetAlert::PlannedExceedsIncome,
                BudgetAlert::SpentExceedsIncome,
            ]
        );
    }

    #[test]
    fn empty_ledger_has_zero_totals() {
        let ledger = TransactionLedger::new();
        assert_eq!(BudgetService::total_income(&ledger), Money::ZERO);
        assert_eq!(BudgetService::total_outcome_planned(&ledger), Money::ZERO);
        assert_eq!(BudgetService::total_outcome_spent(&ledger), Money::ZERO);
        assert!(BudgetService::wallet_alerts(&ledger, DEFAULT_WARNING_PERCENT).is_empty());
    }
}
