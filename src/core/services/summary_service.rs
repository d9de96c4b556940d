use serde::Serialize;

use crate::core::services::budget_service::{BudgetAlert, BudgetService, CategoryBudgetStatus};
use crate::ledger::TransactionLedger;
use crate::money::Money;

/// Wallet-wide totals plus per-category breakdowns, as shown by `status`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WalletSummary {
    pub total_income: Money,
    pub total_spent: Money,
    pub total_planned: Money,
    /// Income minus actual spending.
    pub balance: Money,
    pub income_by_category: Vec<(String, Money)>,
    pub outcome_categories: Vec<CategoryBudgetStatus>,
    pub alerts: Vec<BudgetAlert>,
}

pub struct SummaryService;

impl SummaryService {
    pub fn summarize(ledger: &TransactionLedger, warning_percent: u8) -> WalletSummary {
        let total_income = BudgetService::total_income(ledger);
        let total_spent = BudgetService::total_outcome_spent(ledger);
        let income_totals = BudgetService::income_by_category(ledger);

        WalletSummary {
            total_income,
            total_spent,
            total_planned: BudgetService::total_outcome_planned(ledger),
            balance: total_income - total_spent,
            income_by_category: ledger
                .income_categories()
                .into_iter()
                .map(|category| {
                    let total = income_totals.get(&category).copied().unwrap_or_default();
                    (category, total)
                })
                .collect(),
            outcome_categories: ledger
                .outcome_categories()
                .iter()
                .map(|category| BudgetService::category_status(ledger, category, warning_percent))
                .collect(),
            alerts: BudgetService::total_alerts(ledger),
        }
    }
}
