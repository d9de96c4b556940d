pub mod budget_service;
pub mod category_service;
pub mod summary_service;
pub mod transaction_service;

pub use budget_service::{
    BudgetAlert, BudgetService, BudgetState, CategoryBudgetStatus, DEFAULT_WARNING_PERCENT,
};
pub use category_service::{CategoryPresence, CategoryRow, CategoryService};
pub use summary_service::{SummaryService, WalletSummary};
pub use transaction_service::{TransactionQuery, TransactionService};
