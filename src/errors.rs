use std::result::Result as StdResult;

use thiserror::Error;

use crate::cli::parser::ParseErrors;
use crate::ledger::Namespace;
use crate::money::MoneyParseError;

/// Error type shared by the ledger, the budget services and the command layer.
#[derive(Debug, Error)]
pub enum WalletError {
    #[error("Amount must not be negative or push wallet totals out of range")]
    InvalidAmount,
    #[error("Transaction with id `{0}` not found")]
    TransactionNotFound(String),
    #[error("Category `{0}` not found")]
    CategoryNotFound(String),
    #[error("{namespace} category `{name}` already exists")]
    CategoryAlreadyExists { name: String, namespace: Namespace },
    #[error("Operation cancelled: budget would be exceeded")]
    BudgetExceeded,
    #[error("{0}")]
    Parse(#[from] ParseErrors),
    #[error("Category `{0}` exists for both income and outcome; specify -t")]
    AmbiguousCategory(String),
    #[error("Missing required argument {0}")]
    MissingArgument(&'static str),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Operation cancelled")]
    Cancelled,
    #[error("Command `{0}` is handled outside the wallet core")]
    UnsupportedCommand(String),
    #[error("Persistence error: {0}")]
    Storage(String),
    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = StdResult<T, WalletError>;

impl WalletError {
    /// True for errors that leave the wallet untouched because the user declined.
    pub fn is_cancellation(&self) -> bool {
        matches!(self, WalletError::BudgetExceeded | WalletError::Cancelled)
    }
}

impl From<MoneyParseError> for WalletError {
    fn from(err: MoneyParseError) -> Self {
        WalletError::InvalidInput(err.to_string())
    }
}

impl From<std::io::Error> for WalletError {
    fn from(err: std::io::Error) -> Self {
        WalletError::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for WalletError {
    fn from(err: serde_json::Error) -> Self {
        WalletError::Config(err.to_string())
    }
}
