#![doc(test(attr(deny(warnings))))]

//! Wallet Core keeps a personal income/outcome ledger, evaluates category and
//! whole-wallet budgets over it, and parses the flag-based command lines that
//! drive both.

pub mod cli;
pub mod config;
pub mod core;
pub mod errors;
pub mod ledger;
pub mod money;
pub mod utils;

use std::sync::Once;

pub use crate::core::services::{BudgetAlert, BudgetService, CategoryService};
pub use crate::core::user::{User, UserStore};
pub use crate::errors::{Result, WalletError};
pub use crate::ledger::{Namespace, Transaction, TransactionKind, TransactionLedger};
pub use crate::money::Money;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("Wallet core tracing initialized.");
    });
}
