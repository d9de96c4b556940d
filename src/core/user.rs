use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::errors::{Result, WalletError};
use crate::ledger::TransactionLedger;

/// A wallet owner. Credentials live with the authentication collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub username: String,
    #[serde(default)]
    wallet: TransactionLedger,
}

impl User {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            wallet: TransactionLedger::new(),
        }
    }

    pub fn with_wallet(username: impl Into<String>, wallet: TransactionLedger) -> Self {
        Self {
            username: username.into(),
            wallet,
        }
    }

    pub fn wallet(&self) -> &TransactionLedger {
        &self.wallet
    }

    pub fn wallet_mut(&mut self) -> &mut TransactionLedger {
        &mut self.wallet
    }

    /// Swaps in a wallet from an external source and renumbers it.
    pub fn set_wallet(&mut self, mut wallet: TransactionLedger) {
        wallet.renumber();
        self.wallet = wallet;
    }
}

/// Persistence collaborator invoked after each successful wallet mutation.
pub trait UserStore: Send + Sync {
    fn save(&mut self, user: &User) -> Result<()>;
    fn load(&self, username: &str) -> Result<Option<User>>;
}

/// Keeps users in memory; used in tests and by embedders without storage.
#[derive(Debug, Default)]
pub struct InMemoryUserStore {
    users: HashMap<String, User>,
    saves: usize,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `save` calls served so far.
    pub fn save_count(&self) -> usize {
        self.saves
    }
}

impl UserStore for InMemoryUserStore {
    fn save(&mut self, user: &User) -> Result<()> {
        if user.username.trim().is_empty() {
            return Err(WalletError::Storage("cannot save a user without a name".into()));
        }
        self.users.insert(user.username.clone(), user.clone());
        self.saves += 1;
        Ok(())
    }

    fn load(&self, username: &str) -> Result<Option<User>> {
        Ok(self.users.get(username).cloned())
    }
}
