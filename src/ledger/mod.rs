//! Wallet ledger: transactions, namespaces, and the positional-id ledger itself.

pub mod clock;
#[allow(clippy::module_inception)]
pub mod ledger;
pub mod transaction;

pub use clock::{Clock, FixedClock, SystemClock};
pub use ledger::TransactionLedger;
pub use transaction::{Namespace, Transaction, TransactionKind, UnknownNamespace};
