//! Wallet services and the collaborator seams the core is driven through.

pub mod services;
pub mod user;
pub mod utils;

pub use user::{InMemoryUserStore, User, UserStore};
