//! Data models for wallets and observed ledger state

pub mod ledger;
pub mod wallet;

// Re-export for convenience
pub use ledger::{LedgerState, WalletUpdate};
pub use wallet::{BalanceView, WalletEntry, WalletListing};
