//! Wallet Watch Library
//!
//! A Telegram bot core for watching Solana wallets: per-chat wallet
//! registries, one cancellable polling task per watched wallet, and change
//! notifications delivered back to the chat.

// Public modules - these are the API surface
pub mod bot;
pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod providers;
pub mod service;
pub mod session;
pub mod telegram;
pub mod tracker;
pub mod traits;
pub mod utils;

// Re-export commonly used items for easier access
pub use error::{DeliveryError, FetchError, WalletError};
pub use models::{
    ledger::{LedgerState, WalletUpdate},
    wallet::{BalanceView, WalletEntry, WalletListing},
};
pub use traits::{
    address_validator::{AddressValidator, SolanaAddressValidator},
    ledger_client::LedgerClient,
    notifier::Notifier,
};
pub use providers::rpc_provider::RpcLedgerClient;
pub use handlers::{
    composite::CompositeNotifier,
    console::ConsoleNotifier,
    telegram::TelegramNotifier,
};
pub use service::WalletWatchService;
pub use session::{Session, SessionId, SessionStore};
pub use tracker::{PollerConfig, WatchManager, WatchTask};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
