//! Collaborator traits consumed by the watch core

pub mod address_validator;
pub mod ledger_client;
pub mod notifier;

// Re-export for convenience
pub use address_validator::{AddressValidator, SolanaAddressValidator};
pub use ledger_client::LedgerClient;
pub use notifier::Notifier;
