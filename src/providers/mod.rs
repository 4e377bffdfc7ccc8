//! Ledger clients for fetching wallet state

pub mod rpc_provider;

// Re-export for convenience
pub use rpc_provider::RpcLedgerClient;
