use async_trait::async_trait;

use crate::error::FetchError;
use crate::models::ledger::LedgerState;

/// Read-only query against the ledger for a wallet's current state
#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// Fetch balance and latest transaction signature for a wallet
    async fn fetch_state(&self, address: &str) -> Result<LedgerState, FetchError>;

    /// Fetch only the balance, in lamports
    async fn fetch_balance(&self, address: &str) -> Result<u64, FetchError> {
        // Default implementation goes through the full query
        Ok(self.fetch_state(address).await?.lamports)
    }
}
