use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_client::rpc_client::GetConfirmedSignaturesForAddress2Config;
use solana_commitment_config::CommitmentConfig;
use solana_sdk::pubkey::Pubkey;
use tracing::debug;

use crate::error::FetchError;
use crate::models::ledger::LedgerState;
use crate::traits::ledger_client::LedgerClient;

/// Ledger client backed by Solana JSON-RPC (polling approach)
pub struct RpcLedgerClient {
    rpc_client: Arc<RpcClient>,
}

impl RpcLedgerClient {
    /// Create a new RPC ledger client
    pub fn new(rpc_url: String, request_timeout: Duration) -> Self {
        let client = RpcClient::new_with_timeout_and_commitment(
            rpc_url,
            request_timeout,
            CommitmentConfig::confirmed(),
        );

        Self { rpc_client: Arc::new(client) }
    }

    fn parse_address(address: &str) -> Result<Pubkey, FetchError> {
        Pubkey::from_str(address).map_err(|_| FetchError::InvalidAddress(address.to_string()))
    }

    async fn latest_signature(&self, wallet: &Pubkey) -> Result<Option<String>, FetchError> {
        let config = GetConfirmedSignaturesForAddress2Config {
            limit: Some(1),
            ..Default::default()
        };

        let signatures = self
            .rpc_client
            .get_signatures_for_address_with_config(wallet, config)
            .await
            .map_err(|e| FetchError::Rpc(e.to_string()))?;

        Ok(signatures.into_iter().next().map(|status| status.signature))
    }
}

#[async_trait]
impl LedgerClient for RpcLedgerClient {
    async fn fetch_state(&self, address: &str) -> Result<LedgerState, FetchError> {
        let wallet = Self::parse_address(address)?;

        let (balance, signature) = tokio::join!(
            self.rpc_client.get_balance(&wallet),
            self.latest_signature(&wallet),
        );

        let lamports = balance.map_err(|e| FetchError::Rpc(e.to_string()))?;
        let latest_signature = signature?;

        debug!(
            "Fetched state for {}: {} lamports, latest tx {:?}",
            address, lamports, latest_signature
        );
        Ok(LedgerState::new(lamports, latest_signature))
    }

    async fn fetch_balance(&self, address: &str) -> Result<u64, FetchError> {
        let wallet = Self::parse_address(address)?;
        self.rpc_client
            .get_balance(&wallet)
            .await
            .map_err(|e| FetchError::Rpc(e.to_string()))
    }
}
