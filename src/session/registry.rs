//! Wallet registry operations on a single session.

use tracing::{debug, info};

use super::Session;
use crate::error::WalletError;
use crate::models::wallet::WalletEntry;

impl Session {
    /// Register a wallet. The new entry starts unselected and no watch is started.
    pub fn add_wallet(
        &mut self,
        address: impl Into<String>,
        name: impl Into<String>,
    ) -> Result<&WalletEntry, WalletError> {
        let address = address.into();
        if self.wallet(&address).is_some() {
            return Err(WalletError::DuplicateWallet(address));
        }

        let entry = WalletEntry::new(address, name);
        debug!(session_id = self.session_id, "Added wallet {} ({})", entry.address, entry.name);
        self.wallets.push(entry);
        Ok(&self.wallets[self.wallets.len() - 1])
    }

    /// Mark one wallet as selected and clear the selection on every other one
    pub fn select_wallet(&mut self, address: &str) -> Result<&WalletEntry, WalletError> {
        let index = self
            .wallets
            .iter()
            .position(|w| w.address == address)
            .ok_or_else(|| WalletError::WalletNotFound(address.to_string()))?;

        for (i, wallet) in self.wallets.iter_mut().enumerate() {
            wallet.selected = i == index;
        }
        Ok(&self.wallets[index])
    }

    /// Remove a wallet, stopping its watch task first if one is running.
    pub async fn remove_wallet(&mut self, address: &str) -> Result<WalletEntry, WalletError> {
        let index = self
            .wallets
            .iter()
            .position(|w| w.address == address)
            .ok_or_else(|| WalletError::WalletNotFound(address.to_string()))?;

        if let Some(task) = self.take_watch_task(address) {
            task.shutdown().await;
            info!(session_id = self.session_id, "Stopped watch for removed wallet {}", address);
        }

        Ok(self.wallets.remove(index))
    }

    /// Look a wallet up by exact address or case-insensitive name
    pub fn find_wallet(&self, identifier: &str) -> Option<&WalletEntry> {
        self.wallets
            .iter()
            .find(|w| w.address == identifier)
            .or_else(|| self.wallets.iter().find(|w| w.matches(identifier)))
    }
}
