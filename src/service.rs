//! Entry points used by the command layer.
//!
//! Every operation is keyed by session id, takes the session lock for its whole
//! duration and returns a typed result, so menu buttons and slash commands go
//! through exactly the same code.

use std::sync::Arc;

use futures_util::future::join_all;
use tracing::{debug, info};

use crate::error::WalletError;
use crate::models::wallet::{BalanceView, WalletEntry, WalletListing};
use crate::session::{SessionId, SessionStore};
use crate::tracker::{PollerConfig, WatchManager};
use crate::traits::{AddressValidator, LedgerClient, Notifier};
use crate::utils::helper::lamports_to_sol;

pub struct WalletWatchService {
    store: Arc<SessionStore>,
    validator: Arc<dyn AddressValidator>,
    ledger: Arc<dyn LedgerClient>,
    manager: WatchManager,
}

impl WalletWatchService {
    pub fn new(
        store: Arc<SessionStore>,
        validator: Arc<dyn AddressValidator>,
        ledger: Arc<dyn LedgerClient>,
        notifier: Arc<dyn Notifier>,
        config: PollerConfig,
    ) -> Self {
        let manager = WatchManager::new(ledger.clone(), notifier, config);
        Self { store, validator, ledger, manager }
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    /// Validate and register a wallet
    pub async fn add_wallet(
        &self,
        session_id: SessionId,
        address: &str,
        name: &str,
    ) -> Result<WalletEntry, WalletError> {
        if !self.validator.is_valid_address(address) {
            return Err(WalletError::InvalidAddress(address.to_string()));
        }

        let session = self.store.get_or_create(session_id);
        let mut session = session.lock().await;
        let entry = session.add_wallet(address, name)?.clone();
        info!(session_id, "Wallet {} ({}) added", entry.name, entry.address);
        Ok(entry)
    }

    pub async fn select_wallet(
        &self,
        session_id: SessionId,
        address: &str,
    ) -> Result<WalletEntry, WalletError> {
        let session = self.store.get_or_create(session_id);
        let mut session = session.lock().await;
        Ok(session.select_wallet(address)?.clone())
    }

    /// Remove a wallet; a running watch on it is stopped before this returns
    pub async fn remove_wallet(
        &self,
        session_id: SessionId,
        address: &str,
    ) -> Result<WalletEntry, WalletError> {
        let session = self.store.get_or_create(session_id);
        let mut session = session.lock().await;
        let removed = session.remove_wallet(address).await?;
        info!(session_id, "Wallet {} ({}) removed", removed.name, removed.address);
        Ok(removed)
    }

    /// Remove the wallet matching an address or name
    pub async fn remove_wallet_matching(
        &self,
        session_id: SessionId,
        identifier: &str,
    ) -> Result<WalletEntry, WalletError> {
        let session = self.store.get_or_create(session_id);
        let mut session = session.lock().await;
        let address = session
            .find_wallet(identifier)
            .map(|w| w.address.clone())
            .ok_or_else(|| WalletError::WalletNotFound(identifier.to_string()))?;
        let removed = session.remove_wallet(&address).await?;
        info!(session_id, "Wallet {} ({}) removed", removed.name, removed.address);
        Ok(removed)
    }

    pub async fn find_wallet(&self, session_id: SessionId, identifier: &str) -> Option<WalletEntry> {
        let session = self.store.get(session_id)?;
        let session = session.lock().await;
        session.find_wallet(identifier).cloned()
    }

    pub async fn wallets(&self, session_id: SessionId) -> Vec<WalletEntry> {
        match self.store.get(session_id) {
            Some(session) => session.lock().await.wallets().to_vec(),
            None => Vec::new(),
        }
    }

    /// Registered wallets with their balance fetched now.
    ///
    /// The session lock is released before the ledger is queried.
    pub async fn list_wallets(&self, session_id: SessionId) -> Vec<WalletListing> {
        let wallets = self.wallets(session_id).await;
        let balances = join_all(wallets.iter().map(|w| self.balance_view(&w.address))).await;

        wallets
            .into_iter()
            .zip(balances)
            .map(|(wallet, balance)| WalletListing { wallet, balance })
            .collect()
    }

    /// One registered wallet with its balance fetched now
    pub async fn wallet_balance(
        &self,
        session_id: SessionId,
        address: &str,
    ) -> Result<WalletListing, WalletError> {
        let wallet = match self.store.get(session_id) {
            Some(session) => session.lock().await.wallet(address).cloned(),
            None => None,
        }
        .ok_or_else(|| WalletError::WalletNotFound(address.to_string()))?;

        let balance = self.balance_view(&wallet.address).await;
        Ok(WalletListing { wallet, balance })
    }

    pub async fn start_tracking(&self, session_id: SessionId) -> Result<WalletEntry, WalletError> {
        let session = self.store.get_or_create(session_id);
        let mut session = session.lock().await;
        self.manager.start_tracking(&mut session).await
    }

    /// Stop all tracking in the session. A session without tasks is a no-op.
    pub async fn stop_tracking(&self, session_id: SessionId) -> usize {
        match self.store.get(session_id) {
            Some(session) => {
                let mut session = session.lock().await;
                self.manager.stop_tracking(&mut session).await
            }
            None => 0,
        }
    }

    pub async fn is_tracking(&self, session_id: SessionId) -> bool {
        match self.store.get(session_id) {
            Some(session) => self.manager.is_tracking(&*session.lock().await),
            None => false,
        }
    }

    pub async fn awaiting_address_input(&self, session_id: SessionId) -> bool {
        match self.store.get(session_id) {
            Some(session) => session.lock().await.awaiting_address_input(),
            None => false,
        }
    }

    /// Read and clear the add-wallet flag in one step
    pub async fn take_awaiting_address_input(&self, session_id: SessionId) -> bool {
        match self.store.get(session_id) {
            Some(session) => session.lock().await.take_awaiting_address_input(),
            None => false,
        }
    }

    pub async fn set_awaiting_address_input(&self, session_id: SessionId, awaiting: bool) {
        let session = self.store.get_or_create(session_id);
        session.lock().await.set_awaiting_address_input(awaiting);
    }

    /// Stop the watch tasks of every session
    pub async fn shutdown(&self) {
        let mut stopped = 0;
        for session_id in self.store.session_ids() {
            if let Some(session) = self.store.get(session_id) {
                let mut session = session.lock().await;
                stopped += self.manager.stop_tracking(&mut session).await;
            }
        }
        info!("Shutdown stopped {} watch task(s)", stopped);
    }

    async fn balance_view(&self, address: &str) -> BalanceView {
        let timeout = self.manager.config().fetch_timeout;
        match tokio::time::timeout(timeout, self.ledger.fetch_balance(address)).await {
            Ok(Ok(lamports)) => BalanceView::Sol(lamports_to_sol(lamports)),
            Ok(Err(e)) => {
                debug!("Balance lookup for {} failed: {}", address, e);
                BalanceView::Error
            }
            Err(_) => {
                debug!("Balance lookup for {} timed out", address);
                BalanceView::Error
            }
        }
    }
}
