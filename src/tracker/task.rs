use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::warn;

use super::poller::{Poller, PollerConfig};
use crate::models::ledger::LedgerState;
use crate::models::wallet::WalletEntry;
use crate::session::SessionId;
use crate::traits::{ledger_client::LedgerClient, notifier::Notifier};

/// Handle to a running poller for one wallet.
///
/// Dropping the handle requests cancellation but does not wait for it;
/// use [`WatchTask::shutdown`] to wait for the poller to exit.
#[derive(Debug)]
pub struct WatchTask {
    wallet_address: String,
    cancel: CancellationToken,
    handle: JoinHandle<()>,
    last_seen: watch::Receiver<Option<LedgerState>>,
}

impl WatchTask {
    /// Spawn a poller for `wallet` on the current tokio runtime
    pub fn spawn(
        session_id: SessionId,
        wallet: &WalletEntry,
        ledger: Arc<dyn LedgerClient>,
        notifier: Arc<dyn Notifier>,
        config: PollerConfig,
    ) -> Self {
        let cancel = CancellationToken::new();
        let (state_tx, last_seen) = watch::channel(None);

        let poller = Poller::new(
            session_id,
            wallet.address.clone(),
            wallet.name.clone(),
            ledger,
            notifier,
            config,
        );
        let handle = tokio::spawn(poller.run(cancel.clone(), state_tx));

        Self {
            wallet_address: wallet.address.clone(),
            cancel,
            handle,
            last_seen,
        }
    }

    pub fn wallet_address(&self) -> &str {
        &self.wallet_address
    }

    /// Last state recorded by the poller, `None` before the first successful fetch
    pub fn last_seen_state(&self) -> Option<LedgerState> {
        self.last_seen.borrow().clone()
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Request cooperative termination without waiting for it
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Cancel the poller and wait until it has exited
    pub async fn shutdown(mut self) {
        self.cancel.cancel();
        self.join().await;
    }

    async fn join(&mut self) {
        if let Err(e) = (&mut self.handle).await {
            warn!("Watch task for {} ended abnormally: {}", self.wallet_address, e);
        }
    }
}

impl Drop for WatchTask {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
