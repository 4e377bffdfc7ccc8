use std::sync::Arc;

use tracing::info;

use super::poller::PollerConfig;
use super::task::WatchTask;
use crate::error::WalletError;
use crate::models::wallet::WalletEntry;
use crate::session::Session;
use crate::traits::{ledger_client::LedgerClient, notifier::Notifier};

/// Starts, replaces and cancels the watch tasks of a session.
///
/// Callers pass the session while holding its lock; every method that stops
/// a task returns only after the task has exited.
#[derive(Clone)]
pub struct WatchManager {
    ledger: Arc<dyn LedgerClient>,
    notifier: Arc<dyn Notifier>,
    config: PollerConfig,
}

impl WatchManager {
    pub fn new(
        ledger: Arc<dyn LedgerClient>,
        notifier: Arc<dyn Notifier>,
        config: PollerConfig,
    ) -> Self {
        Self { ledger, notifier, config }
    }

    pub fn config(&self) -> PollerConfig {
        self.config
    }

    /// Watch the selected wallet, replacing every task already running in the session.
    pub async fn start_tracking(&self, session: &mut Session) -> Result<WalletEntry, WalletError> {
        if session.wallets().is_empty() {
            return Err(WalletError::NoWalletsRegistered);
        }
        let selected = session
            .active_wallet()
            .cloned()
            .ok_or(WalletError::NoWalletSelected)?;

        let replaced = self.stop_tracking(session).await;

        let task = WatchTask::spawn(
            session.session_id(),
            &selected,
            self.ledger.clone(),
            self.notifier.clone(),
            self.config,
        );
        session.insert_watch_task(task);

        info!(
            session_id = session.session_id(),
            "Tracking wallet {} ({}), replaced {} task(s)", selected.name, selected.address, replaced
        );
        Ok(selected)
    }

    /// Stop every watch task in the session. Returns how many were running.
    pub async fn stop_tracking(&self, session: &mut Session) -> usize {
        let tasks = session.take_watch_tasks();
        if tasks.is_empty() {
            return 0;
        }

        for task in &tasks {
            task.cancel();
        }
        let count = tasks.len();
        for task in tasks {
            task.shutdown().await;
        }

        info!(session_id = session.session_id(), "Stopped {} watch task(s)", count);
        count
    }

    pub fn is_tracking(&self, session: &Session) -> bool {
        session.is_tracking()
    }
}
