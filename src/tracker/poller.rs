//! The periodic watch loop for one wallet.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::FetchError;
use crate::models::ledger::{LedgerState, WalletUpdate};
use crate::session::SessionId;
use crate::traits::{ledger_client::LedgerClient, notifier::Notifier};

/// Default pause between two polls of the same wallet
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(30);

/// Default bound on a single ledger query
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollerConfig {
    pub poll_interval: Duration,
    pub fetch_timeout: Duration,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
        }
    }
}

/// Outcome of comparing a fetched state against the last one seen
#[derive(Debug, PartialEq, Eq)]
pub enum Observation {
    /// First successful fetch; recorded without notifying
    Initial,
    Unchanged,
    Changed { previous: LedgerState },
}

/// Compare `fetched` with `last_seen` and record it as the new last seen state.
pub fn observe(last_seen: &mut Option<LedgerState>, fetched: &LedgerState) -> Observation {
    match last_seen.replace(fetched.clone()) {
        None => Observation::Initial,
        Some(previous) if previous == *fetched => Observation::Unchanged,
        Some(previous) => Observation::Changed { previous },
    }
}

/// Polls one wallet until cancelled.
///
/// The poller holds an immutable snapshot of the wallet's address and label,
/// it never reads the session the wallet belongs to.
pub struct Poller {
    session_id: SessionId,
    wallet_address: String,
    wallet_name: String,
    ledger: Arc<dyn LedgerClient>,
    notifier: Arc<dyn Notifier>,
    config: PollerConfig,
}

impl Poller {
    pub fn new(
        session_id: SessionId,
        wallet_address: String,
        wallet_name: String,
        ledger: Arc<dyn LedgerClient>,
        notifier: Arc<dyn Notifier>,
        config: PollerConfig,
    ) -> Self {
        Self {
            session_id,
            wallet_address,
            wallet_name,
            ledger,
            notifier,
            config,
        }
    }

    /// Run the loop, publishing every newly recorded state on `state_tx`.
    pub async fn run(self, cancel: CancellationToken, state_tx: watch::Sender<Option<LedgerState>>) {
        info!(
            session_id = self.session_id,
            "Started watching {} every {:?}", self.wallet_address, self.config.poll_interval
        );

        let mut last_seen: Option<LedgerState> = None;

        loop {
            if cancel.is_cancelled() {
                break;
            }

            let fetched = tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                result = self.fetch() => result,
            };

            match fetched {
                Ok(state) => {
                    let observation = observe(&mut last_seen, &state);
                    state_tx.send_replace(last_seen.clone());

                    match observation {
                        Observation::Initial => {
                            debug!(session_id = self.session_id, "Initial state for {}: {:?}", self.wallet_address, state);
                        }
                        Observation::Unchanged => {}
                        Observation::Changed { previous } => {
                            let update = WalletUpdate::new(
                                self.wallet_name.as_str(),
                                self.wallet_address.as_str(),
                                previous,
                                state,
                            );

                            let delivered = tokio::select! {
                                biased;
                                _ = cancel.cancelled() => break,
                                result = self.notifier.notify(self.session_id, &update) => result,
                            };

                            match delivered {
                                Ok(()) => info!(session_id = self.session_id, "Notified change for {}", self.wallet_address),
                                Err(e) => warn!(session_id = self.session_id, "Failed to deliver update for {}: {}", self.wallet_address, e),
                            }
                        }
                    }
                }
                Err(e) => {
                    warn!(session_id = self.session_id, "Poll of {} failed: {}", self.wallet_address, e);
                }
            }

            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(self.config.poll_interval) => {}
            }
        }

        info!(session_id = self.session_id, "Stopped watching {}", self.wallet_address);
    }

    async fn fetch(&self) -> Result<LedgerState, FetchError> {
        match tokio::time::timeout(
            self.config.fetch_timeout,
            self.ledger.fetch_state(&self.wallet_address),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => Err(FetchError::Timeout(self.config.fetch_timeout)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(lamports: u64, signature: &str) -> LedgerState {
        LedgerState::new(lamports, Some(signature.to_string()))
    }

    #[test]
    fn first_observation_is_recorded_silently() {
        let mut last_seen = None;
        assert_eq!(observe(&mut last_seen, &state(5, "S1")), Observation::Initial);
        assert_eq!(last_seen, Some(state(5, "S1")));
    }

    #[test]
    fn unchanged_state_is_not_a_change() {
        let mut last_seen = Some(state(5, "S1"));
        assert_eq!(observe(&mut last_seen, &state(5, "S1")), Observation::Unchanged);
    }

    #[test]
    fn balance_or_signature_change_is_reported() {
        let mut last_seen = Some(state(5, "S1"));
        assert_eq!(
            observe(&mut last_seen, &state(6, "S1")),
            Observation::Changed { previous: state(5, "S1") }
        );
        assert_eq!(
            observe(&mut last_seen, &state(6, "S2")),
            Observation::Changed { previous: state(6, "S1") }
        );
        assert_eq!(last_seen, Some(state(6, "S2")));
    }
}
