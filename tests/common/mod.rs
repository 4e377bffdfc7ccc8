//! Test doubles shared by the integration tests.
#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{mpsc, watch};

use wallet_watch::telegram::{ChatTransport, InlineKeyboard};
use wallet_watch::{
    DeliveryError, FetchError, LedgerClient, LedgerState, Notifier, PollerConfig, SessionId,
    SessionStore, SolanaAddressValidator, WalletUpdate, WalletWatchService,
};

pub const ADDR_A: &str = "4Nd1mBQtrMJVYVfKf2PJy9NZUZdTAsp7D4xWLs4gDB4T";
pub const ADDR_B: &str = "5Q544fKrFoe6tsEbD7S8EmxGTJYAKtTVhAW5Q5pge4j1";
pub const ADDR_C: &str = "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v";

pub const POLL_INTERVAL: Duration = Duration::from_secs(30);

pub fn poller_config() -> PollerConfig {
    PollerConfig {
        poll_interval: POLL_INTERVAL,
        fetch_timeout: Duration::from_secs(5),
    }
}

pub fn sol(lamports_sol: f64) -> u64 {
    (lamports_sol * 1e9).round() as u64
}

pub fn state(balance_sol: f64, signature: &str) -> LedgerState {
    LedgerState::new(sol(balance_sol), Some(signature.to_string()))
}

/// One scripted answer of the ledger
#[derive(Debug, Clone)]
pub enum Step {
    Ok(LedgerState),
    Fail,
    /// Never answers; exercises the fetch timeout
    Hang,
    /// Panics inside the poller task
    Panic,
}

#[derive(Default)]
struct AddressScript {
    steps: VecDeque<Step>,
    last: Option<LedgerState>,
    calls: usize,
}

/// Ledger that replays scripted answers per address.
///
/// Once a script is exhausted the last successful state is repeated.
pub struct ScriptedLedger {
    scripts: Mutex<HashMap<String, AddressScript>>,
    total_calls: watch::Sender<usize>,
}

impl ScriptedLedger {
    pub fn new() -> Arc<Self> {
        let (total_calls, _) = watch::channel(0);
        Arc::new(Self {
            scripts: Mutex::new(HashMap::new()),
            total_calls,
        })
    }

    pub fn script(&self, address: &str, steps: Vec<Step>) {
        let mut scripts = self.scripts.lock().unwrap();
        scripts.entry(address.to_string()).or_default().steps.extend(steps);
    }

    pub fn calls_for(&self, address: &str) -> usize {
        self.scripts
            .lock()
            .unwrap()
            .get(address)
            .map(|s| s.calls)
            .unwrap_or(0)
    }

    /// Wait until `fetch_state` has been called at least `n` times for `address`
    pub async fn wait_for_calls(&self, address: &str, n: usize) {
        let mut rx = self.total_calls.subscribe();
        while self.calls_for(address) < n {
            rx.changed().await.unwrap();
        }
    }

    fn next_step(&self, address: &str) -> Step {
        let mut scripts = self.scripts.lock().unwrap();
        let script = scripts.entry(address.to_string()).or_default();
        script.calls += 1;

        let step = match script.steps.pop_front() {
            Some(step) => step,
            None => match &script.last {
                Some(state) => Step::Ok(state.clone()),
                None => Step::Fail,
            },
        };
        if let Step::Ok(state) = &step {
            script.last = Some(state.clone());
        }
        step
    }
}

#[async_trait]
impl LedgerClient for ScriptedLedger {
    async fn fetch_state(&self, address: &str) -> Result<LedgerState, FetchError> {
        let step = self.next_step(address);
        self.total_calls.send_modify(|n| *n += 1);

        match step {
            Step::Ok(state) => Ok(state),
            Step::Fail => Err(FetchError::Rpc("scripted failure".into())),
            Step::Hang => std::future::pending().await,
            Step::Panic => panic!("scripted ledger panic"),
        }
    }

    async fn fetch_balance(&self, address: &str) -> Result<u64, FetchError> {
        let scripts = self.scripts.lock().unwrap();
        let script = scripts
            .get(address)
            .ok_or_else(|| FetchError::Rpc("unknown address".into()))?;

        let state = script.last.clone().or_else(|| {
            script.steps.iter().find_map(|step| match step {
                Step::Ok(state) => Some(state.clone()),
                _ => None,
            })
        });
        state
            .map(|s| s.lamports)
            .ok_or_else(|| FetchError::Rpc("no balance scripted".into()))
    }
}

/// Notifier that records every update and can be told to fail
pub struct RecordingNotifier {
    updates: Mutex<Vec<(SessionId, WalletUpdate)>>,
    tx: mpsc::UnboundedSender<(SessionId, WalletUpdate)>,
    rx: tokio::sync::Mutex<mpsc::UnboundedReceiver<(SessionId, WalletUpdate)>>,
    fail: Mutex<bool>,
}

impl RecordingNotifier {
    pub fn new() -> Arc<Self> {
        let (tx, rx) = mpsc::unbounded_channel();
        Arc::new(Self {
            updates: Mutex::new(Vec::new()),
            tx,
            rx: tokio::sync::Mutex::new(rx),
            fail: Mutex::new(false),
        })
    }

    pub fn set_failing(&self, fail: bool) {
        *self.fail.lock().unwrap() = fail;
    }

    pub fn updates(&self) -> Vec<(SessionId, WalletUpdate)> {
        self.updates.lock().unwrap().clone()
    }

    pub fn count(&self) -> usize {
        self.updates.lock().unwrap().len()
    }

    /// Wait for the next delivery attempt
    pub async fn next(&self) -> (SessionId, WalletUpdate) {
        self.rx.lock().await.recv().await.unwrap()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, session_id: SessionId, update: &WalletUpdate) -> Result<(), DeliveryError> {
        let _ = self.tx.send((session_id, update.clone()));
        if *self.fail.lock().unwrap() {
            return Err(DeliveryError::Api("scripted delivery failure".into()));
        }
        self.updates.lock().unwrap().push((session_id, update.clone()));
        Ok(())
    }
}

/// A message as the transport saw it
#[derive(Debug, Clone)]
pub struct Sent {
    pub chat_id: SessionId,
    pub edited: Option<i64>,
    pub text: String,
    pub keyboard: Option<InlineKeyboard>,
}

#[derive(Default)]
pub struct RecordingTransport {
    sent: Mutex<Vec<Sent>>,
    answered: Mutex<Vec<String>>,
    answer_delay: Mutex<Option<Duration>>,
}

impl RecordingTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn sent(&self) -> Vec<Sent> {
        self.sent.lock().unwrap().clone()
    }

    pub fn texts(&self) -> Vec<String> {
        self.sent().into_iter().map(|s| s.text).collect()
    }

    pub fn answered(&self) -> Vec<String> {
        self.answered.lock().unwrap().clone()
    }

    /// Make every `answer_callback` take `delay` before it is recorded
    pub fn set_answer_delay(&self, delay: Duration) {
        *self.answer_delay.lock().unwrap() = Some(delay);
    }

    pub fn clear(&self) {
        self.sent.lock().unwrap().clear();
    }
}

#[async_trait]
impl ChatTransport for RecordingTransport {
    async fn send_message(
        &self,
        chat_id: SessionId,
        text: &str,
        keyboard: Option<&InlineKeyboard>,
    ) -> Result<(), DeliveryError> {
        self.sent.lock().unwrap().push(Sent {
            chat_id,
            edited: None,
            text: text.to_string(),
            keyboard: keyboard.cloned(),
        });
        Ok(())
    }

    async fn edit_message(
        &self,
        chat_id: SessionId,
        message_id: i64,
        text: &str,
        keyboard: Option<&InlineKeyboard>,
    ) -> Result<(), DeliveryError> {
        self.sent.lock().unwrap().push(Sent {
            chat_id,
            edited: Some(message_id),
            text: text.to_string(),
            keyboard: keyboard.cloned(),
        });
        Ok(())
    }

    async fn answer_callback(&self, callback_query_id: &str) {
        let delay = *self.answer_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.answered.lock().unwrap().push(callback_query_id.to_string());
    }
}

pub struct Harness {
    pub service: Arc<WalletWatchService>,
    pub ledger: Arc<ScriptedLedger>,
    pub notifier: Arc<RecordingNotifier>,
}

pub fn harness() -> Harness {
    let ledger = ScriptedLedger::new();
    let notifier = RecordingNotifier::new();
    let service = Arc::new(WalletWatchService::new(
        Arc::new(SessionStore::new()),
        Arc::new(SolanaAddressValidator),
        ledger.clone(),
        notifier.clone(),
        poller_config(),
    ));
    Harness { service, ledger, notifier }
}
