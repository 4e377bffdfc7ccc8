//! Per-chat session state: registered wallets, running watch tasks and input flags.
//!
//! A `Session` is always reached through the [`SessionStore`], which wraps it in
//! a `tokio::sync::Mutex`. Every mutation of the registry or of the watch task
//! map happens while that lock is held, so a command that cancels a task only
//! returns once the task has terminated.

pub mod registry;
pub mod store;

use std::collections::HashMap;

use crate::models::wallet::WalletEntry;
use crate::tracker::task::WatchTask;

pub use store::SessionStore;

/// Chat identity supplied by the transport
pub type SessionId = i64;

#[derive(Debug)]
pub struct Session {
    session_id: SessionId,
    wallets: Vec<WalletEntry>,
    watch_tasks: HashMap<String, WatchTask>,
    awaiting_address_input: bool,
}

impl Session {
    pub fn new(session_id: SessionId) -> Self {
        Self {
            session_id,
            wallets: Vec::new(),
            watch_tasks: HashMap::new(),
            awaiting_address_input: false,
        }
    }

    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    /// Registered wallets in insertion order
    pub fn wallets(&self) -> &[WalletEntry] {
        &self.wallets
    }

    pub fn wallet(&self, address: &str) -> Option<&WalletEntry> {
        self.wallets.iter().find(|w| w.address == address)
    }

    /// The wallet currently selected for tracking, if any
    pub fn active_wallet(&self) -> Option<&WalletEntry> {
        self.wallets.iter().find(|w| w.selected)
    }

    pub fn active_wallet_address(&self) -> Option<&str> {
        self.active_wallet().map(|w| w.address.as_str())
    }

    pub fn awaiting_address_input(&self) -> bool {
        self.awaiting_address_input
    }

    pub fn set_awaiting_address_input(&mut self, awaiting: bool) {
        self.awaiting_address_input = awaiting;
    }

    /// Clear the add-wallet flag, returning whether it was set
    pub fn take_awaiting_address_input(&mut self) -> bool {
        std::mem::take(&mut self.awaiting_address_input)
    }

    /// True while at least one watch task is still running.
    ///
    /// A task whose poller has already exited (e.g. after a panic) stays in
    /// the map until the next stop or restart, but does not count.
    pub fn is_tracking(&self) -> bool {
        self.watch_tasks.values().any(|task| !task.is_finished())
    }

    /// Addresses with a watch task, finished or not
    pub fn tracked_addresses(&self) -> Vec<&str> {
        self.watch_tasks.keys().map(String::as_str).collect()
    }

    pub fn watch_task(&self, address: &str) -> Option<&WatchTask> {
        self.watch_tasks.get(address)
    }

    pub(crate) fn insert_watch_task(&mut self, task: WatchTask) -> Option<WatchTask> {
        self.watch_tasks.insert(task.wallet_address().to_string(), task)
    }

    pub(crate) fn take_watch_task(&mut self, address: &str) -> Option<WatchTask> {
        self.watch_tasks.remove(address)
    }

    pub(crate) fn take_watch_tasks(&mut self) -> Vec<WatchTask> {
        self.watch_tasks.drain().map(|(_, task)| task).collect()
    }
}
