//! Background watching of wallets: the poll loop and the tasks that run it

pub mod poller;
pub mod task;
pub mod watch_manager;

// Re-export for convenience
pub use poller::{Poller, PollerConfig};
pub use task::WatchTask;
pub use watch_manager::WatchManager;
