//! Error types shared by the registry, the watch manager and the collaborators.

use thiserror::Error;

/// Failures returned to the command layer by registry and tracking operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WalletError {
    #[error("wallet {0} is already in the tracking list")]
    DuplicateWallet(String),

    #[error("wallet {0} not found in the tracking list")]
    WalletNotFound(String),

    #[error("no wallet selected for tracking")]
    NoWalletSelected,

    #[error("no wallets registered")]
    NoWalletsRegistered,

    #[error("invalid wallet address: {0}")]
    InvalidAddress(String),
}

/// Failure of a single ledger query. Absorbed by the poller.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("rpc request failed: {0}")]
    Rpc(String),

    #[error("ledger query timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("cannot query invalid address {0}")]
    InvalidAddress(String),
}

/// Failure to deliver a notification. Logged and swallowed by the poller.
#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("telegram api error: {0}")]
    Api(String),
}
