use async_trait::async_trait;

use crate::error::DeliveryError;
use crate::models::ledger::WalletUpdate;
use crate::session::SessionId;

/// Delivers wallet change notifications to a chat session
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver one update; failures are reported but never retried here
    async fn notify(&self, session_id: SessionId, update: &WalletUpdate) -> Result<(), DeliveryError>;
}
