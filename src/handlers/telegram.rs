use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::error::DeliveryError;
use crate::models::ledger::WalletUpdate;
use crate::session::SessionId;
use crate::telegram::ChatTransport;
use crate::traits::notifier::Notifier;

/// Sends wallet updates back to the chat that is watching the wallet
pub struct TelegramNotifier {
    transport: Arc<dyn ChatTransport>,
}

impl TelegramNotifier {
    /// Create a new Telegram notifier
    pub fn new(transport: Arc<dyn ChatTransport>) -> Self {
        Self { transport }
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn notify(&self, session_id: SessionId, update: &WalletUpdate) -> Result<(), DeliveryError> {
        let message = update.format_for_telegram();
        self.transport.send_message(session_id, &message, None).await?;
        debug!(session_id, "Telegram notification sent for {}", update.wallet_address);
        Ok(())
    }
}
