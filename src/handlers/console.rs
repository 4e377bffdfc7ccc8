use async_trait::async_trait;
use tracing::info;

use crate::error::DeliveryError;
use crate::models::ledger::WalletUpdate;
use crate::session::SessionId;
use crate::traits::notifier::Notifier;

/// Console logging notifier
#[derive(Debug, Default)]
pub struct ConsoleNotifier;

impl ConsoleNotifier {
    /// Create a new console notifier
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Notifier for ConsoleNotifier {
    async fn notify(&self, session_id: SessionId, update: &WalletUpdate) -> Result<(), DeliveryError> {
        info!("Wallet change detected for chat {}:", session_id);
        info!("{}", "-".repeat(80));
        info!("  Wallet: {} ({})", update.wallet_name, update.wallet_address);

        if update.balance_changed() {
            let indicator = if update.balance_change() > 0.0 { "↑" } else { "↓" };
            info!(
                "  {} Balance: {:.9} → {:.9} SOL ({:+.9})",
                indicator,
                update.previous.sol(),
                update.current.sol(),
                update.balance_change()
            );
        }
        if let Some(signature) = update.new_signature() {
            info!("  New transaction: {}", signature);
        }

        info!("{}", "=".repeat(80));
        Ok(())
    }
}
