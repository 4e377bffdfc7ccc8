use chrono::{DateTime, Utc};

use crate::utils::helper::{escape_html, lamports_to_sol, truncate_string};

/// Balance and latest transaction signature observed for one wallet.
///
/// The balance is kept in lamports so that change detection is exact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerState {
    pub lamports: u64,
    pub latest_signature: Option<String>,
}

impl LedgerState {
    pub fn new(lamports: u64, latest_signature: Option<String>) -> Self {
        Self { lamports, latest_signature }
    }

    /// Balance in SOL
    pub fn sol(&self) -> f64 {
        lamports_to_sol(self.lamports)
    }
}

/// A detected change for a watched wallet, handed to the notifier.
#[derive(Debug, Clone)]
pub struct WalletUpdate {
    pub wallet_name: String,
    pub wallet_address: String,
    pub previous: LedgerState,
    pub current: LedgerState,
    pub detected_at: DateTime<Utc>,
}

impl WalletUpdate {
    pub fn new(
        wallet_name: impl Into<String>,
        wallet_address: impl Into<String>,
        previous: LedgerState,
        current: LedgerState,
    ) -> Self {
        Self {
            wallet_name: wallet_name.into(),
            wallet_address: wallet_address.into(),
            previous,
            current,
            detected_at: Utc::now(),
        }
    }

    /// Signed balance change in SOL
    pub fn balance_change(&self) -> f64 {
        self.current.sol() - self.previous.sol()
    }

    pub fn balance_changed(&self) -> bool {
        self.previous.lamports != self.current.lamports
    }

    /// The latest signature, if it differs from the one seen before.
    pub fn new_signature(&self) -> Option<&str> {
        if self.current.latest_signature != self.previous.latest_signature {
            self.current.latest_signature.as_deref()
        } else {
            None
        }
    }

    /// Format the update as a Telegram HTML message
    pub fn format_for_telegram(&self) -> String {
        let mut lines = Vec::new();
        let timestamp = self.detected_at.format("%Y-%m-%d %H:%M:%S");

        lines.push(format!("⏰ <b>{}</b>", timestamp));
        lines.push(format!(
            "🔔 <b>Wallet activity:</b> {}",
            escape_html(&self.wallet_name)
        ));
        lines.push(format!(
            "👛 <code>{}</code>",
            escape_html(&self.wallet_address)
        ));

        if self.balance_changed() {
            let change = self.balance_change();
            let change_emoji = if change > 0.0 { "📈" } else { "📉" };
            lines.push(format!(
                "\n{} <b>Balance:</b> {:.4} → {:.4} SOL ({:+.4})",
                change_emoji,
                self.previous.sol(),
                self.current.sol(),
                change
            ));
        } else {
            lines.push(format!("\n🪙 <b>Balance:</b> {:.4} SOL", self.current.sol()));
        }

        if let Some(signature) = self.new_signature() {
            lines.push(format!(
                "🧾 <b>New transaction:</b> <a href=\"https://solscan.io/tx/{}\">{}</a>",
                signature,
                escape_html(&truncate_string(signature, 24))
            ));
        }

        lines.join("\n")
    }
}
