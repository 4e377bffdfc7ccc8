/// A named wallet registered in a chat session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalletEntry {
    pub address: String,
    pub name: String,
    pub selected: bool,
}

impl WalletEntry {
    pub fn new(address: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            name: name.into(),
            selected: false,
        }
    }

    /// Match by exact address or case-insensitive name
    pub fn matches(&self, identifier: &str) -> bool {
        self.address == identifier || self.name.to_lowercase() == identifier.to_lowercase()
    }
}

/// Live balance shown next to a wallet in listings.
#[derive(Debug, Clone, PartialEq)]
pub enum BalanceView {
    Sol(f64),
    Error,
}

impl BalanceView {
    pub fn render(&self) -> String {
        match self {
            BalanceView::Sol(sol) => format!("{:.4} SOL", sol),
            BalanceView::Error => "Error".to_string(),
        }
    }
}

/// Wallet entry paired with the balance fetched when it was listed
#[derive(Debug, Clone)]
pub struct WalletListing {
    pub wallet: WalletEntry,
    pub balance: BalanceView,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_by_address_or_name() {
        let wallet = WalletEntry::new("Addr111", "Cold Storage");
        assert!(wallet.matches("Addr111"));
        assert!(wallet.matches("cold storage"));
        assert!(!wallet.matches("addr111"));
        assert!(!wallet.matches("Cold"));
    }

    #[test]
    fn balance_view_renders_error_marker() {
        assert_eq!(BalanceView::Sol(1.5).render(), "1.5000 SOL");
        assert_eq!(BalanceView::Error.render(), "Error");
    }
}
