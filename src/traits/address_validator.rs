use std::str::FromStr;

use solana_sdk::pubkey::Pubkey;
use tracing::debug;

/// Checks the format of a user supplied wallet address
pub trait AddressValidator: Send + Sync {
    fn is_valid_address(&self, address: &str) -> bool;
}

/// Accepts base58 strings that decode to a 32 byte public key
#[derive(Debug, Clone, Copy, Default)]
pub struct SolanaAddressValidator;

impl AddressValidator for SolanaAddressValidator {
    fn is_valid_address(&self, address: &str) -> bool {
        match Pubkey::from_str(address) {
            Ok(_) => true,
            Err(e) => {
                debug!("Address validation failed for {}: {}", address, e);
                false
            }
        }
    }
}
