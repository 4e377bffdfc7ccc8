//! Menu texts and inline keyboards.

use super::commands::CallbackAction;
use crate::models::wallet::WalletListing;
use crate::telegram::{InlineButton, InlineKeyboard};
use crate::utils::helper::escape_html;

pub const MENU_PROMPT: &str = "Please select an option:";
pub const ADD_WALLET_PROMPT: &str = "Please send the wallet address and a name, separated by a space:";

fn button(text: &str, action: CallbackAction) -> InlineButton {
    InlineButton::new(text, action.data())
}

/// Main menu; the last row toggles between starting and stopping tracking
pub fn main_menu(tracking: bool) -> InlineKeyboard {
    let tracking_button = if tracking {
        button("Stop Tracking", CallbackAction::StopTracking)
    } else {
        button("Start Tracking", CallbackAction::StartTracking)
    };

    vec![
        vec![button("Add Wallet to Track", CallbackAction::AddWallet)],
        vec![button("View Tracked Wallets", CallbackAction::ViewWallets)],
        vec![tracking_button],
    ]
}

/// Shown while the bot waits for `<address> <name>` input
pub fn waiting_menu() -> InlineKeyboard {
    vec![
        vec![button("Waiting for Wallet...", CallbackAction::AddWalletWaiting)],
        vec![button("Cancel", CallbackAction::BackToMain)],
    ]
}

/// Wallet picker: one row per wallet to select it or remove it
pub fn wallets_view(listings: &[WalletListing]) -> (String, InlineKeyboard) {
    let mut lines = Vec::with_capacity(listings.len());
    let mut keyboard: InlineKeyboard = Vec::with_capacity(listings.len() + 1);

    for listing in listings {
        let wallet = &listing.wallet;
        let label = if wallet.selected {
            format!("{} ✅", wallet.name)
        } else {
            wallet.name.clone()
        };

        keyboard.push(vec![
            button(&label, CallbackAction::ToggleWallet(wallet.address.clone())),
            button("🗑", CallbackAction::RemoveWallet(wallet.address.clone())),
        ]);
        lines.push(format!("{}: {}", escape_html(&wallet.name), listing.balance.render()));
    }
    keyboard.push(vec![button("Back", CallbackAction::BackToMain)]);

    let text = format!("Tracked Wallets (click to select):\n\n{}", lines.join("\n"));
    (text, keyboard)
}

/// Plain listing used by `/listall`
pub fn wallets_report(listings: &[WalletListing]) -> String {
    let mut message = String::from("Tracked Wallets:\n\n");
    for listing in listings {
        message.push_str(&wallet_report(listing));
        message.push_str("\n\n");
    }
    message.trim_end().to_string()
}

pub fn wallet_report(listing: &WalletListing) -> String {
    format!(
        "Name: {}\nAddress: <code>{}</code>\nBalance: {}",
        escape_html(&listing.wallet.name),
        escape_html(&listing.wallet.address),
        listing.balance.render()
    )
}
