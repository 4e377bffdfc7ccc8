//! Parsing of slash commands and inline button callbacks.

pub const HELP_TEXT: &str = "Available commands:\n\n\
/start - Start the bot and show the main menu\n\
/menu - Show the main menu\n\
/track &lt;wallet_address&gt; &lt;wallet_name&gt; - Add a new wallet to track\n\
/listall [wallet_address] - List tracked wallets with their balance\n\
/del &lt;wallet_address_or_name&gt; - Delete a tracked wallet\n\
/list - Show this list of commands";

pub const TRACK_USAGE: &str = "Please provide a wallet address and a name. \
Usage: /track &lt;wallet_address&gt; &lt;wallet_name&gt;";

pub const DEL_USAGE: &str = "Please provide a wallet address or name to delete. \
Usage: /del &lt;wallet_address_or_name&gt;";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start,
    Menu,
    Track { address: String, name: String },
    ListAll { address: Option<String> },
    Delete { identifier: String },
    Help,
    Unknown(String),
}

impl Command {
    /// Parse a command name and its whitespace separated arguments.
    ///
    /// Returns the usage text when required arguments are missing.
    pub fn parse(command: &str, args: &[String]) -> Result<Self, &'static str> {
        match command {
            "start" => Ok(Command::Start),
            "menu" => Ok(Command::Menu),
            "track" => match args {
                [address, name @ ..] if !name.is_empty() => Ok(Command::Track {
                    address: address.clone(),
                    name: name.join(" "),
                }),
                _ => Err(TRACK_USAGE),
            },
            "listall" => Ok(Command::ListAll { address: args.first().cloned() }),
            "del" => {
                if args.is_empty() {
                    Err(DEL_USAGE)
                } else {
                    Ok(Command::Delete { identifier: args.join(" ") })
                }
            }
            "list" => Ok(Command::Help),
            other => Ok(Command::Unknown(other.to_string())),
        }
    }
}

const TOGGLE_PREFIX: &str = "toggle_wallet_";
const REMOVE_PREFIX: &str = "remove_wallet_";

/// Action encoded in an inline button's callback data
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackAction {
    AddWallet,
    AddWalletWaiting,
    ViewWallets,
    StartTracking,
    StopTracking,
    BackToMain,
    ToggleWallet(String),
    RemoveWallet(String),
}

impl CallbackAction {
    pub fn parse(data: &str) -> Option<Self> {
        let action = match data {
            "add_wallet" => CallbackAction::AddWallet,
            "add_wallet_waiting" => CallbackAction::AddWalletWaiting,
            "view_wallets" => CallbackAction::ViewWallets,
            "start_tracking" => CallbackAction::StartTracking,
            "stop_tracking" => CallbackAction::StopTracking,
            "back_to_main" => CallbackAction::BackToMain,
            other => {
                if let Some(address) = other.strip_prefix(TOGGLE_PREFIX) {
                    CallbackAction::ToggleWallet(address.to_string())
                } else if let Some(address) = other.strip_prefix(REMOVE_PREFIX) {
                    CallbackAction::RemoveWallet(address.to_string())
                } else {
                    return None;
                }
            }
        };
        Some(action)
    }

    pub fn data(&self) -> String {
        match self {
            CallbackAction::AddWallet => "add_wallet".into(),
            CallbackAction::AddWalletWaiting => "add_wallet_waiting".into(),
            CallbackAction::ViewWallets => "view_wallets".into(),
            CallbackAction::StartTracking => "start_tracking".into(),
            CallbackAction::StopTracking => "stop_tracking".into(),
            CallbackAction::BackToMain => "back_to_main".into(),
            CallbackAction::ToggleWallet(address) => format!("{}{}", TOGGLE_PREFIX, address),
            CallbackAction::RemoveWallet(address) => format!("{}{}", REMOVE_PREFIX, address),
        }
    }
}

/// Split free text of the form `<address> <name...>`
pub fn parse_wallet_input(text: &str) -> Option<(&str, &str)> {
    let (address, name) = text.trim().split_once(char::is_whitespace)?;
    let name = name.trim();
    if name.is_empty() {
        None
    } else {
        Some((address, name))
    }
}
