//! Telegram command layer.
//!
//! Slash commands, inline menu buttons and free text input are all thin
//! callers into [`WalletWatchService`]; this module only renders results.

pub mod commands;
pub mod menu;

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::mpsc::{self, error::SendError, Receiver, UnboundedSender};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::WalletError;
use crate::service::WalletWatchService;
use crate::session::SessionId;
use crate::telegram::{BotEvent, ChatTransport, InlineKeyboard};
use crate::utils::helper::escape_html;
use commands::{parse_wallet_input, CallbackAction, Command, HELP_TEXT};

const ADD_WALLET_FIRST: &str = "Please add a wallet first.";
const SELECT_WALLET_FIRST: &str =
    "Please select a wallet to track from the 'View Tracked Wallets' menu.";
const INVALID_ADDRESS: &str = "Invalid wallet address. Please try again.";

pub struct Bot {
    service: Arc<WalletWatchService>,
    transport: Arc<dyn ChatTransport>,
    allowed_chat_ids: Vec<SessionId>,
    username: Option<String>,
}

impl Bot {
    pub fn new(
        service: Arc<WalletWatchService>,
        transport: Arc<dyn ChatTransport>,
        allowed_chat_ids: Vec<SessionId>,
    ) -> Self {
        Self {
            service,
            transport,
            allowed_chat_ids,
            username: None,
        }
    }

    /// Bot username, used to answer mentions in group chats
    pub fn with_username(mut self, username: Option<String>) -> Self {
        self.username = username;
        self
    }

    fn is_chat_allowed(&self, chat_id: SessionId) -> bool {
        self.allowed_chat_ids.is_empty() || self.allowed_chat_ids.contains(&chat_id)
    }

    /// Handle events until cancelled or the event stream ends.
    ///
    /// Chats are served concurrently, each by its own worker, while the events
    /// of one chat are handled one at a time in arrival order. Events already
    /// queued for a chat are handled before this returns.
    pub async fn run(self: Arc<Self>, mut events: Receiver<BotEvent>, cancel: CancellationToken) {
        let mut queues: HashMap<SessionId, UnboundedSender<BotEvent>> = HashMap::new();
        let mut workers = JoinSet::new();

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                Some(result) = workers.join_next(), if !workers.is_empty() => {
                    if let Err(e) = result {
                        warn!("Chat worker panicked: {}", e);
                    }
                }
                event = events.recv() => {
                    let Some(event) = event else { break };
                    if !self.is_chat_allowed(event.chat_id()) {
                        debug!("Ignoring event from chat {}", event.chat_id());
                        continue;
                    }
                    self.dispatch(&mut queues, &mut workers, event);
                }
            }
        }

        // closing the queues lets every worker drain and exit
        queues.clear();
        while let Some(result) = workers.join_next().await {
            if let Err(e) = result {
                warn!("Chat worker panicked: {}", e);
            }
        }
        info!("Command loop stopped");
    }

    /// Queue `event` on its chat's worker, starting one if the chat has none
    /// or its worker has died.
    fn dispatch(
        self: &Arc<Self>,
        queues: &mut HashMap<SessionId, UnboundedSender<BotEvent>>,
        workers: &mut JoinSet<()>,
        event: BotEvent,
    ) {
        let chat_id = event.chat_id();
        let event = match queues.get(&chat_id) {
            Some(queue) => match queue.send(event) {
                Ok(()) => return,
                Err(SendError(event)) => event,
            },
            None => event,
        };

        let (queue, mut pending) = mpsc::unbounded_channel();
        let bot = self.clone();
        workers.spawn(async move {
            while let Some(event) = pending.recv().await {
                bot.handle_event(event).await;
            }
        });

        // the receiver lives in the worker spawned above
        let _ = queue.send(event);
        queues.insert(chat_id, queue);
    }

    pub async fn handle_event(&self, event: BotEvent) {
        let chat_id = event.chat_id();
        if !self.is_chat_allowed(chat_id) {
            debug!("Ignoring event from chat {}", chat_id);
            return;
        }

        match event {
            BotEvent::Command { chat_id, command, args } => match Command::parse(&command, &args) {
                Ok(command) => self.handle_command(chat_id, command).await,
                Err(usage) => self.reply(chat_id, usage).await,
            },
            BotEvent::Callback { chat_id, message_id, callback_query_id, data } => {
                self.transport.answer_callback(&callback_query_id).await;
                match CallbackAction::parse(&data) {
                    Some(action) => self.handle_callback(chat_id, message_id, action).await,
                    None => debug!("Unknown callback data {:?}", data),
                }
            }
            BotEvent::Message { chat_id, is_private, text } => {
                self.handle_text(chat_id, is_private, &text).await
            }
        }
    }

    async fn handle_command(&self, chat_id: SessionId, command: Command) {
        debug!(session_id = chat_id, "Command {:?}", command);

        match command {
            Command::Start | Command::Menu => self.show_main_menu(chat_id, None).await,
            Command::Help => self.reply(chat_id, HELP_TEXT).await,
            Command::Track { address, name } => {
                let text = match self.service.add_wallet(chat_id, &address, &name).await {
                    Ok(wallet) => format!(
                        "Wallet <code>{}</code> with address <code>{}</code> added to tracking list.",
                        escape_html(&wallet.name),
                        escape_html(&wallet.address)
                    ),
                    Err(WalletError::DuplicateWallet(address)) => {
                        format!("Wallet {} is already being tracked.", escape_html(&address))
                    }
                    Err(WalletError::InvalidAddress(_)) => INVALID_ADDRESS.to_string(),
                    Err(e) => escape_html(&e.to_string()),
                };
                self.reply(chat_id, &text).await;
            }
            Command::ListAll { address } => self.list_all(chat_id, address.as_deref()).await,
            Command::Delete { identifier } => {
                let text = match self.service.remove_wallet_matching(chat_id, &identifier).await {
                    Ok(wallet) => format!(
                        "Wallet <code>{}</code> with address <code>{}</code> has been removed from the tracking list.",
                        escape_html(&wallet.name),
                        escape_html(&wallet.address)
                    ),
                    Err(_) => format!(
                        "No wallet found with address or name: {}",
                        escape_html(&identifier)
                    ),
                };
                self.reply(chat_id, &text).await;
            }
            Command::Unknown(name) => debug!("Ignoring unknown command /{}", name),
        }
    }

    /// `/listall`, optionally narrowed to one wallet by address or name
    async fn list_all(&self, chat_id: SessionId, identifier: Option<&str>) {
        if self.service.wallets(chat_id).await.is_empty() {
            self.reply(chat_id, "No wallets are currently being tracked.").await;
            return;
        }

        let text = match identifier {
            Some(identifier) => {
                let listing = match self.service.find_wallet(chat_id, identifier).await {
                    Some(wallet) => self.service.wallet_balance(chat_id, &wallet.address).await.ok(),
                    None => None,
                };
                match listing {
                    Some(listing) => menu::wallet_report(&listing),
                    None => format!("Wallet {} is not being tracked.", escape_html(identifier)),
                }
            }
            None => menu::wallets_report(&self.service.list_wallets(chat_id).await),
        };
        self.reply(chat_id, &text).await;
    }

    async fn handle_callback(&self, chat_id: SessionId, message_id: i64, action: CallbackAction) {
        debug!(session_id = chat_id, "Callback {:?}", action);

        match action {
            CallbackAction::AddWallet => {
                self.service.set_awaiting_address_input(chat_id, true).await;
                let keyboard = menu::waiting_menu();
                self.present(chat_id, Some(message_id), menu::ADD_WALLET_PROMPT, Some(&keyboard))
                    .await;
            }
            CallbackAction::AddWalletWaiting => {}
            CallbackAction::ViewWallets => self.show_wallets(chat_id, Some(message_id)).await,
            CallbackAction::StartTracking => match self.service.start_tracking(chat_id).await {
                Ok(wallet) => {
                    let text = format!("Started tracking wallet <code>{}</code>.", escape_html(&wallet.name));
                    self.reply(chat_id, &text).await;
                    self.show_main_menu(chat_id, Some(message_id)).await;
                }
                Err(WalletError::NoWalletSelected) => {
                    self.reply(chat_id, SELECT_WALLET_FIRST).await;
                    self.show_wallets(chat_id, Some(message_id)).await;
                }
                Err(_) => {
                    self.reply(chat_id, ADD_WALLET_FIRST).await;
                    self.show_main_menu(chat_id, Some(message_id)).await;
                }
            },
            CallbackAction::StopTracking => {
                self.service.stop_tracking(chat_id).await;
                self.reply(chat_id, "Stopped tracking your wallets.").await;
                self.show_main_menu(chat_id, Some(message_id)).await;
            }
            CallbackAction::BackToMain => {
                self.service.set_awaiting_address_input(chat_id, false).await;
                self.show_main_menu(chat_id, Some(message_id)).await;
            }
            CallbackAction::ToggleWallet(address) => {
                if self.service.select_wallet(chat_id, &address).await.is_err() {
                    self.reply(chat_id, "Wallet not found in your tracking list.").await;
                }
                self.show_wallets(chat_id, Some(message_id)).await;
            }
            CallbackAction::RemoveWallet(address) => {
                let text = match self.service.remove_wallet(chat_id, &address).await {
                    Ok(wallet) => format!(
                        "Wallet <code>{}</code> removed from tracking list.",
                        escape_html(&wallet.name)
                    ),
                    Err(_) => "Wallet not found in your tracking list.".to_string(),
                };
                self.reply(chat_id, &text).await;
                self.show_wallets(chat_id, Some(message_id)).await;
            }
        }
    }

    async fn handle_text(&self, chat_id: SessionId, is_private: bool, text: &str) {
        if !self.service.take_awaiting_address_input(chat_id).await {
            if is_private {
                self.reply(
                    chat_id,
                    "Please press 'Add Wallet to Track' before sending a wallet address.",
                )
                .await;
            } else if self.is_mentioned(text) {
                self.reply(
                    chat_id,
                    "Hello! I'm here to help. Use /list to see available commands.",
                )
                .await;
            }
            return;
        }

        let Some((address, name)) = parse_wallet_input(text) else {
            self.reply(
                chat_id,
                "Please send the wallet address followed by a name, separated by a space.",
            )
            .await;
            return;
        };

        match self.service.add_wallet(chat_id, address, name).await {
            Ok(wallet) => {
                let text = format!("Wallet <code>{}</code> added to tracking list.", escape_html(&wallet.name));
                self.reply(chat_id, &text).await;
                self.show_wallets(chat_id, None).await;
            }
            Err(WalletError::DuplicateWallet(_)) => {
                let text = format!(
                    "Wallet <code>{}</code> is already in your tracking list.",
                    escape_html(name)
                );
                self.reply(chat_id, &text).await;
            }
            Err(_) => self.reply(chat_id, INVALID_ADDRESS).await,
        }
    }

    fn is_mentioned(&self, text: &str) -> bool {
        match &self.username {
            Some(username) => text.contains(&format!("@{}", username)),
            None => false,
        }
    }

    async fn show_main_menu(&self, chat_id: SessionId, message_id: Option<i64>) {
        let keyboard = menu::main_menu(self.service.is_tracking(chat_id).await);
        self.present(chat_id, message_id, menu::MENU_PROMPT, Some(&keyboard)).await;
    }

    async fn show_wallets(&self, chat_id: SessionId, message_id: Option<i64>) {
        let listings = self.service.list_wallets(chat_id).await;
        if listings.is_empty() {
            self.reply(chat_id, ADD_WALLET_FIRST).await;
            return;
        }

        let (text, keyboard) = menu::wallets_view(&listings);
        self.present(chat_id, message_id, &text, Some(&keyboard)).await;
    }

    /// Edit the menu message when there is one, send a new message otherwise
    async fn present(
        &self,
        chat_id: SessionId,
        message_id: Option<i64>,
        text: &str,
        keyboard: Option<&InlineKeyboard>,
    ) {
        let result = match message_id {
            Some(message_id) => {
                self.transport
                    .edit_message(chat_id, message_id, text, keyboard)
                    .await
            }
            None => self.transport.send_message(chat_id, text, keyboard).await,
        };
        if let Err(e) = result {
            warn!(session_id = chat_id, "Failed to render menu: {}", e);
        }
    }

    async fn reply(&self, chat_id: SessionId, text: &str) {
        if let Err(e) = self.transport.send_message(chat_id, text, None).await {
            warn!(session_id = chat_id, "Failed to send reply: {}", e);
        }
    }
}
