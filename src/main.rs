use std::sync::Arc;

use anyhow::Context;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use wallet_watch::bot::Bot;
use wallet_watch::config::BotConfig;
use wallet_watch::telegram::{BotEvent, ChatTransport, TelegramClient};
use wallet_watch::{
    CompositeNotifier, ConsoleNotifier, RpcLedgerClient, SessionStore, SolanaAddressValidator,
    TelegramNotifier, WalletWatchService,
};

/// Buffered updates between the Telegram poller and the command loop
const EVENT_QUEUE_SIZE: usize = 256;

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = BotConfig::from_env().context("failed to load configuration")?;

    // Initialize logging
    tracing_subscriber::fmt()
        .with_level(true)
        .with_target(false)
        .with_max_level(config.log_level)
        .with_file(true)
        .with_line_number(true)
        .init();

    tokio::runtime::Runtime::new()?.block_on(run(config))
}

async fn run(config: BotConfig) -> anyhow::Result<()> {
    info!("Initializing wallet watch bot...");
    info!("RPC URL: {}", config.rpc_url);
    info!(
        "Poll interval: {:?}, fetch timeout: {:?}",
        config.poller.poll_interval, config.poller.fetch_timeout
    );

    let client = Arc::new(TelegramClient::new(config.telegram_token.clone())?);
    let transport: Arc<dyn ChatTransport> = client.clone();

    let username = match client.get_me().await {
        Ok(username) => username,
        Err(e) => {
            warn!("Could not fetch bot username, mentions will be ignored: {}", e);
            None
        }
    };

    let mut notifier = CompositeNotifier::new();
    notifier.add_notifier(Arc::new(TelegramNotifier::new(transport.clone())));
    notifier.add_notifier(Arc::new(ConsoleNotifier::new()));

    let ledger = Arc::new(RpcLedgerClient::new(
        config.rpc_url.clone(),
        config.poller.fetch_timeout,
    ));

    let service = Arc::new(WalletWatchService::new(
        Arc::new(SessionStore::new()),
        Arc::new(SolanaAddressValidator),
        ledger,
        Arc::new(notifier),
        config.poller,
    ));

    let bot = Arc::new(
        Bot::new(service.clone(), transport, config.allowed_chat_ids.clone()).with_username(username),
    );

    let cancel = CancellationToken::new();
    let (tx, rx) = mpsc::channel::<BotEvent>(EVENT_QUEUE_SIZE);

    let updates = {
        let client = client.clone();
        let cancel = cancel.clone();
        tokio::spawn(async move { client.run(tx, cancel).await })
    };
    let commands = tokio::spawn(bot.run(rx, cancel.clone()));

    info!("Wallet watch bot is running. Press Ctrl+C to stop.");

    tokio::signal::ctrl_c().await?;
    info!("Shutting down...");

    cancel.cancel();
    if let Err(e) = updates.await {
        warn!("Update loop ended abnormally: {}", e);
    }
    if let Err(e) = commands.await {
        warn!("Command loop ended abnormally: {}", e);
    }
    service.shutdown().await;

    Ok(())
}
