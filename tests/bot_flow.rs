//! Chat flows driven through the command layer with a recording transport.

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::*;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use wallet_watch::bot::{menu, Bot};
use wallet_watch::telegram::BotEvent;
use wallet_watch::SessionId;

const CHAT: SessionId = 42;
const OTHER_CHAT: SessionId = 43;
const MENU_MESSAGE: i64 = 7;

fn bot(h: &Harness, transport: &Arc<RecordingTransport>) -> Bot {
    Bot::new(h.service.clone(), transport.clone(), Vec::new()).with_username(Some("watchbot".into()))
}

fn text(chat_id: SessionId, is_private: bool, text: &str) -> BotEvent {
    BotEvent::from_text(chat_id, is_private, text).unwrap()
}

fn press(data: &str) -> BotEvent {
    BotEvent::Callback {
        chat_id: CHAT,
        message_id: MENU_MESSAGE,
        callback_query_id: format!("q-{}", data),
        data: data.to_string(),
    }
}

fn tracking_button(sent: &Sent) -> String {
    let keyboard = sent.keyboard.as_ref().expect("menu without keyboard");
    keyboard.last().unwrap()[0].text.clone()
}

#[tokio::test(start_paused = true)]
async fn menu_flow_adds_selects_and_tracks_a_wallet() {
    let h = harness();
    let transport = RecordingTransport::new();
    let bot = bot(&h, &transport);

    bot.handle_event(text(CHAT, true, "/start")).await;
    let sent = transport.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].text, menu::MENU_PROMPT);
    assert_eq!(sent[0].edited, None);
    assert_eq!(tracking_button(&sent[0]), "Start Tracking");

    transport.clear();
    bot.handle_event(press("add_wallet")).await;
    assert_eq!(transport.answered(), vec!["q-add_wallet".to_string()]);
    let sent = transport.sent();
    assert_eq!(sent[0].edited, Some(MENU_MESSAGE));
    assert_eq!(sent[0].text, menu::ADD_WALLET_PROMPT);
    assert!(h.service.awaiting_address_input(CHAT).await);

    transport.clear();
    bot.handle_event(text(CHAT, true, &format!("{} alpha", ADDR_A))).await;
    assert!(!h.service.awaiting_address_input(CHAT).await);
    let texts = transport.texts();
    assert_eq!(texts[0], "Wallet <code>alpha</code> added to tracking list.");
    assert!(texts[1].starts_with("Tracked Wallets (click to select):"));
    assert!(texts[1].contains("alpha: Error"), "unreachable balance must show an error marker");

    transport.clear();
    bot.handle_event(press("start_tracking")).await;
    assert!(transport.texts()[0].starts_with("Please select a wallet to track"));
    assert!(!h.service.is_tracking(CHAT).await);

    transport.clear();
    bot.handle_event(press(&format!("toggle_wallet_{}", ADDR_A))).await;
    let sent = transport.sent();
    let keyboard = sent[0].keyboard.as_ref().unwrap();
    assert_eq!(keyboard[0][0].text, "alpha ✅");

    transport.clear();
    bot.handle_event(press("start_tracking")).await;
    let sent = transport.sent();
    assert_eq!(sent[0].text, "Started tracking wallet <code>alpha</code>.");
    assert_eq!(sent[1].edited, Some(MENU_MESSAGE));
    assert_eq!(tracking_button(&sent[1]), "Stop Tracking");
    assert!(h.service.is_tracking(CHAT).await);

    transport.clear();
    bot.handle_event(press("stop_tracking")).await;
    let sent = transport.sent();
    assert_eq!(sent[0].text, "Stopped tracking your wallets.");
    assert_eq!(tracking_button(&sent[1]), "Start Tracking");
    assert!(!h.service.is_tracking(CHAT).await);
}

#[tokio::test(start_paused = true)]
async fn start_tracking_without_wallets_asks_for_one() {
    let h = harness();
    let transport = RecordingTransport::new();
    let bot = bot(&h, &transport);

    bot.handle_event(press("start_tracking")).await;
    assert_eq!(transport.texts()[0], "Please add a wallet first.");
}

#[tokio::test(start_paused = true)]
async fn track_and_delete_commands() {
    let h = harness();
    let transport = RecordingTransport::new();
    let bot = bot(&h, &transport);

    bot.handle_event(text(CHAT, true, &format!("/track {} My Main", ADDR_A))).await;
    bot.handle_event(text(CHAT, true, &format!("/track {} copy", ADDR_A))).await;
    bot.handle_event(text(CHAT, true, "/track nope bad")).await;
    bot.handle_event(text(CHAT, true, "/track")).await;

    let texts = transport.texts();
    assert_eq!(
        texts[0],
        format!("Wallet <code>My Main</code> with address <code>{}</code> added to tracking list.", ADDR_A)
    );
    assert_eq!(texts[1], format!("Wallet {} is already being tracked.", ADDR_A));
    assert_eq!(texts[2], "Invalid wallet address. Please try again.");
    assert!(texts[3].starts_with("Please provide a wallet address and a name."));

    h.service.select_wallet(CHAT, ADDR_A).await.unwrap();
    h.service.start_tracking(CHAT).await.unwrap();

    transport.clear();
    bot.handle_event(text(CHAT, true, "/del my main")).await;
    bot.handle_event(text(CHAT, true, "/del my main")).await;
    let texts = transport.texts();
    assert!(texts[0].contains("has been removed from the tracking list."));
    assert_eq!(texts[1], "No wallet found with address or name: my main");
    assert!(!h.service.is_tracking(CHAT).await);
    assert!(h.service.wallets(CHAT).await.is_empty());
}

#[tokio::test(start_paused = true)]
async fn listall_reports_each_wallet() {
    let h = harness();
    let transport = RecordingTransport::new();
    let bot = bot(&h, &transport);

    bot.handle_event(text(CHAT, true, "/listall")).await;
    assert_eq!(transport.texts()[0], "No wallets are currently being tracked.");

    h.ledger.script(ADDR_A, vec![Step::Ok(state(2.5, "S1"))]);
    h.service.add_wallet(CHAT, ADDR_A, "alpha").await.unwrap();
    h.service.add_wallet(CHAT, ADDR_B, "beta").await.unwrap();

    transport.clear();
    bot.handle_event(text(CHAT, true, "/listall")).await;
    bot.handle_event(text(CHAT, true, &format!("/listall {}", ADDR_A))).await;
    bot.handle_event(text(CHAT, true, &format!("/listall {}", ADDR_C))).await;
    bot.handle_event(text(CHAT, true, "/listall ALPHA")).await;

    let texts = transport.texts();
    assert!(texts[0].starts_with("Tracked Wallets:"));
    assert!(texts[0].contains("Balance: 2.5000 SOL"));
    assert!(texts[0].contains("Balance: Error"));
    assert_eq!(
        texts[1],
        format!("Name: alpha\nAddress: <code>{}</code>\nBalance: 2.5000 SOL", ADDR_A)
    );
    assert_eq!(texts[2], format!("Wallet {} is not being tracked.", ADDR_C));
    assert_eq!(texts[3], texts[1], "a wallet can be looked up by name");
}

#[tokio::test(start_paused = true)]
async fn removing_from_the_wallet_view() {
    let h = harness();
    let transport = RecordingTransport::new();
    let bot = bot(&h, &transport);
    h.service.add_wallet(CHAT, ADDR_A, "alpha").await.unwrap();
    h.service.add_wallet(CHAT, ADDR_B, "beta").await.unwrap();

    bot.handle_event(press(&format!("remove_wallet_{}", ADDR_A))).await;
    let sent = transport.sent();
    assert_eq!(sent[0].text, "Wallet <code>alpha</code> removed from tracking list.");
    let keyboard = sent[1].keyboard.as_ref().unwrap();
    assert_eq!(keyboard.len(), 2, "one wallet row plus the back button");
    assert_eq!(keyboard[0][0].text, "beta");

    transport.clear();
    bot.handle_event(press(&format!("remove_wallet_{}", ADDR_A))).await;
    assert_eq!(transport.texts()[0], "Wallet not found in your tracking list.");
}

#[tokio::test(start_paused = true)]
async fn free_text_outside_the_add_flow() {
    let h = harness();
    let transport = RecordingTransport::new();
    let bot = bot(&h, &transport);

    bot.handle_event(text(CHAT, true, ADDR_A)).await;
    assert!(transport.texts()[0].starts_with("Please press 'Add Wallet to Track'"));
    assert!(h.service.wallets(CHAT).await.is_empty());

    transport.clear();
    bot.handle_event(text(-100, false, "just chatting")).await;
    assert!(transport.sent().is_empty());

    bot.handle_event(text(-100, false, "hey @watchbot")).await;
    assert!(transport.texts()[0].starts_with("Hello!"));
}

#[tokio::test(start_paused = true)]
async fn malformed_wallet_input_ends_the_add_flow() {
    let h = harness();
    let transport = RecordingTransport::new();
    let bot = bot(&h, &transport);

    bot.handle_event(press("add_wallet")).await;
    transport.clear();
    bot.handle_event(text(CHAT, true, ADDR_A)).await;
    assert!(transport.texts()[0].starts_with("Please send the wallet address followed by a name"));
    assert!(!h.service.awaiting_address_input(CHAT).await);

    bot.handle_event(press("add_wallet")).await;
    bot.handle_event(press("back_to_main")).await;
    assert!(!h.service.awaiting_address_input(CHAT).await);
}

#[tokio::test(start_paused = true)]
async fn ignores_chats_outside_the_allow_list() {
    let h = harness();
    let transport = RecordingTransport::new();
    let bot = Bot::new(h.service.clone(), transport.clone(), vec![CHAT]);

    bot.handle_event(text(99, true, "/start")).await;
    assert!(transport.sent().is_empty());

    bot.handle_event(text(CHAT, true, "/start")).await;
    assert_eq!(transport.sent().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn run_loop_processes_queued_events_until_cancelled() {
    let h = harness();
    let transport = RecordingTransport::new();
    let bot = Arc::new(bot(&h, &transport));

    let (tx, rx) = mpsc::channel(8);
    let cancel = CancellationToken::new();
    let handle = tokio::spawn(bot.run(rx, cancel.clone()));

    tx.send(text(CHAT, true, "/list")).await.unwrap();
    drop(tx);
    handle.await.unwrap();

    assert!(transport.texts()[0].starts_with("Available commands:"));
    assert!(!cancel.is_cancelled());
}

#[tokio::test(start_paused = true)]
async fn events_of_one_chat_are_handled_in_arrival_order() {
    let h = harness();
    let transport = RecordingTransport::new();
    transport.set_answer_delay(Duration::from_millis(300));
    let bot = Arc::new(bot(&h, &transport));

    let (tx, rx) = mpsc::channel(8);
    let handle = tokio::spawn(bot.run(rx, CancellationToken::new()));

    tx.send(press("stop_tracking")).await.unwrap();
    tx.send(text(CHAT, true, "/list")).await.unwrap();
    tx.send(text(OTHER_CHAT, true, "/list")).await.unwrap();
    drop(tx);
    handle.await.unwrap();

    let sent = transport.sent();
    let replies: Vec<&str> = sent
        .iter()
        .filter(|s| s.chat_id == CHAT)
        .map(|s| s.text.as_str())
        .collect();
    assert_eq!(replies.len(), 3);
    assert_eq!(replies[0], "Stopped tracking your wallets.");
    assert_eq!(replies[1], menu::MENU_PROMPT);
    assert!(replies[2].starts_with("Available commands:"));

    // a slow callback in one chat does not hold up another chat
    assert_eq!(sent[0].chat_id, OTHER_CHAT);
}

#[tokio::test(start_paused = true)]
async fn add_flow_consumes_only_the_first_text() {
    let h = harness();
    let transport = RecordingTransport::new();
    let bot = Arc::new(bot(&h, &transport));

    let (tx, rx) = mpsc::channel(8);
    let handle = tokio::spawn(bot.run(rx, CancellationToken::new()));

    tx.send(press("add_wallet")).await.unwrap();
    tx.send(text(CHAT, true, &format!("{} alpha", ADDR_A))).await.unwrap();
    tx.send(text(CHAT, true, &format!("{} beta", ADDR_B))).await.unwrap();
    drop(tx);
    handle.await.unwrap();

    let wallets = h.service.wallets(CHAT).await;
    assert_eq!(wallets.len(), 1);
    assert_eq!(wallets[0].name, "alpha");

    let texts = transport.texts();
    assert!(texts.last().unwrap().starts_with("Please press 'Add Wallet to Track'"));
    assert!(!h.service.awaiting_address_input(CHAT).await);
}
