//! Runtime configuration read from the environment (and `.env`).

use std::str::FromStr;
use std::time::Duration;

use anyhow::Context;
use tracing::level_filters::LevelFilter;

use crate::session::SessionId;
use crate::tracker::poller::{PollerConfig, DEFAULT_FETCH_TIMEOUT, DEFAULT_POLL_INTERVAL};

pub const DEFAULT_RPC_URL: &str = "https://api.mainnet-beta.solana.com";

#[derive(Debug, Clone)]
pub struct BotConfig {
    pub telegram_token: String,
    pub rpc_url: String,
    pub poller: PollerConfig,
    /// Chats the bot answers in. Empty = all chats.
    pub allowed_chat_ids: Vec<SessionId>,
    pub log_level: LevelFilter,
}

impl BotConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from any key lookup, e.g. a map in tests
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let telegram_token = lookup("TELEGRAM_TOKEN")
            .filter(|token| !token.trim().is_empty())
            .context("TELEGRAM_TOKEN must be set")?;

        let rpc_url = lookup("SOLANA_RPC_URL").unwrap_or_else(|| DEFAULT_RPC_URL.to_string());

        let poll_interval = parse_secs(&lookup, "POLL_INTERVAL_SECS")?.unwrap_or(DEFAULT_POLL_INTERVAL);
        let fetch_timeout = parse_secs(&lookup, "FETCH_TIMEOUT_SECS")?.unwrap_or(DEFAULT_FETCH_TIMEOUT);
        if poll_interval.is_zero() {
            anyhow::bail!("POLL_INTERVAL_SECS must be greater than zero");
        }

        let allowed_chat_ids = match lookup("ALLOWED_CHAT_IDS") {
            Some(raw) => raw
                .split(',')
                .map(str::trim)
                .filter(|id| !id.is_empty())
                .map(|id| {
                    id.parse::<SessionId>()
                        .with_context(|| format!("invalid chat id in ALLOWED_CHAT_IDS: {}", id))
                })
                .collect::<anyhow::Result<Vec<_>>>()?,
            None => Vec::new(),
        };

        let log_level = match lookup("LOG_LEVEL") {
            Some(level) => LevelFilter::from_str(level.trim())
                .with_context(|| format!("invalid LOG_LEVEL: {}", level))?,
            None => LevelFilter::INFO,
        };

        Ok(Self {
            telegram_token,
            rpc_url,
            poller: PollerConfig { poll_interval, fetch_timeout },
            allowed_chat_ids,
            log_level,
        })
    }
}

fn parse_secs<F>(lookup: &F, key: &str) -> anyhow::Result<Option<Duration>>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|raw| {
            raw.trim()
                .parse::<u64>()
                .map(Duration::from_secs)
                .with_context(|| format!("{} must be a number of seconds, got {:?}", key, raw))
        })
        .transpose()
}
