//! Serenity-backed history lookup and reminder delivery

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::info;
use serenity::http::Http;
use serenity::model::channel::Message;
use serenity::model::id::ChannelId;
use std::sync::Arc;

use crate::features::watchdog::{HistoryLookup, NotificationSink};

/// How far back seeding looks for a message from a human
const HISTORY_SCAN_LIMIT: u64 = 50;

/// Convert Unix seconds to chrono, falling back to now if out of range
pub fn timestamp_from_unix(secs: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(secs, 0).unwrap_or_else(Utc::now)
}

/// Convert a Serenity message timestamp to chrono
pub fn message_time(msg: &Message) -> DateTime<Utc> {
    timestamp_from_unix(msg.timestamp.unix_timestamp())
}

/// What a scan of recent messages says about the last human activity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryScan {
    /// Newest message from a non-bot author
    Human(DateTime<Utc>),
    /// Every scanned message came from a bot; a human last posted before `oldest`
    OnlyBots { oldest: DateTime<Utc>, scanned: usize },
    Empty,
}

impl HistoryScan {
    /// Scan `(is_bot, timestamp)` pairs in any order
    pub fn from_messages<I>(messages: I) -> Self
    where
        I: IntoIterator<Item = (bool, DateTime<Utc>)>,
    {
        let mut newest_human = None;
        let mut oldest = None;
        let mut scanned = 0;

        for (is_bot, at) in messages {
            scanned += 1;
            oldest = Some(oldest.map_or(at, |o: DateTime<Utc>| o.min(at)));
            if !is_bot {
                newest_human = Some(newest_human.map_or(at, |n: DateTime<Utc>| n.max(at)));
            }
        }

        match (newest_human, oldest) {
            (Some(at), _) => HistoryScan::Human(at),
            (None, Some(oldest)) => HistoryScan::OnlyBots { oldest, scanned },
            (None, None) => HistoryScan::Empty,
        }
    }
}

/// REST access to the watched channels
#[derive(Clone)]
pub struct DiscordChannels {
    http: Arc<Http>,
}

impl DiscordChannels {
    pub fn new(http: Arc<Http>) -> Self {
        Self { http }
    }
}

#[async_trait]
impl NotificationSink for DiscordChannels {
    async fn send(&self, channel_id: u64, text: &str) -> Result<()> {
        ChannelId(channel_id).say(&self.http, text).await?;
        Ok(())
    }
}

#[async_trait]
impl HistoryLookup for DiscordChannels {
    /// Newest message from a non-bot author among the last few messages.
    /// Reminders the bot posted itself do not count; if they fill the whole
    /// scan, the oldest of them is used as the seed.
    async fn latest_activity(&self, channel_id: u64) -> Result<Option<DateTime<Utc>>> {
        let messages = ChannelId(channel_id)
            .messages(&self.http, |retriever| retriever.limit(HISTORY_SCAN_LIMIT))
            .await?;

        let scan = HistoryScan::from_messages(
            messages.iter().map(|m| (m.author.bot, message_time(m))),
        );

        Ok(match scan {
            HistoryScan::Human(at) => Some(at),
            HistoryScan::OnlyBots { oldest, scanned } => {
                info!(
                    "🤖 Last {scanned} messages in channel {channel_id} are all from bots, seeding from the oldest"
                );
                Some(oldest)
            }
            HistoryScan::Empty => None,
        })
    }
}
