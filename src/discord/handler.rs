//! Gateway event handler
//!
//! Forwards every message to the watchdog as activity and answers the status
//! command.

use anyhow::Result;
use serenity::async_trait;
use log::{debug, error, info};
use serenity::model::channel::Message;
use serenity::model::gateway::Ready;
use serenity::prelude::*;

use crate::core::response::pack_for_message;
use crate::discord::adapter::message_time;
use crate::features::status::render_lines;
use crate::features::watchdog::{ActivityEvent, WatchdogHandle};

pub struct Handler {
    watchdog: WatchdogHandle,
    status_command: String,
}

impl Handler {
    pub fn new(watchdog: WatchdogHandle, status_command: impl Into<String>) -> Self {
        Handler {
            watchdog,
            status_command: status_command.into(),
        }
    }

    async fn reply_status(&self, ctx: &Context, msg: &Message) -> Result<()> {
        let statuses = self.watchdog.status().await?;
        let lines = render_lines(&statuses);

        for chunk in pack_for_message(&lines) {
            msg.channel_id.say(&ctx.http, chunk).await?;
        }
        Ok(())
    }
}

/// Exact command match, ignoring surrounding whitespace and case
pub fn is_status_command(content: &str, command: &str) -> bool {
    content.trim().eq_ignore_ascii_case(command.trim())
}

#[async_trait]
impl EventHandler for Handler {
    async fn message(&self, ctx: Context, msg: Message) {
        let event = ActivityEvent {
            channel_id: msg.channel_id.0,
            at: message_time(&msg),
            automated: msg.author.bot,
        };
        if let Err(e) = self.watchdog.record_activity(event).await {
            error!("Failed to record activity for channel {}: {e}", msg.channel_id);
        }

        if msg.author.bot || !is_status_command(&msg.content, &self.status_command) {
            return;
        }

        debug!(
            "📥 Status requested by {} in channel {}",
            msg.author.name, msg.channel_id
        );
        if let Err(e) = self.reply_status(&ctx, &msg).await {
            error!("Error handling status command: {e}");
            if let Err(why) = msg
                .channel_id
                .say(&ctx.http, "Sorry, I couldn't read the channel status.")
                .await
            {
                error!("Failed to send error message: {why}");
            }
        }
    }

    async fn ready(&self, _ctx: Context, ready: Ready) {
        info!("🎉 {} is connected and ready!", ready.user.name);
        info!("📡 Connected to {} guilds", ready.guilds.len());
        info!("🤖 Bot ID: {}", ready.user.id);

        if let Some(shard) = ready.shard {
            info!("⚡ Shard: {}/{}", shard[0] + 1, shard[1]);
        }
    }
}
