//! # Configuration
//!
//! Process configuration from environment variables plus the YAML list of
//! watched channels.
//!
//! - **Version**: 1.2.0
//! - **Since**: 1.0.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 1.2.0: `FIRING_POLICY` and `GATE_MINUTE` select between edge and gated reminders
//! - 1.1.0: Channel list moved from env vars into `channels.yaml`
//! - 1.0.0: Initial release

use anyhow::{anyhow, bail, Context, Result};
use chrono::{Duration, FixedOffset};
use serde::Deserialize;
use std::collections::HashSet;

use crate::core::clock::parse_utc_offset;
use crate::core::duration::parse_duration;
use crate::core::response::MESSAGE_LIMIT;
use crate::features::watchdog::FiringPolicy;

/// Reminder text used when a channel entry leaves `message` out
pub const DEFAULT_MESSAGE: &str = "post needed.";

const DEFAULT_CHANNELS_PATH: &str = "channels.yaml";
const DEFAULT_TICK_SECONDS: u64 = 60;
const DEFAULT_STATUS_COMMAND: &str = "!status";
const DEFAULT_PORT: u16 = 8000;

/// Static configuration for one watched channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelConfig {
    pub channel_id: u64,
    pub name: Option<String>,
    pub threshold: Duration,
    pub message: String,
}

impl ChannelConfig {
    pub fn new(channel_id: u64, threshold: Duration, message: impl Into<String>) -> Self {
        ChannelConfig {
            channel_id,
            name: None,
            threshold,
            message: message.into(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

#[derive(Debug, Deserialize)]
struct ChannelsFile {
    channels: Vec<ChannelEntry>,
}

#[derive(Debug, Deserialize)]
struct ChannelEntry {
    id: u64,
    #[serde(default)]
    name: Option<String>,
    threshold: String,
    #[serde(default)]
    message: Option<String>,
}

/// Parse and validate the YAML channel list
pub fn parse_channels(yaml: &str) -> Result<Vec<ChannelConfig>> {
    let file: ChannelsFile = serde_yaml::from_str(yaml).context("Invalid channel file")?;

    if file.channels.is_empty() {
        bail!("Channel file lists no channels to watch");
    }

    let mut seen = HashSet::new();
    let mut channels = Vec::with_capacity(file.channels.len());

    for entry in file.channels {
        if entry.id == 0 {
            bail!("Channel id must be non-zero");
        }
        if !seen.insert(entry.id) {
            bail!("Channel {} is listed more than once", entry.id);
        }

        let threshold = parse_duration(&entry.threshold).ok_or_else(|| {
            anyhow!(
                "Invalid threshold '{}' for channel {} (use formats like 45m, 2h, 1h30m)",
                entry.threshold,
                entry.id
            )
        })?;

        let message = entry
            .message
            .unwrap_or_else(|| DEFAULT_MESSAGE.to_string());
        if message.trim().is_empty() {
            bail!("Reminder message for channel {} is empty", entry.id);
        }
        if message.chars().count() > MESSAGE_LIMIT {
            bail!(
                "Reminder message for channel {} exceeds {} characters",
                entry.id,
                MESSAGE_LIMIT
            );
        }

        channels.push(ChannelConfig {
            channel_id: entry.id,
            name: entry.name.filter(|n| !n.trim().is_empty()),
            threshold,
            message,
        });
    }

    Ok(channels)
}

/// Read and validate the channel list at `path`
pub fn load_channels(path: &str) -> Result<Vec<ChannelConfig>> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read channel file {path}"))?;
    parse_channels(&contents).with_context(|| format!("Failed to load {path}"))
}

#[derive(Debug, Clone)]
pub struct Config {
    pub discord_token: String,
    pub channels_path: String,
    pub channels: Vec<ChannelConfig>,
    pub policy: FiringPolicy,
    pub display_offset: FixedOffset,
    pub tick_interval: std::time::Duration,
    pub status_command: String,
    /// Liveness endpoint port, `None` when disabled
    pub http_port: Option<u16>,
    pub log_level: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from any key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let discord_token = get("DISCORD_BOT_TOKEN")
            .or_else(|| get("TOKEN"))
            .ok_or_else(|| anyhow!("Set DISCORD_BOT_TOKEN (or TOKEN) in your environment"))?;

        let channels_path =
            get("CHANNELS_CONFIG_PATH").unwrap_or_else(|| DEFAULT_CHANNELS_PATH.to_string());
        let channels = load_channels(&channels_path)?;

        let gate_minute = match get("GATE_MINUTE") {
            Some(raw) => raw
                .parse::<u32>()
                .ok()
                .filter(|m| *m < 60)
                .ok_or_else(|| anyhow!("GATE_MINUTE must be 0-59, got '{raw}'"))?,
            None => 0,
        };
        let policy = match get("FIRING_POLICY").as_deref() {
            None => FiringPolicy::EdgeTriggered,
            Some(raw) => FiringPolicy::parse(raw, gate_minute)
                .ok_or_else(|| anyhow!("FIRING_POLICY must be 'edge' or 'gated', got '{raw}'"))?,
        };

        let display_offset = match get("DISPLAY_UTC_OFFSET") {
            Some(raw) => parse_utc_offset(&raw)
                .ok_or_else(|| anyhow!("DISPLAY_UTC_OFFSET must look like +05:30, got '{raw}'"))?,
            None => FixedOffset::east_opt(0).ok_or_else(|| anyhow!("UTC offset out of range"))?,
        };

        let tick_seconds = match get("TICK_INTERVAL_SECONDS") {
            Some(raw) => raw
                .parse::<u64>()
                .ok()
                .filter(|s| *s > 0)
                .ok_or_else(|| anyhow!("TICK_INTERVAL_SECONDS must be a positive integer"))?,
            None => DEFAULT_TICK_SECONDS,
        };

        let http_port = match get("PORT").as_deref() {
            None => Some(DEFAULT_PORT),
            Some("0") | Some("off") | Some("disabled") => None,
            Some(raw) => Some(
                raw.parse::<u16>()
                    .map_err(|e| anyhow!("Invalid PORT '{raw}': {e}"))?,
            ),
        };

        Ok(Config {
            discord_token,
            channels_path,
            channels,
            policy,
            display_offset,
            tick_interval: std::time::Duration::from_secs(tick_seconds),
            status_command: get("STATUS_COMMAND")
                .unwrap_or_else(|| DEFAULT_STATUS_COMMAND.to_string()),
            http_port,
            log_level: get("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
        })
    }
}
