//! # Discord Integration
//!
//! Serenity implementations of the watchdog's collaborators: message events in,
//! channel history and reminder delivery out.
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0
//! - **Toggleable**: false

pub mod adapter;
pub mod handler;

pub use adapter::{message_time, DiscordChannels, HistoryScan};
pub use handler::Handler;
