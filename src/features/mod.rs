//! # Features Layer
//!
//! - `tracker`: per-channel last-activity state
//! - `watchdog`: seeding, the periodic inactivity check and reminder dispatch
//! - `status`: read-only status report

pub mod status;
pub mod tracker;
pub mod watchdog;

pub use status::{ChannelStatus, StatusReporter};
pub use tracker::{ActivityTracker, ChannelState};
pub use watchdog::{
    mailbox, seed_tracker, spawn_ticker, ActivityEvent, FiringPolicy, HistoryLookup,
    InactivityScheduler, NotificationSink, Watchdog, WatchdogHandle,
};

/// Bot version from Cargo.toml
pub fn get_bot_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
