// Core layer - configuration, clock and shared helpers
pub mod core;

// Features layer - activity tracking, inactivity watchdog, status report
pub mod features;

// Discord integration - serenity event handler and REST adapter
pub mod discord;

// Liveness HTTP endpoint
pub mod health;

// Re-export core config
pub use core::{ChannelConfig, Config};

// Re-export feature items
pub use features::{
    // Status
    ChannelStatus, StatusReporter,
    // Tracking
    ActivityTracker, ChannelState,
    // Watchdog
    ActivityEvent, FiringPolicy, InactivityScheduler, Watchdog, WatchdogHandle,
};
