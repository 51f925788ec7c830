//! # Activity Tracking Feature
//!
//! In-memory last-activity state for watched channels.
//!
//! - **Version**: 1.1.0
//! - **Since**: 1.0.0
//! - **Toggleable**: false

pub mod state;

pub use state::{ActivityTracker, ChannelState};
