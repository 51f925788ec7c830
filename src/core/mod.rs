//! # Core Module
//!
//! Configuration, time source and text helpers shared by the watchdog features.
//!
//! - **Version**: 1.1.0
//! - **Since**: 1.0.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 1.1.0: Add clock module with fixed display offset parsing
//! - 1.0.0: Initial creation with config, duration and response modules

pub mod clock;
pub mod config;
pub mod duration;
pub mod response;

// Re-export commonly used items
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{ChannelConfig, Config};
pub use duration::{format_clock, format_human, parse_duration};
pub use response::{pack_for_message, pack_lines, MESSAGE_LIMIT};
