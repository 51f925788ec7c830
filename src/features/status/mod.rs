//! # Status Feature
//!
//! On-demand report of tracked channel state.
//!
//! - **Version**: 1.1.0
//! - **Since**: 1.0.0
//! - **Toggleable**: false

pub mod reporter;

pub use reporter::{render_lines, ChannelStatus, StatusReporter};
