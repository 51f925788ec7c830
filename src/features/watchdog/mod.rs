//! # Inactivity Watchdog Feature
//!
//! Seeds channel state, evaluates it on a fixed cadence and sends reminders
//! to channels that have gone quiet.
//!
//! - **Version**: 1.2.0
//! - **Since**: 1.0.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 1.2.0: Gated firing policy
//! - 1.1.0: Actor owns all state; status queries go through the event queue
//! - 1.0.0: Initial release

pub mod actor;
pub mod policy;
pub mod ports;
pub mod scheduler;
pub mod seeding;

pub use actor::{mailbox, spawn_ticker, ActivityEvent, Mailbox, Watchdog, WatchdogEvent, WatchdogHandle};
pub use policy::{Decision, FiringPolicy};
pub use ports::{HistoryLookup, NotificationSink};
pub use scheduler::{Evaluation, InactivityScheduler};
pub use seeding::seed_tracker;
