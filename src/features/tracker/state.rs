//! # Feature: Activity Tracker
//!
//! Per-channel record of when a channel last saw a qualifying message, plus
//! the edge-trigger flag used by edge-triggered reminders.
//!
//! - **Version**: 1.1.0
//! - **Since**: 1.0.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 1.1.0: Lazy state creation for channels missed during seeding
//! - 1.0.0: Initial release

use chrono::{DateTime, Utc};
use std::collections::HashMap;

/// Mutable state for one watched channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelState {
    pub last_activity_at: DateTime<Utc>,
    /// A reminder already went out for the current quiet period
    pub notified: bool,
}

impl ChannelState {
    fn fresh(at: DateTime<Utc>) -> Self {
        ChannelState {
            last_activity_at: at,
            notified: false,
        }
    }
}

/// Owns every `ChannelState`. Not shared: the watchdog actor is the only writer.
#[derive(Debug, Default)]
pub struct ActivityTracker {
    states: HashMap<u64, ChannelState>,
}

impl ActivityTracker {
    pub fn new() -> Self {
        ActivityTracker {
            states: HashMap::new(),
        }
    }

    /// Initialise a channel at startup. Replaces any existing state.
    pub fn seed(&mut self, channel_id: u64, at: DateTime<Utc>) {
        self.states.insert(channel_id, ChannelState::fresh(at));
    }

    /// Record a qualifying message. Always overwrites the timestamp, even if it
    /// is older than the one already stored, and re-arms the trigger.
    pub fn record_activity(&mut self, channel_id: u64, at: DateTime<Utc>) {
        self.states.insert(channel_id, ChannelState::fresh(at));
    }

    /// Create state for a channel that has none yet. Returns true if it was created.
    pub fn ensure(&mut self, channel_id: u64, now: DateTime<Utc>) -> bool {
        if self.states.contains_key(&channel_id) {
            return false;
        }
        self.states.insert(channel_id, ChannelState::fresh(now));
        true
    }

    pub fn set_notified(&mut self, channel_id: u64, notified: bool) {
        if let Some(state) = self.states.get_mut(&channel_id) {
            state.notified = notified;
        }
    }

    pub fn get(&self, channel_id: u64) -> Option<&ChannelState> {
        self.states.get(&channel_id)
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap()
    }

    #[test]
    fn test_seed_sets_timestamp_and_clears_flag() {
        let mut tracker = ActivityTracker::new();
        tracker.seed(1, t0());

        let state = tracker.get(1).unwrap();
        assert_eq!(state.last_activity_at, t0());
        assert!(!state.notified);
        assert_eq!(tracker.len(), 1);
    }

    #[test]
    fn test_record_activity_clears_notified() {
        let mut tracker = ActivityTracker::new();
        tracker.seed(1, t0());
        tracker.set_notified(1, true);

        let later = t0() + Duration::minutes(70);
        tracker.record_activity(1, later);

        let state = tracker.get(1).unwrap();
        assert_eq!(state.last_activity_at, later);
        assert!(!state.notified);
    }

    #[test]
    fn test_record_activity_accepts_stale_timestamps() {
        let mut tracker = ActivityTracker::new();
        tracker.seed(1, t0());

        let earlier = t0() - Duration::minutes(5);
        tracker.record_activity(1, earlier);
        assert_eq!(tracker.get(1).unwrap().last_activity_at, earlier);
    }

    #[test]
    fn test_ensure_only_creates_missing_state() {
        let mut tracker = ActivityTracker::new();
        tracker.seed(1, t0());

        let now = t0() + Duration::hours(3);
        assert!(!tracker.ensure(1, now));
        assert_eq!(tracker.get(1).unwrap().last_activity_at, t0());

        assert!(tracker.ensure(2, now));
        assert_eq!(tracker.get(2).unwrap().last_activity_at, now);
    }

    #[test]
    fn test_set_notified_ignores_unknown_channels() {
        let mut tracker = ActivityTracker::new();
        tracker.set_notified(42, true);
        assert!(tracker.get(42).is_none());
        assert!(tracker.is_empty());
    }
}
