//! # Feature: Status Report
//!
//! Read-only snapshot of every watched channel for the status command.
//!
//! - **Version**: 1.2.0
//! - **Since**: 1.0.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 1.2.0: Elapsed time floors at zero when activity is ahead of the clock
//! - 1.1.0: Render timestamps in the configured display offset
//! - 1.0.0: Initial release

use chrono::{DateTime, Duration, FixedOffset, Utc};
use std::fmt;

use crate::core::config::ChannelConfig;
use crate::core::duration::format_clock;
use crate::features::tracker::ActivityTracker;
use crate::features::watchdog::FiringPolicy;

/// Snapshot of one channel at the time of the query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelStatus {
    pub channel_id: u64,
    pub name: Option<String>,
    /// Already converted to the display offset
    pub last_activity_at: Option<DateTime<FixedOffset>>,
    /// Never negative
    pub elapsed: Option<Duration>,
    /// Time left before the threshold is reached, never negative
    pub remaining: Option<Duration>,
    /// Only reported under the edge-triggered policy
    pub notified: Option<bool>,
}

impl fmt::Display for ChannelStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<#{}>", self.channel_id)?;
        if let Some(name) = &self.name {
            write!(f, " ({name})")?;
        }

        let (Some(last), Some(elapsed), Some(remaining)) =
            (self.last_activity_at, self.elapsed, self.remaining)
        else {
            return write!(f, " | last: unknown");
        };

        write!(
            f,
            " | last: {} | elapsed: {} | until next reminder: {}",
            last.format("%Y-%m-%d %H:%M:%S %:z"),
            format_clock(elapsed),
            format_clock(remaining)
        )?;
        if let Some(notified) = self.notified {
            write!(f, " | notified={notified}")?;
        }
        Ok(())
    }
}

pub struct StatusReporter {
    offset: FixedOffset,
    show_notified: bool,
}

impl StatusReporter {
    pub fn new(policy: FiringPolicy, offset: FixedOffset) -> Self {
        StatusReporter {
            offset,
            show_notified: policy.tracks_notified(),
        }
    }

    /// One status per configured channel, in configuration order
    pub fn snapshot(
        &self,
        tracker: &ActivityTracker,
        channels: &[ChannelConfig],
        now: DateTime<Utc>,
    ) -> Vec<ChannelStatus> {
        channels
            .iter()
            .map(|channel| {
                let state = tracker.get(channel.channel_id);
                // Message timestamps can run slightly ahead of the local clock
                let elapsed = state.map(|s| (now - s.last_activity_at).max(Duration::zero()));

                ChannelStatus {
                    channel_id: channel.channel_id,
                    name: channel.name.clone(),
                    last_activity_at: state.map(|s| s.last_activity_at.with_timezone(&self.offset)),
                    elapsed,
                    remaining: elapsed.map(|e| (channel.threshold - e).max(Duration::zero())),
                    notified: state.filter(|_| self.show_notified).map(|s| s.notified),
                }
            })
            .collect()
    }
}

/// Render statuses as message lines
pub fn render_lines(statuses: &[ChannelStatus]) -> Vec<String> {
    if statuses.is_empty() {
        return vec!["No channels are being watched.".to_string()];
    }
    statuses.iter().map(ToString::to_string).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap()
    }

    fn utc() -> FixedOffset {
        FixedOffset::east_opt(0).unwrap()
    }

    fn channels() -> Vec<ChannelConfig> {
        vec![
            ChannelConfig::new(1, Duration::hours(1), "a").with_name("facebook-posts"),
            ChannelConfig::new(2, Duration::hours(2), "b"),
        ]
    }

    #[test]
    fn test_snapshot_edge_policy() {
        let mut tracker = ActivityTracker::new();
        tracker.seed(1, t0());
        tracker.set_notified(1, true);
        tracker.seed(2, t0());

        let reporter = StatusReporter::new(FiringPolicy::EdgeTriggered, utc());
        let now = t0() + Duration::minutes(75);
        let statuses = reporter.snapshot(&tracker, &channels(), now);

        assert_eq!(statuses.len(), 2);
        assert_eq!(statuses[0].elapsed, Some(Duration::minutes(75)));
        // Overdue: remaining floors at zero
        assert_eq!(statuses[0].remaining, Some(Duration::zero()));
        assert_eq!(statuses[0].notified, Some(true));
        assert_eq!(statuses[1].remaining, Some(Duration::minutes(45)));

        assert_eq!(
            statuses[0].to_string(),
            "<#1> (facebook-posts) | last: 2024-05-01 09:00:00 +00:00 | elapsed: 1:15:00 | until next reminder: 0:00:00 | notified=true"
        );
        assert_eq!(
            statuses[1].to_string(),
            "<#2> | last: 2024-05-01 09:00:00 +00:00 | elapsed: 1:15:00 | until next reminder: 0:45:00 | notified=false"
        );
    }

    #[test]
    fn test_snapshot_gated_policy_hides_notified() {
        let mut tracker = ActivityTracker::new();
        tracker.seed(1, t0());
        tracker.seed(2, t0());

        let reporter = StatusReporter::new(FiringPolicy::Gated { gate_minute: 0 }, utc());
        let statuses = reporter.snapshot(&tracker, &channels(), t0() + Duration::minutes(10));

        assert!(statuses.iter().all(|s| s.notified.is_none()));
        assert!(!statuses[0].to_string().contains("notified"));
    }

    #[test]
    fn test_snapshot_applies_display_offset() {
        let mut tracker = ActivityTracker::new();
        tracker.seed(1, t0());

        let offset = FixedOffset::east_opt(5 * 3600 + 1800).unwrap();
        let reporter = StatusReporter::new(FiringPolicy::EdgeTriggered, offset);
        let statuses = reporter.snapshot(&tracker, &channels()[..1], t0());

        assert!(statuses[0]
            .to_string()
            .contains("last: 2024-05-01 14:30:00 +05:30"));
        assert_eq!(statuses[0].elapsed, Some(Duration::zero()));
    }

    #[test]
    fn test_snapshot_floors_future_activity_at_zero() {
        let mut tracker = ActivityTracker::new();
        tracker.seed(1, t0() + Duration::seconds(2));

        let reporter = StatusReporter::new(FiringPolicy::EdgeTriggered, utc());
        let statuses = reporter.snapshot(&tracker, &channels()[..1], t0());

        assert_eq!(statuses[0].elapsed, Some(Duration::zero()));
        assert_eq!(statuses[0].remaining, Some(Duration::hours(1)));
        let line = statuses[0].to_string();
        assert!(line.contains("elapsed: 0:00:00"));
        assert!(line.contains("until next reminder: 1:00:00"));
        assert!(!line.contains("elapsed: -"));
    }

    #[test]
    fn test_snapshot_unknown_state() {
        let tracker = ActivityTracker::new();
        let reporter = StatusReporter::new(FiringPolicy::EdgeTriggered, utc());
        let statuses = reporter.snapshot(&tracker, &channels(), t0());

        assert_eq!(statuses[1].to_string(), "<#2> | last: unknown");
        assert!(tracker.is_empty());
    }

    #[test]
    fn test_render_lines_empty() {
        assert_eq!(render_lines(&[]), vec!["No channels are being watched."]);
    }
}
