//! # Feature: Inactivity Scheduler
//!
//! Evaluates every watched channel once per tick and decides which reminders
//! are due under the configured firing policy.
//!
//! - **Version**: 1.3.0
//! - **Since**: 1.0.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 1.3.0: Gate opens on the first tick after each gate instant, any cadence
//! - 1.2.0: Gated policy with one firing per gate minute
//! - 1.1.0: Lazily create state for channels missed during seeding
//! - 1.0.0: Initial edge-triggered release

use chrono::{DateTime, Duration, FixedOffset, Timelike, Utc};

use crate::core::config::ChannelConfig;
use crate::features::tracker::ActivityTracker;
use crate::features::watchdog::policy::{decide, Decision, FiringPolicy};

/// Result of evaluating one channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Evaluation {
    pub channel_id: u64,
    pub decision: Decision,
    /// `None` when the state was created on this tick
    pub elapsed: Option<Duration>,
}

pub struct InactivityScheduler {
    policy: FiringPolicy,
    /// Wall-clock offset used to locate the gate minute
    offset: FixedOffset,
    /// Gate instant that most recently opened
    last_gate: Option<DateTime<Utc>>,
    /// When the previous tick evaluated
    last_tick: Option<DateTime<Utc>>,
}

impl InactivityScheduler {
    pub fn new(policy: FiringPolicy, offset: FixedOffset) -> Self {
        InactivityScheduler {
            policy,
            offset,
            last_gate: None,
            last_tick: None,
        }
    }

    pub fn policy(&self) -> FiringPolicy {
        self.policy
    }

    /// Most recent gate instant at or before `now`
    fn latest_gate(&self, gate_minute: u32, now: DateTime<Utc>) -> DateTime<Utc> {
        let local = now.with_timezone(&self.offset);
        let into_hour = i64::from(local.minute() * 60 + local.second());
        let since_gate = (into_hour - i64::from(gate_minute * 60)).rem_euclid(3600);

        now - Duration::seconds(since_gate)
            - Duration::nanoseconds(i64::from(local.nanosecond()))
    }

    /// True on the first tick at or after each gate instant. Ticks coarser
    /// than a minute still catch every gate; the very first tick only counts
    /// if it lands inside the gate minute itself.
    fn gate_open(&mut self, now: DateTime<Utc>) -> bool {
        let previous = self.last_tick.replace(now);

        let FiringPolicy::Gated { gate_minute } = self.policy else {
            return false;
        };

        let gate = self.latest_gate(gate_minute, now);
        if self.last_gate == Some(gate) {
            return false;
        }

        let crossed = match previous {
            Some(previous) => gate > previous,
            None => now - gate < Duration::minutes(1),
        };
        if crossed {
            self.last_gate = Some(gate);
        }
        crossed
    }

    /// Evaluate every configured channel at `now`.
    ///
    /// Re-arming and lazy initialisation are applied to `tracker` here. A
    /// `Fire` decision is only a request: the caller marks the channel with
    /// [`InactivityScheduler::confirm_sent`] once delivery succeeded.
    pub fn evaluate(
        &mut self,
        tracker: &mut ActivityTracker,
        channels: &[ChannelConfig],
        now: DateTime<Utc>,
    ) -> Vec<Evaluation> {
        let gate_open = self.gate_open(now);

        channels
            .iter()
            .map(|channel| {
                let channel_id = channel.channel_id;

                let Some(state) = tracker.get(channel_id).copied() else {
                    tracker.ensure(channel_id, now);
                    return Evaluation {
                        channel_id,
                        decision: Decision::Initialized,
                        elapsed: None,
                    };
                };

                let decision = decide(self.policy, &state, channel.threshold, now, gate_open);
                if decision == Decision::Rearm {
                    tracker.set_notified(channel_id, false);
                }

                Evaluation {
                    channel_id,
                    decision,
                    elapsed: Some(now - state.last_activity_at),
                }
            })
            .collect()
    }

    /// Record that a reminder was delivered for `channel_id`
    pub fn confirm_sent(&self, tracker: &mut ActivityTracker, channel_id: u64) {
        if self.policy.tracks_notified() {
            tracker.set_notified(channel_id, true);
        }
    }
}
