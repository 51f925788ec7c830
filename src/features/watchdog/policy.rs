//! Firing policies
//!
//! Two reminder styles are supported and picked once at startup:
//!
//! - **Edge-triggered**: one reminder per quiet period. The channel is marked
//!   notified when the reminder goes out and only re-armed by new activity.
//! - **Gated**: while a channel stays quiet past its threshold, a reminder goes
//!   out every time the wall clock reaches the gate minute (for example the
//!   top of every hour). Nothing is suppressed between gates.

use chrono::{DateTime, Duration, Utc};

use crate::features::tracker::ChannelState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FiringPolicy {
    EdgeTriggered,
    Gated { gate_minute: u32 },
}

impl FiringPolicy {
    /// Parse the `FIRING_POLICY` value. `gate_minute` only applies to the gated policy.
    pub fn parse(raw: &str, gate_minute: u32) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "edge" | "edge-triggered" | "once" => Some(FiringPolicy::EdgeTriggered),
            "gated" | "hourly" | "repeat" => Some(FiringPolicy::Gated { gate_minute }),
            _ => None,
        }
    }

    /// Whether the `notified` flag means anything under this policy
    pub fn tracks_notified(&self) -> bool {
        matches!(self, FiringPolicy::EdgeTriggered)
    }

    pub fn describe(&self) -> String {
        match self {
            FiringPolicy::EdgeTriggered => "edge-triggered (one reminder per quiet period)".to_string(),
            FiringPolicy::Gated { gate_minute } => {
                format!("gated (repeat at minute :{gate_minute:02} while quiet)")
            }
        }
    }
}

/// Outcome of evaluating one channel on one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// No state existed; it was created with the current time and evaluation skipped
    Initialized,
    /// Still within the threshold
    Quiet,
    /// Send the reminder now
    Fire,
    /// Back under the threshold after a reminder; trigger re-armed
    Rearm,
    /// Past the threshold but a reminder already went out for this quiet period
    AlreadyNotified,
    /// Past the threshold but this tick is not on the gate
    AwaitingGate,
}

/// Decide what to do for one channel.
///
/// `gate_open` is only consulted by the gated policy and must be true for
/// exactly one tick per gate instant.
pub fn decide(
    policy: FiringPolicy,
    state: &ChannelState,
    threshold: Duration,
    now: DateTime<Utc>,
    gate_open: bool,
) -> Decision {
    let overdue = now - state.last_activity_at >= threshold;

    match policy {
        FiringPolicy::EdgeTriggered => match (overdue, state.notified) {
            (true, false) => Decision::Fire,
            (true, true) => Decision::AlreadyNotified,
            (false, true) => Decision::Rearm,
            (false, false) => Decision::Quiet,
        },
        FiringPolicy::Gated { .. } => match (overdue, gate_open) {
            (true, true) => Decision::Fire,
            (true, false) => Decision::AwaitingGate,
            (false, _) => Decision::Quiet,
        },
    }
}
