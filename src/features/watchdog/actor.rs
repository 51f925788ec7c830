//! # Feature: Watchdog Actor
//!
//! Single owner of all channel state. Activity, ticks and status queries are
//! queued on one mpsc channel and handled strictly in arrival order, so an
//! activity event queued before a tick is always applied before that tick
//! evaluates the channel.
//!
//! - **Version**: 1.1.0
//! - **Since**: 1.0.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 1.1.0: Status queries answered through the event queue
//! - 1.0.0: Initial release

use anyhow::{anyhow, Result};
use chrono::{DateTime, FixedOffset, Utc};
use log::{debug, error, info, warn};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use uuid::Uuid;

use crate::core::clock::Clock;
use crate::core::config::ChannelConfig;
use crate::core::duration::format_human;
use crate::features::status::{ChannelStatus, StatusReporter};
use crate::features::tracker::ActivityTracker;
use crate::features::watchdog::policy::{Decision, FiringPolicy};
use crate::features::watchdog::ports::NotificationSink;
use crate::features::watchdog::scheduler::InactivityScheduler;

/// Event queue capacity
const MAILBOX_CAPACITY: usize = 256;

/// An incoming message as seen by the watchdog
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActivityEvent {
    pub channel_id: u64,
    pub at: DateTime<Utc>,
    /// Sent by a bot or webhook; never counts as activity
    pub automated: bool,
}

#[derive(Debug)]
pub enum WatchdogEvent {
    Activity(ActivityEvent),
    Tick,
    Status(oneshot::Sender<Vec<ChannelStatus>>),
}

/// Cloneable sender side of the watchdog queue
#[derive(Clone)]
pub struct WatchdogHandle {
    tx: mpsc::Sender<WatchdogEvent>,
}

/// Receiver side, consumed by [`Watchdog::new`]
pub struct Mailbox {
    rx: mpsc::Receiver<WatchdogEvent>,
}

/// Create a connected handle/mailbox pair
pub fn mailbox() -> (WatchdogHandle, Mailbox) {
    let (tx, rx) = mpsc::channel(MAILBOX_CAPACITY);
    (WatchdogHandle { tx }, Mailbox { rx })
}

impl WatchdogHandle {
    pub async fn record_activity(&self, event: ActivityEvent) -> Result<()> {
        self.tx
            .send(WatchdogEvent::Activity(event))
            .await
            .map_err(|_| anyhow!("Watchdog is not running"))
    }

    pub async fn tick(&self) -> Result<()> {
        self.tx
            .send(WatchdogEvent::Tick)
            .await
            .map_err(|_| anyhow!("Watchdog is not running"))
    }

    /// Snapshot of every watched channel, taken after all earlier events were applied
    pub async fn status(&self) -> Result<Vec<ChannelStatus>> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(WatchdogEvent::Status(reply_tx))
            .await
            .map_err(|_| anyhow!("Watchdog is not running"))?;
        reply_rx
            .await
            .map_err(|_| anyhow!("Watchdog dropped the status request"))
    }
}

pub struct Watchdog {
    channels: Vec<ChannelConfig>,
    watched: HashSet<u64>,
    tracker: ActivityTracker,
    scheduler: InactivityScheduler,
    reporter: StatusReporter,
    sink: Arc<dyn NotificationSink>,
    clock: Arc<dyn Clock>,
    mailbox: Mailbox,
}

impl Watchdog {
    pub fn new(
        channels: Vec<ChannelConfig>,
        tracker: ActivityTracker,
        policy: FiringPolicy,
        display_offset: FixedOffset,
        sink: Arc<dyn NotificationSink>,
        clock: Arc<dyn Clock>,
        mailbox: Mailbox,
    ) -> Self {
        Watchdog {
            watched: channels.iter().map(|c| c.channel_id).collect(),
            channels,
            tracker,
            scheduler: InactivityScheduler::new(policy, display_offset),
            reporter: StatusReporter::new(policy, display_offset),
            sink,
            clock,
            mailbox,
        }
    }

    /// Process events until every handle is dropped
    pub async fn run(mut self) {
        info!(
            "🐕 Watchdog started for {} channels, policy: {}",
            self.channels.len(),
            self.scheduler.policy().describe()
        );

        while let Some(event) = self.mailbox.rx.recv().await {
            self.handle(event).await;
        }

        info!("Watchdog stopped (all handles dropped)");
    }

    async fn handle(&mut self, event: WatchdogEvent) {
        match event {
            WatchdogEvent::Activity(activity) => self.on_activity(activity),
            WatchdogEvent::Tick => self.on_tick().await,
            WatchdogEvent::Status(reply) => {
                let snapshot = self
                    .reporter
                    .snapshot(&self.tracker, &self.channels, self.clock.now());
                if reply.send(snapshot).is_err() {
                    debug!("Status requester went away before the reply");
                }
            }
        }
    }

    fn on_activity(&mut self, event: ActivityEvent) {
        if event.automated || !self.watched.contains(&event.channel_id) {
            return;
        }

        debug!(
            "💬 Activity in channel {} at {}",
            event.channel_id, event.at
        );
        self.tracker.record_activity(event.channel_id, event.at);
    }

    async fn on_tick(&mut self) {
        let tick_id = Uuid::new_v4();
        let now = self.clock.now();
        let evaluations = self
            .scheduler
            .evaluate(&mut self.tracker, &self.channels, now);

        debug!("[{tick_id}] ⏱️ Evaluated {} channels", evaluations.len());

        for evaluation in evaluations {
            let channel_id = evaluation.channel_id;
            match evaluation.decision {
                Decision::Fire => {}
                Decision::Initialized => {
                    warn!("[{tick_id}] Channel {channel_id} had no state, counting from now");
                    continue;
                }
                Decision::Rearm => {
                    debug!("[{tick_id}] Channel {channel_id} re-armed");
                    continue;
                }
                _ => continue,
            }

            // Lookup by id; the list is small and fixed
            let Some(channel) = self.channels.iter().find(|c| c.channel_id == channel_id) else {
                continue;
            };

            match self.sink.send(channel_id, &channel.message).await {
                Ok(()) => {
                    self.scheduler.confirm_sent(&mut self.tracker, channel_id);
                    info!(
                        "[{}] 🔔 Reminder sent to channel {} (quiet for {})",
                        tick_id,
                        channel_id,
                        evaluation
                            .elapsed
                            .map(format_human)
                            .unwrap_or_else(|| "unknown".to_string())
                    );
                }
                Err(e) => {
                    error!("[{tick_id}] ❌ Failed to send reminder to channel {channel_id}: {e:#}");
                }
            }
        }
    }
}

/// Queue a tick every `period` until the watchdog goes away. The first tick
/// is queued immediately.
pub fn spawn_ticker(handle: WatchdogHandle, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!("Inactivity checks scheduled every {}s", period.as_secs());

        loop {
            interval.tick().await;
            if handle.tick().await.is_err() {
                warn!("Ticker stopping: watchdog is gone");
                break;
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::clock::ManualClock;
    use crate::features::watchdog::ports::fakes::RecordingSink;
    use chrono::{Duration as ChronoDuration, TimeZone};

    const A: u64 = 100;
    const B: u64 = 200;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap()
    }

    struct Harness {
        handle: WatchdogHandle,
        clock: Arc<ManualClock>,
        sink: Arc<RecordingSink>,
    }

    impl Harness {
        fn start(policy: FiringPolicy) -> Self {
            let channels = vec![
                ChannelConfig::new(A, ChronoDuration::hours(1), "post needed."),
                ChannelConfig::new(B, ChronoDuration::hours(2), "spam needed."),
            ];
            let mut tracker = ActivityTracker::new();
            tracker.seed(A, t0());
            tracker.seed(B, t0());

            let clock = Arc::new(ManualClock::new(t0()));
            let sink = Arc::new(RecordingSink::default());
            let (handle, mailbox) = mailbox();

            let watchdog = Watchdog::new(
                channels,
                tracker,
                policy,
                FixedOffset::east_opt(0).unwrap(),
                sink.clone(),
                clock.clone(),
                mailbox,
            );
            tokio::spawn(watchdog.run());

            Harness { handle, clock, sink }
        }

        /// Tick at `t0 + minutes` and wait until the tick was processed
        async fn tick_at(&self, minutes: i64) -> Vec<ChannelStatus> {
            self.clock.set(t0() + ChronoDuration::minutes(minutes));
            self.handle.tick().await.unwrap();
            self.handle.status().await.unwrap()
        }

        async fn activity(&self, channel_id: u64, minutes: i64, automated: bool) {
            self.handle
                .record_activity(ActivityEvent {
                    channel_id,
                    at: t0() + ChronoDuration::minutes(minutes),
                    automated,
                })
                .await
                .unwrap();
        }
    }

    #[tokio::test]
    async fn test_scenario_single_reminder_per_quiet_period() {
        let h = Harness::start(FiringPolicy::EdgeTriggered);

        h.tick_at(59).await;
        assert_eq!(h.sink.count_for(A), 0);

        let status = h.tick_at(61).await;
        assert_eq!(h.sink.sent(), vec![(A, "post needed.".to_string())]);
        assert_eq!(status[0].notified, Some(true));

        h.tick_at(62).await;
        assert_eq!(h.sink.count_for(A), 1);
    }

    #[tokio::test]
    async fn test_scenario_activity_rearms() {
        let h = Harness::start(FiringPolicy::EdgeTriggered);
        h.tick_at(61).await;
        assert_eq!(h.sink.count_for(A), 1);

        h.activity(A, 70, false).await;
        let status = h.tick_at(72).await;
        assert_eq!(status[0].notified, Some(false));
        assert_eq!(status[0].elapsed, Some(ChronoDuration::minutes(2)));
        assert_eq!(h.sink.count_for(A), 1);

        h.tick_at(130).await;
        h.tick_at(131).await;
        assert_eq!(h.sink.count_for(A), 2);
    }

    #[tokio::test]
    async fn test_activity_queued_before_tick_is_applied_first() {
        let h = Harness::start(FiringPolicy::EdgeTriggered);

        // Both queued without awaiting processing in between
        h.clock.set(t0() + ChronoDuration::minutes(61));
        h.activity(A, 60, false).await;
        h.handle.tick().await.unwrap();
        h.handle.status().await.unwrap();

        assert_eq!(h.sink.count_for(A), 0);
    }

    #[tokio::test]
    async fn test_automated_and_unwatched_activity_is_ignored() {
        let h = Harness::start(FiringPolicy::EdgeTriggered);

        h.activity(A, 50, true).await;
        h.activity(999, 50, false).await;
        let status = h.tick_at(61).await;

        assert_eq!(h.sink.count_for(A), 1);
        assert_eq!(status.len(), 2);
        assert!(status.iter().all(|s| s.channel_id != 999));
    }

    #[tokio::test]
    async fn test_dispatch_failure_is_isolated() {
        let h = Harness::start(FiringPolicy::EdgeTriggered);
        h.sink.fail_for(A);

        let status = h.tick_at(125).await;
        assert_eq!(h.sink.count_for(A), 0);
        assert_eq!(h.sink.count_for(B), 1);
        // A stays armed and is tried again on a later tick
        assert_eq!(status[0].notified, Some(false));

        h.sink.recover(A);
        h.tick_at(126).await;
        assert_eq!(h.sink.count_for(A), 1);
        assert_eq!(h.sink.count_for(B), 1);
    }

    #[tokio::test]
    async fn test_gated_policy_repeats_every_gate() {
        let h = Harness::start(FiringPolicy::Gated { gate_minute: 0 });

        for minute in [30, 60, 61, 90, 120, 121, 180] {
            h.tick_at(minute).await;
        }

        // A (1h): 10:00, 11:00, 12:00. B (2h): 11:00, 12:00.
        assert_eq!(h.sink.count_for(A), 3);
        assert_eq!(h.sink.count_for(B), 2);

        let status = h.handle.status().await.unwrap();
        assert!(status.iter().all(|s| s.notified.is_none()));
    }

    #[tokio::test]
    async fn test_handle_errors_once_watchdog_stops() {
        let (handle, mailbox) = mailbox();
        drop(mailbox);

        assert!(handle.tick().await.is_err());
        assert!(handle.status().await.is_err());
    }
}
