//! Startup seeding
//!
//! Every watched channel starts from its newest qualifying message so a restart
//! does not fire reminders for channels that were active moments ago. Lookup
//! failures never abort startup.

use log::{info, warn};

use crate::core::clock::Clock;
use crate::core::config::ChannelConfig;
use crate::core::duration::format_human;
use crate::features::tracker::ActivityTracker;
use crate::features::watchdog::ports::HistoryLookup;

/// Build a tracker with one seeded state per configured channel
pub async fn seed_tracker(
    channels: &[ChannelConfig],
    history: &dyn HistoryLookup,
    clock: &dyn Clock,
) -> ActivityTracker {
    let mut tracker = ActivityTracker::new();

    for channel in channels {
        let channel_id = channel.channel_id;
        let seeded_at = match history.latest_activity(channel_id).await {
            Ok(Some(at)) => at,
            Ok(None) => {
                info!("📭 Channel {channel_id} has no history, counting from now");
                clock.now()
            }
            Err(e) => {
                warn!("Seed warning for channel {channel_id}: {e:#}");
                clock.now()
            }
        };

        tracker.seed(channel_id, seeded_at);
        info!(
            "🌱 Seeded channel {} at {} (quiet for {})",
            channel_id,
            seeded_at.format("%Y-%m-%d %H:%M:%S UTC"),
            format_human(clock.now() - seeded_at)
        );
    }

    tracker
}
