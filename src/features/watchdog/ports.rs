//! Collaborator traits the watchdog depends on
//!
//! The Discord implementations live in `crate::discord`; tests use in-memory fakes.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Delivers reminder text to a channel
#[async_trait]
pub trait NotificationSink: Send + Sync {
    /// Send `text` to `channel_id`. Errors are logged by the caller and not retried.
    async fn send(&self, channel_id: u64, text: &str) -> Result<()>;
}

/// Looks up past activity when seeding
#[async_trait]
pub trait HistoryLookup: Send + Sync {
    /// Timestamp of the newest qualifying message, or `None` for an empty channel
    async fn latest_activity(&self, channel_id: u64) -> Result<Option<DateTime<Utc>>>;
}

#[cfg(test)]
pub(crate) mod fakes {
    use super::*;
    use anyhow::anyhow;
    use std::collections::{HashMap, HashSet};
    use std::sync::Mutex;

    /// Records every send; channels in `failing` return an error instead
    #[derive(Default)]
    pub struct RecordingSink {
        pub sent: Mutex<Vec<(u64, String)>>,
        pub failing: Mutex<HashSet<u64>>,
    }

    impl RecordingSink {
        pub fn fail_for(&self, channel_id: u64) {
            self.failing.lock().unwrap().insert(channel_id);
        }

        pub fn recover(&self, channel_id: u64) {
            self.failing.lock().unwrap().remove(&channel_id);
        }

        pub fn sent(&self) -> Vec<(u64, String)> {
            self.sent.lock().unwrap().clone()
        }

        pub fn count_for(&self, channel_id: u64) -> usize {
            self.sent()
                .iter()
                .filter(|(id, _)| *id == channel_id)
                .count()
        }
    }

    #[async_trait]
    impl NotificationSink for RecordingSink {
        async fn send(&self, channel_id: u64, text: &str) -> Result<()> {
            if self.failing.lock().unwrap().contains(&channel_id) {
                return Err(anyhow!("Unknown Channel"));
            }
            self.sent.lock().unwrap().push((channel_id, text.to_string()));
            Ok(())
        }
    }

    /// Canned history answers; channels without an entry fail the lookup
    #[derive(Default)]
    pub struct StaticHistory {
        pub answers: HashMap<u64, Option<DateTime<Utc>>>,
    }

    #[async_trait]
    impl HistoryLookup for StaticHistory {
        async fn latest_activity(&self, channel_id: u64) -> Result<Option<DateTime<Utc>>> {
            self.answers
                .get(&channel_id)
                .copied()
                .ok_or_else(|| anyhow!("Missing Access"))
        }
    }
}
