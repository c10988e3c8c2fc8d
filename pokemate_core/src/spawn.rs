//! Transient tracking of wild spawn announcements.

use std::collections::HashMap;

use chrono::{DateTime, Duration, FixedOffset};

use crate::event::ChannelId;

/// Embed title fragment the automation account uses for wild spawns.
pub const SPAWN_MARKER: &str = "a wild pokémon has appeared";

/// Channels with a recent spawn, pruned by age on each sweep tick.
///
/// A later spawn in the same channel replaces the earlier entry, so a
/// channel is tracked at most once.
#[derive(Debug, Default)]
pub struct SpawnTracker {
    entries: HashMap<ChannelId, DateTime<FixedOffset>>,
}

impl SpawnTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, channel: ChannelId, at: DateTime<FixedOffset>) {
        self.entries.insert(channel, at);
    }

    /// Drop entries strictly older than `ttl`, returning how many were
    /// removed.
    pub fn sweep(&mut self, now: DateTime<FixedOffset>, ttl: Duration) -> usize {
        let before = self.entries.len();
        self.entries
            .retain(|_, seen_at| now.signed_duration_since(*seen_at) <= ttl);
        before - self.entries.len()
    }

    #[must_use]
    pub fn is_active(&self, channel: ChannelId) -> bool {
        self.entries.contains_key(&channel)
    }

    #[must_use]
    pub fn active_count(&self) -> usize {
        self.entries.len()
    }
}
