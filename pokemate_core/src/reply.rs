//! Outbound reply plumbing.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;

use crate::event::{ChannelId, GuildId};

/// Transport-side delivery of replies and notices.
///
/// Implementations surface failures as errors; the dispatcher logs and
/// drops them, so delivery is fire-and-forget end to end.
#[async_trait]
pub trait ReplySink: Send + Sync {
    /// Send a text block to a channel.
    async fn send_channel(&self, channel: ChannelId, text: &str) -> anyhow::Result<()>;

    /// Deliver a notice to every member of a guild.
    async fn notify_guild(&self, guild: GuildId, text: &str) -> anyhow::Result<()>;
}

/// Heartbeat round-trip cell shared between the transport, which writes
/// it, and the ping command, which reads it.
///
/// Zero is reserved for "not measured yet"; a measured sub-millisecond
/// round trip is stored as one.
#[derive(Debug, Clone, Default)]
pub struct LatencyMonitor(Arc<AtomicU64>);

impl LatencyMonitor {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_millis(&self, millis: u64) {
        self.0.store(millis.max(1), Ordering::Relaxed);
    }

    #[must_use]
    pub fn millis(&self) -> Option<u64> {
        match self.0.load(Ordering::Relaxed) {
            0 => None,
            measured => Some(measured),
        }
    }
}
