//! Transport-neutral view of inbound chat traffic.
//!
//! The gateway crate narrows wire payloads into [`ChatEvent`] values;
//! everything downstream of the queue works on this shape alone.

use chrono::{DateTime, FixedOffset};

/// Discord snowflake of a user account.
pub type UserId = u64;
/// Discord snowflake of a channel.
pub type ChannelId = u64;
/// Discord snowflake of a guild (server).
pub type GuildId = u64;

/// The slice of an embed the extractors read.
#[derive(Debug, Clone, Default)]
pub struct Embed {
    pub title: Option<String>,
    pub description: Option<String>,
}

/// A user reference carried on a reply chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Author {
    pub id: UserId,
    pub name: String,
}

/// One inbound message, already narrowed from the wire format.
#[derive(Debug, Clone)]
pub struct ChatEvent {
    pub author_id: UserId,
    pub author_name: String,
    pub content: String,
    pub embeds: Vec<Embed>,
    /// Mentioned users in message order.
    pub mentions: Vec<UserId>,
    /// Author of the message this one replies to, when the transport
    /// resolved it.
    pub referenced_author: Option<Author>,
    pub channel_id: ChannelId,
    /// Absent for direct messages.
    pub guild_id: Option<GuildId>,
    /// Role names of the author in the originating guild.
    pub author_roles: Vec<String>,
    /// Capture time in IST.
    pub received_at: DateTime<FixedOffset>,
}

/// Everything the dispatcher consumes, in one ordered queue.
#[derive(Debug, Clone)]
pub enum Event {
    /// A chat message from the gateway.
    Message(ChatEvent),
    /// Periodic tick that expires stale spawn entries.
    SpawnSweep,
    /// Periodic tick that fires due reminders.
    ReminderSweep,
}
