//! Gateway wire format, narrowed to the fields the companion reads.

use chrono::{DateTime, FixedOffset};
use pokemate_core::{Author, ChatEvent, Embed};
use serde::{Deserialize, Deserializer};
use serde_json::{Value, json};

/// Opcodes the client handles.
pub mod opcode {
    pub const DISPATCH: u8 = 0;
    pub const HEARTBEAT: u8 = 1;
    pub const IDENTIFY: u8 = 2;
    pub const RECONNECT: u8 = 7;
    pub const INVALID_SESSION: u8 = 9;
    pub const HELLO: u8 = 10;
    pub const HEARTBEAT_ACK: u8 = 11;
}

/// Gateway intents: guilds, members, guild messages, direct messages,
/// and message content.
pub const INTENTS: u64 = (1 << 0) | (1 << 1) | (1 << 9) | (1 << 12) | (1 << 15);

/// One frame off the socket.
#[derive(Debug, Deserialize)]
pub struct GatewayFrame {
    pub op: u8,
    #[serde(default)]
    pub d: Value,
    #[serde(default)]
    pub s: Option<u64>,
    #[serde(default)]
    pub t: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Hello {
    pub heartbeat_interval: u64,
}

#[derive(Debug, Deserialize)]
pub struct WireUser {
    #[serde(deserialize_with = "snowflake")]
    pub id: u64,
    pub username: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct WireEmbed {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct WireMember {
    #[serde(default, deserialize_with = "snowflake_list")]
    pub roles: Vec<u64>,
}

#[derive(Debug, Deserialize)]
pub struct ReferencedMessage {
    /// Absent when the referenced message was deleted or not resolved.
    #[serde(default)]
    pub author: Option<WireUser>,
}

/// MESSAGE_CREATE payload.
#[derive(Debug, Deserialize)]
pub struct MessageCreate {
    #[serde(deserialize_with = "snowflake")]
    pub channel_id: u64,
    #[serde(default, deserialize_with = "snowflake_opt")]
    pub guild_id: Option<u64>,
    pub author: WireUser,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub embeds: Vec<WireEmbed>,
    #[serde(default)]
    pub mentions: Vec<WireUser>,
    #[serde(default)]
    pub referenced_message: Option<ReferencedMessage>,
    #[serde(default)]
    pub member: Option<WireMember>,
}

impl MessageCreate {
    /// Narrow to the core event shape. Role ids are resolved to names
    /// by the caller, which owns the per-guild role cache.
    #[must_use]
    pub fn into_event(
        self,
        author_roles: Vec<String>,
        received_at: DateTime<FixedOffset>,
    ) -> ChatEvent {
        ChatEvent {
            author_id: self.author.id,
            author_name: self.author.username,
            content: self.content,
            embeds: self
                .embeds
                .into_iter()
                .map(|embed| Embed {
                    title: embed.title,
                    description: embed.description,
                })
                .collect(),
            mentions: self.mentions.iter().map(|user| user.id).collect(),
            referenced_author: self
                .referenced_message
                .and_then(|reference| reference.author)
                .map(|author| Author {
                    id: author.id,
                    name: author.username,
                }),
            channel_id: self.channel_id,
            guild_id: self.guild_id,
            author_roles,
            received_at,
        }
    }
}

/// Identify payload for a fresh session.
#[must_use]
pub fn identify(token: &str) -> Value {
    json!({
        "op": opcode::IDENTIFY,
        "d": {
            "token": token,
            "intents": INTENTS,
            "properties": {
                "os": std::env::consts::OS,
                "browser": "pokemate",
                "device": "pokemate"
            }
        }
    })
}

/// Heartbeat payload carrying the last seen sequence number.
#[must_use]
pub fn heartbeat(sequence: Option<u64>) -> Value {
    json!({ "op": opcode::HEARTBEAT, "d": sequence })
}

fn snowflake<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    raw.parse().map_err(serde::de::Error::custom)
}

fn snowflake_opt<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    raw.map(|value| value.parse().map_err(serde::de::Error::custom))
        .transpose()
}

fn snowflake_list<'de, D>(deserializer: D) -> Result<Vec<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Vec::<String>::deserialize(deserializer)?;
    raw.into_iter()
        .map(|value| value.parse().map_err(serde::de::Error::custom))
        .collect()
}
