//! REST side of the Discord API: replies, role lookups, member listings.

use crate::{Error, Result};
use async_trait::async_trait;
use pokemate_core::{ChannelId, GuildId, ReplySink, UserId};
use serde::Deserialize;
use std::{collections::HashMap, time::Duration};
use tokio::time::sleep;
use tracing::{debug, info, warn};

const API_BASE: &str = "https://discord.com/api/v10";

/// Authenticated HTTP client for the Discord REST API.
#[derive(Clone)]
pub struct RestClient {
    http: reqwest::Client,
    token: String,
}

#[derive(Debug, Deserialize)]
struct CurrentUser {
    id: String,
    username: String,
}

#[derive(Debug, Deserialize)]
struct RoleEntry {
    id: String,
    name: String,
}

#[derive(Debug, Deserialize)]
struct MemberEntry {
    user: MemberUser,
}

#[derive(Debug, Deserialize)]
struct MemberUser {
    id: String,
}

#[derive(Debug, Deserialize)]
struct DmChannel {
    id: String,
}

impl RestClient {
    #[must_use]
    pub fn new(token: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            token,
        }
    }

    fn authorization(&self) -> String {
        format!("Bot {}", self.token)
    }

    /// Identify the account behind the token.
    pub async fn current_user(&self) -> Result<(UserId, String)> {
        let user: CurrentUser = self
            .http
            .get(format!("{API_BASE}/users/@me"))
            .header("Authorization", self.authorization())
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok((user.id.parse()?, user.username))
    }

    /// Test connection to the Discord API with exponential backoff retry.
    /// Starts at 2s, increases by 2s each attempt, max 10s delay.
    /// Retries indefinitely until connection succeeds.
    pub async fn test_connection(&self) {
        const INITIAL_DELAY_SECS: u64 = 2;
        const MAX_DELAY_SECS: u64 = 10;

        let mut attempt = 1u64;
        loop {
            match self.current_user().await {
                Ok((id, username)) => {
                    info!("Connected to Discord API: @{username} (id: {id})");
                    return;
                }
                Err(e) => {
                    // Calculate delay with exponential backoff: 2s, 4s, 6s, 8s, 10s, 10s, ...
                    let delay_secs = (INITIAL_DELAY_SECS * attempt).min(MAX_DELAY_SECS);

                    warn!("Connection attempt {attempt} failed: {e}. Retrying in {delay_secs}s...");

                    // Only show detailed help on first failure
                    if attempt == 1 {
                        warn!("This may be due to:");
                        warn!("  - Network connectivity issues");
                        warn!("  - Firewall blocking discord.com");
                        warn!("  - Invalid bot token");
                        warn!("  - Discord API being temporarily unavailable");
                    }

                    sleep(Duration::from_secs(delay_secs)).await;
                    attempt += 1;
                }
            }
        }
    }

    /// Post a message to a channel.
    pub async fn create_message(&self, channel: ChannelId, content: &str) -> Result<()> {
        self.http
            .post(format!("{API_BASE}/channels/{channel}/messages"))
            .header("Authorization", self.authorization())
            .json(&serde_json::json!({ "content": content }))
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    /// Open (or reuse) the direct-message channel with a user.
    pub async fn dm_channel(&self, user: UserId) -> Result<ChannelId> {
        let channel: DmChannel = self
            .http
            .post(format!("{API_BASE}/users/@me/channels"))
            .header("Authorization", self.authorization())
            .json(&serde_json::json!({ "recipient_id": user.to_string() }))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(channel.id.parse()?)
    }

    /// Role id to role name mapping for a guild.
    pub async fn guild_roles(&self, guild: GuildId) -> Result<HashMap<u64, String>> {
        let roles: Vec<RoleEntry> = self
            .http
            .get(format!("{API_BASE}/guilds/{guild}/roles"))
            .header("Authorization", self.authorization())
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        roles
            .into_iter()
            .map(|role| Ok((role.id.parse()?, role.name)))
            .collect()
    }

    /// Member ids for a guild, first page of up to 1000 members.
    pub async fn guild_member_ids(&self, guild: GuildId) -> Result<Vec<UserId>> {
        let members: Vec<MemberEntry> = self
            .http
            .get(format!("{API_BASE}/guilds/{guild}/members?limit=1000"))
            .header("Authorization", self.authorization())
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        members
            .into_iter()
            .map(|member| member.user.id.parse().map_err(Error::from))
            .collect()
    }
}

#[async_trait]
impl ReplySink for RestClient {
    async fn send_channel(&self, channel: ChannelId, text: &str) -> anyhow::Result<()> {
        self.create_message(channel, text).await?;
        Ok(())
    }

    async fn notify_guild(&self, guild: GuildId, text: &str) -> anyhow::Result<()> {
        let members = self.guild_member_ids(guild).await?;
        let mut delivered = 0usize;
        for user in members {
            match self.dm_channel(user).await {
                Ok(channel) => match self.create_message(channel, text).await {
                    Ok(()) => delivered += 1,
                    Err(e) => debug!("Dropping notice to {user}: {e}"),
                },
                Err(e) => debug!("No DM channel for {user}: {e}"),
            }
        }
        info!("Delivered guild notice to {delivered} member(s)");
        Ok(())
    }
}
