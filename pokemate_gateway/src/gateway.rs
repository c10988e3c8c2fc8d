//! Long-lived gateway session: identify, heartbeat, dispatch.

use crate::rest::RestClient;
use crate::wire::{self, GatewayFrame, Hello, MessageCreate, opcode};
use crate::{Error, Result};
use futures_util::{
    SinkExt, StreamExt,
    stream::{SplitSink, SplitStream},
};
use pokemate_core::{Event, GuildId, LatencyMonitor, util};
use serde_json::Value;
use std::{
    collections::HashMap,
    time::{Duration, Instant},
};
use tokio::{net::TcpStream, sync::mpsc};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async, tungstenite::Message};
use tracing::{debug, info, warn};

const GATEWAY_URL: &str = "wss://gateway.discord.gg/?v=10&encoding=json";
const RECONNECT_DELAY: Duration = Duration::from_secs(5);

type WsWriter = SplitSink<WebSocketStream<MaybeTlsStream<TcpStream>>, Message>;
type WsReader = SplitStream<WebSocketStream<MaybeTlsStream<TcpStream>>>;

/// Owns the websocket session and feeds decoded chat events to the
/// dispatcher through a channel.
pub struct Gateway {
    token: String,
    rest: RestClient,
    events: mpsc::Sender<Event>,
    latency: LatencyMonitor,
    /// Per-guild role tables, fetched lazily over REST.
    role_names: HashMap<GuildId, HashMap<u64, String>>,
}

impl Gateway {
    #[must_use]
    pub fn new(
        token: String,
        rest: RestClient,
        events: mpsc::Sender<Event>,
        latency: LatencyMonitor,
    ) -> Self {
        Self {
            token,
            rest,
            events,
            latency,
            role_names: HashMap::new(),
        }
    }

    /// Connect and stream until the event queue closes. A dropped
    /// connection reconnects with a fresh identify after a short pause.
    pub async fn run(mut self) {
        loop {
            match self.connect_and_stream().await {
                Ok(()) => info!("Gateway session ended, reconnecting"),
                Err(e) => warn!("Gateway error: {e}, reconnecting"),
            }
            if self.events.is_closed() {
                info!("Event queue closed, stopping gateway");
                return;
            }
            tokio::time::sleep(RECONNECT_DELAY).await;
        }
    }

    async fn connect_and_stream(&mut self) -> Result<()> {
        let (socket, _) = connect_async(GATEWAY_URL).await?;
        let (mut writer, mut reader) = socket.split();

        let hello = await_hello(&mut reader).await?;
        send_json(&mut writer, &wire::identify(&self.token)).await?;
        info!(
            "Connected to gateway, heartbeating every {}ms",
            hello.heartbeat_interval
        );

        let mut heartbeat =
            tokio::time::interval(Duration::from_millis(hello.heartbeat_interval));
        let mut sequence: Option<u64> = None;
        let mut beat_sent = Instant::now();

        loop {
            tokio::select! {
                _ = heartbeat.tick() => {
                    send_json(&mut writer, &wire::heartbeat(sequence)).await?;
                    beat_sent = Instant::now();
                }
                frame = next_frame(&mut reader) => {
                    let Some(frame) = frame? else {
                        return Ok(());
                    };
                    if let Some(seq) = frame.s {
                        sequence = Some(seq);
                    }
                    match frame.op {
                        opcode::DISPATCH => self.on_dispatch(frame).await?,
                        opcode::HEARTBEAT => {
                            send_json(&mut writer, &wire::heartbeat(sequence)).await?;
                            beat_sent = Instant::now();
                        }
                        opcode::HEARTBEAT_ACK => {
                            let millis = beat_sent.elapsed().as_millis();
                            self.latency
                                .record_millis(u64::try_from(millis).unwrap_or(u64::MAX));
                        }
                        opcode::RECONNECT | opcode::INVALID_SESSION => {
                            info!("Server requested a new session");
                            return Ok(());
                        }
                        other => debug!("Ignoring opcode {other}"),
                    }
                }
            }
        }
    }

    async fn on_dispatch(&mut self, frame: GatewayFrame) -> Result<()> {
        match frame.t.as_deref() {
            Some("READY") => {
                let username = frame.d["user"]["username"].as_str().unwrap_or("unknown");
                info!("Gateway ready as @{username}");
            }
            Some("MESSAGE_CREATE") => match serde_json::from_value::<MessageCreate>(frame.d) {
                Ok(message) => self.forward_message(message).await?,
                Err(e) => debug!("Skipping malformed message payload: {e}"),
            },
            _ => {}
        }
        Ok(())
    }

    async fn forward_message(&mut self, message: MessageCreate) -> Result<()> {
        let author_roles = match (message.guild_id, &message.member) {
            (Some(guild), Some(member)) if !member.roles.is_empty() => {
                self.resolve_role_names(guild, &member.roles).await
            }
            _ => Vec::new(),
        };
        let event = message.into_event(author_roles, util::ist_now());
        self.events
            .send(Event::Message(event))
            .await
            .map_err(|_| Error::QueueClosed)
    }

    /// Resolve role ids to names, fetching the guild's role table on
    /// first use. A failed fetch yields no names and is retried on the
    /// next message from that guild.
    async fn resolve_role_names(&mut self, guild: GuildId, roles: &[u64]) -> Vec<String> {
        if !self.role_names.contains_key(&guild) {
            match self.rest.guild_roles(guild).await {
                Ok(names) => {
                    self.role_names.insert(guild, names);
                }
                Err(e) => {
                    debug!("Role lookup failed for guild {guild}: {e}");
                    return Vec::new();
                }
            }
        }
        let Some(names) = self.role_names.get(&guild) else {
            return Vec::new();
        };
        roles
            .iter()
            .filter_map(|role| names.get(role).cloned())
            .collect()
    }
}

async fn await_hello(reader: &mut WsReader) -> Result<Hello> {
    let Some(frame) = next_frame(reader).await? else {
        return Err(Error::ClosedBeforeHello);
    };
    if frame.op != opcode::HELLO {
        return Err(Error::Protocol(format!(
            "expected hello, got opcode {}",
            frame.op
        )));
    }
    Ok(serde_json::from_value(frame.d)?)
}

async fn next_frame(reader: &mut WsReader) -> Result<Option<GatewayFrame>> {
    while let Some(message) = reader.next().await {
        match message? {
            Message::Text(text) => match serde_json::from_str(&text) {
                Ok(frame) => return Ok(Some(frame)),
                Err(e) => debug!("Skipping undecodable frame: {e}"),
            },
            Message::Close(_) => {
                info!("Gateway closed by server");
                return Ok(None);
            }
            _ => {}
        }
    }
    Ok(None)
}

async fn send_json(writer: &mut WsWriter, payload: &Value) -> Result<()> {
    writer.send(Message::text(payload.to_string())).await?;
    Ok(())
}
