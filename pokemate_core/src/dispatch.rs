//! Single-task event dispatcher.
//!
//! One dispatcher owns the companion state and consumes one ordered
//! queue of chat events and timer ticks. Handlers run to completion one
//! at a time, which is the entire locking story for the index and the
//! user sets.

use chrono::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::catch;
use crate::command::{self, Command};
use crate::event::{ChannelId, ChatEvent, Embed, Event, UserId};
use crate::format;
use crate::listing;
use crate::query::{self, ShopQuery};
use crate::reply::{LatencyMonitor, ReplySink};
use crate::spawn::SPAWN_MARKER;
use crate::state::CompanionState;
use crate::trade;
use crate::util;

/// Alert posted into a channel when a wild spawn is observed.
const SPAWN_ALERT: &str = "🟢 **Spawn detected** (assistant online)";
/// Notice delivered to guild members when their reminder fires.
const REMINDER_TEXT: &str = "⏰ Server reminder!";
/// Embed title fragment marking a shop listing message.
const SHOP_MARKER: &str = "shop";

/// Behavior knobs for the dispatcher, decoupled from the config crate.
#[derive(Debug, Clone)]
pub struct DispatcherConfig {
    /// Command prefix, matched case-sensitively.
    pub prefix: String,
    /// Accounts whose messages feed the extractors instead of the
    /// command router.
    pub automation_ids: Vec<UserId>,
    /// Role names allowed to run admin commands.
    pub admin_roles: Vec<String>,
    /// Spawn entries older than this are dropped by the sweep.
    pub spawn_ttl_secs: i64,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            prefix: "F!".to_string(),
            automation_ids: vec![716_390_085_896_962_058],
            admin_roles: vec![
                "Admin".to_string(),
                "Moderator".to_string(),
                "PoketwoHelper".to_string(),
            ],
            spawn_ttl_secs: 300,
        }
    }
}

/// Owns the state, consumes the queue, talks back through the sink.
pub struct Dispatcher<S> {
    state: CompanionState,
    config: DispatcherConfig,
    sink: S,
    latency: LatencyMonitor,
}

impl<S: ReplySink> Dispatcher<S> {
    #[must_use]
    pub fn new(config: DispatcherConfig, sink: S, latency: LatencyMonitor) -> Self {
        Self {
            state: CompanionState::new(),
            config,
            sink,
            latency,
        }
    }

    /// Read-only view of the companion state.
    #[must_use]
    pub const fn state(&self) -> &CompanionState {
        &self.state
    }

    /// Consume events until every producer hangs up.
    pub async fn run(mut self, mut events: mpsc::Receiver<Event>) {
        info!("Dispatcher running (prefix {})", self.config.prefix);
        while let Some(event) = events.recv().await {
            self.handle(event).await;
        }
        info!("Event queue closed, dispatcher stopping");
    }

    /// Apply one event to the state. Exposed so tests can drive the
    /// dispatcher without a channel.
    pub async fn handle(&mut self, event: Event) {
        match event {
            Event::Message(message) => self.handle_message(message).await,
            Event::SpawnSweep => self.sweep_spawns(),
            Event::ReminderSweep => self.sweep_reminders().await,
        }
    }

    async fn handle_message(&mut self, message: ChatEvent) {
        if self.config.automation_ids.contains(&message.author_id) {
            self.observe_automation(&message).await;
        } else {
            self.route_command(&message).await;
        }
    }

    /// Feed an automation message through the observers. Spawn and shop
    /// checks read the first embed; the catch check reads the content.
    async fn observe_automation(&mut self, message: &ChatEvent) {
        if let Some(embed) = message.embeds.first() {
            let title = embed.title.as_deref().unwrap_or("").to_lowercase();
            if title.contains(SPAWN_MARKER) {
                self.state.spawns.record(message.channel_id, message.received_at);
                self.deliver(message.channel_id, SPAWN_ALERT).await;
            }
            if title.contains(SHOP_MARKER) {
                self.index_shop(message, embed);
            }
        }
        if let Some(notice) = catch::extract_catch(message) {
            debug!(
                "Catch attributed: user={} name={} shiny={}",
                notice.user_id, notice.name, notice.shiny
            );
            self.state.record_catch(&notice, message.received_at);
        }
    }

    /// Index every line of a shop embed. Messages without a resolved
    /// reply author carry no seller and are ignored whole.
    fn index_shop(&mut self, message: &ChatEvent, embed: &Embed) {
        let Some(seller) = message.referenced_author.as_ref() else {
            return;
        };
        let description = embed.description.as_deref().unwrap_or("");
        self.state
            .latest_shops
            .insert(seller.id, description.to_string());
        let mut added = 0usize;
        for line in description.split('\n') {
            if let Some((key, record)) =
                listing::extract_listing(line, seller, message.channel_id, message.received_at)
            {
                self.state.shop_index.append(key, record);
                added += 1;
            }
        }
        if added > 0 {
            debug!(
                "Indexed {added} listing(s) from {} ({} total)",
                seller.name,
                self.state.shop_index.record_count()
            );
        }
    }

    async fn route_command(&mut self, message: &ChatEvent) {
        match Command::parse(&message.content, &self.config.prefix) {
            None => {}
            Some(Err(err)) => self.deliver(message.channel_id, &err.to_string()).await,
            Some(Ok(cmd)) => {
                info!("[{}] Command: {cmd:?}", message.author_name);
                self.run_command(message, cmd).await;
            }
        }
    }

    async fn run_command(&mut self, message: &ChatEvent, cmd: Command) {
        if cmd.admin_only() && !self.is_admin(&message.author_roles) {
            self.deliver(message.channel_id, "❌ Admin only").await;
            return;
        }
        match cmd {
            Command::Ping => {
                let text = self.latency.millis().map_or_else(
                    || "🏓 Pong".to_string(),
                    |measured| format!("🏓 Pong `{measured}ms`"),
                );
                self.deliver(message.channel_id, &text).await;
            }
            Command::Help => {
                let text = command::help_text(&self.config.prefix);
                self.deliver(message.channel_id, &text).await;
            }
            Command::AddPokemon { name } => {
                self.state.add_to_dex(message.author_id, &name);
                self.deliver(message.channel_id, &format!("✅ Added **{name}**"))
                    .await;
            }
            Command::MyDex => {
                let stats = self.state.dex_stats(message.author_id);
                let text = format!(
                    "📘 **Dex Stats**\nTotal: {}\nShiny: {}",
                    stats.total, stats.shiny
                );
                self.deliver(message.channel_id, &text).await;
            }
            Command::ShopSummary => {
                let text = match self.state.latest_shops.get(&message.author_id) {
                    None => "No shop detected yet.".to_string(),
                    Some(description) if description.is_empty() => "No description.".to_string(),
                    Some(description) => description.clone(),
                };
                self.deliver(message.channel_id, &text).await;
            }
            Command::CheckTrade { give, take } => {
                let text = trade::assess(give, take).map_or_else(
                    || "⚠️ The receive amount must be non-zero.".to_string(),
                    |verdict| verdict.message(),
                );
                self.deliver(message.channel_id, &text).await;
            }
            Command::SetReminder { time } => {
                let Some(guild) = message.guild_id else {
                    self.deliver(message.channel_id, "❌ Server channels only")
                        .await;
                    return;
                };
                let text = match self.state.reminders.set(guild, &time) {
                    Ok(stored) => format!("⏰ Reminder set for {stored} IST"),
                    Err(err) => format!("❌ {err}"),
                };
                self.deliver(message.channel_id, &text).await;
            }
            Command::SearchName { name } => {
                self.answer_query(message.channel_id, &name, ShopQuery::ByName)
                    .await;
            }
            Command::SearchShiny { name } => {
                self.answer_query(message.channel_id, &name, ShopQuery::ShinyOnly)
                    .await;
            }
            Command::SearchGmax { name } => {
                self.answer_query(message.channel_id, &name, ShopQuery::GmaxOnly)
                    .await;
            }
            Command::SearchPrice { ceiling, name } => {
                self.answer_query(message.channel_id, &name, ShopQuery::MaxPrice(ceiling))
                    .await;
            }
        }
    }

    async fn answer_query(&self, channel: ChannelId, raw_name: &str, shape: ShopQuery) {
        let key = raw_name.trim().to_lowercase();
        let hits = query::run(&self.state.shop_index, &key, shape);
        if hits.is_empty() {
            self.deliver(channel, &shape.empty_message(raw_name)).await;
            return;
        }
        let block = format::render_listings(&shape.title(&key), &hits);
        self.deliver(channel, &block).await;
    }

    fn is_admin(&self, roles: &[String]) -> bool {
        roles.iter().any(|role| self.config.admin_roles.contains(role))
    }

    fn sweep_spawns(&mut self) {
        let removed = self
            .state
            .spawns
            .sweep(util::ist_now(), Duration::seconds(self.config.spawn_ttl_secs));
        if removed > 0 {
            debug!("Expired {removed} spawn alert(s)");
        }
    }

    async fn sweep_reminders(&mut self) {
        let now = util::ist_now();
        for guild in self.state.reminders.due(&now) {
            info!("Reminder due for guild {guild}");
            if let Err(err) = self.sink.notify_guild(guild, REMINDER_TEXT).await {
                debug!("Reminder delivery for guild {guild} failed: {err}");
            }
        }
    }

    /// Send through the sink, logging and dropping any failure.
    async fn deliver(&self, channel: ChannelId, text: &str) {
        if let Err(err) = self.sink.send_channel(channel, text).await {
            debug!("Delivery to channel {channel} failed: {err}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;

    use crate::event::Author;
    use crate::util::ist_now;

    #[derive(Clone, Default)]
    struct RecordingSink {
        sent: Arc<Mutex<Vec<(ChannelId, String)>>>,
    }

    #[async_trait]
    impl ReplySink for RecordingSink {
        async fn send_channel(&self, channel: ChannelId, text: &str) -> anyhow::Result<()> {
            if let Ok(mut sent) = self.sent.lock() {
                sent.push((channel, text.to_string()));
            }
            Ok(())
        }

        async fn notify_guild(&self, _guild: u64, _text: &str) -> anyhow::Result<()> {
            Ok(())
        }
    }

    impl RecordingSink {
        fn replies(&self) -> Vec<(ChannelId, String)> {
            self.sent.lock().map(|sent| sent.clone()).unwrap_or_default()
        }
    }

    fn dispatcher(sink: RecordingSink) -> Dispatcher<RecordingSink> {
        Dispatcher::new(DispatcherConfig::default(), sink, LatencyMonitor::new())
    }

    fn user_message(content: &str) -> ChatEvent {
        ChatEvent {
            author_id: 77,
            author_name: "misty".to_string(),
            content: content.to_string(),
            embeds: vec![],
            mentions: vec![],
            referenced_author: None,
            channel_id: 9,
            guild_id: Some(5),
            author_roles: vec![],
            received_at: ist_now(),
        }
    }

    fn shop_message(description: &str) -> ChatEvent {
        ChatEvent {
            author_id: 716_390_085_896_962_058,
            author_name: "automation".to_string(),
            content: String::new(),
            embeds: vec![Embed {
                title: Some("Pokétwo Shop".to_string()),
                description: Some(description.to_string()),
            }],
            mentions: vec![],
            referenced_author: Some(Author {
                id: 42,
                name: "Ash".to_string(),
            }),
            channel_id: 3,
            guild_id: Some(5),
            author_roles: vec![],
            received_at: ist_now(),
        }
    }

    #[tokio::test]
    async fn automation_shop_feeds_the_index() {
        let sink = RecordingSink::default();
        let mut dispatcher = dispatcher(sink.clone());
        dispatcher
            .handle(Event::Message(shop_message("Pikachu — 3000\nno price line")))
            .await;
        assert_eq!(dispatcher.state().shop_index.record_count(), 1);
        assert_eq!(dispatcher.state().latest_shops.get(&42).map(String::as_str),
            Some("Pikachu — 3000\nno price line"));
        assert!(sink.replies().is_empty());
    }

    #[tokio::test]
    async fn shop_without_reply_author_is_ignored() {
        let sink = RecordingSink::default();
        let mut dispatcher = dispatcher(sink);
        let mut message = shop_message("Pikachu — 3000");
        message.referenced_author = None;
        dispatcher.handle(Event::Message(message)).await;
        assert_eq!(dispatcher.state().shop_index.record_count(), 0);
    }

    #[tokio::test]
    async fn commands_from_the_automation_account_are_not_routed() {
        let sink = RecordingSink::default();
        let mut dispatcher = dispatcher(sink.clone());
        let mut message = user_message("F!ping");
        message.author_id = 716_390_085_896_962_058;
        dispatcher.handle(Event::Message(message)).await;
        assert!(sink.replies().is_empty());
    }

    #[tokio::test]
    async fn search_replies_in_the_asking_channel() {
        let sink = RecordingSink::default();
        let mut dispatcher = dispatcher(sink.clone());
        dispatcher
            .handle(Event::Message(shop_message("Pikachu — 3000")))
            .await;
        dispatcher
            .handle(Event::Message(user_message("F!--n Pikachu")))
            .await;
        let replies = sink.replies();
        assert_eq!(replies.len(), 1);
        assert_eq!(replies[0].0, 9);
        assert!(replies[0].1.starts_with("🛒 **PIKACHU — Listings**"));
    }

    #[tokio::test]
    async fn missing_name_gets_the_plain_no_result_reply() {
        let sink = RecordingSink::default();
        let mut dispatcher = dispatcher(sink.clone());
        dispatcher
            .handle(Event::Message(user_message("F!--n Mew")))
            .await;
        assert_eq!(sink.replies()[0].1, "❌ No **Mew** found.");
    }

    #[tokio::test]
    async fn spawn_alert_fires_and_expires() {
        let sink = RecordingSink::default();
        let mut dispatcher = dispatcher(sink.clone());
        let mut message = shop_message("");
        message.embeds = vec![Embed {
            title: Some("A wild pokémon has appeared!".to_string()),
            description: None,
        }];
        message.referenced_author = None;
        dispatcher.handle(Event::Message(message)).await;
        assert!(dispatcher.state().spawns.is_active(3));
        assert_eq!(sink.replies()[0].1, SPAWN_ALERT);

        dispatcher.handle(Event::SpawnSweep).await;
        assert!(dispatcher.state().spawns.is_active(3));
    }

    #[tokio::test]
    async fn reminder_needs_an_admin_role() {
        let sink = RecordingSink::default();
        let mut dispatcher = dispatcher(sink.clone());
        dispatcher
            .handle(Event::Message(user_message("F!setreminder 21:30")))
            .await;
        assert_eq!(sink.replies()[0].1, "❌ Admin only");

        let mut admin = user_message("F!setreminder 21:30");
        admin.author_roles = vec!["Moderator".to_string()];
        dispatcher.handle(Event::Message(admin)).await;
        assert_eq!(sink.replies()[1].1, "⏰ Reminder set for 21:30 IST");
        assert_eq!(dispatcher.state().reminders.get(5), Some("21:30"));
    }

    #[tokio::test]
    async fn unknown_commands_stay_silent() {
        let sink = RecordingSink::default();
        let mut dispatcher = dispatcher(sink.clone());
        dispatcher
            .handle(Event::Message(user_message("F!dance")))
            .await;
        dispatcher
            .handle(Event::Message(user_message("just chatting")))
            .await;
        assert!(sink.replies().is_empty());
    }
}
