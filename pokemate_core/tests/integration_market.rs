//! Integration tests for the market observation flow.
//!
//! These tests verify that:
//! - Shop embeds from the automation account feed the listing index
//! - Queries reply with sorted, filtered, capped listing blocks
//! - Replies never exceed the outbound character limit
//! - Spawn alerts fire and expire through the sweep
//! - Catch notices land in the mentioned user's collection

use async_trait::async_trait;
use chrono::Duration;
use pokemate_core::{
    Author, ChatEvent, Dispatcher, DispatcherConfig, Embed, Event, LatencyMonitor, ReplySink,
};
use std::sync::{Arc, Mutex};

const AUTOMATION: u64 = 716_390_085_896_962_058;
const SELLER: u64 = 4242;
const MARKET_CHANNEL: u64 = 900;
const COMMAND_CHANNEL: u64 = 901;

#[derive(Clone, Default)]
struct RecordingSink {
    sent: Arc<Mutex<Vec<(u64, String)>>>,
}

impl RecordingSink {
    fn replies(&self) -> Vec<(u64, String)> {
        self.sent.lock().expect("Failed to lock sink").clone()
    }
}

#[async_trait]
impl ReplySink for RecordingSink {
    async fn send_channel(&self, channel: u64, text: &str) -> anyhow::Result<()> {
        self.sent
            .lock()
            .expect("Failed to lock sink")
            .push((channel, text.to_string()));
        Ok(())
    }

    async fn notify_guild(&self, _guild: u64, _text: &str) -> anyhow::Result<()> {
        Ok(())
    }
}

fn new_dispatcher(sink: RecordingSink) -> Dispatcher<RecordingSink> {
    Dispatcher::new(DispatcherConfig::default(), sink, LatencyMonitor::default())
}

fn shop_event(seller_name: &str, description: &str) -> Event {
    Event::Message(ChatEvent {
        author_id: AUTOMATION,
        author_name: "Pokétwo".to_string(),
        content: String::new(),
        embeds: vec![Embed {
            title: Some("Pokétwo Shop".to_string()),
            description: Some(description.to_string()),
        }],
        mentions: Vec::new(),
        referenced_author: Some(Author {
            id: SELLER,
            name: seller_name.to_string(),
        }),
        channel_id: MARKET_CHANNEL,
        guild_id: Some(1),
        author_roles: Vec::new(),
        received_at: pokemate_core::util::ist_now(),
    })
}

fn member_command(text: &str) -> Event {
    Event::Message(ChatEvent {
        author_id: 77,
        author_name: "misty".to_string(),
        content: text.to_string(),
        embeds: Vec::new(),
        mentions: Vec::new(),
        referenced_author: None,
        channel_id: COMMAND_CHANNEL,
        guild_id: Some(1),
        author_roles: Vec::new(),
        received_at: pokemate_core::util::ist_now(),
    })
}

fn spawn_event(channel: u64, age_secs: i64) -> Event {
    Event::Message(ChatEvent {
        author_id: AUTOMATION,
        author_name: "Pokétwo".to_string(),
        content: String::new(),
        embeds: vec![Embed {
            title: Some("A wild pokémon has appeared!".to_string()),
            description: None,
        }],
        mentions: Vec::new(),
        referenced_author: None,
        channel_id: channel,
        guild_id: Some(1),
        author_roles: Vec::new(),
        received_at: pokemate_core::util::ist_now() - Duration::seconds(age_secs),
    })
}

#[tokio::test]
async fn test_name_query_returns_sorted_listings() {
    let sink = RecordingSink::default();
    let mut dispatcher = new_dispatcher(sink.clone());

    // Three charizard listings arrive out of price order, plus a decoy
    dispatcher
        .handle(shop_event(
            "trader",
            "Charizard — 9000 coins\ncharizard 3000\nCharizard (gmax) 7000\nPikachu 500",
        ))
        .await;
    dispatcher.handle(member_command("F!--n charizard")).await;

    let replies = sink.replies();
    // Indexing the shop itself never produces a reply
    assert_eq!(replies.len(), 1);
    let (channel, block) = &replies[0];
    assert_eq!(*channel, COMMAND_CHANNEL);
    assert!(block.starts_with("🛒 **CHARIZARD — Listings**\n\n"));

    let cheap = block.find("`3000` coins").expect("Missing 3000 entry");
    let mid = block.find("`7000` coins").expect("Missing 7000 entry");
    let top = block.find("`9000` coins").expect("Missing 9000 entry");
    assert!(cheap < mid && mid < top);

    assert!(!block.contains("`500` coins"));
    assert!(block.contains("Seller: `trader`"));
    assert!(block.contains("Channel: <#900>"));
}

#[tokio::test]
async fn test_price_ceiling_is_inclusive() {
    let sink = RecordingSink::default();
    let mut dispatcher = new_dispatcher(sink.clone());

    dispatcher
        .handle(shop_event(
            "trader",
            "Charizard — 9000 coins\ncharizard 3000\nCharizard (gmax) 7000",
        ))
        .await;
    dispatcher.handle(member_command("F!--p 7000 charizard")).await;

    let (_, block) = &sink.replies()[0];
    assert!(block.starts_with("🛒 **CHARIZARD ≤ 7000 — Listings**"));
    assert!(block.contains("`3000` coins"));
    assert!(block.contains("`7000` coins"));
    assert!(!block.contains("`9000` coins"));
}

#[tokio::test]
async fn test_gmax_filter_narrows_and_flags() {
    let sink = RecordingSink::default();
    let mut dispatcher = new_dispatcher(sink.clone());

    dispatcher
        .handle(shop_event(
            "trader",
            "Charizard — 9000 coins\nCharizard (gmax) 7000",
        ))
        .await;
    dispatcher.handle(member_command("F!--gmax charizard")).await;

    let (_, block) = &sink.replies()[0];
    assert!(block.starts_with("🛒 **G-MAX CHARIZARD — Listings**"));
    assert!(block.contains("`7000` coins (💠 G-Max)"));
    assert!(!block.contains("`9000`"));
}

#[tokio::test]
async fn test_shiny_prefix_indexes_under_the_qualifier() {
    let sink = RecordingSink::default();
    let mut dispatcher = new_dispatcher(sink.clone());

    dispatcher
        .handle(shop_event("trader", "Shiny Charizard 5000"))
        .await;

    // The qualifier becomes the lookup key, so the species query misses
    dispatcher.handle(member_command("F!--n charizard")).await;
    dispatcher.handle(member_command("F!--n shiny")).await;

    let replies = sink.replies();
    assert_eq!(replies[0].1, "❌ No **charizard** found.");
    assert!(replies[1].1.starts_with("🛒 **SHINY — Listings**"));
    assert!(replies[1].1.contains("`5000` coins (✨ Shiny)"));
}

#[tokio::test]
async fn test_absent_and_filtered_empty_read_the_same_way() {
    let sink = RecordingSink::default();
    let mut dispatcher = new_dispatcher(sink.clone());

    dispatcher
        .handle(shop_event("trader", "Charizard — 9000 coins"))
        .await;
    dispatcher.handle(member_command("F!--shiny charizard")).await;
    dispatcher.handle(member_command("F!--n mewtwo")).await;
    dispatcher.handle(member_command("F!--p 100 charizard")).await;

    let replies = sink.replies();
    assert_eq!(replies[0].1, "✨ No shiny **charizard** found.");
    assert_eq!(replies[1].1, "❌ No **mewtwo** found.");
    assert_eq!(replies[2].1, "❌ No **charizard** under `100`.");
}

#[tokio::test]
async fn test_reply_is_capped_and_truncated() {
    let sink = RecordingSink::default();
    let mut dispatcher = new_dispatcher(sink.clone());

    // Twelve listings, a seller name long enough to overflow the reply
    let lines: Vec<String> = (1..=12).map(|i| format!("Snorlax {i}00")).collect();
    let seller_name = "t".repeat(160);
    dispatcher
        .handle(shop_event(&seller_name, &lines.join("\n")))
        .await;
    dispatcher.handle(member_command("F!--n snorlax")).await;

    let (_, block) = &sink.replies()[0];
    // Only the ten cheapest survive the cap
    assert!(block.contains("`100` coins"));
    assert!(!block.contains("`1100` coins"));
    assert!(!block.contains("`1200` coins"));
    assert_eq!(block.chars().count(), 2000);
}

#[tokio::test]
async fn test_spawn_alert_fires_and_expires() {
    let sink = RecordingSink::default();
    let mut dispatcher = new_dispatcher(sink.clone());

    // Fresh spawn: alert goes out and the entry survives a sweep
    dispatcher.handle(spawn_event(555, 0)).await;
    let replies = sink.replies();
    assert_eq!(
        replies[0],
        (555, "🟢 **Spawn detected** (assistant online)".to_string())
    );
    dispatcher.handle(Event::SpawnSweep).await;
    assert!(dispatcher.state().spawns.is_active(555));

    // Stale spawn: recorded in the past, dropped by the next sweep
    dispatcher.handle(spawn_event(556, 301)).await;
    assert!(dispatcher.state().spawns.is_active(556));
    dispatcher.handle(Event::SpawnSweep).await;
    assert!(!dispatcher.state().spawns.is_active(556));
    assert!(dispatcher.state().spawns.is_active(555));
}

#[tokio::test]
async fn test_catch_notice_feeds_the_dex() {
    let sink = RecordingSink::default();
    let mut dispatcher = new_dispatcher(sink.clone());

    dispatcher
        .handle(Event::Message(ChatEvent {
            author_id: AUTOMATION,
            author_name: "Pokétwo".to_string(),
            content: "Congratulations <@77>! You caught a Level 19 Pikachu!".to_string(),
            embeds: Vec::new(),
            mentions: vec![77],
            referenced_author: None,
            channel_id: MARKET_CHANNEL,
            guild_id: Some(1),
            author_roles: Vec::new(),
            received_at: pokemate_core::util::ist_now(),
        }))
        .await;
    dispatcher.handle(member_command("F!mydex")).await;

    let replies = sink.replies();
    assert_eq!(replies[0].1, "📘 **Dex Stats**\nTotal: 1\nShiny: 0");
}
