//! Shop listing extraction and the in-memory listing index.

use std::collections::HashMap;
use std::sync::OnceLock;

use chrono::{DateTime, FixedOffset};

use crate::event::{Author, ChannelId, UserId};
use crate::text;

/// Price pattern: the first run of one to nine decimal digits in a line
/// is read as the asking price.
static PRICE_PATTERN: OnceLock<regex::Regex> = OnceLock::new();

/// Get the price pattern regex
#[expect(
    clippy::expect_used,
    reason = "Static regex pattern validated at compile time"
)]
fn price_pattern() -> &'static regex::Regex {
    PRICE_PATTERN.get_or_init(|| {
        regex::Regex::new(r"\d{1,9}").expect("Static regex pattern is guaranteed to be valid")
    })
}

/// One marketplace offer captured from a shop embed line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingRecord {
    pub seller_id: UserId,
    pub seller_name: String,
    pub price: u32,
    /// The embed line exactly as the automation account wrote it.
    pub raw_line: String,
    pub channel_id: ChannelId,
    pub timestamp: DateTime<FixedOffset>,
    pub shiny: bool,
    pub gmax: bool,
}

/// Parse one shop-description line into an index key and a record.
///
/// Returns `None` when the line carries no digit run or no qualifying
/// item token; extraction is best-effort and skips such lines silently.
#[must_use]
pub fn extract_listing(
    line: &str,
    seller: &Author,
    channel_id: ChannelId,
    timestamp: DateTime<FixedOffset>,
) -> Option<(String, ListingRecord)> {
    let folded = line.to_lowercase();
    let price: u32 = price_pattern().find(&folded)?.as_str().parse().ok()?;
    let shiny = folded.contains("shiny");
    let gmax = folded.contains("gmax") || folded.contains("gigantamax");
    let key = text::first_item_token(&folded)?;
    let record = ListingRecord {
        seller_id: seller.id,
        seller_name: seller.name.clone(),
        price,
        raw_line: line.to_string(),
        channel_id,
        timestamp,
        shiny,
        gmax,
    };
    Some((key, record))
}

/// Append-only index of listings keyed by item token.
///
/// Records under a key keep arrival order; nothing is deduplicated or
/// evicted for the life of the process.
#[derive(Debug, Default)]
pub struct ShopIndex {
    entries: HashMap<String, Vec<ListingRecord>>,
}

impl ShopIndex {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, key: String, record: ListingRecord) {
        self.entries.entry(key).or_default().push(record);
    }

    /// All records under `key`, in arrival order. Unknown keys yield an
    /// empty slice.
    #[must_use]
    pub fn lookup(&self, key: &str) -> &[ListingRecord] {
        self.entries.get(key).map_or(&[], Vec::as_slice)
    }

    /// Total records across every key.
    #[must_use]
    pub fn record_count(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }
}
