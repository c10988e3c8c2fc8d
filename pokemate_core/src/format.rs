//! Reply rendering for query results.

use crate::listing::ListingRecord;

/// Platform ceiling on a single message.
pub const MESSAGE_LIMIT: usize = 2000;

/// Render records under a title header.
///
/// The assembled block is cut hard at [`MESSAGE_LIMIT`] characters with
/// no regard for line structure, so a record caught by the cut renders
/// partially.
#[must_use]
pub fn render_listings(title: &str, records: &[ListingRecord]) -> String {
    let mut message = format!("🛒 **{} — Listings**\n\n", title.to_uppercase());
    for record in records {
        let mut flags = Vec::new();
        if record.shiny {
            flags.push("✨ Shiny");
        }
        if record.gmax {
            flags.push("💠 G-Max");
        }
        let flag_text = if flags.is_empty() {
            String::new()
        } else {
            format!(" ({})", flags.join(", "))
        };
        message.push_str(&format!(
            "• `{}` coins{}\n  Seller: `{}`\n  Channel: <#{}>\n\n",
            record.price, flag_text, record.seller_name, record.channel_id
        ));
    }
    truncate_chars(&message, MESSAGE_LIMIT)
}

/// Cut `text` to at most `limit` characters.
#[must_use]
pub fn truncate_chars(text: &str, limit: usize) -> String {
    if text.chars().count() <= limit {
        text.to_string()
    } else {
        text.chars().take(limit).collect()
    }
}
