//! Catch-notice extraction from automation announcements.

use crate::event::{ChatEvent, UserId};
use crate::text;

/// Phrase the automation account uses to announce a successful catch.
const CATCH_MARKER: &str = "you caught";

/// One catch attributed to a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatchNotice {
    pub user_id: UserId,
    /// Item name as selected by the token scan, already lowercased.
    pub name: String,
    pub shiny: bool,
}

/// Read a catch announcement out of an automation message.
///
/// Requires the trigger phrase and at least one mention; the catch goes
/// to the first mentioned user. The token scan runs over the whole
/// message, trigger phrase included, so the word "caught" itself is a
/// valid candidate and is recorded when it wins the scan.
#[must_use]
pub fn extract_catch(event: &ChatEvent) -> Option<CatchNotice> {
    let folded = event.content.to_lowercase();
    if !folded.contains(CATCH_MARKER) {
        return None;
    }
    let user_id = *event.mentions.first()?;
    let name = text::first_item_token(&folded)?;
    let shiny = folded.contains("shiny");
    Some(CatchNotice {
        user_id,
        name,
        shiny,
    })
}
