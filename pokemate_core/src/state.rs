//! Process-wide companion state.
//!
//! One instance lives inside the dispatcher. Extraction handlers write,
//! the query engine and command handlers read; nothing else touches it,
//! which is the entire synchronization story.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, FixedOffset};

use crate::catch::CatchNotice;
use crate::event::UserId;
use crate::listing::ShopIndex;
use crate::reminder::ReminderBook;
use crate::spawn::SpawnTracker;

/// Collection counters for one user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DexStats {
    pub total: usize,
    pub shiny: usize,
}

/// Everything the companion remembers, all of it in memory and gone on
/// restart.
#[derive(Debug, Default)]
pub struct CompanionState {
    /// Listings keyed by item token.
    pub shop_index: ShopIndex,
    /// Item names ever attributed to each user.
    pub collections: HashMap<UserId, HashSet<String>>,
    /// Subset of collected names that arrived flagged shiny.
    pub shinies: HashMap<UserId, HashSet<String>>,
    /// Last time a catch was attributed to each user.
    pub last_active: HashMap<UserId, DateTime<FixedOffset>>,
    /// Most recent full shop description per seller.
    pub latest_shops: HashMap<UserId, String>,
    /// Channels with a live spawn.
    pub spawns: SpawnTracker,
    /// Per-guild reminder times.
    pub reminders: ReminderBook,
}

impl CompanionState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Credit a catch to its user and refresh their activity stamp.
    pub fn record_catch(&mut self, notice: &CatchNotice, at: DateTime<FixedOffset>) {
        self.collections
            .entry(notice.user_id)
            .or_default()
            .insert(notice.name.clone());
        if notice.shiny {
            self.shinies
                .entry(notice.user_id)
                .or_default()
                .insert(notice.name.clone());
        }
        self.last_active.insert(notice.user_id, at);
    }

    /// Manually add a name to a user's collection. The name is folded
    /// and trimmed before storage; a name containing "shiny" also lands
    /// in the shiny set.
    pub fn add_to_dex(&mut self, user: UserId, raw_name: &str) {
        let name = raw_name.to_lowercase().trim().to_string();
        if name.contains("shiny") {
            self.shinies.entry(user).or_default().insert(name.clone());
        }
        self.collections.entry(user).or_default().insert(name);
    }

    #[must_use]
    pub fn dex_stats(&self, user: UserId) -> DexStats {
        DexStats {
            total: self.collections.get(&user).map_or(0, HashSet::len),
            shiny: self.shinies.get(&user).map_or(0, HashSet::len),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::ist_now;

    #[test]
    fn recorded_catches_show_up_in_stats() {
        let mut state = CompanionState::new();
        let at = ist_now();
        state.record_catch(
            &CatchNotice {
                user_id: 7,
                name: "pikachu".to_string(),
                shiny: false,
            },
            at,
        );
        state.record_catch(
            &CatchNotice {
                user_id: 7,
                name: "caught".to_string(),
                shiny: true,
            },
            at,
        );
        let stats = state.dex_stats(7);
        assert_eq!(stats, DexStats { total: 2, shiny: 1 });
        assert_eq!(state.last_active.get(&7), Some(&at));
    }

    #[test]
    fn duplicate_names_count_once() {
        let mut state = CompanionState::new();
        state.add_to_dex(7, "Pikachu");
        state.add_to_dex(7, "  pikachu ");
        assert_eq!(state.dex_stats(7).total, 1);
    }

    #[test]
    fn shiny_in_a_manual_name_lands_in_both_sets() {
        let mut state = CompanionState::new();
        state.add_to_dex(7, "Shiny Rayquaza");
        let stats = state.dex_stats(7);
        assert_eq!(stats, DexStats { total: 1, shiny: 1 });
    }

    #[test]
    fn stats_are_per_user() {
        let mut state = CompanionState::new();
        state.add_to_dex(7, "eevee");
        assert_eq!(state.dex_stats(8).total, 0);
    }
}
