//! Per-guild reminder schedule on the IST wall clock.

use std::collections::HashMap;

use chrono::{DateTime, FixedOffset, NaiveTime};
use thiserror::Error;

use crate::event::GuildId;

/// Rejected reminder time input.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("time must be HH:MM, e.g. 21:30")]
pub struct InvalidTime;

/// One stored reminder time per guild, compared against the wall clock
/// minute by minute.
#[derive(Debug, Default)]
pub struct ReminderBook {
    times: HashMap<GuildId, String>,
}

impl ReminderBook {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate and store a reminder time, replacing any earlier one for
    /// the guild. The stored form is zero-padded HH:MM and is returned
    /// for the confirmation reply.
    pub fn set(&mut self, guild: GuildId, time: &str) -> Result<String, InvalidTime> {
        let parsed = NaiveTime::parse_from_str(time, "%H:%M").map_err(|_| InvalidTime)?;
        let stored = parsed.format("%H:%M").to_string();
        self.times.insert(guild, stored.clone());
        Ok(stored)
    }

    /// Guilds whose stored time matches `now` formatted as HH:MM, in
    /// ascending guild order.
    #[must_use]
    pub fn due(&self, now: &DateTime<FixedOffset>) -> Vec<GuildId> {
        let stamp = now.format("%H:%M").to_string();
        let mut due: Vec<GuildId> = self
            .times
            .iter()
            .filter(|(_, time)| **time == stamp)
            .map(|(guild, _)| *guild)
            .collect();
        due.sort_unstable();
        due
    }

    #[must_use]
    pub fn get(&self, guild: GuildId) -> Option<&str> {
        self.times.get(&guild).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    use crate::util::ist_offset;

    #[expect(clippy::expect_used, reason = "Test failure should panic with context")]
    fn ist_at(hour: u32, minute: u32) -> DateTime<FixedOffset> {
        ist_offset()
            .with_ymd_and_hms(2024, 6, 1, hour, minute, 30)
            .single()
            .expect("fixed offset instants are unambiguous")
    }

    #[test]
    fn set_normalizes_and_stores() {
        let mut book = ReminderBook::new();
        assert_eq!(book.set(5, "7:05"), Ok("07:05".to_string()));
        assert_eq!(book.get(5), Some("07:05"));
    }

    #[test]
    fn malformed_times_are_rejected() {
        let mut book = ReminderBook::new();
        assert_eq!(book.set(5, "25:00"), Err(InvalidTime));
        assert_eq!(book.set(5, "9pm"), Err(InvalidTime));
        assert_eq!(book.get(5), None);
    }

    #[test]
    #[expect(clippy::expect_used, reason = "Test failure should panic with context")]
    fn due_matches_the_current_minute() {
        let mut book = ReminderBook::new();
        book.set(5, "21:30").expect("time should store");
        book.set(6, "09:00").expect("time should store");
        assert_eq!(book.due(&ist_at(21, 30)), vec![5]);
        assert!(book.due(&ist_at(21, 31)).is_empty());
    }

    #[test]
    #[expect(clippy::expect_used, reason = "Test failure should panic with context")]
    fn later_set_replaces_the_earlier_one() {
        let mut book = ReminderBook::new();
        book.set(5, "21:30").expect("time should store");
        book.set(5, "22:00").expect("time should store");
        assert!(book.due(&ist_at(21, 30)).is_empty());
        assert_eq!(book.due(&ist_at(22, 0)), vec![5]);
    }
}
