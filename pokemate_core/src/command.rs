//! Prefix command grammar.
//!
//! Parsing is deliberately forgiving about spacing and strict about
//! shape: a recognized command with bad arguments produces a usage
//! error the router turns into a reply, while an unrecognized command
//! word is silently ignored.

use thiserror::Error;

/// A fully parsed user command.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Ping,
    Help,
    /// Manually add a name to the caller's collection.
    AddPokemon { name: String },
    /// Collection counters for the caller.
    MyDex,
    /// Latest stored shop description for the caller.
    ShopSummary,
    /// Fairness check on give/receive values.
    CheckTrade { give: f64, take: f64 },
    /// Schedule the guild reminder, admin only.
    SetReminder { time: String },
    /// All listings for a name.
    SearchName { name: String },
    /// Shiny listings for a name.
    SearchShiny { name: String },
    /// Gigantamax listings for a name.
    SearchGmax { name: String },
    /// Listings at or under a price ceiling.
    SearchPrice { ceiling: u32, name: String },
}

/// Argument problems worth a reply.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("Usage: `{prefix}{usage}`")]
    Usage {
        prefix: String,
        usage: &'static str,
    },
    #[error("`{given}` is not a number. Usage: `{prefix}{usage}`")]
    InvalidNumber {
        given: String,
        prefix: String,
        usage: &'static str,
    },
}

const USAGE_ADD: &str = "addpokemon <name>";
const USAGE_TRADE: &str = "checktrade <you_give> <you_get>";
const USAGE_REMINDER: &str = "setreminder <HH:MM>";
const USAGE_NAME: &str = "--n <pokemon>";
const USAGE_SHINY: &str = "--shiny <pokemon>";
const USAGE_GMAX: &str = "--gmax <pokemon>";
const USAGE_PRICE: &str = "--p <max_price> <pokemon>";

impl Command {
    /// Parse a message body against a prefix.
    ///
    /// `None` means the text is not addressed to the companion at all,
    /// or names a command it does not know; both cases stay silent.
    #[must_use]
    pub fn parse(text: &str, prefix: &str) -> Option<Result<Self, CommandError>> {
        let body = text.strip_prefix(prefix)?.trim();
        let (word, rest) = match body.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (body, ""),
        };
        match word {
            "ping" => Some(Ok(Self::Ping)),
            "help" => Some(Ok(Self::Help)),
            "mydex" => Some(Ok(Self::MyDex)),
            "shopsummary" => Some(Ok(Self::ShopSummary)),
            "addpokemon" => Some(Self::parse_add(rest, prefix)),
            "checktrade" => Some(Self::parse_trade(rest, prefix)),
            "setreminder" => Some(Self::parse_reminder(rest, prefix)),
            "--n" => Some(Self::parse_named(rest, prefix, USAGE_NAME, |name| {
                Self::SearchName { name }
            })),
            "--shiny" => Some(Self::parse_named(rest, prefix, USAGE_SHINY, |name| {
                Self::SearchShiny { name }
            })),
            "--gmax" => Some(Self::parse_named(rest, prefix, USAGE_GMAX, |name| {
                Self::SearchGmax { name }
            })),
            "--p" => Some(Self::parse_price(rest, prefix)),
            _ => None,
        }
    }

    /// Commands gated behind an admin role.
    #[must_use]
    pub const fn admin_only(&self) -> bool {
        matches!(self, Self::SetReminder { .. })
    }

    fn parse_add(rest: &str, prefix: &str) -> Result<Self, CommandError> {
        if rest.is_empty() {
            return Err(usage(prefix, USAGE_ADD));
        }
        Ok(Self::AddPokemon {
            name: rest.to_string(),
        })
    }

    fn parse_trade(rest: &str, prefix: &str) -> Result<Self, CommandError> {
        let mut parts = rest.split_whitespace();
        let (Some(give), Some(take)) = (parts.next(), parts.next()) else {
            return Err(usage(prefix, USAGE_TRADE));
        };
        let give = parse_number(give, prefix, USAGE_TRADE)?;
        let take = parse_number(take, prefix, USAGE_TRADE)?;
        Ok(Self::CheckTrade { give, take })
    }

    fn parse_reminder(rest: &str, prefix: &str) -> Result<Self, CommandError> {
        let Some(time) = rest.split_whitespace().next() else {
            return Err(usage(prefix, USAGE_REMINDER));
        };
        Ok(Self::SetReminder {
            time: time.to_string(),
        })
    }

    fn parse_named(
        rest: &str,
        prefix: &str,
        usage_text: &'static str,
        build: impl FnOnce(String) -> Self,
    ) -> Result<Self, CommandError> {
        if rest.is_empty() {
            return Err(usage(prefix, usage_text));
        }
        Ok(build(rest.to_string()))
    }

    fn parse_price(rest: &str, prefix: &str) -> Result<Self, CommandError> {
        let (raw_ceiling, name) = match rest.split_once(char::is_whitespace) {
            Some((raw, name)) => (raw, name.trim()),
            None => (rest, ""),
        };
        if raw_ceiling.is_empty() || name.is_empty() {
            return Err(usage(prefix, USAGE_PRICE));
        }
        let ceiling: u32 = raw_ceiling
            .parse()
            .map_err(|_| invalid_number(raw_ceiling, prefix, USAGE_PRICE))?;
        Ok(Self::SearchPrice {
            ceiling,
            name: name.to_string(),
        })
    }
}

fn usage(prefix: &str, usage: &'static str) -> CommandError {
    CommandError::Usage {
        prefix: prefix.to_string(),
        usage,
    }
}

fn invalid_number(given: &str, prefix: &str, usage: &'static str) -> CommandError {
    CommandError::InvalidNumber {
        given: given.to_string(),
        prefix: prefix.to_string(),
        usage,
    }
}

fn parse_number(raw: &str, prefix: &str, usage: &'static str) -> Result<f64, CommandError> {
    raw.parse()
        .map_err(|_| invalid_number(raw, prefix, usage))
}

/// Static command overview sent for the help command.
#[must_use]
pub fn help_text(prefix: &str) -> String {
    format!(
        "**Companion commands**\n\
         `{prefix}ping` latency check\n\
         `{prefix}addpokemon <name>` add a catch by hand\n\
         `{prefix}mydex` your collection counters\n\
         `{prefix}shopsummary` your latest observed shop\n\
         `{prefix}checktrade <you_give> <you_get>` fairness check\n\
         `{prefix}setreminder <HH:MM>` daily guild reminder (admin)\n\
         `{prefix}--n <pokemon>` listings by name\n\
         `{prefix}--shiny <pokemon>` shiny listings\n\
         `{prefix}--gmax <pokemon>` Gigantamax listings\n\
         `{prefix}--p <max_price> <pokemon>` listings under a price"
    )
}
