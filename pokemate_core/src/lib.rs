#![warn(
    clippy::all,
    clippy::nursery,
    clippy::pedantic,
    clippy::style,
    clippy::complexity,
    clippy::perf,
    clippy::correctness,
    clippy::suspicious,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(
    clippy::similar_names,
    clippy::missing_safety_doc,
    clippy::missing_panics_doc,
    clippy::missing_errors_doc
)]

//! Core logic for the companion service: the chat event model, the
//! listing and catch extractors, the in-memory shop index with its
//! query engine, and the single-task dispatcher that ties them to a
//! reply transport.

pub mod catch;
pub mod command;
pub mod dispatch;
pub mod event;
pub mod format;
pub mod listing;
pub mod query;
pub mod reminder;
pub mod reply;
pub mod spawn;
pub mod state;
pub mod text;
pub mod trade;
pub mod util;

pub use catch::{CatchNotice, extract_catch};
pub use command::{Command, CommandError};
pub use dispatch::{Dispatcher, DispatcherConfig};
pub use event::{Author, ChannelId, ChatEvent, Embed, Event, GuildId, UserId};
pub use format::{MESSAGE_LIMIT, render_listings};
pub use listing::{ListingRecord, ShopIndex, extract_listing};
pub use query::ShopQuery;
pub use reply::{LatencyMonitor, ReplySink};
pub use state::{CompanionState, DexStats};
