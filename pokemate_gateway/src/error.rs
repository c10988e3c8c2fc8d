#![deny(
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

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("websocket error: {0}")]
    Socket(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("Discord API error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("malformed gateway payload: {0}")]
    Payload(#[from] serde_json::Error),

    #[error("malformed snowflake: {0}")]
    Snowflake(#[from] std::num::ParseIntError),

    #[error("gateway protocol error: {0}")]
    Protocol(String),

    #[error("socket closed before hello")]
    ClosedBeforeHello,

    #[error("event queue closed")]
    QueueClosed,
}
