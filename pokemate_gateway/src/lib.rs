//! Discord transport: websocket gateway in, REST replies out.
//!
//! Everything Discord-specific lives here. Inbound traffic is narrowed
//! into core chat events and pushed onto the dispatcher queue; outbound
//! replies arrive through the core reply sink trait.

mod error;
mod gateway;
mod rest;
mod wire;

pub use error::{Error, Result};
pub use gateway::Gateway;
pub use rest::RestClient;
