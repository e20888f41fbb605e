//! Chat relay
//!
//! A line-oriented TCP chat server. Clients pick a unique handle with
//! `/NICK`, then broadcast or send directed messages. A single router task
//! owns the handle registry and fans messages out to per-client queues.

pub mod client;
pub mod config;
pub mod error;
pub mod protocol;
pub mod router;
pub mod server;
pub mod utils;

pub use crate::config::ServerConfig;
pub use crate::server::Server;
