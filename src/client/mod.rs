//! Client connection handling
//!
//! Per-connection session state and the duplex pump that drives it.

pub mod handler;
pub mod session;

pub use handler::handle_client;
pub use session::{ClientSession, Outbound, SessionId};
