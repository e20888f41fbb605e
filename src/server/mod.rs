//! Server core functionality
//!
//! Listener bootstrap and the accept loop.

pub mod core;

pub use core::Server;
