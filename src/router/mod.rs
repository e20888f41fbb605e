//! Message router
//!
//! Owns the handle registry and decides fan-out for every chat message.

pub mod core;
pub mod message;
pub mod registry;

pub use core::{ClaimResult, Router, RouterHandle, RouterRequest};
pub use message::Message;
pub use registry::{Registry, RegistryEntry};
