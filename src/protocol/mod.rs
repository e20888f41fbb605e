//! Chat line protocol
//!
//! Handles input parsing, command dispatch and response text.

pub mod commands;
pub mod handlers;
pub mod parser;
pub mod responses;

pub use commands::{Command, Input};
pub use handlers::{handle_command, handle_input};
pub use parser::parse_input;
