//! Module `commands`
//!
//! Data structures representing one parsed line of client input.

/// Marker that introduces a command line
pub const COMMAND_MARKER: char = '/';

/// A command issued by a client.
///
/// Arguments hold the raw remainder of the line after the command word;
/// each handler interprets its own remainder.
#[derive(Debug, PartialEq, Eq)]
pub enum Command {
    Nick(String),
    Send(String),
    Bcast(String),
    List,
    Unknown(String), // Unrecognized command word, as typed
}

/// One trimmed line of client input
#[derive(Debug, PartialEq, Eq)]
pub enum Input {
    Blank,
    Command(Command),
    Chat(String),
}
