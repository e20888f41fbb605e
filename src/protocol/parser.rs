//! Client input parsing
//!
//! Turns a raw line into an [`Input`]: blank, a command, or chat content.

use crate::protocol::commands::{COMMAND_MARKER, Command, Input};

/// Parse a raw line received from a client.
///
/// The line is trimmed first. A leading `/` makes it a command: the word up
/// to the first whitespace run is matched case-insensitively and the rest,
/// with leading whitespace removed, is its argument string.
pub fn parse_input(raw: &str) -> Input {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Input::Blank;
    }

    match trimmed.strip_prefix(COMMAND_MARKER) {
        Some(body) => Input::Command(parse_command(body)),
        None => Input::Chat(trimmed.to_string()),
    }
}

/// Parse the body of a command line, without its leading marker
fn parse_command(body: &str) -> Command {
    let (word, rest) = match body.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim_start()),
        None => (body, ""),
    };

    match word.to_ascii_uppercase().as_str() {
        "NICK" | "N" => Command::Nick(rest.to_string()),
        "SEND" | "S" => Command::Send(rest.to_string()),
        "BCAST" | "B" => Command::Bcast(rest.to_string()),
        "LIST" | "L" => Command::List,
        _ => Command::Unknown(word.to_string()),
    }
}
