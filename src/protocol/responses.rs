//! Response text
//!
//! Every line the server sends that is not routed chat. The protocol has no
//! response codes; all of these are plain human-readable text.

pub const COMMAND_REQUIRED: &str = "Error: A command must be specified";

pub const INVALID_COMMAND: &str = "ERROR: Invalid command. Valid commands are:\n\
    /NICK or /N <name>\n\
    /LIST or /L\n\
    /BCAST or /B <message>\n\
    /SEND or /S <nickname(s)> <message>";

pub const NICK_USAGE: &str = "Usage: /NICK <name>";

pub const NICK_INVALID: &str = "Invalid nickname. Must start with a letter and contain only \
    letters, numbers, or underscores. Max 10 characters.";

pub const NICK_IN_USE: &str = "Error: Nickname is already in use!";

pub const SEND_NEEDS_NICK: &str = "You must set a nickname before using /SEND.";

pub const SEND_USAGE: &str = "Invalid format. Usage: /SEND <nickname(s)> <message>";

pub const BCAST_NEEDS_NICK: &str = "You must set a nickname before using /BCAST.";

pub const BCAST_USAGE: &str = "Usage: /BCAST <message>";

pub const BCAST_SENT: &str = "Broadcast message sent.";

pub const NO_USERS: &str = "No users currently connected.";

pub fn nick_set(handle: &str) -> String {
    format!("Nickname successfully set to {}", handle)
}

pub fn message_sent(recipient: &str) -> String {
    format!("Message sent to {}", recipient)
}

pub fn user_list(handles: &[String]) -> String {
    format!("Connected users: {}", handles.join(", "))
}

/// Sent by the router to a sender whose recipient is unknown
pub fn not_registered(recipient: &str) -> String {
    format!("Error: {} is not registered.\n", recipient)
}
