//! Input validation utilities
//!
//! Handle well-formedness checks.

/// Longest handle a client may register
pub const MAX_HANDLE_LENGTH: usize = 10;

/// Validate a candidate handle.
///
/// A handle is 1 to 10 characters: an ASCII letter followed by ASCII
/// letters, digits or underscores.
pub fn is_valid_handle(candidate: &str) -> bool {
    let mut chars = candidate.chars();

    let Some(first) = chars.next() else {
        return false;
    };

    candidate.len() <= MAX_HANDLE_LENGTH
        && first.is_ascii_alphabetic()
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
