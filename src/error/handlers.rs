//! Error handlers
//!
//! Maps session errors to log output. Peer disconnects are routine and are
//! not reported as failures.

use crate::error::types::{ChatServerError, SessionError};
use log::{error, info};
use std::io::ErrorKind;
use std::net::SocketAddr;

/// Handle a fatal server error
pub fn handle_error(err: &ChatServerError) {
    error!("Chat relay error: {}", err);
}

/// Whether the error is an ordinary peer disconnect rather than a fault
pub fn is_disconnect(err: &SessionError) -> bool {
    match err {
        SessionError::Io(e) => matches!(
            e.kind(),
            ErrorKind::ConnectionReset
                | ErrorKind::ConnectionAborted
                | ErrorKind::BrokenPipe
                | ErrorKind::UnexpectedEof
        ),
        SessionError::OutboundClosed => true,
        SessionError::Router(_) => false,
    }
}

/// Log the error that ended a session
pub fn handle_session_error(addr: &SocketAddr, err: &SessionError) {
    if is_disconnect(err) {
        info!("Client {} dropped: {}", addr, err);
    } else {
        error!("Session {} failed: {}", addr, err);
    }
}
