//! Client session management
//!
//! Defines the per-connection `ClientSession` owned by a connection pump:
//! its identity, current handle and the sending end of its outbound queue.

use std::fmt;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::mpsc;

use crate::error::SessionError;

/// Sending end of a session's bounded outbound line queue
pub type Outbound = mpsc::Sender<String>;

static NEXT_SESSION_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of one connection.
///
/// Never reused, so a registry entry can always be matched to the exact
/// session that created it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(u64);

impl SessionId {
    /// Allocate the next unused id
    pub fn next() -> Self {
        SessionId(NEXT_SESSION_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// State of one connected client.
///
/// A session starts without a handle and can only issue commands until a
/// NICK succeeds.
pub struct ClientSession {
    id: SessionId,
    addr: SocketAddr,
    handle: Option<String>,
    outbound: Outbound,
}

impl ClientSession {
    pub fn new(addr: SocketAddr, outbound: Outbound) -> Self {
        Self {
            id: SessionId::next(),
            addr,
            handle: None,
            outbound,
        }
    }

    // --------------------
    // Getter methods
    // --------------------

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn addr(&self) -> &SocketAddr {
        &self.addr
    }

    /// Returns the registered handle, if any.
    pub fn handle(&self) -> Option<&str> {
        self.handle.as_deref()
    }

    /// Returns a clone of the outbound sender for handing to the router.
    pub fn outbound(&self) -> Outbound {
        self.outbound.clone()
    }

    // --------------------
    // Setter methods
    // --------------------

    /// Sets the handle after the router confirmed the claim.
    pub fn set_handle(&mut self, handle: Option<String>) {
        self.handle = handle;
    }

    /// Queue a reply for this session only.
    ///
    /// Waits for room on the session's own queue; a stalled writer only
    /// holds up its own reader.
    pub async fn reply(&self, text: impl Into<String>) -> Result<(), SessionError> {
        let mut text = text.into();
        if !text.ends_with('\n') {
            text.push('\n');
        }
        self.outbound
            .send(text)
            .await
            .map_err(|_| SessionError::OutboundClosed)
    }
}
