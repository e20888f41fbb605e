//! Router control loop
//!
//! The router is the single owner of the handle registry. Every registration
//! change, listing and routing decision is a request on one channel and is
//! processed to completion before the next, so requests are totally ordered
//! and never observe a half-applied rename.
//!
//! Delivery never waits on a session: lines are pushed with `try_send`.
//! A full queue drops that recipient's copy, a closed queue evicts the entry.

use log::{debug, info, warn};
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, oneshot};

use crate::client::{Outbound, SessionId};
use crate::error::{RegistryError, RouterError};
use crate::protocol::responses;
use crate::router::message::Message;
use crate::router::registry::{Registry, RegistryEntry};

/// Outcome of a handle claim, as decided by the router
pub type ClaimResult = Result<(), RegistryError>;

/// Requests accepted by the router control loop
#[derive(Debug)]
pub enum RouterRequest {
    /// Claim `handle`, atomically releasing `previous` on success
    Register {
        session: SessionId,
        handle: String,
        previous: Option<String>,
        outbound: Outbound,
        reply: oneshot::Sender<ClaimResult>,
    },
    /// Release every handle still held by `session`
    Unregister { session: SessionId },
    Route(Message),
    List { reply: oneshot::Sender<Vec<String>> },
}

/// Result of pushing one line to one session
#[derive(Debug, PartialEq, Eq)]
enum Delivery {
    Queued,
    Dropped,
    Closed,
}

/// The router actor. Construct with [`Router::new`] and drive with [`Router::run`].
pub struct Router {
    registry: Registry,
    requests: mpsc::Receiver<RouterRequest>,
}

/// Cloneable submission side of the router
#[derive(Clone, Debug)]
pub struct RouterHandle {
    requests: mpsc::Sender<RouterRequest>,
}

impl Router {
    /// Create a router and its handle. `capacity` bounds the request queue.
    pub fn new(capacity: usize) -> (Router, RouterHandle) {
        let (tx, rx) = mpsc::channel(capacity);
        let router = Router {
            registry: Registry::new(),
            requests: rx,
        };
        (router, RouterHandle { requests: tx })
    }

    /// Create a router and run it on its own task
    pub fn spawn(capacity: usize) -> RouterHandle {
        let (router, handle) = Router::new(capacity);
        tokio::spawn(router.run());
        handle
    }

    /// Process requests until every [`RouterHandle`] has been dropped
    pub async fn run(mut self) {
        info!("Router started");
        while let Some(request) = self.requests.recv().await {
            self.process(request);
        }
        info!("Router stopped ({} handles still registered)", self.registry.len());
    }

    fn process(&mut self, request: RouterRequest) {
        match request {
            RouterRequest::Register {
                session,
                handle,
                previous,
                outbound,
                reply,
            } => {
                let result = self.register(session, &handle, previous.as_deref(), outbound);
                // Requester may have disconnected while waiting
                let _ = reply.send(result);
            }
            RouterRequest::Unregister { session } => self.unregister(session),
            RouterRequest::Route(message) => self.route(message),
            RouterRequest::List { reply } => {
                let _ = reply.send(self.registry.handles());
            }
        }
    }

    fn register(
        &mut self,
        session: SessionId,
        handle: &str,
        previous: Option<&str>,
        outbound: Outbound,
    ) -> ClaimResult {
        let entry = RegistryEntry::new(session, outbound);
        match self.registry.claim(handle, previous, entry) {
            Ok(()) => {
                match previous {
                    Some(old) => info!("Session {} renamed '{}' -> '{}'", session, old, handle),
                    None => info!("Session {} registered as '{}'", session, handle),
                }
                Ok(())
            }
            Err(e) => {
                debug!("Session {} denied handle '{}': {}", session, handle, e);
                Err(e)
            }
        }
    }

    fn unregister(&mut self, session: SessionId) {
        let released = self.registry.release_session(session);
        if released.is_empty() {
            debug!("Session {} held no handle at unregister", session);
        }
        for handle in released {
            info!("Session {} with handle '{}' unregistered", session, handle);
        }
    }

    fn route(&mut self, message: Message) {
        match &message.to {
            None => self.route_broadcast(&message),
            Some(to) => self.route_directed(to, &message),
        }
    }

    fn route_broadcast(&mut self, message: &Message) {
        let line = message.format();
        let mut closed = Vec::new();
        let mut delivered = 0;

        for (handle, entry) in self.registry.iter() {
            if *handle == message.from {
                continue;
            }
            match deliver(handle, entry, line.clone()) {
                Delivery::Queued => delivered += 1,
                Delivery::Dropped => {}
                Delivery::Closed => closed.push((handle.clone(), entry.session())),
            }
        }

        debug!("Broadcast from '{}' queued for {} sessions", message.from, delivered);
        self.evict(closed);
    }

    fn route_directed(&mut self, to: &str, message: &Message) {
        if let Some(entry) = self.registry.get(to) {
            debug!("Direct message '{}' -> '{}'", message.from, to);
            if deliver(to, entry, message.format()) == Delivery::Closed {
                let session = entry.session();
                self.evict(vec![(to.to_string(), session)]);
            }
            return;
        }

        // Unknown recipient: tell the sender if it is still around
        match self.registry.get(&message.from) {
            Some(sender) => {
                debug!("'{}' addressed unregistered '{}'", message.from, to);
                if deliver(&message.from, sender, responses::not_registered(to)) == Delivery::Closed
                {
                    let session = sender.session();
                    self.evict(vec![(message.from.clone(), session)]);
                }
            }
            None => debug!(
                "Dropping message from departed '{}' to unregistered '{}'",
                message.from, to
            ),
        }
    }

    fn evict(&mut self, closed: Vec<(String, SessionId)>) {
        for (handle, session) in closed {
            if self.registry.release(&handle, session) {
                warn!("Evicted '{}' (session {}): outbound queue closed", handle, session);
            }
        }
    }
}

/// Push one line onto a session's queue without waiting
fn deliver(handle: &str, entry: &RegistryEntry, line: String) -> Delivery {
    match entry.outbound().try_send(line) {
        Ok(()) => Delivery::Queued,
        Err(TrySendError::Full(_)) => {
            warn!("Outbound queue for '{}' full, message dropped", handle);
            Delivery::Dropped
        }
        Err(TrySendError::Closed(_)) => Delivery::Closed,
    }
}

impl RouterHandle {
    async fn submit(&self, request: RouterRequest) -> Result<(), RouterError> {
        self.requests
            .send(request)
            .await
            .map_err(|_| RouterError::Closed)
    }

    /// Claim `handle` for `session`, replacing `previous` if set.
    ///
    /// The outer error means the router is gone; the inner one carries the
    /// registry's decision.
    pub async fn register(
        &self,
        session: SessionId,
        handle: &str,
        previous: Option<&str>,
        outbound: Outbound,
    ) -> Result<ClaimResult, RouterError> {
        let (reply, response) = oneshot::channel();
        self.submit(RouterRequest::Register {
            session,
            handle: handle.to_string(),
            previous: previous.map(str::to_string),
            outbound,
            reply,
        })
        .await?;
        response.await.map_err(|_| RouterError::Closed)
    }

    /// Release whatever `session` holds in the registry.
    ///
    /// Keyed by session rather than handle, so a claim the session never
    /// saw confirmed is released too.
    pub async fn unregister(&self, session: SessionId) -> Result<(), RouterError> {
        self.submit(RouterRequest::Unregister { session }).await
    }

    /// Hand a message to the router. Returns once the router accepted it,
    /// not once it was delivered.
    pub async fn route(&self, message: Message) -> Result<(), RouterError> {
        self.submit(RouterRequest::Route(message)).await
    }

    /// Snapshot of the registered handles
    pub async fn list(&self) -> Result<Vec<String>, RouterError> {
        let (reply, response) = oneshot::channel();
        self.submit(RouterRequest::List { reply }).await?;
        response.await.map_err(|_| RouterError::Closed)
    }
}
