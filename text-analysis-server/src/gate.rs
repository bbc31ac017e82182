//! Single-slot section around a word's ranking and its prompt/response
//! exchange.
//!
//! With [`InteractiveScope::Server`] every connection shares one gate, so at
//! most one word on the whole server is waiting for an answer. A client that
//! never answers therefore holds up every other client until its reply
//! times out or its connection drops. [`InteractiveScope::Connection`] hands
//! each connection its own gate instead, which keeps a request's prompts
//! from interleaving without making clients wait on each other.
//!
//! The gate is a separate lock from the dictionary's. Holding the dictionary
//! lock across a blocking read would stall every scan and append.

use std::sync::Arc;

use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::config::InteractiveScope;

/// Held while a word session talks to its client.
pub type InteractiveTurn = OwnedMutexGuard<()>;

#[derive(Debug, Clone, Default)]
pub struct InteractiveGate {
    slot: Arc<Mutex<()>>,
}

impl InteractiveGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits until no other session holds the gate. Waiters are served in
    /// arrival order.
    pub async fn enter(&self) -> InteractiveTurn {
        Arc::clone(&self.slot).lock_owned().await
    }

    /// Gate for a new connection: the shared one, or a fresh private one.
    pub fn for_connection(&self, scope: InteractiveScope) -> Self {
        match scope {
            InteractiveScope::Server => self.clone(),
            InteractiveScope::Connection => Self::new(),
        }
    }
}
