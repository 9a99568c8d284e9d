//! Query bus shared between the header input and the search view.
//!
//! Best-effort delivery: publishing with nobody listening drops the event, and a
//! subscriber only sees what was published after it subscribed. Readers drain
//! synchronously with `try_recv`, so no async runtime is involved.

#![forbid(unsafe_code)]

use tokio::sync::broadcast;
use tokio::sync::broadcast::error::TryRecvError;
use tracing::{trace, warn};

pub const BUS_CAPACITY: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryEvent {
    /// Live text of the header input.
    TextChanged(String),
    /// Header search pressed while the search view is showing.
    CommitRequested(String),
}

#[derive(Debug, Clone)]
pub struct QueryBus {
    tx: broadcast::Sender<QueryEvent>,
}

impl Default for QueryBus {
    fn default() -> Self { Self::new() }
}

impl QueryBus {
    pub fn new() -> Self { Self::with_capacity(BUS_CAPACITY) }

    pub fn with_capacity(cap: usize) -> Self {
        let (tx, _rx) = broadcast::channel(cap.max(1));
        Self { tx }
    }

    /// Returns how many subscribers will see the event.
    pub fn publish(&self, ev: QueryEvent) -> usize {
        match self.tx.send(ev) {
            Ok(n) => n,
            Err(broadcast::error::SendError(ev)) => {
                trace!(?ev, "no subscribers; event dropped");
                0
            }
        }
    }

    pub fn subscribe(&self) -> QuerySubscription { QuerySubscription { rx: self.tx.subscribe() } }

    pub fn subscriber_count(&self) -> usize { self.tx.receiver_count() }
}

#[derive(Debug)]
pub struct QuerySubscription {
    rx: broadcast::Receiver<QueryEvent>,
}

impl QuerySubscription {
    /// Everything published since the last drain, oldest first.
    pub fn drain(&mut self) -> Vec<QueryEvent> {
        let mut out = Vec::new();
        loop {
            match self.rx.try_recv() {
                Ok(ev) => out.push(ev),
                Err(TryRecvError::Lagged(skipped)) => {
                    warn!(skipped, "query bus lagged; oldest events dropped");
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
            }
        }
        out
    }
}
