//! Shared latest-price cell
//!
//! One writer (the active session, via the supervisor) and any number of
//! readers. Backed by a `watch` channel so every read sees a whole
//! `(price, connection)` pair and readers can await changes.

use crate::feed::PriceUpdate;
use std::fmt;
use std::sync::Arc;
use tokio::sync::watch;

/// Connection status mirrored for readers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionState {
    /// A session is opening or handshaking
    Connecting,
    /// Subscribed and streaming
    Open,
    /// Closed cleanly (remote close or local command)
    Closed(String),
    /// Closed by a transport fault
    Failed(String),
}

impl ConnectionState {
    pub fn is_open(&self) -> bool {
        matches!(self, ConnectionState::Open)
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionState::Connecting => write!(f, "connecting"),
            ConnectionState::Open => write!(f, "open"),
            ConnectionState::Closed(reason) => write!(f, "closed: {}", reason),
            ConnectionState::Failed(error) => write!(f, "failed: {}", error),
        }
    }
}

/// Consistent view of the cell
#[derive(Debug, Clone, PartialEq)]
pub struct StateSnapshot {
    pub latest_price: Option<PriceUpdate>,
    pub connection: ConnectionState,
}

impl Default for StateSnapshot {
    fn default() -> Self {
        Self {
            latest_price: None,
            connection: ConnectionState::Connecting,
        }
    }
}

/// Latest price plus connection status, shared between the receive task and
/// readers. Clones share the same cell.
#[derive(Debug, Clone)]
pub struct PriceState {
    tx: Arc<watch::Sender<StateSnapshot>>,
}

impl Default for PriceState {
    fn default() -> Self {
        Self::new()
    }
}

impl PriceState {
    /// Create a cell with no price and `Connecting` status
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(StateSnapshot::default());
        Self { tx: Arc::new(tx) }
    }

    /// Replace the latest price
    pub fn set(&self, update: PriceUpdate) {
        self.tx.send_modify(|snapshot| snapshot.latest_price = Some(update));
    }

    /// Replace the connection status. Readers are only woken on a real change.
    pub fn set_connection_state(&self, state: ConnectionState) {
        self.tx.send_if_modified(|snapshot| {
            if snapshot.connection == state {
                return false;
            }
            snapshot.connection = state;
            true
        });
    }

    /// Copy of the current pair
    pub fn snapshot(&self) -> StateSnapshot {
        self.tx.borrow().clone()
    }

    pub fn latest_price(&self) -> Option<PriceUpdate> {
        self.tx.borrow().latest_price.clone()
    }

    pub fn connection_state(&self) -> ConnectionState {
        self.tx.borrow().connection.clone()
    }

    /// Receiver notified on every change
    pub fn subscribe(&self) -> watch::Receiver<StateSnapshot> {
        self.tx.subscribe()
    }
}
