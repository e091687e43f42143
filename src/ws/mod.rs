//! WebSocket transport
//!
//! A [`Connector`] opens one [`Connection`] per call. Sessions only see these
//! traits, so the real tokio-tungstenite transport and scripted test
//! transports are interchangeable.

mod client;
mod types;

pub use client::{WsConnection, WsConnector};
pub use types::{WsConfig, WsError, WsFrame};

use async_trait::async_trait;

/// Opens fresh connections to the feed endpoint
#[async_trait]
pub trait Connector: Send + Sync {
    /// Establish a new connection
    async fn connect(&self) -> Result<Box<dyn Connection>, WsError>;
}

/// A single open duplex connection
#[async_trait]
pub trait Connection: Send {
    /// Send a text frame
    async fn send_text(&mut self, text: String) -> Result<(), WsError>;

    /// Wait for the next inbound frame.
    ///
    /// Returns `None` once the stream is exhausted.
    async fn next_frame(&mut self) -> Option<Result<WsFrame, WsError>>;

    /// Start the close handshake and release the socket. Never fails; errors
    /// during teardown are only logged.
    async fn close(&mut self);
}
