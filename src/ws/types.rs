//! WebSocket types and configuration

use std::time::Duration;
use thiserror::Error;

/// WebSocket connector configuration
#[derive(Debug, Clone)]
pub struct WsConfig {
    /// WebSocket URL to connect to
    pub url: String,
    /// Upper bound on the TCP/TLS/upgrade handshake
    pub connect_timeout: Duration,
    /// Upper bound on the close handshake during teardown
    pub close_timeout: Duration,
}

impl Default for WsConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            connect_timeout: Duration::from_secs(10),
            close_timeout: Duration::from_secs(2),
        }
    }
}

impl WsConfig {
    /// Create a new config with the given URL
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    /// Set connect timeout
    pub fn connect_timeout(mut self, d: Duration) -> Self {
        self.connect_timeout = d;
        self
    }

    /// Set close timeout
    pub fn close_timeout(mut self, d: Duration) -> Self {
        self.close_timeout = d;
        self
    }
}

/// Inbound frame surfaced by a [`Connection`](super::Connection)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WsFrame {
    /// Text frame
    Text(String),
    /// Binary frame
    Binary(Vec<u8>),
    /// Ping or pong control frame. Carries no payload but proves liveness.
    Heartbeat,
    /// Close frame from the remote side, with its reason if one was given
    Close(Option<String>),
}

/// WebSocket errors
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum WsError {
    /// Connection could not be established
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),
    /// Outbound frame could not be written
    #[error("Send failed: {0}")]
    SendFailed(String),
    /// Inbound stream failed or ended without a close frame
    #[error("Receive failed: {0}")]
    ReceiveFailed(String),
}
