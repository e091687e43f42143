//! Session types

use crate::state::ConnectionState;
use std::time::Duration;
use thiserror::Error;

/// Phases of one connection attempt, in the only order they can occur
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SessionPhase {
    Opening,
    Handshaking,
    Streaming,
    Closed,
}

/// Per-session tunables
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSettings {
    /// Application-level ping period (`None` = no pings)
    pub ping_interval: Option<Duration>,
    /// Close the session if no frame arrives for this long (`None` = wait forever)
    pub liveness_timeout: Option<Duration>,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            ping_interval: Some(Duration::from_secs(30)),
            liveness_timeout: Some(Duration::from_secs(90)),
        }
    }
}

/// Why a session reached `Closed`
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TerminationReason {
    /// Connect failed
    #[error("transport open failed: {0}")]
    TransportOpenFailure(String),
    /// Subscription could not be sent
    #[error("handshake send failed: {0}")]
    HandshakeSendFailure(String),
    /// Server sent a close frame
    #[error("remote closed{}", close_detail(.0))]
    RemoteClosed(Option<String>),
    /// Receive error, unexpected end of stream, failed keepalive, or liveness timeout
    #[error("transport error: {0}")]
    TransportError(String),
    /// Cancelled by a local command
    #[error("local cancel")]
    LocalCancel,
}

fn close_detail(reason: &Option<String>) -> String {
    match reason {
        Some(reason) if !reason.is_empty() => format!(": {}", reason),
        _ => String::new(),
    }
}

impl TerminationReason {
    pub fn is_local_cancel(&self) -> bool {
        matches!(self, TerminationReason::LocalCancel)
    }

    /// Status readers see while the supervisor handles this termination
    pub fn connection_state(&self) -> ConnectionState {
        match self {
            TerminationReason::RemoteClosed(_) | TerminationReason::LocalCancel => {
                ConnectionState::Closed(self.to_string())
            }
            TerminationReason::TransportOpenFailure(_)
            | TerminationReason::HandshakeSendFailure(_)
            | TerminationReason::TransportError(_) => ConnectionState::Failed(self.to_string()),
        }
    }
}
