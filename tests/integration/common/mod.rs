//! Shared fixtures for integration tests
#![allow(dead_code)]

use async_trait::async_trait;
use hype_ticker::ws::{Connection, Connector, WsError, WsFrame};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::watch;

pub const HYPE_27: &str =
    r#"{"channel":"allMids","data":{"mids":{"HYPE":"27.1234","BTC":"65000.0"}}}"#;
pub const HYPE_28: &str = r#"{"channel":"allMids","data":{"mids":{"HYPE":"28.5"}}}"#;

pub fn text(s: &str) -> Result<WsFrame, WsError> {
    Ok(WsFrame::Text(s.to_string()))
}

/// What one connection attempt does
pub enum Script {
    /// Fail the connect
    Refuse,
    /// Never finish connecting
    Hang,
    /// Accept, yield these frames in order, then go silent
    Stream(Vec<Result<WsFrame, WsError>>),
}

/// Connector that plays one [`Script`] per attempt and hangs once the
/// scripts run out.
pub struct ScriptedConnector {
    scripts: Mutex<VecDeque<Script>>,
    attempts: watch::Sender<usize>,
    closes: Arc<AtomicUsize>,
}

impl ScriptedConnector {
    pub fn new(scripts: impl IntoIterator<Item = Script>) -> Arc<Self> {
        Arc::new(Self {
            scripts: Mutex::new(scripts.into_iter().collect()),
            attempts: watch::Sender::new(0),
            closes: Arc::new(AtomicUsize::new(0)),
        })
    }

    pub fn attempts(&self) -> usize {
        *self.attempts.borrow()
    }

    /// Connections that were accepted and later closed
    pub fn closes(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }

    pub async fn wait_for_attempts(&self, n: usize) {
        let mut rx = self.attempts.subscribe();
        rx.wait_for(|attempts| *attempts >= n)
            .await
            .expect("connector alive");
    }
}

#[async_trait]
impl Connector for ScriptedConnector {
    async fn connect(&self) -> Result<Box<dyn Connection>, WsError> {
        self.attempts.send_modify(|n| *n += 1);
        let script = self.scripts.lock().unwrap().pop_front().unwrap_or(Script::Hang);

        match script {
            Script::Refuse => Err(WsError::ConnectionFailed("connection refused".into())),
            Script::Hang => std::future::pending().await,
            Script::Stream(frames) => Ok(Box::new(ScriptedConnection {
                frames: frames.into(),
                closes: self.closes.clone(),
            })),
        }
    }
}

struct ScriptedConnection {
    frames: VecDeque<Result<WsFrame, WsError>>,
    closes: Arc<AtomicUsize>,
}

#[async_trait]
impl Connection for ScriptedConnection {
    async fn send_text(&mut self, _text: String) -> Result<(), WsError> {
        Ok(())
    }

    async fn next_frame(&mut self) -> Option<Result<WsFrame, WsError>> {
        match self.frames.pop_front() {
            Some(frame) => Some(frame),
            None => std::future::pending().await,
        }
    }

    async fn close(&mut self) {
        self.closes.fetch_add(1, Ordering::SeqCst);
    }
}
