//! tokio-tungstenite transport

use super::types::{WsConfig, WsError, WsFrame};
use super::{Connection, Connector};
use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::{
    connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream,
};

/// Connector for `ws://` and `wss://` endpoints
#[derive(Debug, Clone)]
pub struct WsConnector {
    config: WsConfig,
}

impl WsConnector {
    /// Create a new connector with the given configuration
    pub fn new(config: WsConfig) -> Self {
        Self { config }
    }

    /// Create a new connector with just a URL using default config
    pub fn with_url(url: impl Into<String>) -> Self {
        Self::new(WsConfig::new(url))
    }

    /// Get the configured URL
    pub fn url(&self) -> &str {
        &self.config.url
    }
}

#[async_trait]
impl Connector for WsConnector {
    async fn connect(&self) -> Result<Box<dyn Connection>, WsError> {
        tracing::info!(url = %self.config.url, "Connecting to WebSocket");

        let (stream, response) =
            tokio::time::timeout(self.config.connect_timeout, connect_async(&self.config.url))
                .await
                .map_err(|_| WsError::ConnectionFailed("connect timed out".into()))?
                .map_err(|e| WsError::ConnectionFailed(e.to_string()))?;

        tracing::info!(status = %response.status(), "WebSocket connected");

        Ok(Box::new(WsConnection {
            stream,
            config: self.config.clone(),
        }))
    }
}

/// An open tokio-tungstenite connection
pub struct WsConnection {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
    config: WsConfig,
}

#[async_trait]
impl Connection for WsConnection {
    async fn send_text(&mut self, text: String) -> Result<(), WsError> {
        self.stream
            .send(Message::Text(text))
            .await
            .map_err(|e| WsError::SendFailed(e.to_string()))
    }

    async fn next_frame(&mut self) -> Option<Result<WsFrame, WsError>> {
        loop {
            let frame = match self.stream.next().await? {
                Ok(Message::Text(text)) => WsFrame::Text(text),
                Ok(Message::Binary(data)) => WsFrame::Binary(data),
                Ok(Message::Ping(data)) => {
                    if let Err(e) = self.stream.send(Message::Pong(data)).await {
                        return Some(Err(WsError::SendFailed(e.to_string())));
                    }
                    WsFrame::Heartbeat
                }
                Ok(Message::Pong(_)) => WsFrame::Heartbeat,
                Ok(Message::Close(frame)) => {
                    WsFrame::Close(frame.map(|cf| format!("{} {}", u16::from(cf.code), cf.reason)))
                }
                // Raw frames are never yielded while reading
                Ok(Message::Frame(_)) => continue,
                Err(e) => return Some(Err(WsError::ReceiveFailed(e.to_string()))),
            };
            return Some(Ok(frame));
        }
    }

    async fn close(&mut self) {
        match tokio::time::timeout(self.config.close_timeout, self.stream.close(None)).await {
            Ok(Ok(())) => tracing::debug!("WebSocket closed"),
            Ok(Err(e)) => tracing::debug!(error = %e, "WebSocket close failed"),
            Err(_) => tracing::debug!("WebSocket close timed out"),
        }
    }
}
