//! One connection attempt
//!
//! A [`StreamSession`] walks `Opening → Handshaking → Streaming → Closed`
//! exactly once. `run` consumes the session, so a closed session can never
//! be restarted; the supervisor builds a new one per attempt.

mod types;

pub use types::{SessionPhase, SessionSettings, TerminationReason};

use crate::feed::{DecodedMessage, MessageCodec, SubscriptionRequest};
use crate::state::{ConnectionState, PriceState};
use crate::telemetry::{self, CounterMetric, GaugeMetric};
use crate::ws::{Connection, Connector, WsError, WsFrame};
use rust_decimal::prelude::ToPrimitive;
use std::time::Duration;
use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

/// Lifecycle of a single connection attempt
pub struct StreamSession<'a> {
    attempt: u64,
    connector: &'a dyn Connector,
    codec: &'a MessageCodec,
    request: &'a SubscriptionRequest,
    settings: &'a SessionSettings,
    phase: SessionPhase,
}

impl<'a> StreamSession<'a> {
    pub fn new(
        attempt: u64,
        connector: &'a dyn Connector,
        codec: &'a MessageCodec,
        request: &'a SubscriptionRequest,
        settings: &'a SessionSettings,
    ) -> Self {
        Self {
            attempt,
            connector,
            codec,
            request,
            settings,
            phase: SessionPhase::Opening,
        }
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    /// Drive the session until it closes.
    ///
    /// `cancel` is checked at every suspension point. Any open transport is
    /// closed before this returns.
    pub async fn run(mut self, state: &PriceState, cancel: CancellationToken) -> TerminationReason {
        tracing::debug!(attempt = self.attempt, "Opening session");

        let opened = tokio::select! {
            biased;
            _ = cancel.cancelled() => None,
            result = self.connector.connect() => Some(result),
        };
        let mut conn = match opened {
            None => return self.finish(TerminationReason::LocalCancel),
            Some(Ok(conn)) => conn,
            Some(Err(e)) => {
                return self.finish(TerminationReason::TransportOpenFailure(e.to_string()))
            }
        };

        self.enter(SessionPhase::Handshaking);
        let reason = self.stream(conn.as_mut(), state, &cancel).await;
        conn.close().await;
        self.finish(reason)
    }

    /// Handshake, then drain frames until something ends the session
    async fn stream(
        &mut self,
        conn: &mut dyn Connection,
        state: &PriceState,
        cancel: &CancellationToken,
    ) -> TerminationReason {
        let subscribe = self.codec.encode_subscribe(self.request);
        match send_or_cancel(conn, subscribe, cancel).await {
            None => return TerminationReason::LocalCancel,
            Some(Err(e)) => return TerminationReason::HandshakeSendFailure(e.to_string()),
            Some(Ok(())) => {}
        }

        self.enter(SessionPhase::Streaming);
        state.set_connection_state(ConnectionState::Open);
        telemetry::set_gauge(GaugeMetric::Connected, 1.0);
        tracing::info!(
            attempt = self.attempt,
            symbol = %self.codec.symbol(),
            subscription = ?self.request.subscription(),
            "Subscribed to feed"
        );

        let mut ping = self.settings.ping_interval.map(|period| {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            ticker
        });
        let liveness = self.settings.liveness_timeout;
        let mut last_frame = Instant::now();

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => return TerminationReason::LocalCancel,
                _ = next_tick(&mut ping) => {
                    match send_or_cancel(conn, self.codec.encode_ping(), cancel).await {
                        None => return TerminationReason::LocalCancel,
                        Some(Err(e)) => {
                            return TerminationReason::TransportError(format!("keepalive: {e}"))
                        }
                        Some(Ok(())) => tracing::trace!("Sent keepalive ping"),
                    }
                }
                frame = conn.next_frame() => {
                    last_frame = Instant::now();
                    match frame {
                        Some(Ok(WsFrame::Text(text))) => self.handle_payload(text.as_bytes(), state),
                        Some(Ok(WsFrame::Binary(data))) => self.handle_payload(&data, state),
                        Some(Ok(WsFrame::Heartbeat)) => {}
                        Some(Ok(WsFrame::Close(reason))) => {
                            return TerminationReason::RemoteClosed(reason)
                        }
                        Some(Err(e)) => return TerminationReason::TransportError(e.to_string()),
                        None => {
                            return TerminationReason::TransportError(
                                "stream ended without close frame".into(),
                            )
                        }
                    }
                }
                idle = idle_for(last_frame, liveness) => {
                    return TerminationReason::TransportError(format!(
                        "no frame received for {}s",
                        idle.as_secs()
                    ))
                }
            }
        }
    }

    fn handle_payload(&self, raw: &[u8], state: &PriceState) {
        telemetry::increment(CounterMetric::FramesReceived);

        match self.codec.decode(raw) {
            DecodedMessage::PriceSnapshot(snapshot) => {
                if let Some(update) = snapshot.price_update(self.codec.symbol()) {
                    tracing::trace!(symbol = %update.symbol, value = %update.value, "Price update");
                    telemetry::increment(CounterMetric::PriceUpdates);
                    if let Some(value) = update.value.to_f64() {
                        telemetry::set_gauge(GaugeMetric::LatestPrice, value);
                    }
                    state.set(update);
                }
            }
            DecodedMessage::Unrecognized => {
                telemetry::increment(CounterMetric::DecodeUnrecognized);
                tracing::trace!(len = raw.len(), "Ignoring unrecognized message");
            }
            DecodedMessage::Malformed(reason) => {
                telemetry::increment(CounterMetric::DecodeMalformed);
                tracing::warn!(
                    %reason,
                    preview = %String::from_utf8_lossy(&raw[..raw.len().min(100)]),
                    "Dropping malformed message"
                );
            }
        }
    }

    fn enter(&mut self, next: SessionPhase) {
        debug_assert!(next > self.phase, "session phases only move forward");
        tracing::debug!(attempt = self.attempt, from = ?self.phase, to = ?next, "Session phase");
        self.phase = next;
    }

    fn finish(mut self, reason: TerminationReason) -> TerminationReason {
        self.enter(SessionPhase::Closed);
        telemetry::set_gauge(GaugeMetric::Connected, 0.0);
        tracing::info!(attempt = self.attempt, %reason, "Session closed");
        reason
    }
}

/// Send unless cancelled first. `None` means cancelled.
async fn send_or_cancel(
    conn: &mut dyn Connection,
    text: String,
    cancel: &CancellationToken,
) -> Option<Result<(), WsError>> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => None,
        result = conn.send_text(text) => Some(result),
    }
}

/// Resolves once `limit` has passed since `since`; never without a limit
async fn idle_for(since: Instant, limit: Option<Duration>) -> Duration {
    match limit {
        Some(limit) => {
            tokio::time::sleep_until(since + limit).await;
            limit
        }
        None => std::future::pending().await,
    }
}

async fn next_tick(ticker: &mut Option<Interval>) {
    match ticker {
        Some(ticker) => {
            ticker.tick().await;
        }
        None => std::future::pending().await,
    }
}
