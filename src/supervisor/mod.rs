//! Connection supervisor
//!
//! Keeps one [`StreamSession`] live at a time, waits a fixed cooldown after
//! failures, and applies `Reconnect` / `Terminate` commands from any
//! [`SupervisorHandle`].

use crate::feed::{MessageCodec, SubscriptionRequest, Symbol};
use crate::session::{SessionSettings, StreamSession, TerminationReason};
use crate::state::{ConnectionState, PriceState};
use crate::telemetry::{self, CounterMetric};
use crate::ws::Connector;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

/// Intents accepted from a command source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Drop the current connection and connect again without cooldown
    Reconnect,
    /// Stop supervising and release the connection
    Terminate,
}

/// Cloneable command sender. Never blocks.
#[derive(Debug, Clone)]
pub struct SupervisorHandle {
    tx: mpsc::UnboundedSender<Command>,
}

impl SupervisorHandle {
    /// Deliver a command. Returns false once the supervisor has exited.
    pub fn send(&self, command: Command) -> bool {
        self.tx.send(command).is_ok()
    }

    pub fn reconnect(&self) -> bool {
        self.send(Command::Reconnect)
    }

    pub fn terminate(&self) -> bool {
        self.send(Command::Terminate)
    }
}

/// What the supervisor did over its lifetime
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SupervisorStats {
    /// Sessions created, including the first
    pub sessions_started: u64,
    /// Cooldown waits entered after a failed session
    pub cooldowns: u64,
    /// Sessions ended by a local command
    pub local_cancels: u64,
}

/// Owns the reconnect policy
pub struct ConnectionSupervisor {
    connector: Arc<dyn Connector>,
    codec: MessageCodec,
    request: SubscriptionRequest,
    settings: SessionSettings,
    cooldown: Duration,
    state: PriceState,
    commands: mpsc::UnboundedReceiver<Command>,
}

impl ConnectionSupervisor {
    /// Create a supervisor tracking `symbol` and publishing into `state`
    pub fn new(
        connector: Arc<dyn Connector>,
        symbol: Symbol,
        state: PriceState,
    ) -> (Self, SupervisorHandle) {
        let (tx, commands) = mpsc::unbounded_channel();
        let supervisor = Self {
            connector,
            codec: MessageCodec::new(symbol),
            request: SubscriptionRequest::all_mids(),
            settings: SessionSettings::default(),
            cooldown: Duration::from_secs(2),
            state,
            commands,
        };
        (supervisor, SupervisorHandle { tx })
    }

    /// Set the delay before reconnecting after a failure
    pub fn cooldown(mut self, d: Duration) -> Self {
        self.cooldown = d;
        self
    }

    /// Set per-session tunables
    pub fn session_settings(mut self, settings: SessionSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn state(&self) -> &PriceState {
        &self.state
    }

    /// Run on a background task
    pub fn spawn(self) -> JoinHandle<SupervisorStats> {
        tokio::spawn(self.run())
    }

    /// Supervise sessions until a `Terminate` command arrives or every
    /// handle is dropped.
    pub async fn run(mut self) -> SupervisorStats {
        let mut stats = SupervisorStats::default();
        tracing::info!(
            symbol = %self.codec.symbol(),
            cooldown_ms = self.cooldown.as_millis() as u64,
            "Starting connection supervisor"
        );

        loop {
            stats.sessions_started += 1;
            telemetry::increment(CounterMetric::SessionsStarted);
            let attempt = stats.sessions_started;

            let (reason, command) = self.run_session(attempt).await;
            self.state.set_connection_state(reason.connection_state());

            if reason.is_local_cancel() {
                stats.local_cancels += 1;
                telemetry::increment(CounterMetric::LocalCancels);
            }

            match command {
                Some(Command::Terminate) => break,
                Some(Command::Reconnect) => {
                    tracing::info!(attempt, "Reconnecting on request");
                    continue;
                }
                None if reason.is_local_cancel() => continue,
                None => {}
            }

            stats.cooldowns += 1;
            telemetry::increment(CounterMetric::Cooldowns);
            tracing::warn!(
                attempt,
                %reason,
                cooldown_ms = self.cooldown.as_millis() as u64,
                "Session ended, reconnecting after cooldown"
            );

            match self.cool_down().await {
                Some(Command::Terminate) => break,
                Some(Command::Reconnect) => tracing::info!("Cooldown cut short by reconnect"),
                None => {}
            }
        }

        self.state
            .set_connection_state(ConnectionState::Closed("terminated".into()));
        tracing::info!(
            sessions = stats.sessions_started,
            cooldowns = stats.cooldowns,
            "Connection supervisor stopped"
        );
        stats
    }

    /// Run one session while listening for commands. A command cancels the
    /// session; the session still runs to `Closed` so the transport is
    /// released before this returns.
    async fn run_session(&mut self, attempt: u64) -> (TerminationReason, Option<Command>) {
        self.state.set_connection_state(ConnectionState::Connecting);

        let cancel = CancellationToken::new();
        let session = StreamSession::new(
            attempt,
            self.connector.as_ref(),
            &self.codec,
            &self.request,
            &self.settings,
        );
        let run = session
            .run(&self.state, cancel.clone())
            .instrument(tracing::info_span!("session", attempt));
        tokio::pin!(run);

        let mut command = None;
        loop {
            tokio::select! {
                biased;
                received = self.commands.recv(), if command.is_none() => {
                    // Every handle dropped: nobody can ever stop us again
                    let received = received.unwrap_or(Command::Terminate);
                    tracing::info!(attempt, command = ?received, "Cancelling session");
                    cancel.cancel();
                    command = Some(received);
                }
                reason = &mut run => return (reason, command),
            }
        }
    }

    /// Wait out the cooldown unless a command arrives first
    async fn cool_down(&mut self) -> Option<Command> {
        tokio::select! {
            biased;
            received = self.commands.recv() => Some(received.unwrap_or(Command::Terminate)),
            _ = tokio::time::sleep(self.cooldown) => None,
        }
    }
}
