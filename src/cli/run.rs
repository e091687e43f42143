//! Run command implementation

use crate::config::Config;
use crate::display::{spawn_display, TerminalDisplay};
use crate::feed::Symbol;
use crate::state::PriceState;
use crate::supervisor::ConnectionSupervisor;
use crate::ws::{WsConfig, WsConnector};
use clap::Args;
use std::sync::Arc;

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Symbol to track, overrides `feed.symbol`
    #[arg(short, long)]
    pub symbol: Option<String>,

    /// WebSocket endpoint, overrides `feed.url`
    #[arg(short, long)]
    pub url: Option<String>,

    /// Reconnect cooldown in milliseconds, overrides `supervisor.cooldown_ms`
    #[arg(long)]
    pub cooldown_ms: Option<u64>,
}

impl RunArgs {
    /// Apply command-line overrides on top of the loaded configuration
    pub fn apply(&self, mut config: Config) -> Config {
        if let Some(symbol) = &self.symbol {
            config.feed.symbol = symbol.clone();
        }
        if let Some(url) = &self.url {
            config.feed.url = url.clone();
        }
        if let Some(cooldown_ms) = self.cooldown_ms {
            config.supervisor.cooldown_ms = cooldown_ms;
        }
        config
    }

    pub async fn execute(&self, config: Config) -> anyhow::Result<()> {
        let config = self.apply(config);
        if config.feed.symbol.trim().is_empty() {
            anyhow::bail!("feed.symbol must not be empty");
        }
        let symbol = Symbol::from(config.feed.symbol.as_str());

        tracing::info!(
            symbol = %symbol,
            url = %config.feed.url,
            "Starting ticker (r = reconnect, q = quit)"
        );

        let ws_config = WsConfig::new(config.feed.url.clone())
            .connect_timeout(config.supervisor.connect_timeout())
            .close_timeout(config.supervisor.close_timeout());
        let connector = Arc::new(WsConnector::new(ws_config));

        let state = PriceState::new();
        let display = spawn_display(&state, Arc::new(TerminalDisplay::new(symbol.clone())));

        let (supervisor, handle) = ConnectionSupervisor::new(connector, symbol, state);
        let supervisor = supervisor
            .cooldown(config.supervisor.cooldown())
            .session_settings(config.supervisor.session_settings());
        let task = supervisor.spawn();

        // Keep one handle so stdin EOF does not read as "every handle dropped"
        super::spawn_command_source(handle.clone());

        let stats = task.await?;
        drop(handle);
        display.await?;

        tracing::info!(
            sessions = stats.sessions_started,
            cooldowns = stats.cooldowns,
            local_cancels = stats.local_cancels,
            "Ticker stopped"
        );
        Ok(())
    }
}
