//! Configuration types for hype-ticker

use crate::feed::HYPERLIQUID_WS_URL;
use crate::session::SessionSettings;
use crate::telemetry::LogFormat;
use serde::Deserialize;
use std::time::Duration;

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub feed: FeedConfig,
    #[serde(default)]
    pub supervisor: SupervisorConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

/// Price feed configuration
#[derive(Debug, Clone, Deserialize)]
pub struct FeedConfig {
    /// WebSocket endpoint
    #[serde(default = "default_url")]
    pub url: String,

    /// Symbol whose mid price is tracked, spelled as the feed spells it
    #[serde(default = "default_symbol")]
    pub symbol: String,
}

fn default_url() -> String {
    HYPERLIQUID_WS_URL.to_string()
}
fn default_symbol() -> String {
    "HYPE".to_string()
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            symbol: default_symbol(),
        }
    }
}

/// Reconnect and session tuning
#[derive(Debug, Clone, Deserialize)]
pub struct SupervisorConfig {
    /// Delay before reconnecting after a failure (0 = reconnect immediately)
    #[serde(default = "default_cooldown_ms")]
    pub cooldown_ms: u64,

    /// Treat the connection as dead after this long without a frame (0 = never)
    #[serde(default = "default_liveness_timeout_secs")]
    pub liveness_timeout_secs: u64,

    /// Application-level ping period (0 = no pings)
    #[serde(default = "default_ping_interval_secs")]
    pub ping_interval_secs: u64,

    /// Bound on connecting (TCP, TLS and upgrade)
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,

    /// Bound on the close handshake during teardown
    #[serde(default = "default_close_timeout_ms")]
    pub close_timeout_ms: u64,
}

fn default_cooldown_ms() -> u64 {
    2_000
}
fn default_liveness_timeout_secs() -> u64 {
    90
}
fn default_ping_interval_secs() -> u64 {
    30
}
fn default_connect_timeout_secs() -> u64 {
    10
}
fn default_close_timeout_ms() -> u64 {
    2_000
}

impl Default for SupervisorConfig {
    fn default() -> Self {
        Self {
            cooldown_ms: default_cooldown_ms(),
            liveness_timeout_secs: default_liveness_timeout_secs(),
            ping_interval_secs: default_ping_interval_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
            close_timeout_ms: default_close_timeout_ms(),
        }
    }
}

impl SupervisorConfig {
    pub fn cooldown(&self) -> Duration {
        Duration::from_millis(self.cooldown_ms)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn close_timeout(&self) -> Duration {
        Duration::from_millis(self.close_timeout_ms)
    }

    /// Session tunables; zero disables the corresponding timer
    pub fn session_settings(&self) -> SessionSettings {
        let non_zero = |secs: u64| (secs > 0).then(|| Duration::from_secs(secs));
        SessionSettings {
            ping_interval: non_zero(self.ping_interval_secs),
            liveness_timeout: non_zero(self.liveness_timeout_secs),
        }
    }
}

/// Telemetry configuration
#[derive(Debug, Clone, Deserialize)]
pub struct TelemetryConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub log_format: LogFormat,
    /// Serve Prometheus metrics on this port when set
    #[serde(default)]
    pub metrics_port: Option<u16>,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: LogFormat::default(),
            metrics_port: None,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<std::path::Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }
}
