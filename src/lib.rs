//! hype-ticker: live mid price of one Hyperliquid asset
//!
//! This library provides the core components for:
//! - WebSocket transport behind a mockable `Connector` seam
//! - Encoding the `allMids` subscription and decoding its snapshots
//! - One streaming session per connection, ending in a `TerminationReason`
//! - A supervisor that reconnects after a fixed cooldown and obeys commands
//! - Shared price and connection state observed by a display
//! - Structured logging and Prometheus metrics

pub mod cli;
pub mod config;
pub mod display;
pub mod feed;
pub mod session;
pub mod state;
pub mod supervisor;
pub mod telemetry;
pub mod ws;
