//! Price feed module
//!
//! Wire format and domain types for Hyperliquid's `allMids` stream

mod codec;
mod types;

pub use codec::{DecodedMessage, MessageCodec, PriceSnapshot};
pub use types::{PriceUpdate, Subscription, SubscriptionRequest, Symbol};

/// Hyperliquid public WebSocket endpoint
pub const HYPERLIQUID_WS_URL: &str = "wss://api.hyperliquid.xyz/ws";
