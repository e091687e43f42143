//! Hyperliquid WebSocket message codec
//!
//! Pure translation between wire text and feed types. Knows nothing about
//! connections or tasks.

use super::{PriceUpdate, SubscriptionRequest, Symbol};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::HashMap;
use std::str::FromStr;

/// Channel tag of the mid price snapshot stream
const ALL_MIDS_CHANNEL: &str = "allMids";

/// Result of decoding one inbound frame
#[derive(Debug, Clone, PartialEq)]
pub enum DecodedMessage {
    /// `allMids` snapshot
    PriceSnapshot(PriceSnapshot),
    /// Valid JSON of some other shape (subscription acks, pongs, other channels)
    Unrecognized,
    /// Not JSON, or the tracked symbol's price is unusable
    Malformed(String),
}

/// Mid prices carried by one `allMids` frame
#[derive(Debug, Clone, PartialEq)]
pub struct PriceSnapshot {
    /// Symbol → mid price. Entries that failed to parse are omitted.
    pub mids: HashMap<String, Decimal>,
    /// Local timestamp when the frame was decoded
    pub received_at: DateTime<Utc>,
}

impl PriceSnapshot {
    /// Extract the update for `symbol`, if this snapshot carries it
    pub fn price_update(&self, symbol: &Symbol) -> Option<PriceUpdate> {
        self.mids.get(symbol.as_str()).map(|value| PriceUpdate {
            symbol: symbol.clone(),
            value: *value,
            received_at: self.received_at,
        })
    }
}

/// `{"channel": "...", "data": ...}` envelope
#[derive(Debug, Deserialize)]
struct Envelope {
    channel: String,
    #[serde(default)]
    data: serde_json::Value,
}

/// Payload of the `allMids` channel
#[derive(Debug, Deserialize)]
struct AllMidsData {
    mids: HashMap<String, String>,
}

/// Encodes the handshake and decodes frames for one tracked symbol
#[derive(Debug, Clone)]
pub struct MessageCodec {
    symbol: Symbol,
}

impl MessageCodec {
    /// Create a codec tracking `symbol`
    pub fn new(symbol: impl Into<Symbol>) -> Self {
        Self {
            symbol: symbol.into(),
        }
    }

    /// Tracked symbol
    pub fn symbol(&self) -> &Symbol {
        &self.symbol
    }

    /// Serialize the subscription handshake
    pub fn encode_subscribe(&self, req: &SubscriptionRequest) -> String {
        // A struct of static strings always serializes
        serde_json::to_string(req).unwrap_or_default()
    }

    /// Application-level keepalive; the server answers on the `pong` channel
    pub fn encode_ping(&self) -> String {
        serde_json::json!({ "method": "ping" }).to_string()
    }

    /// Decode one inbound frame
    pub fn decode(&self, raw: &[u8]) -> DecodedMessage {
        let value: serde_json::Value = match serde_json::from_slice(raw) {
            Ok(value) => value,
            Err(e) => return DecodedMessage::Malformed(format!("invalid JSON: {e}")),
        };

        let Ok(envelope) = serde_json::from_value::<Envelope>(value) else {
            return DecodedMessage::Unrecognized;
        };
        if envelope.channel != ALL_MIDS_CHANNEL {
            return DecodedMessage::Unrecognized;
        }
        let Ok(data) = serde_json::from_value::<AllMidsData>(envelope.data) else {
            return DecodedMessage::Unrecognized;
        };

        let mut mids = HashMap::with_capacity(data.mids.len());
        for (symbol, raw_price) in data.mids {
            match parse_price(&raw_price) {
                Some(price) => {
                    mids.insert(symbol, price);
                }
                None if symbol == self.symbol.as_str() => {
                    return DecodedMessage::Malformed(format!(
                        "invalid price for {symbol}: {raw_price:?}"
                    ));
                }
                None => {
                    tracing::trace!(%symbol, %raw_price, "Skipping unparseable mid");
                }
            }
        }

        DecodedMessage::PriceSnapshot(PriceSnapshot {
            mids,
            received_at: Utc::now(),
        })
    }
}

/// Parse a string-encoded mid. Negative prices are rejected.
fn parse_price(raw: &str) -> Option<Decimal> {
    let price = Decimal::from_str(raw.trim())
        .or_else(|_| Decimal::from_scientific(raw.trim()))
        .ok()?;
    (!price.is_sign_negative()).then_some(price)
}
