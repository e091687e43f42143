//! Price feed types

use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of the tracked asset as the feed spells it (e.g. "HYPE")
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Symbol(String);

impl Symbol {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self(symbol.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Symbol {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Latest mid price of the tracked symbol
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceUpdate {
    /// Tracked symbol
    pub symbol: Symbol,
    /// Mid price, never negative
    pub value: Decimal,
    /// Local timestamp when the frame was decoded
    pub received_at: DateTime<Utc>,
}

impl PriceUpdate {
    /// Text shown by the status indicator, e.g. `HYPE: $27.1234`
    pub fn label(&self) -> String {
        let value = self
            .value
            .round_dp_with_strategy(4, RoundingStrategy::MidpointAwayFromZero);
        format!("{}: ${:.4}", self.symbol, value)
    }
}

/// Subscription kinds understood by the feed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Subscription {
    /// Mid prices for every listed asset
    #[serde(rename = "allMids")]
    AllMids,
}

/// The single subscription sent on every (re)connect
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubscriptionRequest {
    method: &'static str,
    subscription: SubscriptionKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
struct SubscriptionKind {
    #[serde(rename = "type")]
    kind: Subscription,
}

impl SubscriptionRequest {
    /// Request for the `allMids` channel
    pub fn all_mids() -> Self {
        Self {
            method: "subscribe",
            subscription: SubscriptionKind {
                kind: Subscription::AllMids,
            },
        }
    }

    pub fn subscription(&self) -> Subscription {
        self.subscription.kind
    }
}
