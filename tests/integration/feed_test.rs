//! Integration tests for the price feed codec and shared state

use hype_ticker::feed::{DecodedMessage, MessageCodec, SubscriptionRequest, Symbol};
use hype_ticker::state::PriceState;
use rust_decimal_macros::dec;

fn apply(codec: &MessageCodec, state: &PriceState, raw: &str) -> DecodedMessage {
    let decoded = codec.decode(raw.as_bytes());
    if let DecodedMessage::PriceSnapshot(snapshot) = &decoded {
        if let Some(update) = snapshot.price_update(codec.symbol()) {
            state.set(update);
        }
    }
    decoded
}

#[test]
fn test_subscribe_payload_matches_wire_format() {
    let codec = MessageCodec::new("HYPE");
    let payload = codec.encode_subscribe(&SubscriptionRequest::all_mids());
    let value: serde_json::Value = serde_json::from_str(&payload).unwrap();
    assert_eq!(
        value,
        serde_json::json!({"method": "subscribe", "subscription": {"type": "allMids"}})
    );
}

#[test]
fn test_hype_price_is_extracted() {
    let codec = MessageCodec::new("HYPE");
    let state = PriceState::new();

    apply(
        &codec,
        &state,
        r#"{"channel":"allMids","data":{"mids":{"HYPE":"27.1234","ETH":"3000.5"}}}"#,
    );

    let update = state.latest_price().unwrap();
    assert_eq!(update.symbol, Symbol::from("HYPE"));
    assert_eq!(update.value, dec!(27.1234));
    assert_eq!(update.label(), "HYPE: $27.1234");
}

#[test]
fn test_non_price_messages_leave_state_untouched() {
    let codec = MessageCodec::new("HYPE");
    let state = PriceState::new();
    apply(
        &codec,
        &state,
        r#"{"channel":"allMids","data":{"mids":{"HYPE":"27.1234"}}}"#,
    );

    let trades = apply(
        &codec,
        &state,
        r#"{"channel":"trades","data":[{"coin":"HYPE","px":"99.0"}]}"#,
    );
    assert_eq!(trades, DecodedMessage::Unrecognized);

    let garbage = apply(&codec, &state, "not-json");
    assert!(matches!(garbage, DecodedMessage::Malformed(_)));

    let missing = apply(
        &codec,
        &state,
        r#"{"channel":"allMids","data":{"mids":{"BTC":"65000"}}}"#,
    );
    assert!(matches!(missing, DecodedMessage::PriceSnapshot(_)));

    assert_eq!(state.latest_price().unwrap().value, dec!(27.1234));
}

#[test]
fn test_tracks_configured_symbol_only() {
    let codec = MessageCodec::new("BTC");
    let state = PriceState::new();

    apply(
        &codec,
        &state,
        r#"{"channel":"allMids","data":{"mids":{"HYPE":"27.1234","BTC":"65000.25"}}}"#,
    );

    assert_eq!(state.latest_price().unwrap().value, dec!(65000.25));
    assert_eq!(state.latest_price().unwrap().label(), "BTC: $65000.2500");
}
