//! Integration tests for the reconnect policy

mod common;

use common::{text, Script, ScriptedConnector, HYPE_27, HYPE_28};
use hype_ticker::feed::Symbol;
use hype_ticker::session::SessionSettings;
use hype_ticker::state::{ConnectionState, PriceState};
use hype_ticker::supervisor::ConnectionSupervisor;
use hype_ticker::ws::{WsError, WsFrame};
use rust_decimal_macros::dec;
use std::time::Duration;

fn quiet() -> SessionSettings {
    SessionSettings {
        ping_interval: None,
        liveness_timeout: None,
    }
}

async fn wait_for_price(state: &PriceState, value: rust_decimal::Decimal) {
    let mut rx = state.subscribe();
    tokio::time::timeout(
        Duration::from_secs(5),
        rx.wait_for(|s| s.latest_price.as_ref().map(|p| p.value) == Some(value)),
    )
    .await
    .expect("price arrived in time")
    .expect("state alive");
}

#[tokio::test]
async fn test_reconnect_mid_stream_skips_cooldown() {
    let connector = ScriptedConnector::new([
        Script::Stream(vec![text(HYPE_27)]),
        Script::Stream(vec![text(HYPE_28)]),
    ]);
    let state = PriceState::new();
    let (supervisor, handle) =
        ConnectionSupervisor::new(connector.clone(), Symbol::from("HYPE"), state.clone());
    let task = supervisor
        .cooldown(Duration::from_secs(3600))
        .session_settings(quiet())
        .spawn();

    wait_for_price(&state, dec!(27.1234)).await;
    assert!(handle.reconnect());
    wait_for_price(&state, dec!(28.5)).await;
    assert_eq!(state.connection_state(), ConnectionState::Open);

    handle.terminate();
    let stats = task.await.unwrap();

    assert_eq!(stats.sessions_started, 2);
    assert_eq!(stats.cooldowns, 0);
    assert_eq!(stats.local_cancels, 2);
    assert_eq!(connector.attempts(), 2);
    assert_eq!(connector.closes(), 2);
}

#[tokio::test]
async fn test_terminate_stops_without_new_session() {
    let connector = ScriptedConnector::new([Script::Stream(vec![text(HYPE_27)])]);
    let state = PriceState::new();
    let (supervisor, handle) =
        ConnectionSupervisor::new(connector.clone(), Symbol::from("HYPE"), state.clone());
    let task = supervisor.session_settings(quiet()).spawn();

    wait_for_price(&state, dec!(27.1234)).await;
    handle.terminate();
    let stats = task.await.unwrap();

    assert_eq!(stats.sessions_started, 1);
    assert_eq!(stats.cooldowns, 0);
    assert_eq!(connector.attempts(), 1);
    assert_eq!(connector.closes(), 1);
    assert_eq!(
        state.connection_state(),
        ConnectionState::Closed("terminated".into())
    );
    // The last price survives the shutdown
    assert_eq!(state.latest_price().unwrap().value, dec!(27.1234));
    assert!(!handle.reconnect());
}

#[tokio::test(start_paused = true)]
async fn test_each_transport_error_costs_one_cooldown() {
    const FAILURES: usize = 3;
    let connector = ScriptedConnector::new((0..FAILURES).map(|_| {
        Script::Stream(vec![Err(WsError::ReceiveFailed("reset by peer".into()))])
    }));
    let (supervisor, handle) =
        ConnectionSupervisor::new(connector.clone(), Symbol::from("HYPE"), PriceState::new());
    let task = supervisor
        .cooldown(Duration::from_secs(1))
        .session_settings(quiet())
        .spawn();

    let started = tokio::time::Instant::now();
    connector.wait_for_attempts(FAILURES + 1).await;
    assert!(started.elapsed() >= Duration::from_secs(FAILURES as u64));

    handle.terminate();
    let stats = task.await.unwrap();

    assert_eq!(stats.cooldowns, FAILURES as u64);
    assert_eq!(stats.sessions_started, FAILURES as u64 + 1);
    assert_eq!(stats.local_cancels, 1);
    assert_eq!(connector.attempts(), FAILURES + 1);
    assert_eq!(connector.closes(), FAILURES);
}

#[tokio::test(start_paused = true)]
async fn test_open_failure_shows_failed_then_retries() {
    let connector = ScriptedConnector::new([
        Script::Refuse,
        Script::Stream(vec![text(HYPE_27)]),
    ]);
    let state = PriceState::new();
    let (supervisor, handle) =
        ConnectionSupervisor::new(connector.clone(), Symbol::from("HYPE"), state.clone());
    let task = supervisor
        .cooldown(Duration::from_secs(2))
        .session_settings(quiet())
        .spawn();

    let mut rx = state.subscribe();
    let failed_at = {
        let snapshot = rx
            .wait_for(|s| matches!(s.connection, ConnectionState::Failed(_)))
            .await
            .unwrap();
        assert!(snapshot.latest_price.is_none());
        tokio::time::Instant::now()
    };

    rx.wait_for(|s| s.latest_price.is_some()).await.unwrap();
    assert!(failed_at.elapsed() >= Duration::from_secs(2));
    assert_eq!(connector.attempts(), 2);

    handle.terminate();
    let stats = task.await.unwrap();
    assert_eq!(stats.cooldowns, 1);
}

#[tokio::test]
async fn test_reconnect_during_cooldown_aborts_wait() {
    let connector = ScriptedConnector::new([
        Script::Refuse,
        Script::Stream(vec![text(HYPE_27)]),
    ]);
    let state = PriceState::new();
    let (supervisor, handle) =
        ConnectionSupervisor::new(connector.clone(), Symbol::from("HYPE"), state.clone());
    let task = supervisor
        .cooldown(Duration::from_secs(3600))
        .session_settings(quiet())
        .spawn();

    let mut rx = state.subscribe();
    rx.wait_for(|s| matches!(s.connection, ConnectionState::Failed(_)))
        .await
        .unwrap();
    drop(rx);

    handle.reconnect();
    wait_for_price(&state, dec!(27.1234)).await;

    handle.terminate();
    let stats = task.await.unwrap();
    assert_eq!(stats.cooldowns, 1);
    assert_eq!(stats.sessions_started, 2);
}

#[tokio::test(start_paused = true)]
async fn test_remote_close_reconnects_after_cooldown() {
    let connector = ScriptedConnector::new([
        Script::Stream(vec![
            text(HYPE_27),
            Ok(WsFrame::Close(Some("1001 going away".into()))),
        ]),
        Script::Stream(vec![text(HYPE_28)]),
    ]);
    let state = PriceState::new();
    let (supervisor, handle) =
        ConnectionSupervisor::new(connector.clone(), Symbol::from("HYPE"), state.clone());
    let task = supervisor.session_settings(quiet()).spawn();

    let mut rx = state.subscribe();
    rx.wait_for(|s| matches!(s.connection, ConnectionState::Closed(_)))
        .await
        .unwrap();
    assert_eq!(state.latest_price().unwrap().value, dec!(27.1234));

    rx.wait_for(|s| s.latest_price.as_ref().map(|p| p.value) == Some(dec!(28.5)))
        .await
        .unwrap();

    handle.terminate();
    let stats = task.await.unwrap();
    assert_eq!(stats.sessions_started, 2);
    assert_eq!(stats.cooldowns, 1);
}
