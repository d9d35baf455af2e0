mod support;

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use common::PauseGate;
use market::MarketFeed;
use monitor::{Engine, EngineConfig, EngineError, Supervisor, Thresholds};
use support::{ScriptedFeed, dispatcher, snapshot};

fn config() -> EngineConfig {
    let thresholds = Thresholds {
        percent: 5.0,
        volume_change: 1_000_000.0,
        price_floor: 50.0,
    };
    EngineConfig {
        price_change: thresholds,
        price_change_interval: Duration::from_secs(60),
        pump_dump: Thresholds {
            percent: 20.0,
            volume_change: 10_000_000.0,
            ..thresholds
        },
        pump_dump_interval: Duration::from_secs(10),
        pump_dump_window: Duration::from_secs(240 * 60),
        maintenance_interval: Duration::from_secs(30),
    }
}

#[tokio::test(start_paused = true)]
async fn unavailable_initial_snapshot_is_reported_and_retried_after_backoff() {
    let feed = Arc::new(ScriptedFeed::new());
    let (dispatcher, channel) = dispatcher();
    let counters = dispatcher.counters().clone();
    let engine = Engine::new(
        feed.clone() as Arc<dyn MarketFeed>,
        dispatcher,
        PauseGate::new(),
        config(),
    );
    let supervisor =
        Supervisor::new(engine, Duration::from_secs(30)).with_online_notice("Xyrabot Is Online");

    // attempts at t = 0s, 30s and 60s
    let outcome = tokio::time::timeout(Duration::from_secs(65), supervisor.run()).await;
    assert!(outcome.is_err());

    assert_eq!(feed.calls(), 3);
    assert_eq!(counters.error_count(), 3);
    let messages = channel.messages();
    assert_eq!(messages.len(), 3);
    assert!(
        messages
            .iter()
            .all(|m| m == "Xyrabot Is Paused (Reason: initial market snapshot unavailable)")
    );
}

#[tokio::test(start_paused = true)]
async fn panicking_detector_brings_the_generation_down() {
    let feed = Arc::new(ScriptedFeed::panicking_on(2));
    feed.push_snapshot(Some(snapshot(Utc::now(), &[("btc_idr", 100.0, 0.0)])));
    let (dispatcher, channel) = dispatcher();
    let engine = Engine::new(
        feed.clone() as Arc<dyn MarketFeed>,
        dispatcher,
        PauseGate::new(),
        config(),
    );
    let supervisor =
        Supervisor::new(engine, Duration::from_secs(30)).with_online_notice("Xyrabot Is Online");

    let fault = supervisor.run_once().await;

    match fault {
        EngineError::DetectorPanicked { reason, .. } => assert_eq!(reason, "feed exploded"),
        other => panic!("unexpected fault: {other}"),
    }
    // the generation got its initial snapshot, so it was announced
    assert_eq!(channel.messages(), vec!["Xyrabot Is Online".to_string()]);
}
