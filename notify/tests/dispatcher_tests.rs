
use std::sync::Arc;

use chrono::TimeDelta;

use common::Counters;
use market::Pair;
use mock_channel::RecordingChannel;
use notify::{Alert, AlertDispatcher, Direction, MaintenanceAlert, MoveAlert, MoveKind};

fn dispatcher(channel: RecordingChannel) -> (AlertDispatcher, Counters) {
    let counters = Counters::default();
    (AlertDispatcher::new(Arc::new(channel), counters.clone()), counters)
}

#[tokio::test]
async fn long_message_is_sent_as_three_ordered_chunks() {
    let channel = RecordingChannel::new();
    let (d, counters) = dispatcher(channel.clone());
    let message: String = (0..9000).map(|i| if i % 100 == 99 { '\n' } else { 'x' }).collect();

    let report = d.dispatch(&message).await;

    let sent = channel.sent.lock().await;
    assert_eq!(report.chunks_sent, 3);
    assert!(!report.failed);
    assert_eq!(sent.len(), 3);
    assert!(sent.iter().all(|c| c.chars().count() <= 4096));
    assert_eq!(sent.concat(), message);
    assert_eq!(counters.sent(), 3);
    assert_eq!(counters.error_count(), 0);
}

#[tokio::test]
async fn delivery_failure_is_counted_not_raised() {
    let channel = RecordingChannel::failing_after(1);
    let (d, counters) = dispatcher(channel.clone());
    let message = "y".repeat(9000);

    let report = d.dispatch(&message).await;

    assert_eq!(report.chunks_sent, 1);
    assert!(report.failed);
    assert_eq!(counters.sent(), 1);
    assert_eq!(counters.error_count(), 1);
    // remainder of the message is dropped
    assert_eq!(channel.sent.lock().await.len(), 1);
}

#[tokio::test]
async fn alerts_are_counted_per_instrument() {
    let channel = RecordingChannel::new();
    let (d, counters) = dispatcher(channel.clone());

    let alert = Alert::Move(MoveAlert {
        pair: Pair::parse("eth_idr"),
        kind: MoveKind::PriceChange,
        direction: Direction::Up,
        change_pct: 6.0,
        price: 53_000_000.0,
        prev_price: 50_000_000.0,
        volume: 9_000_000_000.0,
        volume_delta: 700_000_000.0,
        elapsed: TimeDelta::seconds(30),
        under_maintenance: false,
        rank: None,
    });

    d.dispatch_alert(&alert).await;
    d.dispatch_alert(&alert).await;
    d.dispatch_alert(&Alert::Maintenance(MaintenanceAlert::Started { asset: "eth".into() }))
        .await;

    assert_eq!(counters.alerts_for("ETH/IDR"), 3);
    assert_eq!(counters.sent(), 3);
    assert!(channel.sent.lock().await[0].starts_with("🚀 ETH/IDR (6.00%)"));
}

#[tokio::test]
async fn undeliverable_alert_still_counts_toward_instrument() {
    let (d, counters) = dispatcher(RecordingChannel::failing_after(0));

    let report = d
        .dispatch_alert(&Alert::Maintenance(MaintenanceAlert::Ended {
            asset: "ada".into(),
            duration: TimeDelta::minutes(5),
        }))
        .await;

    assert!(report.failed);
    assert_eq!(counters.alerts_for("ADA/IDR"), 1);
    assert_eq!(counters.error_count(), 1);
}
