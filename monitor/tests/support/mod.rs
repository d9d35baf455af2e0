#![allow(dead_code)]

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::Counters;
use market::{MarketFeed, Pair, ReferenceSnapshot, Snapshot, Ticker};
use notify::{AlertDispatcher, NotificationChannel, NotifyError};
use parking_lot::Mutex;

/// Feed replaying queued responses in order; an empty queue answers `None`.
#[derive(Default)]
pub struct ScriptedFeed {
    snapshots: Mutex<VecDeque<Option<Snapshot>>>,
    references: Mutex<VecDeque<Option<ReferenceSnapshot>>>,
    flags: Mutex<VecDeque<Option<HashSet<String>>>>,
    pub snapshot_calls: AtomicUsize,
    /// Panic on this (1-based) `fetch_snapshot` call.
    pub panic_on_snapshot_call: Option<usize>,
}

impl ScriptedFeed {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn panicking_on(call: usize) -> Self {
        Self {
            panic_on_snapshot_call: Some(call),
            ..Self::default()
        }
    }

    pub fn push_snapshot(&self, snapshot: Option<Snapshot>) {
        self.snapshots.lock().push_back(snapshot);
    }

    pub fn push_reference(&self, reference: Option<ReferenceSnapshot>) {
        self.references.lock().push_back(reference);
    }

    pub fn push_flags(&self, flags: Option<HashSet<String>>) {
        self.flags.lock().push_back(flags);
    }

    pub fn calls(&self) -> usize {
        self.snapshot_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MarketFeed for ScriptedFeed {
    async fn fetch_snapshot(&self) -> Option<Snapshot> {
        let call = self.snapshot_calls.fetch_add(1, Ordering::SeqCst) + 1;
        if self.panic_on_snapshot_call == Some(call) {
            panic!("feed exploded");
        }
        self.snapshots.lock().pop_front().flatten()
    }

    async fn fetch_reference(&self) -> Option<ReferenceSnapshot> {
        self.references.lock().pop_front().flatten()
    }

    async fn fetch_maintenance_flags(&self) -> Option<HashSet<String>> {
        self.flags.lock().pop_front().flatten()
    }
}

#[derive(Default, Clone)]
pub struct RecordingChannel {
    pub sent: Arc<Mutex<Vec<String>>>,
}

impl RecordingChannel {
    pub fn messages(&self) -> Vec<String> {
        self.sent.lock().clone()
    }
}

#[async_trait]
impl NotificationChannel for RecordingChannel {
    async fn send(&self, text: &str) -> Result<(), NotifyError> {
        self.sent.lock().push(text.to_string());
        Ok(())
    }
}

pub fn dispatcher() -> (AlertDispatcher, RecordingChannel) {
    let channel = RecordingChannel::default();
    let dispatcher = AlertDispatcher::new(Arc::new(channel.clone()), Counters::default());
    (dispatcher, channel)
}

/// `rows` are `(pair id, price, volume)`.
pub fn snapshot(at: DateTime<Utc>, rows: &[(&str, f64, f64)]) -> Snapshot {
    Snapshot::new(
        at,
        rows.iter().map(|(id, price, volume)| {
            (
                Pair::parse(id),
                Ticker {
                    price: *price,
                    volume: *volume,
                },
            )
        }),
    )
}

/// `rows` are `(normalized id, price 24h ago)`.
pub fn reference(rows: &[(&str, f64)]) -> ReferenceSnapshot {
    ReferenceSnapshot::new(
        rows.iter()
            .map(|(id, price)| (id.to_string(), *price))
            .collect::<HashMap<_, _>>(),
    )
}

pub fn flags(keys: &[&str]) -> HashSet<String> {
    keys.iter().map(|k| k.to_string()).collect()
}
