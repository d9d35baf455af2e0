//! Wallet-maintenance tracking.
//!
//! The tracker is the only writer of the maintenance set; the detection
//! loops read it through a cloned [`MaintenanceView`] to annotate alerts.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use common::PauseGate;
use common::logger::task_span;
use market::types::maintenance_key;
use market::{MarketFeed, Pair};
use notify::{Alert, AlertDispatcher, MaintenanceAlert};
use parking_lot::RwLock;
use tracing::{Instrument, debug, info};

use crate::detector::PAUSE_POLL;

/// Shared read handle on the current maintenance set, keyed by canonical
/// asset (`btc`) with the time the flag was first seen.
#[derive(Debug, Clone, Default)]
pub struct MaintenanceView {
    inner: Arc<RwLock<HashMap<String, DateTime<Utc>>>>,
}

impl MaintenanceView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_under_maintenance(&self, pair: &Pair) -> bool {
        self.inner.read().contains_key(&pair.maintenance_key())
    }

    /// Accepts any spelling the feeds use: `btc_idr`, `btcidr`, `BTCIDR`,
    /// `btc`, `BTC/IDR`.
    pub fn contains_symbol(&self, symbol: &str) -> bool {
        self.inner.read().contains_key(&maintenance_key(symbol))
    }

    pub fn started_at(&self, symbol: &str) -> Option<DateTime<Utc>> {
        self.inner.read().get(&maintenance_key(symbol)).copied()
    }

    /// Sorted canonical keys.
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.inner.read().keys().cloned().collect();
        keys.sort();
        keys
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }
}

/// Result of one tracker cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MaintenanceOutcome {
    Paused,
    /// Fetch failed; nothing changed.
    Skipped,
    Diffed { started: usize, ended: usize },
}

pub struct MaintenanceTracker {
    feed: Arc<dyn MarketFeed>,
    view: MaintenanceView,
    dispatcher: AlertDispatcher,
    pause: PauseGate,
    interval: Duration,
}

impl MaintenanceTracker {
    pub fn new(
        feed: Arc<dyn MarketFeed>,
        view: MaintenanceView,
        dispatcher: AlertDispatcher,
        pause: PauseGate,
        interval: Duration,
    ) -> Self {
        Self {
            feed,
            view,
            dispatcher,
            pause,
            interval,
        }
    }

    pub fn view(&self) -> &MaintenanceView {
        &self.view
    }

    pub async fn run(mut self) {
        async move {
            info!(interval_secs = self.interval.as_secs(), "maintenance tracker started");
            loop {
                let delay = match self.cycle().await {
                    MaintenanceOutcome::Paused => PAUSE_POLL,
                    _ => self.interval,
                };
                tokio::time::sleep(delay).await;
            }
        }
        .instrument(task_span("maintenance"))
        .await
    }

    pub async fn cycle(&mut self) -> MaintenanceOutcome {
        if self.pause.is_paused() {
            return MaintenanceOutcome::Paused;
        }

        match self.feed.fetch_maintenance_flags().await {
            Some(flags) => self.apply(flags, Utc::now()).await,
            None => MaintenanceOutcome::Skipped,
        }
    }

    /// Diff `flags` against the known set and emit one alert per transition.
    /// The set starts empty, so everything flagged on the first fetch is
    /// announced as started.
    pub async fn apply(
        &mut self,
        flags: HashSet<String>,
        now: DateTime<Utc>,
    ) -> MaintenanceOutcome {
        let mut alerts = Vec::new();
        {
            let mut set = self.view.inner.write();

            let mut ended: Vec<String> = set
                .keys()
                .filter(|k| !flags.contains(*k))
                .cloned()
                .collect();
            ended.sort();
            for asset in ended {
                if let Some(since) = set.remove(&asset) {
                    alerts.push(MaintenanceAlert::Ended {
                        asset,
                        duration: now - since,
                    });
                }
            }

            let mut started: Vec<String> = flags
                .into_iter()
                .filter(|k| !set.contains_key(k))
                .collect();
            started.sort();
            for asset in started {
                set.insert(asset.clone(), now);
                alerts.push(MaintenanceAlert::Started { asset });
            }
        }

        let mut outcome = (0, 0);
        for alert in alerts {
            match &alert {
                MaintenanceAlert::Started { asset } => {
                    info!(asset = %asset, "wallet maintenance started");
                    outcome.0 += 1;
                }
                MaintenanceAlert::Ended { asset, duration } => {
                    info!(
                        asset = %asset,
                        secs = duration.num_seconds(),
                        "wallet maintenance ended"
                    );
                    outcome.1 += 1;
                }
            }
            self.dispatcher.dispatch_alert(&Alert::Maintenance(alert)).await;
        }

        debug!(size = self.view.len(), "maintenance set updated");
        MaintenanceOutcome::Diffed {
            started: outcome.0,
            ended: outcome.1,
        }
    }
}
