use std::sync::Arc;
use std::time::Duration;

use common::PauseGate;
use common::logger::{TraceId, cycle_span, task_span};
use market::{MarketFeed, Snapshot, compute_ranks};
use notify::{Alert, AlertDispatcher, Direction, MoveAlert};
use tracing::{Instrument, Span, debug, info};

use crate::baseline::BaselineStore;
use crate::maintenance::MaintenanceView;
use crate::pulse::{MovePulse, Movement};

/// Re-check interval while the pause gate is set.
pub const PAUSE_POLL: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    Paused,
    /// Snapshot or reference unavailable; baselines untouched.
    Skipped,
    Evaluated { alerts: usize },
}

/// One polling loop: fetch, compare every instrument against its baseline,
/// alert, overwrite the baseline, sleep.
pub struct DetectionLoop<P: MovePulse> {
    pulse: P,
    baselines: BaselineStore,
    feed: Arc<dyn MarketFeed>,
    dispatcher: AlertDispatcher,
    maintenance: MaintenanceView,
    pause: PauseGate,
    first_cycle: bool,
}

impl<P: MovePulse> DetectionLoop<P> {
    /// Baselines are seeded from `initial`.
    pub fn new(
        pulse: P,
        initial: &Snapshot,
        feed: Arc<dyn MarketFeed>,
        dispatcher: AlertDispatcher,
        maintenance: MaintenanceView,
        pause: PauseGate,
    ) -> Self {
        Self {
            pulse,
            baselines: BaselineStore::seeded(initial),
            feed,
            dispatcher,
            maintenance,
            pause,
            first_cycle: true,
        }
    }

    pub fn pulse(&self) -> &P {
        &self.pulse
    }

    pub fn baselines(&self) -> &BaselineStore {
        &self.baselines
    }

    pub async fn run(mut self) {
        let name = self.pulse.name();
        async move {
            info!(interval_secs = self.pulse.interval().as_secs(), "detector started");
            loop {
                let delay = match self.cycle().await {
                    CycleOutcome::Paused => PAUSE_POLL,
                    _ => self.pulse.interval(),
                };
                tokio::time::sleep(delay).await;
            }
        }
        .instrument(task_span(name))
        .await
    }

    pub async fn cycle(&mut self) -> CycleOutcome {
        if self.pause.is_paused() {
            return CycleOutcome::Paused;
        }

        let trace_id = TraceId::new();
        let span = cycle_span(self.pulse.name(), &trace_id);
        self.evaluate().instrument(span).await
    }

    async fn evaluate(&mut self) -> CycleOutcome {
        let Some(snapshot) = self.feed.fetch_snapshot().await else {
            return CycleOutcome::Skipped;
        };
        let Some(reference) = self.feed.fetch_reference().await else {
            return CycleOutcome::Skipped;
        };

        let now = snapshot.taken_at;
        let thresholds = *self.pulse.thresholds();
        let ranks = compute_ranks(&snapshot, &reference, thresholds.price_floor);
        let mut alerts = 0;

        for (pair, ticker) in snapshot.iter() {
            let Some(baseline) = self.baselines.get(pair) else {
                self.baselines.set(pair, ticker.price, ticker.volume, now);
                continue;
            };

            let movement = Movement::between(baseline, ticker, now);
            if !self.first_cycle && thresholds.is_met(&movement) {
                debug!(
                    pair = %pair,
                    price_pct = movement.price_pct,
                    volume_delta = movement.volume_delta,
                    "move detected"
                );
                let alert = MoveAlert {
                    pair: pair.clone(),
                    kind: self.pulse.classify(&movement),
                    direction: Direction::of(movement.price_pct),
                    change_pct: movement.price_pct,
                    price: movement.price,
                    prev_price: movement.prev_price,
                    volume: movement.volume,
                    volume_delta: movement.volume_delta,
                    elapsed: movement.elapsed,
                    under_maintenance: self.maintenance.is_under_maintenance(pair),
                    rank: Some(ranks.label(pair)),
                };
                self.dispatcher.dispatch_alert(&Alert::Move(alert)).await;
                alerts += 1;
            }

            self.baselines.set(pair, ticker.price, ticker.volume, now);
        }

        self.first_cycle = false;
        self.pulse.after_cycle(&mut self.baselines);

        Span::current().record("alerts", alerts);
        debug!(instruments = snapshot.len(), ranked = ranks.len(), "cycle evaluated");
        CycleOutcome::Evaluated { alerts }
    }
}
