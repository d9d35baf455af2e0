use std::sync::Arc;
use std::time::Duration;

use market::Snapshot;
use notify::{MoveKind, Severity};
use tracing::info;

use super::{MovePulse, Movement, Thresholds};
use crate::baseline::BaselineStore;

/// Fast spike detector with tiered severity.
///
/// Every `window` of evaluated cycles the baselines are re-based to the
/// snapshot the engine started from, so moves are then measured against the
/// session's original prices rather than the previous cycle.
#[derive(Debug, Clone)]
pub struct PumpDumpPulse {
    thresholds: Thresholds,
    interval: Duration,
    window: Duration,
    initial: Arc<Snapshot>,
    accumulated: Duration,
}

impl PumpDumpPulse {
    pub fn new(
        thresholds: Thresholds,
        interval: Duration,
        window: Duration,
        initial: Arc<Snapshot>,
    ) -> Self {
        Self {
            thresholds,
            interval,
            window,
            initial,
            accumulated: Duration::ZERO,
        }
    }

    /// Time counted towards the next re-base.
    pub fn accumulated(&self) -> Duration {
        self.accumulated
    }
}

impl MovePulse for PumpDumpPulse {
    fn name(&self) -> &'static str {
        "pump_dump"
    }

    fn thresholds(&self) -> &Thresholds {
        &self.thresholds
    }

    fn interval(&self) -> Duration {
        self.interval
    }

    fn classify(&self, movement: &Movement) -> MoveKind {
        MoveKind::PumpDump(Severity::classify(movement.price_pct))
    }

    fn after_cycle(&mut self, baselines: &mut BaselineStore) {
        self.accumulated += self.interval;
        if self.accumulated >= self.window {
            baselines.reset_all(&self.initial);
            self.accumulated = Duration::ZERO;
            info!(instruments = baselines.len(), "pump/dump baselines reset to initial snapshot");
        }
    }
}
