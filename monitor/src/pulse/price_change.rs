use std::time::Duration;

use notify::MoveKind;

use super::{MovePulse, Movement, Thresholds};

/// Sustained price/volume move over the detector interval.
#[derive(Debug, Clone)]
pub struct PriceChangePulse {
    thresholds: Thresholds,
    interval: Duration,
}

impl PriceChangePulse {
    pub fn new(thresholds: Thresholds, interval: Duration) -> Self {
        Self {
            thresholds,
            interval,
        }
    }
}

impl MovePulse for PriceChangePulse {
    fn name(&self) -> &'static str {
        "price_change"
    }

    fn thresholds(&self) -> &Thresholds {
        &self.thresholds
    }

    fn interval(&self) -> Duration {
        self.interval
    }

    fn classify(&self, _movement: &Movement) -> MoveKind {
        MoveKind::PriceChange
    }
}
