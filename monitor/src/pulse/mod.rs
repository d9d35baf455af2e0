//! Move rules evaluated by the detection loops.
//!
//! A pulse decides *what* counts as a move and how it is classified. The
//! loop in [`crate::detector`] owns the fetching, baselines and delivery.

pub mod price_change;
pub mod pump_dump;

use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use market::Ticker;
use notify::MoveKind;

pub use price_change::PriceChangePulse;
pub use pump_dump::PumpDumpPulse;

use crate::baseline::{Baseline, BaselineStore};

/// All three must hold for a rule to fire.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    /// Minimum `|price_pct|`.
    pub percent: f64,
    /// Minimum `|volume_delta|` in IDR.
    pub volume_change: f64,
    /// Minimum current price in IDR.
    pub price_floor: f64,
}

impl Thresholds {
    pub fn is_met(&self, m: &Movement) -> bool {
        m.price_pct.abs() >= self.percent
            && m.volume_delta.abs() >= self.volume_change
            && m.price >= self.price_floor
    }
}

/// Change of one instrument between its baseline and the current reading.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Movement {
    pub price: f64,
    pub prev_price: f64,
    pub volume: f64,
    pub volume_delta: f64,
    pub price_pct: f64,
    pub elapsed: TimeDelta,
}

impl Movement {
    pub fn between(baseline: &Baseline, current: &Ticker, now: DateTime<Utc>) -> Self {
        Self {
            price: current.price,
            prev_price: baseline.price,
            volume: current.volume,
            volume_delta: current.volume - baseline.volume,
            price_pct: pct_change(baseline.price, current.price),
            elapsed: now - baseline.taken_at,
        }
    }
}

/// Percentage change; a zero previous price yields 0.
pub fn pct_change(prev: f64, current: f64) -> f64 {
    if prev == 0.0 {
        0.0
    } else {
        (current - prev) / prev * 100.0
    }
}

/// A move rule plus its cadence.
pub trait MovePulse: Send + 'static {
    /// Name used in logs and fault reports.
    fn name(&self) -> &'static str;

    fn thresholds(&self) -> &Thresholds;

    /// Sleep between cycles.
    fn interval(&self) -> Duration;

    fn classify(&self, movement: &Movement) -> MoveKind;

    /// Called once after every evaluated cycle, after all baselines were
    /// overwritten.
    fn after_cycle(&mut self, _baselines: &mut BaselineStore) {}
}
