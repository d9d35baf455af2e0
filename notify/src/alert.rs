//! Classified alert values produced by the detectors.

use chrono::TimeDelta;
use market::{Pair, RankLabel};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

impl Direction {
    /// Zero counts as down, matching the sign test the detectors apply.
    pub fn of(pct: f64) -> Self {
        if pct > 0.0 {
            Direction::Up
        } else {
            Direction::Down
        }
    }

    pub fn glyph(self) -> &'static str {
        match self {
            Direction::Up => "🚀",
            Direction::Down => "🔻",
        }
    }
}

/// Pump/dump tier on `|pct|`: `(0, 50]`, `(50, 100]`, `(100, ∞)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Alert,
    Big,
    Mega,
}

impl Severity {
    pub fn classify(pct: f64) -> Self {
        let magnitude = pct.abs();
        if magnitude > 100.0 {
            Severity::Mega
        } else if magnitude > 50.0 {
            Severity::Big
        } else {
            Severity::Alert
        }
    }

    /// e.g. `⚠ BIG DUMP ALERT ⚠`
    pub fn banner(self, direction: Direction) -> String {
        let side = match direction {
            Direction::Up => "PUMP",
            Direction::Down => "DUMP",
        };
        match self {
            Severity::Alert => format!("⚠ {side} ALERT ⚠"),
            Severity::Big => format!("⚠ BIG {side} ALERT ⚠"),
            Severity::Mega => format!("⚠ MEGA {side} ALERT ⚠"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveKind {
    /// Sustained price/volume move.
    PriceChange,
    /// Fast spike.
    PumpDump(Severity),
}

/// A price/volume rule match against a detector's baseline.
#[derive(Debug, Clone)]
pub struct MoveAlert {
    pub pair: Pair,
    pub kind: MoveKind,
    pub direction: Direction,
    pub change_pct: f64,
    pub price: f64,
    pub prev_price: f64,
    pub volume: f64,
    pub volume_delta: f64,
    /// Time since the baseline was taken.
    pub elapsed: TimeDelta,
    pub under_maintenance: bool,
    pub rank: Option<RankLabel>,
}

/// Wallet-maintenance transition. `asset` is the canonical maintenance key
/// (`btc`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MaintenanceAlert {
    Started { asset: String },
    Ended { asset: String, duration: TimeDelta },
}

impl MaintenanceAlert {
    pub fn asset(&self) -> &str {
        match self {
            MaintenanceAlert::Started { asset } | MaintenanceAlert::Ended { asset, .. } => asset,
        }
    }
}

#[derive(Debug, Clone)]
pub enum Alert {
    Move(MoveAlert),
    Maintenance(MaintenanceAlert),
}

impl Alert {
    /// Label the per-instrument counters are keyed by, e.g. `BTC/IDR`.
    pub fn pair_label(&self) -> String {
        match self {
            Alert::Move(m) => m.pair.label(),
            Alert::Maintenance(m) => format!("{}/IDR", m.asset().to_uppercase()),
        }
    }
}
