//! Market anomaly monitoring engine.
//!
//! Two detection loops (price-change, pump/dump) and a maintenance tracker
//! run side by side on one runtime, each sampling the feed on its own
//! cadence. The [`supervisor::Supervisor`] rebuilds all of them from scratch
//! whenever one faults.

pub mod baseline;
pub mod detector;
pub mod engine;
pub mod error;
pub mod maintenance;
pub mod pulse;
pub mod supervisor;

pub use baseline::{Baseline, BaselineStore};
pub use detector::{CycleOutcome, DetectionLoop, PAUSE_POLL};
pub use engine::{Engine, EngineConfig, EngineHandle};
pub use error::EngineError;
pub use maintenance::{MaintenanceOutcome, MaintenanceTracker, MaintenanceView};
pub use pulse::{MovePulse, Movement, PriceChangePulse, PumpDumpPulse, Thresholds};
pub use supervisor::{DEFAULT_BACKOFF, Supervisor};
