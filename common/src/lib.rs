//! Shared plumbing for the monitoring workspace: logging, process-wide
//! counters and the pause gate polled by every detector loop.

pub mod logger;
pub mod metrics;
pub mod pause;

pub use metrics::counters::Counters;
pub use pause::PauseGate;
