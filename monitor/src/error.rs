use thiserror::Error;

/// Faults that bring the whole engine down. The supervisor reacts to every
/// variant the same way: notify, back off, rebuild.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("initial market snapshot unavailable")]
    InitialSnapshotUnavailable,

    #[error("{detector} stopped unexpectedly")]
    DetectorStopped { detector: &'static str },

    #[error("{detector} panicked: {reason}")]
    DetectorPanicked {
        detector: &'static str,
        reason: String,
    },

    #[error("detector task failed: {0}")]
    Join(String),
}
