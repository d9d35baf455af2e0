use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Process-wide pause switch.
///
/// Written by the command layer, polled by every loop at the top of its
/// cycle. Polling means a pause takes effect within one poll interval.
#[derive(Clone, Debug, Default)]
pub struct PauseGate(Arc<AtomicBool>);

impl PauseGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_paused(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    /// Returns `false` if the gate was already paused.
    pub fn pause(&self) -> bool {
        !self.0.swap(true, Ordering::AcqRel)
    }

    /// Returns `false` if the gate was already running.
    pub fn resume(&self) -> bool {
        self.0.swap(false, Ordering::AcqRel)
    }
}
