use tracing::{Span, field};

use super::TraceId;

/// Span wrapping a single detector cycle. `alerts` is recorded once the
/// cycle has finished evaluating.
pub fn cycle_span(detector: &'static str, trace_id: &TraceId) -> Span {
    tracing::info_span!(
        "cycle",
        detector = %detector,
        trace_id = %trace_id,
        alerts = field::Empty
    )
}

/// Span for a long-lived task (a detector loop, the command poller).
pub fn task_span(name: &'static str) -> Span {
    tracing::info_span!("task", name = %name)
}
