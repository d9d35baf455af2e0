use std::sync::Arc;

use common::Counters;
use tracing::{error, info};

use crate::alert::Alert;
use crate::channel::{MAX_MESSAGE_LEN, NotificationChannel, split_message};
use crate::format::format_alert;

/// Outcome of one dispatch, for logging and tests. Callers are free to
/// ignore it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchReport {
    pub chunks_sent: usize,
    pub failed: bool,
}

/// Best-effort delivery of alerts and notices.
///
/// Delivery failures are logged and counted, never returned: a detector loop
/// keeps running whatever happens to its alerts. There is no retry.
#[derive(Clone)]
pub struct AlertDispatcher {
    channel: Arc<dyn NotificationChannel>,
    counters: Counters,
    max_len: usize,
}

impl AlertDispatcher {
    pub fn new(channel: Arc<dyn NotificationChannel>, counters: Counters) -> Self {
        Self {
            channel,
            counters,
            max_len: MAX_MESSAGE_LEN,
        }
    }

    pub fn counters(&self) -> &Counters {
        &self.counters
    }

    /// Format, count and deliver one alert.
    pub async fn dispatch_alert(&self, alert: &Alert) -> DispatchReport {
        self.counters.record_alert(&alert.pair_label());
        self.dispatch(&format_alert(alert)).await
    }

    /// Deliver `message`, split into chunks the channel accepts. The first
    /// failed chunk drops the remainder of the message.
    pub async fn dispatch(&self, message: &str) -> DispatchReport {
        let mut report = DispatchReport::default();

        for chunk in split_message(message, self.max_len) {
            match self.channel.send(chunk).await {
                Ok(()) => {
                    self.counters.record_sent();
                    report.chunks_sent += 1;
                }
                Err(e) => {
                    error!(error = %e, "error sending message");
                    self.counters.record_error();
                    report.failed = true;
                    break;
                }
            }
        }

        if report.chunks_sent > 0 {
            info!(chunks = report.chunks_sent, "notification sent");
        }
        report
    }
}
