use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, TimeDelta, Utc};
use parking_lot::Mutex;

/// Process-wide running totals, read by `/stats`.
///
/// Created once at process start and shared (cheap clones) between the
/// dispatcher, the supervisor and the command layer. Never reset during a run.
#[derive(Clone, Debug)]
pub struct Counters {
    pub notifications_sent: Arc<AtomicU64>,
    pub errors: Arc<AtomicU64>,

    // keyed by display label, e.g. "BTC/IDR"
    alerts_by_pair: Arc<Mutex<HashMap<String, u64>>>,

    started_at: DateTime<Utc>,
}

impl Default for Counters {
    fn default() -> Self {
        Self::new(Utc::now())
    }
}

impl Counters {
    pub fn new(started_at: DateTime<Utc>) -> Self {
        Self {
            notifications_sent: Arc::new(AtomicU64::new(0)),
            errors: Arc::new(AtomicU64::new(0)),
            alerts_by_pair: Arc::new(Mutex::new(HashMap::new())),
            started_at,
        }
    }

    pub fn record_sent(&self) {
        self.notifications_sent.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_error(&self) {
        self.errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_alert(&self, pair_label: &str) {
        *self
            .alerts_by_pair
            .lock()
            .entry(pair_label.to_string())
            .or_default() += 1;
    }

    pub fn sent(&self) -> u64 {
        self.notifications_sent.load(Ordering::Relaxed)
    }

    pub fn error_count(&self) -> u64 {
        self.errors.load(Ordering::Relaxed)
    }

    pub fn alerts_for(&self, pair_label: &str) -> u64 {
        self.alerts_by_pair
            .lock()
            .get(pair_label)
            .copied()
            .unwrap_or(0)
    }

    /// Most frequently alerted instruments, highest count first. Ties are
    /// broken alphabetically so the output is stable.
    pub fn top_pairs(&self, n: usize) -> Vec<(String, u64)> {
        let mut all: Vec<(String, u64)> = self
            .alerts_by_pair
            .lock()
            .iter()
            .map(|(k, v)| (k.clone(), *v))
            .collect();

        all.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        all.truncate(n);
        all
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn uptime(&self, now: DateTime<Utc>) -> TimeDelta {
        now - self.started_at
    }
}
