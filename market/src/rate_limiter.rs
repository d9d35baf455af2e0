use std::collections::VecDeque;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::{Instant, sleep_until};

/// Sliding-window limiter: at most `max_calls` acquisitions within any
/// trailing `window`.
///
/// The window state sits behind a tokio mutex that stays held while a caller
/// waits, so concurrent callers are admitted in arrival order.
#[derive(Debug)]
pub struct RateLimiter {
    max_calls: usize,
    window: Duration,
    calls: Mutex<VecDeque<Instant>>,
}

impl RateLimiter {
    pub fn new(max_calls: usize, window: Duration) -> Self {
        let max_calls = max_calls.max(1);
        Self {
            max_calls,
            window,
            calls: Mutex::new(VecDeque::with_capacity(max_calls)),
        }
    }

    /// Wait until a slot is free, then register the call.
    pub async fn acquire(&self) {
        let mut calls = self.calls.lock().await;

        loop {
            let now = Instant::now();
            while calls
                .front()
                .is_some_and(|&t| now.duration_since(t) >= self.window)
            {
                calls.pop_front();
            }

            if calls.len() < self.max_calls {
                calls.push_back(now);
                return;
            }

            if let Some(&oldest) = calls.front() {
                sleep_until(oldest + self.window).await;
            }
        }
    }

    /// Calls registered in the current window.
    pub async fn in_flight(&self) -> usize {
        let now = Instant::now();
        self.calls
            .lock()
            .await
            .iter()
            .filter(|&&t| now.duration_since(t) < self.window)
            .count()
    }

    pub fn max_calls(&self) -> usize {
        self.max_calls
    }

    pub fn window(&self) -> Duration {
        self.window
    }
}
