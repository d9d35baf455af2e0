use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use tracing::warn;

use crate::feed::MarketFeed;
use crate::indodax::client::IndodaxClient;
use crate::rate_limiter::RateLimiter;
use crate::types::{ReferenceSnapshot, Snapshot, maintenance_set};

/// Outbound budgets. The tickers endpoint is polled by both detectors; the
/// heavier summaries and pairs endpoints share a tighter budget.
#[derive(Debug, Clone, Copy)]
pub struct FeedLimits {
    pub tickers_per_window: usize,
    pub tickers_window: Duration,
    pub summaries_per_window: usize,
    pub summaries_window: Duration,
}

impl Default for FeedLimits {
    fn default() -> Self {
        Self {
            tickers_per_window: 50,
            tickers_window: Duration::from_secs(30),
            summaries_per_window: 30,
            summaries_window: Duration::from_secs(60),
        }
    }
}

/// [`MarketFeed`] backed by the Indodax REST API.
///
/// Clones share the client and both limiters.
#[derive(Clone)]
pub struct IndodaxFeed {
    client: IndodaxClient,
    tickers_limiter: Arc<RateLimiter>,
    summaries_limiter: Arc<RateLimiter>,
}

impl IndodaxFeed {
    pub fn new(client: IndodaxClient, limits: FeedLimits) -> Self {
        Self {
            client,
            tickers_limiter: Arc::new(RateLimiter::new(
                limits.tickers_per_window,
                limits.tickers_window,
            )),
            summaries_limiter: Arc::new(RateLimiter::new(
                limits.summaries_per_window,
                limits.summaries_window,
            )),
        }
    }
}

#[async_trait]
impl MarketFeed for IndodaxFeed {
    async fn fetch_snapshot(&self) -> Option<Snapshot> {
        self.tickers_limiter.acquire().await;

        match self.client.fetch_tickers().await {
            Ok(envelope) => Some(Snapshot::from_envelope(envelope, Utc::now())),
            Err(e) => {
                warn!(error = %e, "failed to fetch tickers");
                None
            }
        }
    }

    async fn fetch_reference(&self) -> Option<ReferenceSnapshot> {
        self.summaries_limiter.acquire().await;

        match self.client.fetch_summaries().await {
            Ok(envelope) => Some(ReferenceSnapshot::from_envelope(envelope)),
            Err(e) => {
                warn!(error = %e, "failed to fetch summaries");
                None
            }
        }
    }

    async fn fetch_maintenance_flags(&self) -> Option<HashSet<String>> {
        self.summaries_limiter.acquire().await;

        match self.client.fetch_pairs().await {
            Ok(pairs) => Some(maintenance_set(&pairs)),
            Err(e) => {
                warn!(error = %e, "failed to fetch pairs");
                None
            }
        }
    }
}
