use std::collections::HashSet;

use async_trait::async_trait;

use crate::types::{ReferenceSnapshot, Snapshot};

/// Read side of the market-data source.
///
/// Implementations swallow transport and status failures: they log and
/// return `None`, and the caller skips the cycle.
#[async_trait]
pub trait MarketFeed: Send + Sync + 'static {
    /// Price and volume of every monitored instrument.
    async fn fetch_snapshot(&self) -> Option<Snapshot>;

    /// Prices 24 hours ago.
    async fn fetch_reference(&self) -> Option<ReferenceSnapshot>;

    /// Canonical keys (see [`crate::types::maintenance_key`]) of instruments
    /// whose wallet is under maintenance.
    async fn fetch_maintenance_flags(&self) -> Option<HashSet<String>>;
}
