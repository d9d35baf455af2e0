pub mod feed;
pub mod indodax;
pub mod ranking;
pub mod rate_limiter;
pub mod types;

pub use feed::MarketFeed;
pub use ranking::{RankEntry, RankLabel, RankTable, compute_ranks};
pub use rate_limiter::RateLimiter;
pub use types::{Pair, ReferenceSnapshot, Snapshot, Ticker};
