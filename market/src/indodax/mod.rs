pub mod client;
pub mod errors;
pub mod feed;

pub use client::IndodaxClient;
pub use errors::FeedError;
pub use feed::{FeedLimits, IndodaxFeed};
