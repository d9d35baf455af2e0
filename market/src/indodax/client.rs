use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use crate::indodax::errors::FeedError;
use crate::types::{PairInfo, SummariesEnvelope, TickersEnvelope};

pub const DEFAULT_BASE_URL: &str = "https://indodax.com";

/// Thin HTTP client over the public Indodax REST API.
#[derive(Clone)]
pub struct IndodaxClient {
    http: Client,
    base_url: String,
}

impl IndodaxClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, FeedError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(10))
            .pool_idle_timeout(Duration::from_secs(30))
            .tcp_keepalive(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    #[instrument(skip(self), level = "debug")]
    pub async fn fetch_tickers(&self) -> Result<TickersEnvelope, FeedError> {
        let envelope: TickersEnvelope = self.get_json("tickers").await?;
        debug!(count = envelope.tickers.len(), "tickers fetched");
        Ok(envelope)
    }

    #[instrument(skip(self), level = "debug")]
    pub async fn fetch_summaries(&self) -> Result<SummariesEnvelope, FeedError> {
        let envelope: SummariesEnvelope = self.get_json("summaries").await?;
        debug!(count = envelope.prices_24h.len(), "summaries fetched");
        Ok(envelope)
    }

    #[instrument(skip(self), level = "debug")]
    pub async fn fetch_pairs(&self) -> Result<Vec<PairInfo>, FeedError> {
        let pairs: Vec<PairInfo> = self.get_json("pairs").await?;
        debug!(count = pairs.len(), "pairs fetched");
        Ok(pairs)
    }

    async fn get_json<T: DeserializeOwned>(&self, endpoint: &'static str) -> Result<T, FeedError> {
        let url = format!("{}/api/{}", self.base_url, endpoint);

        let resp = self.http.get(&url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(FeedError::Status { endpoint, status });
        }

        let body = resp.bytes().await?;
        serde_json::from_slice(&body)
            .map_err(|e| FeedError::InvalidResponse(format!("{endpoint}: {e}")))
    }
}
