use std::collections::{HashMap, HashSet};
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::debug;

/// Stablecoin quote dropped from every detector at ingestion time.
pub const EXCLUDED_QUOTE: &str = "usdt";

/// Quote currency every monitored instrument is priced in.
pub const HOME_QUOTE: &str = "idr";

/// Tradable instrument, e.g. `btc_idr`.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct Pair {
    pub base: String,
    pub quote: String,
}

impl Pair {
    pub fn new(base: impl Into<String>, quote: impl Into<String>) -> Self {
        Self {
            base: base.into().to_lowercase(),
            quote: quote.into().to_lowercase(),
        }
    }

    /// Parse a feed identifier. Accepts `btc_idr` as well as the
    /// separator-less `btcidr`.
    pub fn parse(id: &str) -> Self {
        let id = id.trim().to_lowercase();

        if let Some((base, quote)) = id.split_once('_') {
            return Self::new(base, quote);
        }

        for quote in [HOME_QUOTE, EXCLUDED_QUOTE] {
            if let Some(base) = id.strip_suffix(quote).filter(|b| !b.is_empty()) {
                return Self::new(base, quote);
            }
        }

        Self::new(id, "")
    }

    /// Identifier as used by the tickers feed.
    pub fn id(&self) -> String {
        if self.quote.is_empty() {
            self.base.clone()
        } else {
            format!("{}_{}", self.base, self.quote)
        }
    }

    /// Identifier without separator, as used by `prices_24h`.
    pub fn normalized(&self) -> String {
        format!("{}{}", self.base, self.quote)
    }

    /// Human readable label, e.g. `BTC/IDR`.
    pub fn label(&self) -> String {
        if self.quote.is_empty() {
            self.base.to_uppercase()
        } else {
            format!("{}/{}", self.base.to_uppercase(), self.quote.to_uppercase())
        }
    }

    pub fn is_excluded(&self) -> bool {
        self.id().contains(EXCLUDED_QUOTE)
    }

    /// Key under which this instrument appears in the maintenance set.
    pub fn maintenance_key(&self) -> String {
        maintenance_key(&self.id())
    }
}

impl fmt::Display for Pair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id())
    }
}

/// Canonical form shared by the pairs feed and the price feed.
///
/// `BTCIDR`, `btc_idr`, `BTC/IDR`, `btc-idr` and `btc` all map to `btc`.
pub fn maintenance_key(symbol: &str) -> String {
    let flat: String = symbol
        .chars()
        .filter(|c| !matches!(c, '_' | '-' | '/' | ' '))
        .flat_map(char::to_lowercase)
        .collect();

    match flat.strip_suffix(HOME_QUOTE) {
        Some(base) if !base.is_empty() => base.to_string(),
        _ => flat,
    }
}

/// Latest reading for one instrument.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ticker {
    /// Last traded price in IDR.
    pub price: f64,
    /// Traded volume in IDR.
    pub volume: f64,
}

/// Point-in-time read of every monitored instrument.
///
/// Iteration order follows the feed.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub taken_at: DateTime<Utc>,
    entries: Vec<(Pair, Ticker)>,
    index: HashMap<Pair, usize>,
}

impl Snapshot {
    /// Build a snapshot, dropping excluded instruments. A repeated
    /// instrument keeps its first position and its last reading.
    pub fn new(
        taken_at: DateTime<Utc>,
        readings: impl IntoIterator<Item = (Pair, Ticker)>,
    ) -> Self {
        let mut entries: Vec<(Pair, Ticker)> = Vec::new();
        let mut index: HashMap<Pair, usize> = HashMap::new();

        for (pair, ticker) in readings {
            if pair.is_excluded() {
                continue;
            }
            match index.get(&pair) {
                Some(&i) => entries[i].1 = ticker,
                None => {
                    index.insert(pair.clone(), entries.len());
                    entries.push((pair, ticker));
                }
            }
        }

        Self {
            taken_at,
            entries,
            index,
        }
    }

    pub fn from_envelope(envelope: TickersEnvelope, taken_at: DateTime<Utc>) -> Self {
        let readings = envelope.tickers.into_iter().filter_map(|(id, raw)| {
            let ticker = serde_json::from_value::<RawTicker>(raw)
                .ok()
                .and_then(|r| r.parse());

            if ticker.is_none() {
                debug!(pair = %id, "skipping malformed ticker");
            }
            ticker.map(|t| (Pair::parse(&id), t))
        });

        Self::new(taken_at, readings)
    }

    pub fn get(&self, pair: &Pair) -> Option<&Ticker> {
        self.index.get(pair).map(|&i| &self.entries[i].1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Pair, &Ticker)> {
        self.entries.iter().map(|(p, t)| (p, t))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Prices 24 hours ago, keyed by separator-less identifier (`btcidr`).
#[derive(Debug, Clone, Default)]
pub struct ReferenceSnapshot {
    prices_24h: HashMap<String, f64>,
}

impl ReferenceSnapshot {
    pub fn new(prices_24h: HashMap<String, f64>) -> Self {
        Self {
            prices_24h: prices_24h
                .into_iter()
                .map(|(k, v)| (k.to_lowercase(), v))
                .collect(),
        }
    }

    pub fn from_envelope(envelope: SummariesEnvelope) -> Self {
        let prices = envelope
            .prices_24h
            .into_iter()
            .filter_map(|(k, v)| parse_decimal(&v).map(|p| (k, p)))
            .collect();

        Self::new(prices)
    }

    pub fn price_for(&self, pair: &Pair) -> Option<f64> {
        self.prices_24h.get(&pair.normalized()).copied()
    }

    pub fn len(&self) -> usize {
        self.prices_24h.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices_24h.is_empty()
    }
}

// ---- wire types ----

/// `GET /api/tickers`
#[derive(Debug, Deserialize)]
pub struct TickersEnvelope {
    pub tickers: serde_json::Map<String, Value>,
}

/// `GET /api/summaries`. Only the 24h prices are consumed.
#[derive(Debug, Deserialize)]
pub struct SummariesEnvelope {
    #[serde(default)]
    pub prices_24h: HashMap<String, Value>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RawTicker {
    #[serde(default)]
    pub last: Option<Value>,
    #[serde(default)]
    pub vol_idr: Option<Value>,
}

impl RawTicker {
    /// `None` when price or volume is missing or non-numeric.
    pub fn parse(&self) -> Option<Ticker> {
        Some(Ticker {
            price: parse_decimal(self.last.as_ref()?)?,
            volume: parse_decimal(self.vol_idr.as_ref()?)?,
        })
    }
}

/// One entry of `GET /api/pairs`.
#[derive(Debug, Clone, Deserialize)]
pub struct PairInfo {
    pub symbol: String,
    #[serde(default, deserialize_with = "lenient_flag")]
    pub is_maintenance: bool,
}

/// Canonical keys of every non-excluded instrument flagged for maintenance.
pub fn maintenance_set(pairs: &[PairInfo]) -> HashSet<String> {
    pairs
        .iter()
        .filter(|p| p.is_maintenance)
        .filter(|p| !p.symbol.to_lowercase().contains(EXCLUDED_QUOTE))
        .map(|p| maintenance_key(&p.symbol))
        .collect()
}

/// The feed sends decimals as strings, occasionally as numbers.
pub fn parse_decimal(value: &Value) -> Option<f64> {
    let v = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    v.is_finite().then_some(v)
}

fn lenient_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Bool(b) => b,
        Value::Number(n) => n.as_f64().is_some_and(|v| v != 0.0),
        Value::String(s) => matches!(s.trim(), "1" | "true" | "TRUE" | "True"),
        _ => false,
    })
}
