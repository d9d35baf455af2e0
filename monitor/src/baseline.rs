use std::collections::HashMap;

use chrono::{DateTime, Utc};
use market::{Pair, Snapshot};

/// Comparison point a detector holds for one instrument.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Baseline {
    pub price: f64,
    pub volume: f64,
    pub taken_at: DateTime<Utc>,
}

/// Per-detector baselines. Owned by exactly one detection loop; never
/// shared.
#[derive(Debug, Default, Clone)]
pub struct BaselineStore {
    entries: HashMap<Pair, Baseline>,
}

impl BaselineStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store holding one baseline per instrument of `initial`.
    pub fn seeded(initial: &Snapshot) -> Self {
        let mut store = Self::new();
        store.reset_all(initial);
        store
    }

    pub fn get(&self, pair: &Pair) -> Option<&Baseline> {
        self.entries.get(pair)
    }

    pub fn set(&mut self, pair: &Pair, price: f64, volume: f64, taken_at: DateTime<Utc>) {
        let baseline = Baseline {
            price,
            volume,
            taken_at,
        };
        match self.entries.get_mut(pair) {
            Some(existing) => *existing = baseline,
            None => {
                self.entries.insert(pair.clone(), baseline);
            }
        }
    }

    /// Drop everything and reinstall the baselines of `initial`, stamped with
    /// the time `initial` was taken.
    pub fn reset_all(&mut self, initial: &Snapshot) {
        self.entries.clear();
        for (pair, ticker) in initial.iter() {
            self.set(pair, ticker.price, ticker.volume, initial.taken_at);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeDelta;
    use market::Ticker;

    use super::*;

    fn snap(at: DateTime<Utc>, rows: &[(&str, f64, f64)]) -> Snapshot {
        Snapshot::new(
            at,
            rows.iter().map(|(id, price, volume)| {
                (
                    Pair::parse(id),
                    Ticker {
                        price: *price,
                        volume: *volume,
                    },
                )
            }),
        )
    }

    #[test]
    fn seeded_store_mirrors_initial_snapshot() {
        let t0 = Utc::now();
        let initial = snap(t0, &[("btc_idr", 100.0, 5.0), ("eth_idr", 10.0, 1.0)]);
        let store = BaselineStore::seeded(&initial);

        assert_eq!(store.len(), 2);
        assert_eq!(
            store.get(&Pair::parse("btc_idr")),
            Some(&Baseline {
                price: 100.0,
                volume: 5.0,
                taken_at: t0
            })
        );
    }

    #[test]
    fn reset_all_discards_later_instruments_and_values() {
        let t0 = Utc::now();
        let initial = snap(t0, &[("btc_idr", 100.0, 5.0)]);
        let mut store = BaselineStore::seeded(&initial);

        let later = t0 + TimeDelta::minutes(10);
        store.set(&Pair::parse("btc_idr"), 150.0, 9.0, later);
        store.set(&Pair::parse("new_idr"), 1.0, 1.0, later);
        store.reset_all(&initial);

        assert_eq!(store.len(), 1);
        let b = store.get(&Pair::parse("btc_idr")).unwrap();
        assert_eq!((b.price, b.volume, b.taken_at), (100.0, 5.0, t0));
        assert!(store.get(&Pair::parse("new_idr")).is_none());
    }
}
