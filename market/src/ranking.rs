//! Relative 24h performance ranking across the whole instrument universe.
//!
//! ```text
//! pct_change = (price_now - price_24h) / price_24h * 100
//! ```
//!
//! Instruments below the price floor, or without a nonzero 24h reference,
//! are left unranked.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;

use crate::types::{Pair, ReferenceSnapshot, Snapshot};

/// Label thresholds: rank 1..=10 on either side gets a Top/Low label.
pub const LABEL_CUTOFF: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RankEntry {
    /// 1 = largest 24h gain.
    pub rank: usize,
    /// 1 = largest 24h loss.
    pub reverse_rank: usize,
    pub pct_change: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankLabel {
    Top(usize),
    Low(usize),
    Rank(usize),
}

impl RankLabel {
    /// Gainer side is checked first.
    pub fn for_entry(entry: &RankEntry) -> Self {
        if entry.rank <= LABEL_CUTOFF {
            RankLabel::Top(entry.rank)
        } else if entry.reverse_rank <= LABEL_CUTOFF {
            RankLabel::Low(entry.reverse_rank)
        } else {
            RankLabel::Rank(entry.rank)
        }
    }
}

impl fmt::Display for RankLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RankLabel::Top(n) => write!(f, "Top #{n}"),
            RankLabel::Low(n) => write!(f, "Low #{n}"),
            RankLabel::Rank(n) => write!(f, "Rank #{n}"),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct RankTable {
    entries: HashMap<Pair, RankEntry>,
}

impl RankTable {
    pub fn get(&self, pair: &Pair) -> Option<&RankEntry> {
        self.entries.get(pair)
    }

    /// Display label for `pair`. Unranked instruments are placed last.
    pub fn label(&self, pair: &Pair) -> RankLabel {
        match self.entries.get(pair) {
            Some(entry) => RankLabel::for_entry(entry),
            None => RankLabel::Rank(self.fallback_rank()),
        }
    }

    pub fn fallback_rank(&self) -> usize {
        self.entries.len() + 1
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Pair, &RankEntry)> {
        self.entries.iter()
    }
}

pub fn compute_ranks(
    snapshot: &Snapshot,
    reference: &ReferenceSnapshot,
    price_floor: f64,
) -> RankTable {
    let changes: Vec<(&Pair, f64)> = snapshot
        .iter()
        .filter(|(pair, ticker)| !pair.is_excluded() && ticker.price >= price_floor)
        .filter_map(|(pair, ticker)| {
            let reference_price = reference.price_for(pair).filter(|p| *p != 0.0)?;
            let pct = (ticker.price - reference_price) / reference_price * 100.0;
            pct.is_finite().then_some((pair, pct))
        })
        .collect();

    let mut gainers = changes.clone();
    gainers.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));

    let mut losers = changes;
    losers.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(Ordering::Equal));

    let reverse: HashMap<&Pair, usize> = losers
        .iter()
        .enumerate()
        .map(|(i, (pair, _))| (*pair, i + 1))
        .collect();

    let entries = gainers
        .iter()
        .enumerate()
        .map(|(i, (pair, pct))| {
            let entry = RankEntry {
                rank: i + 1,
                reverse_rank: reverse[pair],
                pct_change: *pct,
            };
            ((*pair).clone(), entry)
        })
        .collect();

    RankTable { entries }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use chrono::Utc;

    use super::*;
    use crate::types::Ticker;

    fn snapshot(rows: &[(&str, f64)]) -> Snapshot {
        Snapshot::new(
            Utc::now(),
            rows.iter().map(|(id, price)| {
                (
                    Pair::parse(id),
                    Ticker {
                        price: *price,
                        volume: 0.0,
                    },
                )
            }),
        )
    }

    fn reference(rows: &[(&str, f64)]) -> ReferenceSnapshot {
        ReferenceSnapshot::new(
            rows.iter()
                .map(|(k, v)| (k.to_string(), *v))
                .collect::<HashMap<_, _>>(),
        )
    }

    #[test]
    fn ranks_by_pct_change_both_directions() {
        let snap = snapshot(&[("a_idr", 110.0), ("b_idr", 90.0), ("c_idr", 200.0)]);
        let reference = reference(&[("aidr", 100.0), ("bidr", 100.0), ("cidr", 100.0)]);

        let table = compute_ranks(&snap, &reference, 25.0);

        let c = table.get(&Pair::parse("c_idr")).unwrap();
        let b = table.get(&Pair::parse("b_idr")).unwrap();

        assert_eq!((c.rank, c.reverse_rank), (1, 3));
        assert_eq!((b.rank, b.reverse_rank), (3, 1));
        assert!((c.pct_change - 100.0).abs() < 1e-9);
    }

    #[test]
    fn floor_and_missing_reference_leave_instrument_unranked() {
        let snap = snapshot(&[
            ("a_idr", 110.0),
            ("cheap_idr", 5.0),
            ("new_idr", 50.0),
            ("zero_idr", 50.0),
        ]);
        let reference = reference(&[("aidr", 100.0), ("cheapidr", 4.0), ("zeroidr", 0.0)]);

        let table = compute_ranks(&snap, &reference, 25.0);

        assert_eq!(table.len(), 1);
        assert!(table.get(&Pair::parse("cheap_idr")).is_none());
        assert_eq!(table.label(&Pair::parse("new_idr")), RankLabel::Rank(2));
        assert_eq!(table.label(&Pair::parse("zero_idr")).to_string(), "Rank #2");
    }

    #[test]
    fn label_prefers_gainer_side_then_loser_side() {
        let top = RankEntry {
            rank: 3,
            reverse_rank: 8,
            pct_change: 1.0,
        };
        let low = RankEntry {
            rank: 40,
            reverse_rank: 2,
            pct_change: -9.0,
        };
        let mid = RankEntry {
            rank: 20,
            reverse_rank: 25,
            pct_change: 0.0,
        };

        assert_eq!(RankLabel::for_entry(&top).to_string(), "Top #3");
        assert_eq!(RankLabel::for_entry(&low).to_string(), "Low #2");
        assert_eq!(RankLabel::for_entry(&mid).to_string(), "Rank #20");
    }
}
