use super::tree::ROOT_ITEM;
use crate::config::MinSupport;
use crate::error::{MineError, Result};
use ndarray::ArrayView2;
use rayon::prelude::*;
use rustc_hash::FxHashMap;
use tracing::{debug, warn};

/// Universes up to this many ids are counted with per-worker arrays;
/// larger ones with hash maps.
const DENSE_HISTOGRAM_LIMIT: usize = 1 << 20;

/// In-memory transaction store that can be scanned for item histograms and
/// re-read as filtered, support-ordered transactions.
///
/// Item id 0 is reserved for the tree root; it and any id at or above the
/// declared universe are skipped during scans.
#[derive(Debug, Clone)]
pub struct Database {
    transactions: Vec<Vec<u32>>,
    universe: u32,
    item_counts: FxHashMap<u32, u32>,
    ranks: FxHashMap<u32, u32>,
    min_support: Option<u32>,
}

impl Database {
    /// Builds a database whose universe covers every item id that occurs.
    pub fn new(transactions: Vec<Vec<u32>>) -> Self {
        let max_item = transactions
            .iter()
            .flat_map(|tx| tx.iter().copied())
            .max()
            .unwrap_or(ROOT_ITEM);
        Self::with_universe(transactions, max_item.saturating_add(1))
    }

    pub fn with_universe(mut transactions: Vec<Vec<u32>>, universe: u32) -> Self {
        for tx in transactions.iter_mut() {
            tx.sort_unstable();
            tx.dedup();
        }
        Self {
            transactions,
            universe: universe.max(1),
            item_counts: FxHashMap::default(),
            ranks: FxHashMap::default(),
            min_support: None,
        }
    }

    /// Reads a binary transaction matrix. Column `c` becomes item `c + 1`.
    pub fn from_dense(matrix: ArrayView2<i32>) -> Self {
        let num_items = matrix.shape()[1];
        Self::with_universe(matrix_to_transactions(matrix), num_items as u32 + 1)
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    /// Exclusive upper bound of base item ids; synthetic itemset ids start here.
    pub fn universe(&self) -> u32 {
        self.universe
    }

    pub fn resolve_min_support(&self, min_support: MinSupport) -> u32 {
        min_support.resolve(self.transactions.len())
    }

    /// Forgets the previous scan so the source can be read again from the start.
    pub fn seek_to_start(&mut self) {
        self.item_counts.clear();
        self.ranks.clear();
        self.min_support = None;
    }

    /// Counts every item across all transactions and returns the frequent ones,
    /// ordered by descending support with ties broken by ascending item id.
    pub fn scan_for_frequent_items(&mut self, min_support: u32) -> Vec<(u32, u32)> {
        let (counts, skipped) = if self.universe as usize <= DENSE_HISTOGRAM_LIMIT {
            self.dense_histogram()
        } else {
            self.sparse_histogram()
        };

        if skipped > 0 {
            warn!(skipped, universe = self.universe, "ignored item ids outside the item universe");
        }

        let min_support = min_support.max(1);
        let mut frequent: Vec<(u32, u32)> = counts
            .iter()
            .filter(|&(_, &count)| count >= min_support)
            .map(|(&item, &count)| (item, count))
            .collect();
        frequent.sort_unstable_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));

        self.ranks = frequent
            .iter()
            .enumerate()
            .map(|(rank, &(item, _))| (item, rank as u32))
            .collect();

        debug!(
            transactions = self.transactions.len(),
            distinct = counts.len(),
            frequent = frequent.len(),
            min_support,
            "histogram scan complete"
        );

        self.item_counts = counts;
        self.min_support = Some(min_support);
        frequent
    }

    fn accepts(&self, item: u32) -> bool {
        item != ROOT_ITEM && item < self.universe
    }

    /// Per-worker arrays indexed by item, summed elementwise. Only for small universes.
    fn dense_histogram(&self) -> (FxHashMap<u32, u32>, usize) {
        let width = self.universe as usize;

        let (hist, skipped) = self
            .transactions
            .par_iter()
            .fold(
                || (vec![0u32; width], 0usize),
                |(mut hist, mut skipped), tx| {
                    for &item in tx {
                        if !self.accepts(item) {
                            skipped += 1;
                            continue;
                        }
                        hist[item as usize] += 1;
                    }
                    (hist, skipped)
                },
            )
            .reduce(
                || (vec![0u32; width], 0usize),
                |(mut a, skipped_a), (b, skipped_b)| {
                    for (x, y) in a.iter_mut().zip(b.iter()) {
                        *x += y;
                    }
                    (a, skipped_a + skipped_b)
                },
            );

        let counts = hist
            .iter()
            .enumerate()
            .filter(|&(_, &count)| count > 0)
            .map(|(item, &count)| (item as u32, count))
            .collect();
        (counts, skipped)
    }

    /// Per-worker hash maps merged by key, sized by the distinct items seen
    /// rather than by the universe.
    fn sparse_histogram(&self) -> (FxHashMap<u32, u32>, usize) {
        self.transactions
            .par_iter()
            .fold(
                || (FxHashMap::default(), 0usize),
                |(mut hist, mut skipped): (FxHashMap<u32, u32>, usize), tx| {
                    for &item in tx {
                        if !self.accepts(item) {
                            skipped += 1;
                            continue;
                        }
                        *hist.entry(item).or_insert(0) += 1;
                    }
                    (hist, skipped)
                },
            )
            .reduce(
                || (FxHashMap::default(), 0usize),
                |(mut a, skipped_a), (b, skipped_b)| {
                    for (item, count) in b {
                        *a.entry(item).or_insert(0) += count;
                    }
                    (a, skipped_a + skipped_b)
                },
            )
    }

    /// Support of `item` as of the last scan. `None` before a scan or for ids
    /// outside the universe.
    pub fn item_count(&self, item: u32) -> Option<u32> {
        if self.min_support.is_none() || item >= self.universe {
            return None;
        }
        Some(self.item_counts.get(&item).copied().unwrap_or(0))
    }

    /// Transactions reduced to their frequent items, sorted by the scan's item order.
    /// Transactions left empty are dropped.
    pub fn filtered_items(&self) -> Result<Vec<Vec<u32>>> {
        if self.min_support.is_none() {
            return Err(MineError::Phase {
                operation: "filter transactions",
                expected: "Scanned",
                found: "Unscanned",
            });
        }

        let ranks = &self.ranks;
        let filtered = self
            .transactions
            .par_iter()
            .filter_map(|tx| {
                let mut ranked: Vec<(u32, u32)> = tx
                    .iter()
                    .filter_map(|&item| ranks.get(&item).map(|&rank| (rank, item)))
                    .collect();
                if ranked.is_empty() {
                    return None;
                }
                ranked.sort_unstable();
                Some(ranked.into_iter().map(|(_, item)| item).collect())
            })
            .collect();

        Ok(filtered)
    }
}

/// Converts a binary transaction matrix into item lists; nonzero cell `(row, c)`
/// puts item `c + 1` into transaction `row`.
pub fn matrix_to_transactions(matrix: ArrayView2<i32>) -> Vec<Vec<u32>> {
    matrix
        .outer_iter()
        .map(|row| {
            row.iter()
                .enumerate()
                .filter(|&(_, &value)| value != 0)
                .map(|(col, _)| col as u32 + 1)
                .collect()
        })
        .collect()
}
