use crate::config::MinSupport;
use crate::error::{MineError, Result};
use crate::fp::tree::{FPTree, ROOT_ITEM};
use rustc_hash::FxHashMap;
use tracing::{debug, warn};

/// State for chunk-fed, two-pass mining: every chunk is counted first, then
/// the same chunks are replayed to build the tree.
#[derive(Debug)]
pub struct StreamingState {
    /// Item frequency counts during counting phase
    pub item_counts: FxHashMap<u32, u32>,
    /// Total number of transactions processed
    pub num_transactions: usize,
    /// Frequent items with their counts, sorted by count descending then item ascending
    pub frequent_items: Vec<(u32, u32)>,
    /// Absolute minimum support resolved at finalization
    pub min_support: Option<u32>,
    /// The FP-Tree being built incrementally
    pub fp_tree: Option<FPTree>,
    /// Largest item id seen while counting
    pub max_item: u32,
    /// Processing phase
    pub phase: ProcessingPhase,
    ranks: FxHashMap<u32, u32>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProcessingPhase {
    Counting,
    CountingFinalized,
    Building,
    ReadyToMine,
}

impl ProcessingPhase {
    pub fn name(self) -> &'static str {
        match self {
            ProcessingPhase::Counting => "Counting",
            ProcessingPhase::CountingFinalized => "CountingFinalized",
            ProcessingPhase::Building => "Building",
            ProcessingPhase::ReadyToMine => "ReadyToMine",
        }
    }
}

impl Default for StreamingState {
    fn default() -> Self {
        Self::new()
    }
}

impl StreamingState {
    pub fn new() -> Self {
        Self {
            item_counts: FxHashMap::default(),
            num_transactions: 0,
            frequent_items: Vec::new(),
            min_support: None,
            fp_tree: None,
            max_item: ROOT_ITEM,
            phase: ProcessingPhase::Counting,
            ranks: FxHashMap::default(),
        }
    }

    pub(crate) fn expect_phase(&self, expected: ProcessingPhase, operation: &'static str) -> Result<()> {
        if self.phase != expected {
            return Err(MineError::Phase {
                operation,
                expected: expected.name(),
                found: self.phase.name(),
            });
        }
        Ok(())
    }

    /// Add item counts from a transaction batch. Each item counts once per transaction.
    pub fn add_counts(&mut self, transactions: &[Vec<u32>]) {
        let mut skipped = 0usize;
        let mut seen: Vec<u32> = Vec::new();
        for transaction in transactions {
            self.num_transactions += 1;
            seen.clear();
            seen.extend_from_slice(transaction);
            seen.sort_unstable();
            seen.dedup();
            for &item in &seen {
                if item == ROOT_ITEM {
                    skipped += 1;
                    continue;
                }
                self.max_item = self.max_item.max(item);
                *self.item_counts.entry(item).or_insert(0) += 1;
            }
        }
        if skipped > 0 {
            warn!(skipped, "ignored reserved item id 0 in streamed transactions");
        }
    }

    /// Finalize counting phase and determine frequent items
    pub fn finalize_counts(&mut self, min_support: MinSupport) -> Result<()> {
        self.expect_phase(ProcessingPhase::Counting, "finalize counts")?;

        let min_count = min_support.resolve(self.num_transactions);
        self.min_support = Some(min_count);

        // Filter frequent items and sort by frequency (descending)
        let mut frequent: Vec<(u32, u32)> = self
            .item_counts
            .iter()
            .filter(|&(_, &count)| count >= min_count)
            .map(|(&item, &count)| (item, count))
            .collect();

        frequent.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        self.ranks = frequent
            .iter()
            .enumerate()
            .map(|(rank, &(item, _))| (item, rank as u32))
            .collect();
        self.frequent_items = frequent;

        debug!(
            transactions = self.num_transactions,
            frequent = self.frequent_items.len(),
            min_count,
            "streamed counts finalized"
        );
        self.phase = ProcessingPhase::CountingFinalized;
        Ok(())
    }

    /// Initialize FP-Tree for building phase
    pub fn init_tree(&mut self) -> Result<()> {
        self.expect_phase(ProcessingPhase::CountingFinalized, "init tree")?;

        self.fp_tree = Some(FPTree::with_items(&self.frequent_items));
        self.phase = ProcessingPhase::Building;
        Ok(())
    }

    /// Get the rank of an item (for sorting transactions)
    pub fn get_item_rank(&self, item: u32) -> Option<u32> {
        self.ranks.get(&item).copied()
    }

    /// Check if an item is frequent
    pub fn is_frequent(&self, item: u32) -> bool {
        self.ranks.contains_key(&item)
    }

    /// Complete building phase
    pub fn finalize_building(&mut self) -> Result<()> {
        self.expect_phase(ProcessingPhase::Building, "finalize building")?;

        self.phase = ProcessingPhase::ReadyToMine;
        Ok(())
    }
}
