use super::mining::CacheStats;
use super::tree::ROOT_ITEM;
use super::utils::FrequentLevel;
use crate::error::{MineError, Result};

/// A frequent itemset of depth > 1: `prefix` (a base item or an earlier
/// synthetic id) extended by `suffix`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemsetRecord {
    pub prefix: u32,
    pub suffix: u32,
    pub support: u32,
}

/// Id → (prefix, suffix) table. Synthetic ids start at the item universe.
#[derive(Debug, Clone)]
pub struct ItemsetTable {
    base: u32,
    records: Vec<ItemsetRecord>,
}

impl ItemsetTable {
    pub fn new(universe: u32) -> Self {
        Self {
            base: universe,
            records: Vec::new(),
        }
    }

    /// First synthetic id.
    pub fn base(&self) -> u32 {
        self.base
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn is_synthetic(&self, id: u32) -> bool {
        id >= self.base
    }

    pub fn get(&self, id: u32) -> Option<&ItemsetRecord> {
        id.checked_sub(self.base)
            .and_then(|index| self.records.get(index as usize))
    }

    /// Records a new itemset and returns its id. Fails once ids would pass `u32::MAX`.
    pub(crate) fn record(&mut self, prefix: u32, suffix: u32, support: u32) -> Result<u32> {
        let id = u32::try_from(self.records.len())
            .ok()
            .and_then(|offset| self.base.checked_add(offset))
            .ok_or(MineError::IdSpaceExhausted {
                universe: self.base,
                recorded: self.records.len(),
            })?;
        self.records.push(ItemsetRecord {
            prefix,
            suffix,
            support,
        });
        Ok(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, &ItemsetRecord)> + '_ {
        self.records
            .iter()
            .enumerate()
            .map(move |(index, record)| (self.base + index as u32, record))
    }

    /// Expands `id` into its items in discovery order: the prefix's expansion
    /// followed by the suffix. Base items expand to themselves.
    pub fn materialize(&self, id: u32) -> Option<Vec<u32>> {
        let mut suffixes = Vec::new();
        let mut current = id;
        // Prefix ids are always recorded before the ids that extend them.
        while self.is_synthetic(current) {
            let record = self.get(current)?;
            suffixes.push(record.suffix);
            current = record.prefix;
        }
        if current == ROOT_ITEM {
            return None;
        }

        let mut items = Vec::with_capacity(suffixes.len() + 1);
        items.push(current);
        items.extend(suffixes.iter().rev());
        Some(items)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrequentItemset {
    pub items: Vec<u32>,
    pub support: u32,
}

/// Everything a reporter needs: depth-1 itemsets with their counts, the
/// id table for longer ones, and a few run statistics.
#[derive(Debug, Clone)]
pub struct MiningResult {
    pub singletons: Vec<(u32, u32)>,
    pub itemsets: ItemsetTable,
    pub min_support: u32,
    pub rounds: usize,
    pub cache_stats: CacheStats,
}

impl MiningResult {
    pub fn len(&self) -> usize {
        self.singletons.len() + self.itemsets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn materialize(&self, id: u32) -> Option<Vec<u32>> {
        self.itemsets.materialize(id)
    }

    /// Depth-1 itemsets first, then longer ones in id order.
    pub fn iter(&self) -> impl Iterator<Item = FrequentItemset> + '_ {
        let singletons = self.singletons.iter().map(|&(item, support)| FrequentItemset {
            items: vec![item],
            support,
        });
        let longer = self.itemsets.iter().filter_map(|(id, record)| {
            self.itemsets.materialize(id).map(|items| FrequentItemset {
                items,
                support: record.support,
            })
        });
        singletons.chain(longer)
    }

    /// Itemsets grouped by size, each stored sorted in flat storage.
    pub fn levels(&self) -> Vec<FrequentLevel> {
        let mut levels: Vec<FrequentLevel> = Vec::new();
        for itemset in self.iter() {
            let size = itemset.items.len();
            while levels.len() < size {
                levels.push(FrequentLevel::new(levels.len() + 1));
            }
            levels[size - 1].add_itemset_with_support(itemset.items, itemset.support);
        }
        levels
    }
}
