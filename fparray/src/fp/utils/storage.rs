/// Flat storage of itemsets: all items back to back, addressed by `(start, len)` offsets.
#[derive(Debug, Clone, Default)]
pub struct ItemsetStorage {
    pub items: Vec<u32>,
    pub offsets: Vec<(usize, usize)>,
    pub supports: Vec<u32>,
}

/// All itemsets of one size.
#[derive(Debug, Clone)]
pub struct FrequentLevel {
    pub storage: ItemsetStorage,
    pub itemset_size: usize,
}

impl ItemsetStorage {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Stores `items` in ascending order so equal itemsets compare equal.
    pub(crate) fn add_itemset_with_support(&mut self, mut items: Vec<u32>, support: u32) {
        items.sort_unstable();
        items.dedup();
        let start = self.items.len();
        self.items.extend_from_slice(&items);
        self.offsets.push((start, items.len()));
        self.supports.push(support);
    }

    pub(crate) fn get_itemset(&self, idx: usize) -> &[u32] {
        let (start, len) = self.offsets[idx];
        &self.items[start..start + len]
    }

    pub(crate) fn len(&self) -> usize {
        self.offsets.len()
    }
}

impl FrequentLevel {
    pub fn new(itemset_size: usize) -> Self {
        Self {
            storage: ItemsetStorage::new(),
            itemset_size,
        }
    }

    pub fn add_itemset_with_support(&mut self, items: Vec<u32>, support: u32) -> usize {
        debug_assert_eq!(items.len(), self.itemset_size);
        self.storage.add_itemset_with_support(items, support);
        self.storage.len() - 1
    }

    pub fn len(&self) -> usize {
        self.storage.len()
    }

    pub fn is_empty(&self) -> bool {
        self.storage.len() == 0
    }

    pub fn get_itemset(&self, idx: usize) -> &[u32] {
        self.storage.get_itemset(idx)
    }

    pub fn support(&self, idx: usize) -> u32 {
        self.storage.supports[idx]
    }

    pub fn iter_itemsets(&self) -> impl Iterator<Item = &[u32]> {
        (0..self.storage.len()).map(move |idx| self.get_itemset(idx))
    }

    pub fn iter_with_support(&self) -> impl Iterator<Item = (&[u32], u32)> {
        (0..self.storage.len()).map(move |idx| (self.get_itemset(idx), self.support(idx)))
    }
}
