//! Set-associative read cache in front of a group's FP-array.
//!
//! Each set is guarded by its own lock, so workers only contend when their
//! positions map to the same set. Every way carries a saturating `u16` LRU
//! counter; when a counter would overflow, the whole set is aged by a right
//! shift instead. The cache never changes what a read returns.

use crate::config::CacheGeometry;
use crate::fp::array::{FpArray, FpArrayEntry};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

const AGING_SHIFT: u32 = 2;

/// Read access to FP-array entries by position. Out-of-range positions read as `None`.
pub trait ArrayReader: Sync {
    fn read(&self, pos: u32) -> Option<FpArrayEntry>;
}

impl ArrayReader for FpArray {
    #[inline]
    fn read(&self, pos: u32) -> Option<FpArrayEntry> {
        self.get(pos)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
}

impl CacheStats {
    pub fn accesses(&self) -> u64 {
        self.hits + self.misses
    }

    pub fn hit_ratio(&self) -> f64 {
        if self.accesses() == 0 {
            return 0.0;
        }
        self.hits as f64 / self.accesses() as f64
    }

    pub fn merge(self, other: CacheStats) -> CacheStats {
        CacheStats {
            hits: self.hits + other.hits,
            misses: self.misses + other.misses,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct CacheBlock {
    index: u32,
    valid: bool,
    lru: u16,
    data: FpArrayEntry,
}

impl CacheBlock {
    const EMPTY: CacheBlock = CacheBlock {
        index: 0,
        valid: false,
        lru: 0,
        data: FpArrayEntry {
            item: 0,
            parent_pos: 0,
            support: 0,
            depth: 0,
        },
    };
}

#[derive(Debug)]
struct CacheSet {
    blocks: Vec<CacheBlock>,
}

impl CacheSet {
    fn new(ways: usize) -> Self {
        Self {
            blocks: vec![CacheBlock::EMPTY; ways],
        }
    }

    fn find(&self, index: u32) -> Option<usize> {
        self.blocks
            .iter()
            .position(|block| block.valid && block.index == index)
    }

    /// First invalid way, otherwise the way with the smallest counter.
    fn victim(&self) -> usize {
        if let Some(way) = self.blocks.iter().position(|block| !block.valid) {
            return way;
        }
        let mut victim = 0;
        let mut min_lru = u16::MAX;
        for (way, block) in self.blocks.iter().enumerate() {
            if block.lru < min_lru {
                min_lru = block.lru;
                victim = way;
            }
        }
        victim
    }

    fn touch(&mut self, way: usize) {
        if self.blocks[way].lru == u16::MAX {
            self.age(way);
        } else {
            self.blocks[way].lru += 1;
        }
    }

    /// Shifts every other valid counter down and ranks `recent` just above the old maximum.
    fn age(&mut self, recent: usize) {
        let mut max_lru = 0u16;
        for (way, block) in self.blocks.iter_mut().enumerate() {
            if way == recent || !block.valid {
                continue;
            }
            max_lru = max_lru.max(block.lru);
            block.lru >>= AGING_SHIFT;
        }
        self.blocks[recent].lru = (max_lru >> AGING_SHIFT) + 1;
    }
}

pub struct CachedArray<'a> {
    array: &'a FpArray,
    sets: Vec<Mutex<CacheSet>>,
    set_mask: u32,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl<'a> CachedArray<'a> {
    /// `geometry` must already be validated (power-of-two sets, at least one way).
    pub fn new(array: &'a FpArray, geometry: CacheGeometry) -> Self {
        let sets = geometry.sets.max(1);
        Self {
            array,
            sets: (0..sets)
                .map(|_| Mutex::new(CacheSet::new(geometry.ways.max(1))))
                .collect(),
            set_mask: (sets - 1) as u32,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    pub fn array(&self) -> &'a FpArray {
        self.array
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}

impl ArrayReader for CachedArray<'_> {
    fn read(&self, pos: u32) -> Option<FpArrayEntry> {
        if pos as usize >= self.array.len() {
            return None;
        }

        let mut set = self.sets[(pos & self.set_mask) as usize].lock();
        if let Some(way) = set.find(pos) {
            set.touch(way);
            self.hits.fetch_add(1, Ordering::Relaxed);
            return Some(set.blocks[way].data);
        }

        let data = self.array.get(pos)?;
        let way = set.victim();
        set.blocks[way] = CacheBlock {
            index: pos,
            valid: true,
            lru: 0,
            data,
        };
        set.age(way);
        self.misses.fetch_add(1, Ordering::Relaxed);
        Some(data)
    }
}
