use crate::error::Result;
use crate::fp::array::{Candidate, ElePos};
use crate::fp::itemsets::ItemsetTable;
use parking_lot::Mutex;
use rustc_hash::{FxBuildHasher, FxHashMap};
use std::hash::BuildHasher;

/// Where one candidate was found: the suffix's array position in its group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Occurrence {
    pub suffix_pos: u32,
    pub support: u32,
}

#[derive(Debug, Clone)]
struct CandidateSet {
    support: u32,
    occurrences: Vec<Vec<Occurrence>>,
}

impl CandidateSet {
    fn new(groups: usize) -> Self {
        Self {
            support: 0,
            occurrences: vec![Vec::new(); groups],
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct DrainOutcome {
    /// Next-round seeds, one list per group.
    pub seeds: Vec<Vec<ElePos>>,
    pub frequent: usize,
    pub pruned: usize,
}

impl DrainOutcome {
    pub fn is_exhausted(&self) -> bool {
        self.seeds.iter().all(Vec::is_empty)
    }
}

/// Concurrent `(prefix, suffix)` → support map, split into independently locked shards.
pub struct CandidateAggregator {
    shards: Vec<Mutex<FxHashMap<(u32, u32), CandidateSet>>>,
    groups: usize,
    hasher: FxBuildHasher,
}

impl CandidateAggregator {
    pub fn new(shards: usize, groups: usize) -> Self {
        Self {
            shards: (0..shards.max(1))
                .map(|_| Mutex::new(FxHashMap::default()))
                .collect(),
            groups: groups.max(1),
            hasher: FxBuildHasher,
        }
    }

    fn shard_for(&self, key: (u32, u32)) -> usize {
        (self.hasher.hash_one(key) as usize) % self.shards.len()
    }

    /// Adds one candidate found by `group`. Empty slots are ignored.
    pub fn insert(&self, group: usize, candidate: &Candidate) {
        if candidate.is_empty() || group >= self.groups {
            return;
        }
        let key = candidate.key();
        let mut shard = self.shards[self.shard_for(key)].lock();
        let set = shard
            .entry(key)
            .or_insert_with(|| CandidateSet::new(self.groups));
        set.support = set.support.saturating_add(candidate.support);
        set.occurrences[group].push(Occurrence {
            suffix_pos: candidate.suffix_pos,
            support: candidate.support,
        });
    }

    pub fn len(&self) -> usize {
        self.shards.iter().map(|shard| shard.lock().len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        for shard in &self.shards {
            shard.lock().clear();
        }
    }

    /// Empties the map. Keys reaching `min_support` are recorded in `table` in
    /// ascending key order and every occurrence becomes a seed in its group.
    /// Everything else is dropped.
    ///
    /// Fails when `table` has no ids left; the map is empty afterwards either way.
    pub fn drain(&self, min_support: u32, table: &mut ItemsetTable) -> Result<DrainOutcome> {
        let mut survivors: Vec<((u32, u32), CandidateSet)> = Vec::new();
        let mut pruned = 0;

        for shard in &self.shards {
            for (key, set) in shard.lock().drain() {
                if set.support >= min_support {
                    survivors.push((key, set));
                } else {
                    pruned += 1;
                }
            }
        }
        survivors.sort_unstable_by_key(|(key, _)| *key);

        let mut seeds: Vec<Vec<ElePos>> = vec![Vec::new(); self.groups];
        let frequent = survivors.len();
        for ((prefix, suffix), set) in survivors {
            let id = table.record(prefix, suffix, set.support)?;
            for (group, mut occurrences) in set.occurrences.into_iter().enumerate() {
                occurrences.sort_unstable();
                seeds[group].extend(
                    occurrences
                        .into_iter()
                        .map(|occ| ElePos::new(id, occ.suffix_pos, occ.support)),
                );
            }
        }

        Ok(DrainOutcome {
            seeds,
            frequent,
            pruned,
        })
    }
}
