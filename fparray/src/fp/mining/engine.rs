use super::aggregator::CandidateAggregator;
use super::cache::{CacheStats, CachedArray};
use super::kernel::{CandidateKernel, CpuKernel, GroupView};
use crate::config::MinerConfig;
use crate::error::{MineError, Result};
use crate::fp::array::{flatten, ElePos, FpArray};
use crate::fp::database::Database;
use crate::fp::itemsets::{ItemsetTable, MiningResult};
use crate::fp::tree::FPTree;
use parking_lot::Mutex;
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Barrier;
use std::thread;
use tracing::{debug, error, info};

/// State shared by all groups for the duration of one mining run.
struct RoundState {
    seeds: Vec<Mutex<Vec<ElePos>>>,
    table: Mutex<ItemsetTable>,
    failure: Mutex<Option<MineError>>,
    running: AtomicBool,
    rounds: AtomicUsize,
    min_support: u32,
}

impl RoundState {
    fn fail(&self, err: MineError) {
        let mut failure = self.failure.lock();
        if failure.is_none() {
            error!(error = %err, "mining round failed");
            *failure = Some(err);
        }
    }

    /// Runs on the last group to reach the round barrier.
    fn merge(&self, aggregator: &CandidateAggregator) {
        let round = self.rounds.fetch_add(1, Ordering::Relaxed) + 1;

        if self.failure.lock().is_some() {
            aggregator.clear();
            self.running.store(false, Ordering::Release);
            return;
        }

        let outcome = match aggregator.drain(self.min_support, &mut self.table.lock()) {
            Ok(outcome) => outcome,
            Err(err) => {
                self.fail(err);
                self.running.store(false, Ordering::Release);
                return;
            }
        };
        info!(
            round,
            frequent = outcome.frequent,
            pruned = outcome.pruned,
            "round merged"
        );

        let exhausted = outcome.is_exhausted();
        for (slot, seeds) in self.seeds.iter().zip(outcome.seeds) {
            *slot.lock() = seeds;
        }
        if exhausted {
            self.running.store(false, Ordering::Release);
        }
    }
}

/// Frequent itemset miner over flattened FP-arrays.
///
/// ```
/// use fparray::{Database, MinSupport, Miner, MinerConfig};
///
/// let mut db = Database::new(vec![vec![1, 2, 3], vec![1, 2], vec![1, 3], vec![2, 3], vec![1, 2, 3]]);
/// let miner = Miner::new(MinerConfig::new(MinSupport::Count(3)).with_groups(2)).unwrap();
/// let result = miner.mine(&mut db).unwrap();
/// assert_eq!(result.len(), 6);
/// ```
pub struct Miner<K = CpuKernel> {
    config: MinerConfig,
    kernel: K,
}

impl Miner<CpuKernel> {
    pub fn new(config: MinerConfig) -> Result<Self> {
        let kernel = CpuKernel::new(config.threads_per_group);
        Self::with_kernel(config, kernel)
    }
}

impl<K: CandidateKernel> Miner<K> {
    pub fn with_kernel(config: MinerConfig, kernel: K) -> Result<Self> {
        config.validate()?;
        Ok(Self { config, kernel })
    }

    pub fn config(&self) -> &MinerConfig {
        &self.config
    }

    pub fn kernel(&self) -> &K {
        &self.kernel
    }

    /// Scans `db`, builds the tree and mines it.
    pub fn mine(&self, db: &mut Database) -> Result<MiningResult> {
        db.seek_to_start();
        let min_support = db.resolve_min_support(self.config.min_support);
        let singletons = db.scan_for_frequent_items(min_support);

        let mut tree = FPTree::with_items(&singletons);
        for transaction in db.filtered_items()? {
            tree.insert_transaction(&transaction, 1);
        }
        info!(
            transactions = db.len(),
            frequent_items = singletons.len(),
            nodes = tree.len(),
            "built fp-tree"
        );

        self.mine_tree(&tree, singletons, min_support, db.universe())
    }

    /// Mines an already built tree. `singletons` are reported as the depth-1
    /// itemsets; every item in the tree must lie below `universe`.
    pub fn mine_tree(
        &self,
        tree: &FPTree,
        singletons: Vec<(u32, u32)>,
        min_support: u32,
        universe: u32,
    ) -> Result<MiningResult> {
        if let Some(node) = tree.nodes.iter().find(|node| node.item >= universe) {
            return Err(MineError::config(format!(
                "tree holds item {} outside universe {universe}",
                node.item
            )));
        }
        let min_support = min_support.max(1);

        let flattened = flatten(tree, self.config.groups);
        let groups = flattened.groups.len();
        let aggregator = CandidateAggregator::new(self.config.shards, groups);
        let barrier = Barrier::new(groups);

        let state = RoundState {
            seeds: flattened
                .groups
                .iter()
                .map(|group| Mutex::new(group.seeds.clone()))
                .collect(),
            table: Mutex::new(ItemsetTable::new(universe)),
            failure: Mutex::new(None),
            running: AtomicBool::new(true),
            rounds: AtomicUsize::new(0),
            min_support,
        };

        let joined: Vec<thread::Result<CacheStats>> = thread::scope(|scope| {
            let handles: Vec<_> = flattened
                .groups
                .iter()
                .enumerate()
                .map(|(group, arrays)| {
                    let (state, aggregator, barrier) = (&state, &aggregator, &barrier);
                    scope.spawn(move || {
                        self.run_group(group, &arrays.array, state, aggregator, barrier)
                    })
                })
                .collect();
            handles.into_iter().map(|handle| handle.join()).collect()
        });

        let mut cache_stats = CacheStats::default();
        for stats in joined {
            match stats {
                Ok(stats) => cache_stats = cache_stats.merge(stats),
                Err(_) => return Err(MineError::environment("group worker panicked")),
            }
        }
        if let Some(err) = state.failure.into_inner() {
            return Err(err);
        }

        let rounds = state.rounds.into_inner();
        let itemsets = state.table.into_inner();
        info!(
            rounds,
            singletons = singletons.len(),
            itemsets = itemsets.len(),
            cache_hits = cache_stats.hits,
            cache_misses = cache_stats.misses,
            "mining finished"
        );

        Ok(MiningResult {
            singletons,
            itemsets,
            min_support,
            rounds,
            cache_stats,
        })
    }

    fn batch_limit(&self) -> Option<usize> {
        match (self.config.seed_batch, self.kernel.seed_capacity()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (limit, None) | (None, limit) => limit,
        }
    }

    fn run_group(
        &self,
        group: usize,
        array: &FpArray,
        state: &RoundState,
        aggregator: &CandidateAggregator,
        barrier: &Barrier,
    ) -> CacheStats {
        let pool = ThreadPoolBuilder::new()
            .num_threads(self.config.threads_per_group)
            .thread_name(move |worker| format!("fparray-g{group}-w{worker}"))
            .build()
            .map_err(|err| state.fail(err.into()))
            .ok();
        let cache = self
            .config
            .cache
            .map(|geometry| CachedArray::new(array, geometry));
        let view = GroupView {
            group,
            array,
            cache: cache.as_ref(),
        };

        // Every group reaches both barriers each round, even after a failure or
        // panic, so no peer is left waiting.
        loop {
            let seeds = std::mem::take(&mut *state.seeds[group].lock());
            if let Some(pool) = &pool {
                if !seeds.is_empty() {
                    let mined = panic::catch_unwind(AssertUnwindSafe(|| {
                        self.mine_seeds(pool, &view, &seeds, aggregator)
                    }));
                    match mined {
                        Ok(Ok(())) => {}
                        Ok(Err(err)) => state.fail(err),
                        Err(_) => state.fail(MineError::environment(format!(
                            "kernel panicked in group {group}"
                        ))),
                    }
                }
            }

            if barrier.wait().is_leader() {
                let merged = panic::catch_unwind(AssertUnwindSafe(|| state.merge(aggregator)));
                if merged.is_err() {
                    state.fail(MineError::environment("round merge panicked"));
                    state.running.store(false, Ordering::Release);
                }
            }
            barrier.wait();

            if !state.running.load(Ordering::Acquire) {
                break;
            }
        }

        cache.map(|cache| cache.stats()).unwrap_or_default()
    }

    fn mine_seeds(
        &self,
        pool: &ThreadPool,
        view: &GroupView<'_>,
        seeds: &[ElePos],
        aggregator: &CandidateAggregator,
    ) -> Result<()> {
        let batch = self.batch_limit().unwrap_or(seeds.len()).max(1);
        for chunk in seeds.chunks(batch) {
            let buffers = pool.install(|| self.kernel.mine(view, chunk))?;
            let emitted: usize = buffers.iter().map(Vec::len).sum();
            debug!(group = view.group, seeds = chunk.len(), emitted, "mined seed batch");

            pool.install(|| {
                buffers.par_iter().for_each(|buffer| {
                    for candidate in buffer {
                        aggregator.insert(view.group, candidate);
                    }
                })
            });
        }
        Ok(())
    }
}
