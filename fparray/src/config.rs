use crate::error::{MineError, Result};

/// Minimum support threshold, either absolute or relative to the number of transactions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MinSupport {
    Count(u32),
    Fraction(f64),
}

impl MinSupport {
    /// Absolute count for a dataset of `num_transactions` rows, never below 1.
    pub fn resolve(self, num_transactions: usize) -> u32 {
        let count = match self {
            MinSupport::Count(count) => count,
            MinSupport::Fraction(fraction) => {
                (fraction * num_transactions as f64).ceil().min(u32::MAX as f64) as u32
            }
        };
        count.max(1)
    }
}

impl Default for MinSupport {
    fn default() -> Self {
        MinSupport::Count(1)
    }
}

/// Geometry of the per-group FP-array read cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheGeometry {
    pub ways: usize,
    pub sets: usize,
}

impl CacheGeometry {
    pub fn new(ways: usize, sets: usize) -> Self {
        Self { ways, sets }
    }

    pub fn validate(&self) -> Result<()> {
        if self.ways == 0 {
            return Err(MineError::config("cache needs at least one way"));
        }
        if !self.sets.is_power_of_two() {
            return Err(MineError::config(format!(
                "cache set count must be a power of two, got {}",
                self.sets
            )));
        }
        Ok(())
    }
}

impl Default for CacheGeometry {
    fn default() -> Self {
        Self { ways: 2, sets: 1 << 10 }
    }
}

#[derive(Debug, Clone)]
pub struct MinerConfig {
    pub groups: usize,
    pub threads_per_group: usize,
    pub min_support: MinSupport,
    pub cache: Option<CacheGeometry>,
    pub shards: usize,
    /// Upper bound on seeds handed to the kernel at once. `None` defers to the kernel.
    pub seed_batch: Option<usize>,
}

impl Default for MinerConfig {
    fn default() -> Self {
        let threads = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(4);
        Self {
            groups: 1,
            threads_per_group: threads,
            min_support: MinSupport::default(),
            cache: Some(CacheGeometry::default()),
            shards: 16,
            seed_batch: None,
        }
    }
}

impl MinerConfig {
    pub fn new(min_support: MinSupport) -> Self {
        Self {
            min_support,
            ..Self::default()
        }
    }

    pub fn with_groups(mut self, groups: usize) -> Self {
        self.groups = groups;
        self
    }

    pub fn with_threads_per_group(mut self, threads: usize) -> Self {
        self.threads_per_group = threads;
        self
    }

    pub fn with_min_support(mut self, min_support: MinSupport) -> Self {
        self.min_support = min_support;
        self
    }

    pub fn with_cache(mut self, geometry: CacheGeometry) -> Self {
        self.cache = Some(geometry);
        self
    }

    pub fn without_cache(mut self) -> Self {
        self.cache = None;
        self
    }

    pub fn with_shards(mut self, shards: usize) -> Self {
        self.shards = shards;
        self
    }

    pub fn with_seed_batch(mut self, seeds: usize) -> Self {
        self.seed_batch = Some(seeds);
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.groups == 0 {
            return Err(MineError::config("at least one group is required"));
        }
        if self.threads_per_group == 0 {
            return Err(MineError::config("at least one thread per group is required"));
        }
        if self.shards == 0 {
            return Err(MineError::config("aggregator needs at least one shard"));
        }
        if self.seed_batch == Some(0) {
            return Err(MineError::config("seed batch must be positive"));
        }
        if let MinSupport::Fraction(fraction) = self.min_support {
            if !(0.0..=1.0).contains(&fraction) || fraction.is_nan() {
                return Err(MineError::config(format!(
                    "fractional min support must lie in [0, 1], got {fraction}"
                )));
            }
        }
        if let Some(geometry) = &self.cache {
            geometry.validate()?;
        }
        Ok(())
    }
}
