// Mining module - candidate kernels, read cache, aggregation and the round loop

pub mod aggregator;
pub mod cache;
pub mod engine;
pub mod kernel;

pub use aggregator::{CandidateAggregator, DrainOutcome, Occurrence};
pub use cache::{ArrayReader, CacheStats, CachedArray};
pub use engine::Miner;
pub use kernel::{assign_offsets, mine_partition, CandidateKernel, CpuKernel, GroupView};
