pub mod array;
pub mod database;
pub mod itemsets;
pub mod mining;
pub mod streaming_growth;
pub mod tree;
pub mod utils;


pub use array::{flatten, Candidate, ElePos, FlattenedTree, FpArray, FpArrayEntry, GroupArrays};
pub use database::{matrix_to_transactions, Database};
pub use itemsets::{FrequentItemset, ItemsetRecord, ItemsetTable, MiningResult};
pub use mining::{CacheStats, CandidateKernel, CpuKernel, GroupView, Miner};
pub use streaming_growth::{
    build_pass, count_pass, finalize_building, finalize_counts, mine_patterns, StreamingState,
};
pub use tree::{FPNode, FPTree, ROOT_ITEM};
pub use utils::{FrequentLevel, ItemsetStorage};
