//! Frequent itemset mining over flattened FP-trees.
//!
//! Transactions are scanned into a support-ordered FP-tree, the tree is
//! flattened into one array per worker group, and itemsets are grown level by
//! level: every round walks seeds towards the root, merges the resulting
//! `(prefix, suffix)` candidates and keeps the frequent ones as next seeds.
//!
//! ```
//! use fparray::{Database, MinSupport, Miner, MinerConfig};
//!
//! let mut db = Database::new(vec![vec![1, 2], vec![1, 2, 3], vec![2, 3]]);
//! let miner = Miner::new(MinerConfig::new(MinSupport::Count(2))).unwrap();
//! let result = miner.mine(&mut db).unwrap();
//!
//! for itemset in result.iter() {
//!     println!("{:?}: {}", itemset.items, itemset.support);
//! }
//! ```

pub mod config;
pub mod error;
pub mod fp;

pub use config::{CacheGeometry, MinSupport, MinerConfig};
pub use error::{MineError, Result};
pub use fp::{
    Database, FrequentItemset, FrequentLevel, ItemsetTable, Miner, MiningResult, StreamingState,
};
