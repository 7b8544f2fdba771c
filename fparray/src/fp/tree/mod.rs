// Tree module - FP-Tree arena, insertion and leaf list

mod tree;
mod tree_ops;

pub use tree::{FPNode, FPTree, NodeId, ROOT_ITEM};
