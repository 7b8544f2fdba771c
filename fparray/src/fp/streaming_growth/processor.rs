use super::state::{ProcessingPhase, StreamingState};
use crate::config::MinSupport;
use crate::error::{MineError, Result};
use crate::fp::itemsets::MiningResult;
use crate::fp::mining::{CandidateKernel, Miner};

/// Process counting pass for streaming mining
pub fn count_pass(state: &mut StreamingState, transactions: &[Vec<u32>]) -> Result<()> {
    state.expect_phase(ProcessingPhase::Counting, "count")?;
    state.add_counts(transactions);
    Ok(())
}

/// Finalize counting and determine frequent items
pub fn finalize_counts(state: &mut StreamingState, min_support: MinSupport) -> Result<()> {
    state.finalize_counts(min_support)?;
    state.init_tree()?;
    Ok(())
}

/// Process building pass: replay a chunk, filtered and ordered by the finalized ranks
pub fn build_pass(state: &mut StreamingState, transactions: &[Vec<u32>]) -> Result<()> {
    state.expect_phase(ProcessingPhase::Building, "build")?;

    let mut ranked: Vec<(u32, u32)> = Vec::new();
    let mut sorted_items: Vec<u32> = Vec::new();
    for transaction in transactions {
        ranked.clear();
        ranked.extend(
            transaction
                .iter()
                .filter_map(|&item| state.get_item_rank(item).map(|rank| (item, rank))),
        );
        if ranked.is_empty() {
            continue;
        }

        ranked.sort_unstable_by_key(|&(_, rank)| rank);
        ranked.dedup();
        sorted_items.clear();
        sorted_items.extend(ranked.iter().map(|&(item, _)| item));

        let fp_tree = state.fp_tree.as_mut().ok_or(MineError::Phase {
            operation: "build",
            expected: "Building",
            found: "Uninitialized",
        })?;
        fp_tree.insert_transaction(&sorted_items, 1);
    }

    Ok(())
}

/// Finalize building phase
pub fn finalize_building(state: &mut StreamingState) -> Result<()> {
    state.finalize_building()
}

/// Mine itemsets from the streamed tree
pub fn mine_patterns<K: CandidateKernel>(
    state: &StreamingState,
    miner: &Miner<K>,
) -> Result<MiningResult> {
    state.expect_phase(ProcessingPhase::ReadyToMine, "mine")?;

    let fp_tree = state.fp_tree.as_ref().ok_or(MineError::Phase {
        operation: "mine",
        expected: "ReadyToMine",
        found: "Uninitialized",
    })?;
    let min_support = state.min_support.unwrap_or(1);

    miner.mine_tree(
        fp_tree,
        state.frequent_items.clone(),
        min_support,
        state.max_item.saturating_add(1),
    )
}
