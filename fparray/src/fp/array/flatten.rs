use super::types::{ElePos, FpArray, FpArrayEntry};
use crate::fp::tree::{FPNode, FPTree, NodeId};
use tracing::{debug, error};

/// Array and depth-1 seeds owned by one worker group.
#[derive(Debug, Clone, Default)]
pub struct GroupArrays {
    pub array: FpArray,
    pub seeds: Vec<ElePos>,
}

#[derive(Debug, Clone)]
pub struct FlattenedTree {
    pub groups: Vec<GroupArrays>,
    /// Every `(group, position)` a tree node occupies, indexed by node id.
    pub placements: Vec<Vec<(usize, u32)>>,
}

fn entry_for(node: &FPNode) -> FpArrayEntry {
    FpArrayEntry::new(node.item, node.count, node.depth)
}

/// Serializes the tree into `groups` arrays by walking each leaf to the root.
///
/// Leaves are dealt round-robin to groups. Within a group a node is emitted
/// once; later paths through it link to the recorded position. Seeds cover
/// each non-root node exactly once, in one of the groups that holds it.
pub fn flatten(tree: &FPTree, groups: usize) -> FlattenedTree {
    let groups = groups.max(1);
    let mut arrays = vec![FpArray::default(); groups];
    let mut position_tables: Vec<Vec<Option<u32>>> = vec![vec![None; tree.len()]; groups];
    let mut placements: Vec<Vec<(usize, u32)>> = vec![Vec::new(); tree.len()];

    for (leaf_index, leaf) in tree.leaves().enumerate() {
        let group = leaf_index % groups;
        let array = &mut arrays[group];
        let table = &mut position_tables[group];

        let mut current: NodeId = leaf;
        let mut current_pos = array.push(entry_for(tree.node(leaf)));
        table[leaf] = Some(current_pos);
        placements[leaf].push((group, current_pos));

        while let Some(parent) = tree.node(current).parent {
            if let Some(parent_pos) = table[parent] {
                array.set_parent(current_pos, parent_pos);
                break;
            }

            let parent_pos = array.push(entry_for(tree.node(parent)));
            table[parent] = Some(parent_pos);
            placements[parent].push((group, parent_pos));
            array.set_parent(current_pos, parent_pos);

            current = parent;
            current_pos = parent_pos;
        }
    }

    let mut seeds: Vec<Vec<ElePos>> = vec![Vec::new(); groups];
    let mut dealt = 0usize;
    for (id, node) in tree.nodes.iter().enumerate() {
        if node.is_root() {
            continue;
        }
        let places = &placements[id];
        if places.is_empty() {
            error!(node = id, item = node.item, "tree node missing from every array, skipping");
            continue;
        }
        let (group, pos) = places[dealt % places.len()];
        dealt += 1;
        seeds[group].push(ElePos::new(node.item, pos, node.count));
    }

    let groups: Vec<GroupArrays> = arrays
        .into_iter()
        .zip(seeds)
        .map(|(array, seeds)| GroupArrays { array, seeds })
        .collect();

    for (group, arrays) in groups.iter().enumerate() {
        debug!(
            group,
            entries = arrays.array.len(),
            seeds = arrays.seeds.len(),
            "flattened group array"
        );
    }

    FlattenedTree { groups, placements }
}
