use super::tree::{FPNode, FPTree, NodeId};
use tracing::error;

impl FPTree {
    /// Inserts one support-ordered transaction with weight `count`.
    ///
    /// New nodes enter the leaf list at its head; a node leaves the list as
    /// soon as it gains its first child.
    pub fn insert_transaction(&mut self, transaction: &[u32], count: u32) {
        if transaction.is_empty() {
            return;
        }
        self.nodes[self.root_index].count += count;
        let mut current_index = self.root_index;

        for &item in transaction {
            if let Some(&child_index) = self.nodes[current_index].children.get(&item) {
                self.nodes[child_index].count += count;
                current_index = child_index;
                continue;
            }

            if self.strict_header && !self.header_table.contains_key(&item) {
                error!(item, "item missing from header table, dropping branch");
                return;
            }

            let depth = self.nodes[current_index].depth + 1;
            let new_index = self.nodes.len();
            self.nodes
                .push(FPNode::new_item(item, count, current_index, depth));

            self.unlink_leaf(current_index);
            self.nodes[current_index].children.insert(item, new_index);
            self.push_leaf(new_index);

            self.header_table.entry(item).or_default().push(new_index);
            current_index = new_index;
        }
    }

    fn push_leaf(&mut self, id: NodeId) {
        let old_head = self.leaf_head;
        if let Some(head) = old_head {
            self.nodes[head].prev_leaf = Some(id);
        }
        let node = &mut self.nodes[id];
        node.next_leaf = old_head;
        node.prev_leaf = None;
        node.in_leaf_list = true;
        self.leaf_head = Some(id);
    }

    fn unlink_leaf(&mut self, id: NodeId) {
        if !self.nodes[id].in_leaf_list {
            return;
        }
        let (prev, next) = (self.nodes[id].prev_leaf, self.nodes[id].next_leaf);

        match prev {
            Some(prev) => self.nodes[prev].next_leaf = next,
            None => self.leaf_head = next,
        }
        if let Some(next) = next {
            self.nodes[next].prev_leaf = prev;
        }

        let node = &mut self.nodes[id];
        node.next_leaf = None;
        node.prev_leaf = None;
        node.in_leaf_list = false;
    }

    /// Current leaves, most recently created first.
    pub fn leaves(&self) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.leaf_head, move |&id| self.nodes[id].next_leaf)
    }

    /// Items on the path from `id` up to (excluding) the root, nearest first.
    pub fn path_to_root(&self, id: NodeId) -> Vec<u32> {
        let mut path = Vec::with_capacity(self.nodes[id].depth as usize);
        let mut current = Some(id);
        while let Some(index) = current {
            let node = &self.nodes[index];
            if node.is_root() {
                break;
            }
            path.push(node.item);
            current = node.parent;
        }
        path
    }
}
