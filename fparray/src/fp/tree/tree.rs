use rustc_hash::FxHashMap;

/// Item id carried by the root node. Never a real item.
pub const ROOT_ITEM: u32 = 0;

pub type NodeId = usize;

#[derive(Debug, Clone)]
pub struct FPNode {
    pub item: u32,
    pub count: u32,
    pub depth: u32,
    pub parent: Option<NodeId>,
    pub children: FxHashMap<u32, NodeId>,
    // Leaf list links, only meaningful while `in_leaf_list` is set.
    pub(crate) next_leaf: Option<NodeId>,
    pub(crate) prev_leaf: Option<NodeId>,
    pub(crate) in_leaf_list: bool,
}

/// Prefix tree stored as an arena. Parent, child and leaf links are arena indices.
#[derive(Debug, Clone)]
pub struct FPTree {
    pub nodes: Vec<FPNode>,
    pub header_table: FxHashMap<u32, Vec<NodeId>>,
    pub root_index: NodeId,
    pub(crate) leaf_head: Option<NodeId>,
    /// When set, items missing from the header table are rejected during insertion.
    pub(crate) strict_header: bool,
}

impl FPNode {
    pub fn new_root() -> Self {
        Self {
            item: ROOT_ITEM,
            count: 0,
            depth: 0,
            parent: None,
            children: FxHashMap::default(),
            next_leaf: None,
            prev_leaf: None,
            in_leaf_list: false,
        }
    }

    pub fn new_item(item: u32, count: u32, parent: NodeId, depth: u32) -> Self {
        Self {
            item,
            count,
            depth,
            parent: Some(parent),
            children: FxHashMap::default(),
            next_leaf: None,
            prev_leaf: None,
            in_leaf_list: false,
        }
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}

impl Default for FPTree {
    fn default() -> Self {
        Self::new()
    }
}

impl FPTree {
    /// An empty tree that accepts any item.
    pub fn new() -> Self {
        Self {
            nodes: vec![FPNode::new_root()],
            header_table: FxHashMap::default(),
            root_index: 0,
            leaf_head: None,
            strict_header: false,
        }
    }

    /// An empty tree whose header table is fixed to the given frequent items.
    pub fn with_items(frequent_items: &[(u32, u32)]) -> Self {
        let mut tree = Self::new();
        tree.header_table = frequent_items
            .iter()
            .map(|&(item, _)| (item, Vec::new()))
            .collect();
        tree.strict_header = true;
        tree
    }

    /// Number of nodes including the root.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    pub fn node(&self, id: NodeId) -> &FPNode {
        &self.nodes[id]
    }

    pub fn header(&self, item: u32) -> &[NodeId] {
        self.header_table.get(&item).map_or(&[], |nodes| nodes.as_slice())
    }

    pub fn item_support(&self, item: u32) -> u32 {
        self.header(item).iter().map(|&id| self.nodes[id].count).sum()
    }
}
