use crate::fp::tree::ROOT_ITEM;

/// Parent position of the root entry.
pub const NO_PARENT: u32 = u32::MAX;

/// One tree node as seen from a single group's array.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FpArrayEntry {
    pub item: u32,
    pub parent_pos: u32,
    pub support: u32,
    pub depth: u32,
}

impl FpArrayEntry {
    pub fn new(item: u32, support: u32, depth: u32) -> Self {
        Self {
            item,
            parent_pos: NO_PARENT,
            support,
            depth,
        }
    }

    #[inline]
    pub fn parent(&self) -> Option<u32> {
        (self.parent_pos != NO_PARENT).then_some(self.parent_pos)
    }

    #[inline]
    pub fn is_root(&self) -> bool {
        self.item == ROOT_ITEM
    }
}

/// A mining seed: one occurrence of an itemset, anchored at an array position.
///
/// `item` is a base item for depth-1 seeds and a synthetic itemset id otherwise.
/// `offset` is where this seed's candidates start in its partition's buffer.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ElePos {
    pub item: u32,
    pub pos: u32,
    pub support: u32,
    pub offset: u32,
}

impl ElePos {
    pub fn new(item: u32, pos: u32, support: u32) -> Self {
        Self {
            item,
            pos,
            support,
            offset: 0,
        }
    }
}

/// A tentative `(prefix, suffix)` extension found above a seed.
/// Slots left at their default (suffix item 0) carry no candidate.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Candidate {
    pub prefix: u32,
    pub suffix: u32,
    pub suffix_pos: u32,
    pub support: u32,
}

impl Candidate {
    #[inline]
    pub fn key(&self) -> (u32, u32) {
        (self.prefix, self.suffix)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.suffix == ROOT_ITEM
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FpArray {
    entries: Vec<FpArrayEntry>,
}

impl FpArray {
    pub fn from_entries(entries: Vec<FpArrayEntry>) -> Self {
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[inline]
    pub fn get(&self, pos: u32) -> Option<FpArrayEntry> {
        self.entries.get(pos as usize).copied()
    }

    pub fn as_slice(&self) -> &[FpArrayEntry] {
        &self.entries
    }

    pub(crate) fn push(&mut self, entry: FpArrayEntry) -> u32 {
        let pos = self.entries.len() as u32;
        self.entries.push(entry);
        pos
    }

    pub(crate) fn set_parent(&mut self, pos: u32, parent_pos: u32) {
        self.entries[pos as usize].parent_pos = parent_pos;
    }
}
