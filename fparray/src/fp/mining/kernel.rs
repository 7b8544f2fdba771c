use super::cache::{ArrayReader, CachedArray};
use crate::error::{MineError, Result};
use crate::fp::array::{Candidate, ElePos, FpArray};
use crate::fp::tree::ROOT_ITEM;
use rayon::prelude::*;
use tracing::warn;

/// What a kernel sees of one group: its array and, if configured, the group's cache.
pub struct GroupView<'a> {
    pub group: usize,
    pub array: &'a FpArray,
    pub cache: Option<&'a CachedArray<'a>>,
}

/// Executes the candidate walk for a batch of seeds.
///
/// Implementations return one candidate buffer per worker partition. Empty
/// slots (suffix item 0) are ignored by the caller. An `Err` is treated as an
/// environment failure and aborts the whole mining run.
pub trait CandidateKernel: Sync {
    /// Largest seed batch the kernel accepts at once. Bigger lists are chunked.
    fn seed_capacity(&self) -> Option<usize> {
        None
    }

    fn mine(&self, view: &GroupView<'_>, seeds: &[ElePos]) -> Result<Vec<Vec<Candidate>>>;
}

/// Reference kernel: strided partitions over the current rayon pool.
#[derive(Debug, Clone)]
pub struct CpuKernel {
    workers: usize,
}

impl CpuKernel {
    pub fn new(workers: usize) -> Self {
        Self {
            workers: workers.max(1),
        }
    }

    pub fn workers(&self) -> usize {
        self.workers
    }
}

impl CandidateKernel for CpuKernel {
    fn mine(&self, view: &GroupView<'_>, seeds: &[ElePos]) -> Result<Vec<Vec<Candidate>>> {
        let workers = self.workers.min(seeds.len()).max(1);

        let buffers = (0..workers)
            .into_par_iter()
            .map(|worker| -> Result<Vec<Candidate>> {
                let mut partition: Vec<ElePos> =
                    seeds.iter().skip(worker).step_by(workers).copied().collect();
                let slots = assign_offsets(view.array, &mut partition)?;
                let mut buffer = vec![Candidate::default(); slots];
                match view.cache {
                    Some(cache) => mine_partition(cache, &partition, &mut buffer),
                    None => mine_partition(view.array, &partition, &mut buffer),
                }
                Ok(buffer)
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(buffers)
    }
}

/// Gives each seed its start slot and returns the buffer length for the partition.
///
/// A seed at depth `d` has `d - 1` non-root ancestors, one candidate each.
/// Offsets are 32-bit; a partition needing more slots is rejected.
pub fn assign_offsets(array: &FpArray, seeds: &mut [ElePos]) -> Result<usize> {
    let mut next = 0u32;
    let mut slots = 0usize;
    for seed in seeds.iter_mut() {
        seed.offset = next;
        if seed.item == ROOT_ITEM {
            continue;
        }
        if let Some(entry) = array.get(seed.pos) {
            let reserved = entry.depth.saturating_sub(1);
            slots = slots.saturating_add(reserved as usize);
            next = next
                .checked_add(reserved)
                .ok_or(MineError::BufferOverflow { slots })?;
        }
    }
    Ok(next as usize)
}

/// Walks from every seed towards the root, writing one candidate per ancestor
/// into the seed's reserved slots.
///
/// A seed never writes past the `depth - 1` slots reserved for it, so a
/// corrupt parent link truncates that seed's walk and nothing else.
pub fn mine_partition<R>(reader: &R, seeds: &[ElePos], out: &mut [Candidate])
where
    R: ArrayReader + ?Sized,
{
    for seed in seeds {
        if seed.item == ROOT_ITEM {
            continue;
        }
        let Some(entry) = reader.read(seed.pos) else {
            warn!(item = seed.item, pos = seed.pos, "seed position outside array, skipping");
            continue;
        };

        let start = seed.offset as usize;
        let end = start + entry.depth.saturating_sub(1) as usize;
        let mut slot = start;
        let mut suffix_pos = entry.parent_pos;

        while slot < end {
            let Some(ancestor) = reader.read(suffix_pos) else {
                break;
            };
            if ancestor.is_root() {
                break;
            }
            if let Some(dst) = out.get_mut(slot) {
                *dst = Candidate {
                    prefix: seed.item,
                    suffix: ancestor.item,
                    suffix_pos,
                    support: seed.support,
                };
            }
            slot += 1;
            suffix_pos = ancestor.parent_pos;
        }
    }
}
