//! Per-particle weight/gradient storage.
//!
//! Each particle owns a fixed-length slot of (node, weight, gradient) tuples
//! sized once from the kernel support radius, so the transfer loop never
//! allocates. Only the first `pair_count` entries of a slot are valid; the
//! rest is scratch space that is overwritten on the next refill.

use bevy::prelude::IVec2;

use crate::math::{DIM, Real, Vector, zero_vector};

/// One cached particle-node interaction.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NodeWeightGradient {
    pub node: IVec2,
    pub weight: Real,
    pub gradient: Vector,
}

impl Default for NodeWeightGradient {
    fn default() -> Self {
        Self {
            node: IVec2::ZERO,
            weight: 0.0,
            gradient: zero_vector(),
        }
    }
}

/// Maximum number of nodes a kernel of the given support radius can reach
/// around one particle: `(2r + 1)^dim`.
#[inline]
pub fn capacity_for(support_radius: u32, dim: u32) -> usize {
    (2 * support_radius as usize + 1).pow(dim)
}

pub struct TransferCache {
    slots: Vec<Vec<NodeWeightGradient>>,
    pair_counts: Vec<usize>,
    capacity: usize,
}

impl TransferCache {
    pub fn new(support_radius: u32) -> Self {
        Self {
            slots: Vec::new(),
            pair_counts: Vec::new(),
            capacity: capacity_for(support_radius, DIM as u32),
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Slot length shared by every particle.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Replace every slot with freshly sized, zero-populated storage, with the
    /// capacity recomputed from the kernel's current support radius. Used after
    /// bulk particle replacement or a kernel change.
    pub fn allocate_all(&mut self, particle_count: usize, support_radius: u32) {
        self.capacity = capacity_for(support_radius, DIM as u32);
        self.slots.clear();
        self.slots
            .resize(particle_count, vec![NodeWeightGradient::default(); self.capacity]);
        self.pair_counts.clear();
        self.pair_counts.resize(particle_count, 0);
    }

    /// Append one zero-populated slot at the current capacity. Existing slots
    /// keep their contents and indices.
    pub fn append_one(&mut self) {
        self.slots
            .push(vec![NodeWeightGradient::default(); self.capacity]);
        self.pair_counts.push(0);
    }

    /// Remove the slot and count at `idx`, shifting later slots down by one.
    /// Callers validate the index.
    pub fn erase_at(&mut self, idx: usize) {
        debug_assert!(idx < self.slots.len());
        self.slots.remove(idx);
        self.pair_counts.remove(idx);
    }

    /// Reset a slot's occupancy ahead of a refill. Stale entries are left in
    /// place and never read.
    #[inline]
    pub fn begin_refill(&mut self, idx: usize) {
        self.pair_counts[idx] = 0;
    }

    /// Write the next valid entry of a slot.
    #[inline]
    pub fn push_pair(&mut self, idx: usize, pair: NodeWeightGradient) {
        let count = self.pair_counts[idx];
        debug_assert!(count < self.capacity, "cache slot overflow");
        self.slots[idx][count] = pair;
        self.pair_counts[idx] = count + 1;
    }

    /// Valid prefix of a particle's slot.
    #[inline]
    pub fn pairs(&self, idx: usize) -> &[NodeWeightGradient] {
        &self.slots[idx][..self.pair_counts[idx]]
    }

    #[inline]
    pub fn pair_count(&self, idx: usize) -> usize {
        self.pair_counts[idx]
    }

    /// Full slot length including scratch entries.
    #[inline]
    pub fn slot_len(&self, idx: usize) -> usize {
        self.slots[idx].len()
    }
}
