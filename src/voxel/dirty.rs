//! Dirty chunk tracking for meshing after edits.

use std::collections::{HashMap, HashSet};

use crate::voxel::chunk::ChunkIndex;

/// Tracks which chunks need their mesh rebuilt.
///
/// Every time a chunk is marked its generation counter advances, so a
/// consumer holding a mesh built at generation `g` can tell it is stale.
#[derive(Debug, Default)]
pub struct DirtyTracker {
    /// Chunks needing a rebuild
    dirty: HashSet<ChunkIndex>,
    /// Generation counters for cache invalidation
    generations: HashMap<ChunkIndex, u32>,
}

impl DirtyTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a chunk dirty and increment its generation.
    pub fn mark(&mut self, index: ChunkIndex) {
        self.dirty.insert(index);
        let generation = self.generations.entry(index).or_insert(0);
        *generation = generation.wrapping_add(1);
    }

    /// Mark every chunk in `indices` dirty.
    pub fn mark_all<I: IntoIterator<Item = ChunkIndex>>(&mut self, indices: I) {
        for index in indices {
            self.mark(index);
        }
    }

    /// Take all dirty chunks in sorted order and clear the set.
    pub fn take(&mut self) -> Vec<ChunkIndex> {
        let mut indices: Vec<ChunkIndex> = self.dirty.drain().collect();
        indices.sort_unstable();
        indices
    }

    /// Drop a chunk that left the grid.
    pub fn forget(&mut self, index: ChunkIndex) {
        self.dirty.remove(&index);
        self.generations.remove(&index);
    }

    /// Current generation counter for a chunk (0 if never marked).
    pub fn generation(&self, index: ChunkIndex) -> u32 {
        self.generations.get(&index).copied().unwrap_or(0)
    }

    pub fn is_dirty(&self, index: ChunkIndex) -> bool {
        self.dirty.contains(&index)
    }

    pub fn has_dirty(&self) -> bool {
        !self.dirty.is_empty()
    }

    pub fn dirty_count(&self) -> usize {
        self.dirty.len()
    }

    /// Clear all dirty state and reset generation counters.
    pub fn clear(&mut self) {
        self.dirty.clear();
        self.generations.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new() {
        let tracker = DirtyTracker::new();
        assert!(!tracker.has_dirty());
        assert_eq!(tracker.dirty_count(), 0);
    }

    #[test]
    fn test_mark_multiple_times() {
        let mut tracker = DirtyTracker::new();
        let index = ChunkIndex::new(1, 2, 3);

        tracker.mark(index);
        assert!(tracker.is_dirty(index));
        assert_eq!(tracker.generation(index), 1);

        tracker.mark(index);
        tracker.mark(index);
        assert_eq!(tracker.generation(index), 3);
        assert_eq!(tracker.dirty_count(), 1);
    }

    #[test]
    fn test_take_is_sorted_and_clears() {
        let mut tracker = DirtyTracker::new();
        tracker.mark_all([ChunkIndex::new(1, 0, 0), ChunkIndex::new(-1, 0, 0), ChunkIndex::new(0, 5, 0)]);

        let dirty = tracker.take();
        assert_eq!(
            dirty,
            vec![ChunkIndex::new(-1, 0, 0), ChunkIndex::new(0, 5, 0), ChunkIndex::new(1, 0, 0)]
        );
        assert!(!tracker.has_dirty());
        // Generations survive a take
        assert_eq!(tracker.generation(ChunkIndex::new(1, 0, 0)), 1);
    }

    #[test]
    fn test_forget_and_clear() {
        let mut tracker = DirtyTracker::new();
        let a = ChunkIndex::new(0, 0, 0);
        let b = ChunkIndex::new(0, 0, 1);
        tracker.mark(a);
        tracker.mark(b);

        tracker.forget(a);
        assert!(!tracker.is_dirty(a));
        assert_eq!(tracker.generation(a), 0);

        tracker.clear();
        assert!(!tracker.has_dirty());
        assert_eq!(tracker.generation(b), 0);
    }
}
