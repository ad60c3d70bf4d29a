//! Ordered segment store.
//!
//! A `Vec<Segment>` kept sorted by `alloc_address`. Every lookup goes through
//! two binary searches: nearest-lesser (rightmost entry at or below an
//! address) and nearest-higher (leftmost entry at or above it).

use super::segment::Segment;

/// Segments sorted ascending by `alloc_address`.
///
/// Equal keys are allowed (tombstones of a reused address); they keep
/// insertion order, so nearest-lesser returns the most recently inserted one.
#[derive(Debug, Default)]
pub struct SegmentStore {
    segments: Vec<Segment>,
}

impl SegmentStore {
    /// Create a store with room for `capacity` segments.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            segments: Vec::with_capacity(capacity),
        }
    }

    /// Number of segments.
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Segments in address order.
    pub fn as_slice(&self) -> &[Segment] {
        &self.segments
    }

    /// Segment at `index`.
    pub fn get(&self, index: usize) -> Option<&Segment> {
        self.segments.get(index)
    }

    /// Index of the rightmost segment whose `alloc_address <= address`.
    pub fn nearest_lesser(&self, address: usize) -> Option<usize> {
        self.segments
            .partition_point(|s| s.alloc_address <= address)
            .checked_sub(1)
    }

    /// Index of the leftmost segment whose `alloc_address >= address`.
    ///
    /// Returns `len()` when every segment starts below `address`.
    pub fn nearest_higher(&self, address: usize) -> usize {
        self.segments.partition_point(|s| s.alloc_address < address)
    }

    /// The segment returned by [`nearest_lesser`](Self::nearest_lesser).
    pub fn nearest_lesser_segment(&self, address: usize) -> Option<&Segment> {
        self.nearest_lesser(address).map(|i| &self.segments[i])
    }

    /// First segment whose reserved range intersects `candidate`'s.
    ///
    /// Only the window between the nearest-lesser entry of the candidate's
    /// start and the nearest-higher entry of its end can intersect it.
    pub fn find_overlap(&self, candidate: &Segment) -> Option<&Segment> {
        let start = self.nearest_lesser(candidate.alloc_address).unwrap_or(0);
        let end = self.nearest_higher(candidate.alloc_end());
        self.segments
            .get(start..end)
            .unwrap_or(&[])
            .iter()
            .find(|s| s.overlaps(candidate))
    }

    /// Insert keeping address order, after any entries with the same key.
    pub fn insert(&mut self, segment: Segment) -> usize {
        let index = self
            .segments
            .partition_point(|s| s.alloc_address <= segment.alloc_address);
        self.segments.insert(index, segment);
        index
    }

    /// Remove and return the segment at `index`.
    pub fn remove(&mut self, index: usize) -> Segment {
        self.segments.remove(index)
    }

    /// Remove the tombstone at `address` carrying `release_seq`.
    pub fn remove_release(&mut self, address: usize, release_seq: u64) -> Option<Segment> {
        let start = self.nearest_higher(address);
        let offset = self.segments[start..]
            .iter()
            .take_while(|s| s.alloc_address == address)
            .position(|s| s.release_seq == release_seq)?;
        Some(self.segments.remove(start + offset))
    }

    /// Drop every segment.
    pub fn clear(&mut self) {
        self.segments.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::segment::Origin;

    fn seg(address: usize, size: usize) -> Segment {
        Segment::whole(address, size, Origin::unknown())
    }

    fn store(ranges: &[(usize, usize)]) -> SegmentStore {
        let mut store = SegmentStore::default();
        for &(a, s) in ranges {
            store.insert(seg(a, s));
        }
        store
    }

    #[test]
    fn test_insert_keeps_order() {
        let store = store(&[(0x300, 0x10), (0x100, 0x10), (0x200, 0x10)]);
        let addrs: Vec<_> = store.as_slice().iter().map(|s| s.alloc_address).collect();
        assert_eq!(addrs, vec![0x100, 0x200, 0x300]);
    }

    #[test]
    fn test_nearest_lesser() {
        let store = store(&[(0x100, 0x10), (0x200, 0x10)]);
        assert_eq!(store.nearest_lesser(0xff), None);
        assert_eq!(store.nearest_lesser(0x100), Some(0));
        assert_eq!(store.nearest_lesser(0x1ff), Some(0));
        assert_eq!(store.nearest_lesser(0x200), Some(1));
        assert_eq!(store.nearest_lesser(usize::MAX), Some(1));
        assert_eq!(SegmentStore::default().nearest_lesser(0x100), None);
    }

    #[test]
    fn test_nearest_higher() {
        let store = store(&[(0x100, 0x10), (0x200, 0x10)]);
        assert_eq!(store.nearest_higher(0), 0);
        assert_eq!(store.nearest_higher(0x100), 0);
        assert_eq!(store.nearest_higher(0x101), 1);
        assert_eq!(store.nearest_higher(0x201), 2);
    }

    #[test]
    fn test_find_overlap_window() {
        let store = store(&[(0x100, 0x100), (0x300, 0x100), (0x500, 0x100)]);

        assert!(store.find_overlap(&seg(0x200, 0x100)).is_none());
        assert!(store.find_overlap(&seg(0x0, 0x100)).is_none());
        assert!(store.find_overlap(&seg(0x600, 0x10)).is_none());

        let hit = store.find_overlap(&seg(0x3ff, 0x2)).map(|s| s.alloc_address);
        assert_eq!(hit, Some(0x300));

        let spanning = store.find_overlap(&seg(0x250, 0x400)).map(|s| s.alloc_address);
        assert_eq!(spanning, Some(0x300));

        let below_all = store.find_overlap(&seg(0x50, 0xb1)).map(|s| s.alloc_address);
        assert_eq!(below_all, Some(0x100));
    }

    #[test]
    fn test_duplicate_keys_latest_wins() {
        let mut store = SegmentStore::default();
        let mut first = seg(0x100, 0x10);
        first.release_seq = 1;
        let mut second = seg(0x100, 0x20);
        second.release_seq = 2;
        store.insert(first);
        store.insert(second);

        assert_eq!(store.nearest_lesser_segment(0x100).map(|s| s.release_seq), Some(2));

        let removed = store.remove_release(0x100, 1).map(|s| s.alloc_size);
        assert_eq!(removed, Some(0x10));
        assert_eq!(store.len(), 1);
        assert!(store.remove_release(0x100, 7).is_none());
        assert!(store.remove_release(0x999, 2).is_none());
    }
}
