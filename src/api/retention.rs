//! Tombstone retention.
//!
//! Released segments are kept only so access diagnostics can say "this
//! memory was released at ...". By default every tombstone is kept for the
//! life of the registry. Long-running processes can cap the log, in which case
//! the oldest release is evicted first.

use std::collections::VecDeque;

use crate::core::segment::{Origin, Segment};
use crate::core::store::SegmentStore;

/// How many tombstones the registry keeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TombstoneRetention {
    /// Keep every tombstone (full audit trail).
    #[default]
    Unbounded,
    /// Keep at most this many, evicting the oldest release first.
    Capped(usize),
}

impl TombstoneRetention {
    /// Policy from a numeric cap, where 0 means unbounded.
    pub fn from_cap(cap: usize) -> Self {
        if cap == 0 {
            Self::Unbounded
        } else {
            Self::Capped(cap)
        }
    }

    /// Maximum number of tombstones, if bounded.
    pub fn limit(&self) -> Option<usize> {
        match self {
            Self::Unbounded => None,
            Self::Capped(n) => Some(*n),
        }
    }
}

/// Address-ordered tombstones plus their release order.
#[derive(Debug)]
pub(crate) struct TombstoneLog {
    store: SegmentStore,
    /// `(alloc_address, release_seq)` oldest first; only kept when capped.
    order: VecDeque<(usize, u64)>,
    next_seq: u64,
    policy: TombstoneRetention,
}

impl TombstoneLog {
    pub fn new(policy: TombstoneRetention, capacity: usize) -> Self {
        Self {
            store: SegmentStore::with_capacity(capacity),
            order: VecDeque::new(),
            next_seq: 1,
            policy,
        }
    }

    pub fn store(&self) -> &SegmentStore {
        &self.store
    }

    /// Record a released segment.
    ///
    /// Returns the tombstone's release sequence number and whatever the
    /// policy evicted to make room for it.
    pub fn bury(&mut self, segment: Segment, release_origin: Origin) -> (u64, Vec<Segment>) {
        let seq = self.next_seq;
        self.next_seq += 1;

        let tomb = segment.into_tombstone(release_origin, seq);
        let address = tomb.alloc_address;
        self.store.insert(tomb);

        let Some(limit) = self.policy.limit() else {
            return (seq, Vec::new());
        };

        self.order.push_back((address, seq));
        let mut evicted = Vec::new();
        while self.order.len() > limit {
            if let Some((addr, old_seq)) = self.order.pop_front() {
                evicted.extend(self.store.remove_release(addr, old_seq));
            }
        }
        (seq, evicted)
    }

    pub fn clear(&mut self) {
        self.store.clear();
        self.order.clear();
    }
}
