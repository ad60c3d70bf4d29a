//! The segment registry.
//!
//! Holds the live set and the tombstone log behind one lock. Registration
//! checks for overlap and inserts in the same critical section, so two
//! overlapping regions can never both be accepted, and an access check never
//! observes a half-applied registration.

use crate::core::canary;
use crate::core::segment::{Origin, Segment};
use crate::core::store::SegmentStore;
use crate::debug::capture_backtrace;
use crate::diagnostics::{emit_with_context, SC101};
use crate::sync::mutex::Mutex;

use super::config::RegistryConfig;
use super::error::{AccessViolation, SegmentError};
use super::history::ViolationHistory;
use super::retention::TombstoneLog;
use super::stats::{RegistryStats, StatsCounters};

struct RegistryState {
    live: SegmentStore,
    tombstones: TombstoneLog,
}

/// Registry of memory segments that are safe to access.
///
/// # Example
///
/// ```rust
/// use segcheck::{Origin, RegistryConfig, SegmentRegistry};
///
/// let registry = SegmentRegistry::new(RegistryConfig::default());
/// let mut block = vec![0u8; segcheck::alloc_size_for(32)];
/// let alloc = block.as_mut_ptr() as usize;
/// let live = segcheck::live_address(alloc);
///
/// unsafe {
///     registry.register(alloc, block.len(), live, 32, Origin::caller()).unwrap();
/// }
/// assert!(registry.check_access(live, 32).is_ok());
/// assert!(registry.check_access(live, 33).is_err());
/// unsafe { registry.release(alloc, Origin::caller()).unwrap() };
/// ```
pub struct SegmentRegistry {
    state: Mutex<RegistryState>,
    config: RegistryConfig,
    stats: StatsCounters,
    history: ViolationHistory,
}

impl SegmentRegistry {
    /// Create an empty registry.
    pub fn new(config: RegistryConfig) -> Self {
        Self {
            state: Mutex::new(RegistryState {
                live: SegmentStore::with_capacity(config.initial_capacity),
                tombstones: TombstoneLog::new(config.tombstone_retention, config.initial_capacity),
            }),
            stats: StatsCounters::default(),
            history: ViolationHistory::new(config.violation_history),
            config,
        }
    }

    /// Create a registry with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(RegistryConfig::default())
    }

    /// The process-wide registry.
    pub fn global() -> &'static SegmentRegistry {
        crate::core::global::global()
    }

    /// Get the configuration.
    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Register `[alloc_address, alloc_address + alloc_size)` with the live
    /// sub-range `[live_address, live_address + live_size)`.
    ///
    /// With canaries enabled the bytes between the two ranges are filled with
    /// the padding pattern.
    ///
    /// # Safety
    ///
    /// With canaries enabled, both padding ranges must be valid for writes and
    /// must stay readable until [`release`](Self::release).
    pub unsafe fn register(
        &self,
        alloc_address: usize,
        alloc_size: usize,
        live_address: usize,
        live_size: usize,
        origin: Origin,
    ) -> Result<(), SegmentError> {
        let mut segment = Segment::new(alloc_address, alloc_size, live_address, live_size, origin);
        if !segment.is_well_formed() {
            return Err(self.fail(SegmentError::InvalidLayout {
                alloc_address,
                alloc_size,
                live_address,
                live_size,
            }));
        }
        if self.config.capture_backtraces {
            segment.backtrace = capture_backtrace();
        }

        let mut state = self.state.lock();
        if let Some(existing) = state.live.find_overlap(&segment).cloned() {
            drop(state);
            return Err(self.fail(SegmentError::Overlap { segment, existing }));
        }
        if self.config.canaries {
            // SAFETY: caller guarantees the padding is writable
            unsafe { canary::install(&segment) };
        }

        #[cfg(feature = "log")]
        log::debug!("[segcheck] register {}", segment);

        state.live.insert(segment);
        self.stats.record_register(alloc_size);
        drop(state);
        Ok(())
    }

    /// Register a region whose live range is the whole allocation.
    ///
    /// # Safety
    ///
    /// Same contract as [`register`](Self::register); with no padding nothing
    /// is written.
    pub unsafe fn register_range(
        &self,
        address: usize,
        size: usize,
        origin: Origin,
    ) -> Result<(), SegmentError> {
        unsafe { self.register(address, size, address, size, origin) }
    }

    /// Release the live segment that starts exactly at `address`.
    ///
    /// The segment leaves the live set and becomes a tombstone even when its
    /// padding turns out to be corrupted.
    ///
    /// # Safety
    ///
    /// With canaries enabled, the segment's padding must still be readable.
    pub unsafe fn release(&self, address: usize, origin: Origin) -> Result<(), SegmentError> {
        let mut state = self.state.lock();

        let Some(index) = state.live.nearest_lesser(address) else {
            drop(state);
            return Err(self.fail(SegmentError::NotFound { address }));
        };
        if state.live.as_slice()[index].alloc_address != address {
            let nearest = state.live.as_slice()[index].clone();
            drop(state);
            return Err(self.fail(SegmentError::Integrity { address, nearest }));
        }

        let segment = state.live.remove(index);
        let mismatch = if self.config.canaries {
            // SAFETY: caller guarantees the padding is readable
            unsafe { canary::validate(&segment) }.err()
        } else {
            None
        };

        #[cfg(feature = "log")]
        log::debug!("[segcheck] release {} at {}", segment, origin);

        let alloc_size = segment.alloc_size;
        let corrupted = mismatch.map(|m| (m, segment.clone()));
        let (tombstone_seq, evicted) = state.tombstones.bury(segment, origin);
        self.stats.record_release(alloc_size);
        drop(state);

        self.report_evictions(&evicted);

        match corrupted {
            None => Ok(()),
            Some((m, segment)) => {
                self.stats.corruptions.increment();
                Err(self.fail(SegmentError::Corruption {
                    segment: segment.into_tombstone(origin, tombstone_seq),
                    address: m.address,
                    expected: m.expected,
                    found: m.found,
                }))
            }
        }
    }

    /// Check that `[address, address + size)` lies entirely inside the live
    /// range of one live segment.
    pub fn check_access(&self, address: usize, size: usize) -> Result<(), SegmentError> {
        self.stats.checks.increment();

        let violation = {
            let state = self.state.lock();
            let nearest = state.live.nearest_lesser_segment(address);
            if nearest.map_or(false, |s| s.contains_live(address, size)) {
                return Ok(());
            }
            AccessViolation {
                address,
                size,
                nearest_live: nearest.cloned(),
                nearest_tombstone: state.tombstones.store().nearest_lesser_segment(address).cloned(),
            }
        };

        self.stats.violations.increment();
        self.history.record(violation.clone());
        Err(self.fail(SegmentError::AccessViolation(violation)))
    }

    /// Whether a live segment starts exactly at `address`.
    pub fn is_live(&self, address: usize) -> bool {
        self.state
            .lock()
            .live
            .nearest_lesser_segment(address)
            .map_or(false, |s| s.alloc_address == address)
    }

    /// Nearest live segment at or below `address`.
    pub fn nearest_live(&self, address: usize) -> Option<Segment> {
        self.state.lock().live.nearest_lesser_segment(address).cloned()
    }

    /// Nearest tombstone at or below `address`.
    pub fn nearest_tombstone(&self, address: usize) -> Option<Segment> {
        self.state
            .lock()
            .tombstones
            .store()
            .nearest_lesser_segment(address)
            .cloned()
    }

    /// Live segments in address order.
    pub fn live_segments(&self) -> Vec<Segment> {
        self.state.lock().live.as_slice().to_vec()
    }

    /// Tombstones in address order.
    pub fn tombstones(&self) -> Vec<Segment> {
        self.state.lock().tombstones.store().as_slice().to_vec()
    }

    /// Drop every tombstone.
    pub fn clear_tombstones(&self) {
        self.state.lock().tombstones.clear();
    }

    /// Current statistics.
    pub fn stats(&self) -> RegistryStats {
        let (live, tombs) = {
            let state = self.state.lock();
            (state.live.len(), state.tombstones.store().len())
        };
        self.stats.snapshot(live, tombs)
    }

    /// The most recent access violations, oldest first.
    pub fn recent_violations(&self) -> Vec<AccessViolation> {
        self.history.snapshot()
    }

    /// Remove and return the recorded access violations.
    pub fn take_violations(&self) -> Vec<AccessViolation> {
        self.history.drain()
    }

    fn report_evictions(&self, evicted: &[Segment]) {
        if evicted.is_empty() {
            return;
        }
        self.stats.tombstones_evicted.add(evicted.len() as u64);
        for tomb in evicted {
            emit_with_context(&SC101, &tomb.to_string());
        }
    }

    /// Emit the error's diagnostic and hand the error back.
    fn fail(&self, err: SegmentError) -> SegmentError {
        let mut context = err.to_string();
        let registered_at = match &err {
            SegmentError::Overlap { existing, .. } => existing.backtrace.as_deref(),
            SegmentError::Integrity { nearest, .. } => nearest.backtrace.as_deref(),
            SegmentError::Corruption { segment, .. } => segment.backtrace.as_deref(),
            _ => None,
        };
        if let Some(bt) = registered_at {
            context.push_str("\n  registered at:\n");
            context.push_str(bt);
        }
        emit_with_context(err.diagnostic(), &context);
        err
    }
}

impl Default for SegmentRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl std::fmt::Debug for SegmentRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SegmentRegistry")
            .field("config", &self.config)
            .field("stats", &self.stats())
            .finish()
    }
}
