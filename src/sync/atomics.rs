//! Atomic helpers for registry statistics.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

/// An atomic event counter.
pub struct AtomicCounter(AtomicU64);

impl AtomicCounter {
    /// Create a new counter.
    pub const fn new(initial: u64) -> Self {
        Self(AtomicU64::new(initial))
    }

    /// Increment the counter.
    pub fn increment(&self) {
        self.0.fetch_add(1, Ordering::Relaxed);
    }

    /// Add a value to the counter.
    pub fn add(&self, value: u64) {
        self.0.fetch_add(value, Ordering::Relaxed);
    }

    /// Get the current value.
    pub fn get(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }
}

impl Default for AtomicCounter {
    fn default() -> Self {
        Self::new(0)
    }
}

/// An atomic gauge for tracking current values (can go up or down).
pub struct AtomicGauge(AtomicUsize);

impl AtomicGauge {
    /// Create a new gauge.
    pub const fn new(initial: usize) -> Self {
        Self(AtomicUsize::new(initial))
    }

    /// Add to the gauge, returning the new value.
    pub fn add(&self, value: usize) -> usize {
        self.0.fetch_add(value, Ordering::Relaxed) + value
    }

    /// Subtract from the gauge, saturating at zero, returning the new value.
    pub fn sub(&self, value: usize) -> usize {
        let prev = self
            .0
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |v| Some(v.saturating_sub(value)))
            .unwrap_or_else(|v| v);
        prev.saturating_sub(value)
    }

    /// Get the current value.
    pub fn get(&self) -> usize {
        self.0.load(Ordering::Relaxed)
    }

    /// Update the maximum (for high-water marks).
    pub fn update_max(&self, value: usize) {
        let mut current = self.0.load(Ordering::Relaxed);
        while value > current {
            match self.0.compare_exchange_weak(
                current,
                value,
                Ordering::Relaxed,
                Ordering::Relaxed,
            ) {
                Ok(_) => break,
                Err(c) => current = c,
            }
        }
    }
}

impl Default for AtomicGauge {
    fn default() -> Self {
        Self::new(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counter() {
        let c = AtomicCounter::default();
        c.increment();
        c.add(4);
        assert_eq!(c.get(), 5);
    }

    #[test]
    fn test_gauge_high_water_mark() {
        let live = AtomicGauge::default();
        let peak = AtomicGauge::default();

        peak.update_max(live.add(100));
        peak.update_max(live.add(50));
        live.sub(120);
        peak.update_max(live.get());

        assert_eq!(live.get(), 30);
        assert_eq!(peak.get(), 150);
    }

    #[test]
    fn test_gauge_sub_saturates() {
        let live = AtomicGauge::new(16);
        assert_eq!(live.sub(64), 0);
        assert_eq!(live.get(), 0);
        assert_eq!(live.add(8), 8);
    }
}
