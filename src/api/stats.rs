//! Registry statistics.

use crate::sync::atomics::{AtomicCounter, AtomicGauge};
use crate::util::size::format_bytes;

/// Point-in-time registry statistics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistryStats {
    /// Segments currently live.
    pub live_segments: usize,

    /// Tombstones currently retained.
    pub tombstones: usize,

    /// Reserved bytes across live segments (padding included).
    pub live_bytes: usize,

    /// High water mark of `live_bytes`.
    pub peak_live_bytes: usize,

    /// Successful registrations.
    pub registrations: u64,

    /// Releases that removed a live segment (corrupted ones included).
    pub releases: u64,

    /// Access checks performed.
    pub checks: u64,

    /// Access checks that failed.
    pub violations: u64,

    /// Releases that found corrupted padding.
    pub corruptions: u64,

    /// Tombstones dropped by the retention policy.
    pub tombstones_evicted: u64,
}

impl std::fmt::Display for RegistryStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Segment Registry Statistics:")?;
        writeln!(f, "  Live segments:   {}", self.live_segments)?;
        writeln!(f, "  Tombstones:      {}", self.tombstones)?;
        writeln!(f, "  Live bytes:      {}", format_bytes(self.live_bytes))?;
        writeln!(f, "  Peak live bytes: {}", format_bytes(self.peak_live_bytes))?;
        writeln!(f, "  Registrations:   {}", self.registrations)?;
        writeln!(f, "  Releases:        {}", self.releases)?;
        writeln!(f, "  Checks:          {}", self.checks)?;
        writeln!(f, "  Violations:      {}", self.violations)?;
        writeln!(f, "  Corruptions:     {}", self.corruptions)?;
        writeln!(f, "  Evicted:         {}", self.tombstones_evicted)?;
        Ok(())
    }
}

/// Live counters behind [`RegistryStats`].
#[derive(Default)]
pub(crate) struct StatsCounters {
    pub live_bytes: AtomicGauge,
    pub peak_live_bytes: AtomicGauge,
    pub registrations: AtomicCounter,
    pub releases: AtomicCounter,
    pub checks: AtomicCounter,
    pub violations: AtomicCounter,
    pub corruptions: AtomicCounter,
    pub tombstones_evicted: AtomicCounter,
}

impl StatsCounters {
    pub fn record_register(&self, bytes: usize) {
        self.registrations.increment();
        let live = self.live_bytes.add(bytes);
        self.peak_live_bytes.update_max(live);
    }

    pub fn record_release(&self, bytes: usize) {
        self.releases.increment();
        self.live_bytes.sub(bytes);
    }

    pub fn snapshot(&self, live_segments: usize, tombstones: usize) -> RegistryStats {
        RegistryStats {
            live_segments,
            tombstones,
            live_bytes: self.live_bytes.get(),
            peak_live_bytes: self.peak_live_bytes.get(),
            registrations: self.registrations.get(),
            releases: self.releases.get(),
            checks: self.checks.get(),
            violations: self.violations.get(),
            corruptions: self.corruptions.get(),
            tombstones_evicted: self.tombstones_evicted.get(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_snapshot() {
        let counters = StatsCounters::default();
        counters.record_register(160);
        counters.record_register(64);
        counters.record_release(160);
        counters.checks.add(3);

        let stats = counters.snapshot(1, 1);
        assert_eq!(stats.live_bytes, 64);
        assert_eq!(stats.peak_live_bytes, 224);
        assert_eq!(stats.registrations, 2);
        assert_eq!(stats.releases, 1);
        assert_eq!(stats.checks, 3);
    }

    #[test]
    fn test_display() {
        let stats = RegistryStats {
            live_bytes: 2048,
            ..Default::default()
        };
        let text = stats.to_string();
        assert!(text.contains("Live bytes:      2.00 KB"));
    }
}
