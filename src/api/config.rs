//! Registry configuration.

use super::retention::TombstoneRetention;

/// Configuration for a [`SegmentRegistry`](crate::SegmentRegistry).
#[derive(Debug, Clone)]
pub struct RegistryConfig {
    /// Install and validate canary padding (default: true)
    pub canaries: bool,

    /// How many released segments to keep for diagnostics
    pub tombstone_retention: TombstoneRetention,

    /// Number of recent access violations kept for inspection (default: 64)
    pub violation_history: usize,

    /// Capture a backtrace at every registration (`debug` feature)
    pub capture_backtraces: bool,

    /// Pre-allocated slots in the live and tombstone sets
    pub initial_capacity: usize,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            canaries: true,
            tombstone_retention: TombstoneRetention::Unbounded,
            violation_history: 64,
            capture_backtraces: cfg!(feature = "debug"),
            initial_capacity: 1024,
        }
    }
}

impl RegistryConfig {
    /// Bookkeeping only: no canaries, no tombstones kept beyond the last one.
    pub fn minimal() -> Self {
        Self {
            canaries: false,
            tombstone_retention: TombstoneRetention::Capped(1),
            violation_history: 1,
            capture_backtraces: false,
            initial_capacity: 16,
        }
    }

    /// Everything kept: full tombstone log and a long violation history.
    pub fn audit() -> Self {
        Self {
            canaries: true,
            tombstone_retention: TombstoneRetention::Unbounded,
            violation_history: 4096,
            capture_backtraces: cfg!(feature = "debug"),
            initial_capacity: 65536,
        }
    }

    /// Defaults overridden by environment variables.
    ///
    /// - `SEGCHECK_CANARIES`: "0"/"false"/"off" or "1"/"true"/"on"
    /// - `SEGCHECK_TOMBSTONE_CAP`: tombstone cap, "0" for unbounded
    /// - `SEGCHECK_HISTORY`: violation history length
    ///
    /// Unparseable values are ignored.
    pub fn from_env() -> Self {
        Self::default().with_env_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from a variable lookup.
    pub fn with_env_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(val) = lookup("SEGCHECK_CANARIES") {
            match val.to_lowercase().as_str() {
                "0" | "false" | "off" => self.canaries = false,
                "1" | "true" | "on" => self.canaries = true,
                _ => {}
            }
        }
        if let Some(cap) = lookup("SEGCHECK_TOMBSTONE_CAP").and_then(|v| v.trim().parse().ok()) {
            self.tombstone_retention = TombstoneRetention::from_cap(cap);
        }
        if let Some(len) = lookup("SEGCHECK_HISTORY").and_then(|v| v.trim().parse().ok()) {
            self = self.with_violation_history(len);
        }
        self
    }

    /// Builder pattern: enable or disable canary padding.
    pub fn with_canaries(mut self, enable: bool) -> Self {
        self.canaries = enable;
        self
    }

    /// Builder pattern: set the tombstone retention policy.
    pub fn with_tombstone_retention(mut self, retention: TombstoneRetention) -> Self {
        self.tombstone_retention = retention;
        self
    }

    /// Builder pattern: set the violation history length (at least 1).
    pub fn with_violation_history(mut self, len: usize) -> Self {
        self.violation_history = len.max(1);
        self
    }

    /// Builder pattern: enable backtrace capture.
    pub fn with_backtraces(mut self, enable: bool) -> Self {
        self.capture_backtraces = enable;
        self
    }

    /// Builder pattern: set the initial capacity of the segment sets.
    pub fn with_initial_capacity(mut self, capacity: usize) -> Self {
        self.initial_capacity = capacity;
        self
    }
}
