//! Synchronization primitives.
//!
//! The registry lock and the counters behind `RegistryStats`.

pub(crate) mod atomics;
pub(crate) mod mutex;
