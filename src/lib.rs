//! # segcheck
//!
//! Checked raw-pointer stores against a registry of declared safe memory
//! segments.
//!
//! ## Features
//!
//! - Ordered registry of non-overlapping live segments with logarithmic lookup
//! - Range containment checks against each segment's live sub-range
//! - Canary padding around live ranges, validated on release
//! - Tombstones for released segments, with optional bounded retention
//! - Check-and-store wrappers that compile to plain writes without `check`
//! - Coded diagnostics to stderr, `log`, or a custom sink
//!
//! ## Quick Start
//!
//! ```rust
//! use segcheck::{GuardedBuffer, Origin, SegmentRegistry};
//!
//! let registry = SegmentRegistry::with_defaults();
//! let buf = GuardedBuffer::new(&registry, 64, Origin::caller()).unwrap();
//!
//! let live = buf.as_ptr() as usize;
//! assert!(registry.check_access(live, 64).is_ok());
//! assert!(registry.check_access(live + 60, 8).is_err());
//!
//! buf.free().unwrap();
//! ```
//!
//! ## Feature flags
//!
//! | Feature       | Effect                                              |
//! |---------------|-----------------------------------------------------|
//! | `check`       | Wrappers and `register!`/`release!` hit the global registry |
//! | `parking_lot` | Registry lock uses `parking_lot::Mutex`             |
//! | `log`         | Diagnostics and registry events go to the `log` crate |
//! | `debug`       | Capture a backtrace at every registration           |
//! | `diagnostics` | Print diagnostics to stderr in release builds       |

pub mod api;
pub mod diagnostics;

pub mod core;
#[allow(dead_code)]
mod debug;
#[allow(dead_code)]
mod sync;
pub mod util;

// Re-export public API at crate root for convenience
pub use api::checked;
pub use api::config::RegistryConfig;
pub use api::error::{AccessViolation, SegmentError};
pub use api::guarded::GuardedBuffer;
pub use api::registry::SegmentRegistry;
pub use api::retention::TombstoneRetention;
pub use api::stats::RegistryStats;

// Segment records
pub use crate::core::segment::{Origin, Segment};
pub use crate::core::canary::PADDING_PATTERN;
pub use crate::core::global::{global, init_global};

// Padding helpers for callers that allocate their own memory
pub use util::padding::{alloc_size_for, live_address, live_offset, live_size_for, PADDING};

// Diagnostics
pub use diagnostics::{Diagnostic, DiagnosticKind, DiagnosticSink, CollectingSink};
pub use diagnostics::{set_sink, suppress_diagnostics};
