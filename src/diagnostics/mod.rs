//! Coded diagnostics for registry failures.
//!
//! Every error the registry returns is also emitted here, so a violation is
//! visible even when the caller discards the `Result`.
//!
//! ## Diagnostic Codes
//!
//! | Code  | Meaning                        |
//! |-------|--------------------------------|
//! | SC001 | Invalid segment layout         |
//! | SC002 | Overlapping registration       |
//! | SC003 | Release of unknown address     |
//! | SC004 | Mismatched release address     |
//! | SC005 | Padding corruption             |
//! | SC006 | Access violation               |
//! | SC101 | Tombstone evicted              |

pub mod emit;
pub mod kind;

pub use emit::{emit_with_context, set_sink, suppress_diagnostics, CollectingSink, DiagnosticSink};
pub use kind::{Diagnostic, DiagnosticKind};
pub use kind::{SC001, SC002, SC003, SC004, SC005, SC006, SC101};
