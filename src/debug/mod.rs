//! Debug utilities for tracking registrations.
//!
//! Backtraces are only captured when the `debug` feature is enabled.

mod backtrace;

pub(crate) use self::backtrace::capture_backtrace;
