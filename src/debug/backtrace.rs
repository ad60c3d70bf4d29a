//! Registration backtrace capture.
//!
//! Stored on the segment and appended to overlap, mismatched-release and
//! corruption diagnostics so the original registration site can be found.

use std::sync::Arc;

/// Capture the current backtrace as text.
#[cfg(feature = "debug")]
pub(crate) fn capture_backtrace() -> Option<Arc<str>> {
    let bt = backtrace::Backtrace::new();
    Some(Arc::from(format!("{:?}", bt)))
}

/// Backtraces need the `debug` feature.
#[cfg(not(feature = "debug"))]
pub(crate) fn capture_backtrace() -> Option<Arc<str>> {
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capture_matches_feature() {
        assert_eq!(capture_backtrace().is_some(), cfg!(feature = "debug"));
    }
}
