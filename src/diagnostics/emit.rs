//! Diagnostic emission backend.
//!
//! Handles outputting diagnostics to stderr, logs, or a custom sink.

#[cfg(any(debug_assertions, feature = "diagnostics"))]
use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use super::kind::{Diagnostic, DiagnosticKind};

/// Global flag to suppress stderr and log output (for testing).
static DIAGNOSTICS_SUPPRESSED: AtomicBool = AtomicBool::new(false);

/// Optional sink receiving every emitted diagnostic.
static SINK: RwLock<Option<Arc<dyn DiagnosticSink>>> = RwLock::new(None);

/// Suppress stderr and log output. The installed sink still receives
/// every diagnostic.
pub fn suppress_diagnostics(suppress: bool) {
    DIAGNOSTICS_SUPPRESSED.store(suppress, Ordering::Relaxed);
}

/// Check if diagnostics are suppressed.
pub fn is_suppressed() -> bool {
    DIAGNOSTICS_SUPPRESSED.load(Ordering::Relaxed)
}

/// Install a sink that receives every diagnostic, replacing any previous one.
pub fn set_sink(sink: Option<Arc<dyn DiagnosticSink>>) {
    *SINK.write().unwrap_or_else(PoisonError::into_inner) = sink;
}

/// Emit a diagnostic with runtime context.
///
/// Output goes to stderr in debug builds or with the `diagnostics` feature,
/// to the `log` crate with the `log` feature, and to the installed sink.
pub fn emit_with_context(diag: &Diagnostic, context: &str) {
    if !is_suppressed() {
        #[cfg(any(debug_assertions, feature = "diagnostics"))]
        {
            emit_to_stderr_with_context(diag, context);
        }

        #[cfg(feature = "log")]
        {
            emit_to_log(diag, context);
        }
    }

    let sink = SINK.read().unwrap_or_else(PoisonError::into_inner).clone();
    if let Some(sink) = sink {
        sink.emit(diag, context);
    }
}

/// Internal: emit to stderr with context.
#[cfg(any(debug_assertions, feature = "diagnostics"))]
fn emit_to_stderr_with_context(diag: &Diagnostic, context: &str) {
    let mut stderr = std::io::stderr().lock();

    let _ = writeln!(
        stderr,
        "[segcheck][{}] {}: {}",
        diag.code,
        diag.kind.prefix(),
        diag.message
    );

    let _ = writeln!(stderr, "  context: {}", context);

    if let Some(note) = diag.note {
        let _ = writeln!(stderr, "  note: {}", note);
    }

    if let Some(help) = diag.help {
        let _ = writeln!(stderr, "  help: {}", help);
    }

    let _ = writeln!(stderr);
}

/// Emit a diagnostic using the log crate.
#[cfg(feature = "log")]
pub fn emit_to_log(diag: &Diagnostic, context: &str) {
    match diag.kind {
        DiagnosticKind::Error => {
            log::error!("[{}] {}: {}", diag.code, diag.message, context);
        }
        DiagnosticKind::Warning => {
            log::warn!("[{}] {}: {}", diag.code, diag.message, context);
        }
        DiagnosticKind::Note => {
            log::info!("[{}] {}: {}", diag.code, diag.message, context);
        }
    }

    if let Some(help) = diag.help {
        log::info!("  help: {}", help);
    }
}

/// A diagnostic sink trait for custom output.
pub trait DiagnosticSink: Send + Sync {
    /// Handle a diagnostic and its context line.
    fn emit(&self, diag: &Diagnostic, context: &str);
}

/// A simple sink that collects diagnostics.
#[derive(Default)]
pub struct CollectingSink {
    diagnostics: Mutex<Vec<(Diagnostic, String)>>,
}

impl CollectingSink {
    /// Create a new collecting sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get all collected diagnostics with their context.
    pub fn diagnostics(&self) -> Vec<(Diagnostic, String)> {
        self.diagnostics
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Clear collected diagnostics.
    pub fn clear(&self) {
        self.diagnostics
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// Check if any errors were collected.
    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .any(|(d, _)| d.kind == DiagnosticKind::Error)
    }
}

impl DiagnosticSink for CollectingSink {
    fn emit(&self, diag: &Diagnostic, context: &str) {
        self.diagnostics
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((diag.clone(), context.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::kind::{SC003, SC101};

    #[test]
    fn test_collecting_sink() {
        let sink = CollectingSink::new();
        sink.emit(&SC101, "evicted 1000-1010");
        assert!(!sink.has_errors());

        sink.emit(&SC003, "release of 2000");
        assert_eq!(sink.diagnostics().len(), 2);
        assert!(sink.has_errors());
        assert_eq!(sink.diagnostics()[1].1, "release of 2000");

        sink.clear();
        assert_eq!(sink.diagnostics().len(), 0);
    }

    #[test]
    fn test_installed_sink_receives_diagnostics() {
        let sink = Arc::new(CollectingSink::new());
        set_sink(Some(sink.clone()));
        emit_with_context(&SC003, "emit-test-marker");
        set_sink(None);

        assert!(sink
            .diagnostics()
            .iter()
            .any(|(d, ctx)| d.code == "SC003" && ctx == "emit-test-marker"));
    }
}
