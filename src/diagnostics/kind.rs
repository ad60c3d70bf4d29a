//! Diagnostic kinds and predefined codes.
//!
//! Mirrors rustc's diagnostic levels for familiar UX.

/// The severity level of a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticKind {
    /// A hard error - something is definitely wrong.
    Error,
    /// A warning - something is probably wrong or suboptimal.
    Warning,
    /// Additional context about another diagnostic.
    Note,
}

impl DiagnosticKind {
    /// Get the display prefix for this kind.
    pub fn prefix(&self) -> &'static str {
        match self {
            DiagnosticKind::Error => "error",
            DiagnosticKind::Warning => "warning",
            DiagnosticKind::Note => "note",
        }
    }
}

/// A diagnostic message with code, message, and optional context.
///
/// Diagnostic codes follow the pattern:
/// - `SC0xx` - Segment registry failures
/// - `SC1xx` - Retention and bookkeeping events
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Severity level.
    pub kind: DiagnosticKind,
    /// Diagnostic code (e.g., "SC005").
    pub code: &'static str,
    /// Primary message.
    pub message: &'static str,
    /// Optional additional context.
    pub note: Option<&'static str>,
    /// Optional fix suggestion.
    pub help: Option<&'static str>,
}

impl Diagnostic {
    /// Create a new error diagnostic.
    pub const fn error(code: &'static str, message: &'static str) -> Self {
        Self {
            kind: DiagnosticKind::Error,
            code,
            message,
            note: None,
            help: None,
        }
    }

    /// Create a new warning diagnostic.
    pub const fn warning(code: &'static str, message: &'static str) -> Self {
        Self {
            kind: DiagnosticKind::Warning,
            code,
            message,
            note: None,
            help: None,
        }
    }

    /// Add a note to this diagnostic.
    pub const fn with_note(mut self, note: &'static str) -> Self {
        self.note = Some(note);
        self
    }

    /// Add a help message to this diagnostic.
    pub const fn with_help(mut self, help: &'static str) -> Self {
        self.help = Some(help);
        self
    }
}

// =============================================================================
// Predefined diagnostics (SC0xx - Registry failures)
// =============================================================================

/// SC001: Registration with an impossible layout.
pub const SC001: Diagnostic = Diagnostic::error(
    "SC001",
    "segment layout is invalid"
).with_note("the allocation must be non-empty and contain the whole live range")
 .with_help("use alloc_size_for()/live_address() to derive the live range from the reservation");

/// SC002: Two live segments would overlap.
pub const SC002: Diagnostic = Diagnostic::error(
    "SC002",
    "new segment overlaps a live segment"
).with_note("the same memory was registered twice, or a release was skipped")
 .with_help("release the previous segment before registering memory that reuses it");

/// SC003: Release of an address that was never registered.
pub const SC003: Diagnostic = Diagnostic::error(
    "SC003",
    "no live segment found for release"
).with_note("the segment was already released, or never registered")
 .with_help("check for a double release of this address");

/// SC004: Release of an address inside, but not at the start of, a segment.
pub const SC004: Diagnostic = Diagnostic::error(
    "SC004",
    "release address does not match the segment start"
).with_note("segments are released by the exact address they were registered with")
 .with_help("pass the allocation address, not the live address or an interior pointer");

/// SC005: Canary padding was overwritten.
pub const SC005: Diagnostic = Diagnostic::error(
    "SC005",
    "diagnostic padding of segment was changed"
).with_note("memory outside the live range was written during the segment's lifetime")
 .with_help("look for out-of-bounds writes just before or after the live range");

/// SC006: Access outside every live range.
pub const SC006: Diagnostic = Diagnostic::error(
    "SC006",
    "memory access outside a safe segment"
).with_note("the nearest live segment and tombstone are listed in the context")
 .with_help("a tombstone covering the address means the memory was used after release");

// =============================================================================
// Predefined diagnostics (SC1xx - Retention)
// =============================================================================

/// SC101: Tombstone evicted by the retention policy.
pub const SC101: Diagnostic = Diagnostic::warning(
    "SC101",
    "tombstone evicted by retention policy"
).with_note("access diagnostics for this address will no longer name the released segment")
 .with_help("raise the tombstone cap or use TombstoneRetention::Unbounded");
