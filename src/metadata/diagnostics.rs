//! Diagnostics collection for emit and delta passes.
//!
//! All user-reachable failure conditions in this subsystem accumulate in a
//! shared diagnostics bag owned by the emit context rather than unwinding the
//! pass: an unrepresentable symbol, an Edit-and-Continue limitation, or a
//! stale edit never aborts processing of the remaining symbols. Only internal
//! invariant violations fail fast, and those go through
//! [`crate::Error::Invariant`], not through this sink.
//!
//! # Architecture
//!
//! The [`EmitDiagnostics`] container uses `boxcar::Vec` for thread-safe,
//! lock-free append operations. A driver that parallelizes independent emit
//! passes gives each pass its own [`crate::emit::EmitContext`], but the
//! diagnostics sink may be shared across passes when the driver wants a
//! single combined report.
//!
//! # Key Components
//!
//! - [`EmitDiagnostics`] - Thread-safe container for diagnostic entries
//! - [`EmitDiagnostic`] - Individual entry: code, severity, message, location
//! - [`EmitErrorCode`] - The closed set of user-facing condition codes
//! - [`SourceLocation`] - Best-available source attribution, optional
//!
//! # Usage Examples
//!
//! ```rust
//! use cilemit::metadata::diagnostics::{EmitDiagnostics, EmitErrorCode, SourceLocation};
//!
//! let diagnostics = EmitDiagnostics::new();
//!
//! diagnostics.error(
//!     EmitErrorCode::EncNoPiaTypeAdded,
//!     "embedded interop type 'IAccessible' cannot be added in a delta generation",
//!     Some(SourceLocation::new("Widget.cs", 42)),
//! );
//!
//! assert!(diagnostics.has_errors());
//! for entry in diagnostics.iter() {
//!     println!("{entry}");
//! }
//! ```

use std::fmt::{self, Write};

/// Severity level of a diagnostic entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticSeverity {
    /// Informational message, not indicating a problem.
    Info,

    /// Warning about a construct that emits but may not behave as intended.
    Warning,

    /// Error indicating the affected definition could not be emitted.
    ///
    /// The pass continues for unaffected symbols; the driver decides whether
    /// the overall emit is rejected.
    Error,
}

impl fmt::Display for DiagnosticSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticSeverity::Info => write!(f, "INFO"),
            DiagnosticSeverity::Warning => write!(f, "WARN"),
            DiagnosticSeverity::Error => write!(f, "ERROR"),
        }
    }
}

/// The closed set of user-facing condition codes this subsystem can report.
///
/// Codes are stable identifiers for driver-side handling; the human-readable
/// message on each [`EmitDiagnostic`] carries the per-occurrence detail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EmitErrorCode {
    /// A referenced symbol has a shape the binary metadata format cannot
    /// represent at all.
    UnrepresentableSymbol,

    /// A delta generation would add a locally embedded interop type, which
    /// the incremental-reload mechanism does not support after generation 0.
    EncNoPiaTypeAdded,

    /// An `Update` edit named an old symbol with no structural counterpart in
    /// the previous generation.
    EncUpdateFailedMissingSymbol,

    /// The live compilation's anonymous-type map is missing a key the
    /// baseline already registered (analysis-layer defect, reported rather
    /// than unwound in release builds).
    EncAnonymousTypeMapRegression,

    /// An edit kind the incremental-reload mechanism cannot represent.
    EncEditNotSupported,
}

impl fmt::Display for EmitErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EmitErrorCode::UnrepresentableSymbol => write!(f, "UnrepresentableSymbol"),
            EmitErrorCode::EncNoPiaTypeAdded => write!(f, "EncNoPiaTypeAdded"),
            EmitErrorCode::EncUpdateFailedMissingSymbol => {
                write!(f, "EncUpdateFailedMissingSymbol")
            }
            EmitErrorCode::EncAnonymousTypeMapRegression => {
                write!(f, "EncAnonymousTypeMapRegression")
            }
            EmitErrorCode::EncEditNotSupported => write!(f, "EncEditNotSupported"),
        }
    }
}

/// Best-available source attribution for a diagnostic.
///
/// `None` is a valid location for symbol-less or global errors; when a
/// symbol has no location of its own, the emit context's location hint is
/// used instead.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SourceLocation {
    /// Path of the source document
    pub path: String,
    /// Zero-based character position within the document
    pub position: u32,
}

impl SourceLocation {
    /// Creates a new source location.
    pub fn new(path: impl Into<String>, position: u32) -> Self {
        Self {
            path: path.into(),
            position,
        }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.path, self.position)
    }
}

/// A single diagnostic entry produced during an emit or delta pass.
#[derive(Debug, Clone)]
pub struct EmitDiagnostic {
    /// Severity level of this diagnostic.
    pub severity: DiagnosticSeverity,

    /// Stable condition code.
    pub code: EmitErrorCode,

    /// Human-readable description of the issue.
    pub message: String,

    /// Best-available source location, if any.
    pub location: Option<SourceLocation>,
}

impl EmitDiagnostic {
    /// Creates a new diagnostic entry.
    ///
    /// # Arguments
    ///
    /// * `severity` - Severity level of the diagnostic
    /// * `code` - Stable condition code
    /// * `message` - Human-readable description
    pub fn new(
        severity: DiagnosticSeverity,
        code: EmitErrorCode,
        message: impl Into<String>,
    ) -> Self {
        Self {
            severity,
            code,
            message: message.into(),
            location: None,
        }
    }

    /// Attaches a source location to the diagnostic.
    #[must_use]
    pub fn with_location(mut self, location: SourceLocation) -> Self {
        self.location = Some(location);
        self
    }
}

impl fmt::Display for EmitDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.severity, self.code, self.message)?;
        if let Some(location) = &self.location {
            write!(f, " ({location})")?;
        }
        Ok(())
    }
}

/// Thread-safe container for collecting diagnostic entries.
///
/// Uses `boxcar::Vec` internally for lock-free concurrent append operations,
/// so independent emit passes may share a single sink without coordination.
///
/// # Example
///
/// ```rust
/// use cilemit::metadata::diagnostics::{EmitDiagnostics, EmitErrorCode};
/// use std::sync::Arc;
///
/// let diagnostics = Arc::new(EmitDiagnostics::new());
///
/// let shared = Arc::clone(&diagnostics);
/// std::thread::spawn(move || {
///     shared.warning(EmitErrorCode::UnrepresentableSymbol, "satellite pass", None);
/// })
/// .join()
/// .unwrap();
///
/// diagnostics.error(EmitErrorCode::EncEditNotSupported, "primary pass", None);
/// assert_eq!(diagnostics.count(), 2);
/// ```
#[derive(Debug)]
pub struct EmitDiagnostics {
    entries: boxcar::Vec<EmitDiagnostic>,
}

impl Default for EmitDiagnostics {
    fn default() -> Self {
        Self::new()
    }
}

impl EmitDiagnostics {
    /// Creates a new empty diagnostics container.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: boxcar::Vec::new(),
        }
    }

    /// Adds an informational diagnostic.
    pub fn info(
        &self,
        code: EmitErrorCode,
        message: impl Into<String>,
        location: Option<SourceLocation>,
    ) {
        self.report(DiagnosticSeverity::Info, code, message, location);
    }

    /// Adds a warning diagnostic.
    pub fn warning(
        &self,
        code: EmitErrorCode,
        message: impl Into<String>,
        location: Option<SourceLocation>,
    ) {
        self.report(DiagnosticSeverity::Warning, code, message, location);
    }

    /// Adds an error diagnostic.
    pub fn error(
        &self,
        code: EmitErrorCode,
        message: impl Into<String>,
        location: Option<SourceLocation>,
    ) {
        self.report(DiagnosticSeverity::Error, code, message, location);
    }

    fn report(
        &self,
        severity: DiagnosticSeverity,
        code: EmitErrorCode,
        message: impl Into<String>,
        location: Option<SourceLocation>,
    ) {
        let mut diagnostic = EmitDiagnostic::new(severity, code, message);
        if let Some(location) = location {
            diagnostic = diagnostic.with_location(location);
        }
        self.push(diagnostic);
    }

    /// Adds a diagnostic entry directly.
    pub fn push(&self, diagnostic: EmitDiagnostic) {
        self.entries.push(diagnostic);
    }

    /// Returns true if any diagnostics have been collected.
    pub fn has_any(&self) -> bool {
        self.entries.count() > 0
    }

    /// Returns true if any error-level diagnostics have been collected.
    pub fn has_errors(&self) -> bool {
        self.entries
            .iter()
            .any(|(_, d)| d.severity == DiagnosticSeverity::Error)
    }

    /// Returns the total number of diagnostics.
    pub fn count(&self) -> usize {
        self.entries.count()
    }

    /// Returns the number of error-level diagnostics.
    pub fn error_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|(_, d)| d.severity == DiagnosticSeverity::Error)
            .count()
    }

    /// Returns an iterator over all diagnostics.
    pub fn iter(&self) -> impl Iterator<Item = &EmitDiagnostic> {
        self.entries.iter().map(|(_, d)| d)
    }

    /// Returns diagnostics filtered by condition code.
    pub fn by_code(&self, code: EmitErrorCode) -> Vec<&EmitDiagnostic> {
        self.entries
            .iter()
            .filter(|(_, d)| d.code == code)
            .map(|(_, d)| d)
            .collect()
    }

    /// Formats a summary of all diagnostics for display.
    pub fn summary(&self) -> String {
        let mut output = String::new();
        let _ = writeln!(
            output,
            "Diagnostics: {} entries, {} error(s)",
            self.count(),
            self.error_count()
        );
        for diag in self.iter() {
            let _ = writeln!(output, "  {diag}");
        }
        output
    }
}

impl fmt::Display for EmitDiagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.summary())
    }
}
