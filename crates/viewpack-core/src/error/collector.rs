//! Collector for accumulating diagnostics across a pipeline run.
//!
//! The [`DiagnosticCollector`] lets every stage report errors, warnings
//! and notes instead of failing on the first error encountered.

use crate::error::{Diagnostic, DiagnosticError};

/// A collector for accumulating diagnostics during a run.
///
/// # Example
///
/// ```
/// # use viewpack_core::error::{Diagnostic, DiagnosticCollector};
///
/// let mut collector = DiagnosticCollector::new();
/// collector.emit(Diagnostic::warning("stray `@`"));
/// collector.emit(Diagnostic::error("unterminated comment"));
///
/// let err = collector.finish().unwrap_err();
/// assert_eq!(err.diagnostics().len(), 2);
/// ```
#[derive(Debug, Default)]
pub struct DiagnosticCollector {
    diagnostics: Vec<Diagnostic>,
    has_errors: bool,
}

impl DiagnosticCollector {
    /// Create a new empty collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Emit a diagnostic to this collector.
    ///
    /// The diagnostic is added to the collection and if it's an error,
    /// the collector is marked as having errors.
    pub fn emit(&mut self, diagnostic: Diagnostic) {
        if diagnostic.severity().is_error() {
            self.has_errors = true;
        }
        self.diagnostics.push(diagnostic);
    }

    /// Emit every diagnostic from an iterator.
    pub fn extend(&mut self, diagnostics: impl IntoIterator<Item = Diagnostic>) {
        for diagnostic in diagnostics {
            self.emit(diagnostic);
        }
    }

    /// Whether any error-severity diagnostic has been emitted.
    pub fn has_errors(&self) -> bool {
        self.has_errors
    }

    /// All diagnostics emitted so far.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Finish collection and return a result.
    ///
    /// - If there are errors, returns `Err(DiagnosticError)` with all diagnostics.
    /// - If there are no errors, returns the remaining warnings and notes.
    pub fn finish(self) -> Result<Vec<Diagnostic>, DiagnosticError> {
        if self.has_errors {
            Err(DiagnosticError::new(self.diagnostics))
        } else {
            Ok(self.diagnostics)
        }
    }
}
