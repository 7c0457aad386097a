//! The DiagnosticError type for wrapping pipeline diagnostics.
//!
//! [`DiagnosticError`] wraps every [`Diagnostic`] collected during a failed
//! run, including warnings and notes, so the full report survives the
//! failure.

use std::fmt;

use crate::error::Diagnostic;

/// Error type for runs that produced at least one error diagnostic.
#[derive(Debug, Clone)]
pub struct DiagnosticError {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticError {
    /// Create a new diagnostic error from diagnostics.
    pub fn new(diagnostics: Vec<Diagnostic>) -> Self {
        Self { diagnostics }
    }

    /// Get all diagnostics in this error.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Number of error-severity diagnostics.
    pub fn error_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity().is_error())
            .count()
    }

    /// Consume the error and return its diagnostics.
    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }
}

impl fmt::Display for DiagnosticError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Lead with the first error; warnings are listed but not headlined.
        let first = self
            .diagnostics
            .iter()
            .find(|d| d.severity().is_error())
            .or_else(|| self.diagnostics.first());
        if let Some(first) = first {
            write!(f, "{}", first)?;
            if self.diagnostics.len() > 1 {
                write!(f, " (+{} more)", self.diagnostics.len() - 1)?;
            }
        }
        Ok(())
    }
}

impl std::error::Error for DiagnosticError {}

impl From<Diagnostic> for DiagnosticError {
    fn from(diagnostic: Diagnostic) -> Self {
        Self {
            diagnostics: vec![diagnostic],
        }
    }
}

impl From<Vec<Diagnostic>> for DiagnosticError {
    fn from(diagnostics: Vec<Diagnostic>) -> Self {
        Self { diagnostics }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    #[test]
    fn test_diagnostic_error_from_diagnostic() {
        let diag = Diagnostic::error("test error").with_code(ErrorCode::V200);
        let err: DiagnosticError = diag.into();

        assert_eq!(err.diagnostics().len(), 1);
        assert_eq!(err.error_count(), 1);
    }

    #[test]
    fn test_diagnostic_error_display_multiple() {
        let diags = vec![
            Diagnostic::error("first error"),
            Diagnostic::error("second error"),
            Diagnostic::error("third error"),
        ];
        let err: DiagnosticError = diags.into();

        assert_eq!(err.to_string(), "error: first error (+2 more)");
    }

    #[test]
    fn test_diagnostic_error_display_leads_with_error() {
        let diags = vec![
            Diagnostic::warning("a warning"),
            Diagnostic::error("the error"),
        ];
        let err: DiagnosticError = diags.into();

        assert_eq!(err.to_string(), "error: the error (+1 more)");
        assert_eq!(err.error_count(), 1);
    }
}
