//! Error codes for the viewpack diagnostic system.
//!
//! Error codes are organized by phase:
//! - `V0xx` - Template input errors
//! - `V1xx` - Template translation errors
//! - `V2xx` - Compilation errors

use std::fmt;

/// Error codes for categorizing diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // =========================================================================
    // Input Errors (V0xx)
    // =========================================================================
    /// Unreadable template.
    ///
    /// The template file could not be read or is not valid UTF-8 text.
    V001,

    /// Empty template.
    ///
    /// The template file contains no content. The generated view renders
    /// nothing.
    V002,

    // =========================================================================
    // Translation Errors (V1xx)
    // =========================================================================
    /// Stray transition character.
    ///
    /// An `@` was not followed by an identifier, `(`, `*` or another `@`.
    /// It is emitted literally.
    V100,

    /// Unterminated expression.
    ///
    /// An explicit expression `@(` was opened but never closed.
    V101,

    /// Unterminated comment.
    ///
    /// A template comment `@*` was opened but never closed with `*@`.
    V102,

    /// Empty expression.
    ///
    /// An explicit expression `@()` contains nothing to render.
    V103,

    // =========================================================================
    // Compilation Errors (V2xx)
    // =========================================================================
    /// Unbalanced delimiter.
    ///
    /// A `{`, `(`, `}` or `)` in a source unit has no matching counterpart.
    V200,

    /// Unresolved type reference.
    ///
    /// A `typeof(...)` reference names a type that no source unit declares.
    V201,

    /// Unterminated string literal.
    ///
    /// A string literal in a source unit was opened but never closed.
    V202,

    /// Duplicate type declaration.
    ///
    /// Two source units declare a type with the same fully-qualified name.
    V203,
}

impl ErrorCode {
    /// Returns the code as a string (e.g., "V001").
    pub fn as_str(&self) -> &'static str {
        match self {
            // Input errors
            ErrorCode::V001 => "V001",
            ErrorCode::V002 => "V002",
            // Translation errors
            ErrorCode::V100 => "V100",
            ErrorCode::V101 => "V101",
            ErrorCode::V102 => "V102",
            ErrorCode::V103 => "V103",
            // Compilation errors
            ErrorCode::V200 => "V200",
            ErrorCode::V201 => "V201",
            ErrorCode::V202 => "V202",
            ErrorCode::V203 => "V203",
        }
    }

    /// Returns a short description of what this error code means.
    pub fn description(&self) -> &'static str {
        match self {
            // Input errors
            ErrorCode::V001 => "unreadable template",
            ErrorCode::V002 => "empty template",
            // Translation errors
            ErrorCode::V100 => "stray transition character",
            ErrorCode::V101 => "unterminated expression",
            ErrorCode::V102 => "unterminated comment",
            ErrorCode::V103 => "empty expression",
            // Compilation errors
            ErrorCode::V200 => "unbalanced delimiter",
            ErrorCode::V201 => "unresolved type reference",
            ErrorCode::V202 => "unterminated string literal",
            ErrorCode::V203 => "duplicate type declaration",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
