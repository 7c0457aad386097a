//! Labeled source spans for diagnostic messages.
//!
//! A label associates a message with a span in a template or source unit,
//! providing context for where an error or warning occurred.

use crate::span::Span;

/// A labeled span in source text.
///
/// # Primary vs Secondary Labels
///
/// - **Primary labels** mark the main location of a diagnostic.
/// - **Secondary labels** provide additional context, such as "opened here".
///
/// # Example
///
/// ```text
/// error[V101]: unterminated `@(` expression
///   --> Views/Home/Index.tmpl:3:5
///    |
///  3 | <p>@(Model.Title</p>
///    |    ^^^^^^^^^^^^^^^^^ expression is never closed
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Label {
    span: Span,
    message: String,
    is_primary: bool,
}

impl Label {
    /// Create a new primary label.
    pub fn primary(span: Span, message: impl Into<String>) -> Self {
        Self {
            span,
            message: message.into(),
            is_primary: true,
        }
    }

    /// Create a new secondary label.
    pub fn secondary(span: Span, message: impl Into<String>) -> Self {
        Self {
            span,
            message: message.into(),
            is_primary: false,
        }
    }

    /// Get the span this label applies to.
    pub fn span(&self) -> Span {
        self.span
    }

    /// Get the label message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Check if this is a primary label.
    pub fn is_primary(&self) -> bool {
        self.is_primary
    }

    /// Check if this is a secondary label.
    pub fn is_secondary(&self) -> bool {
        !self.is_primary
    }
}
