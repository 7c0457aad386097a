//! Error and diagnostic system for viewpack.
//!
//! This module provides an error handling system with:
//! - Error codes for documentation and searchability
//! - Multiple labeled spans for rich error context
//! - Severity levels (info, warning, error)
//! - Diagnostic collector for accumulating diagnostics across templates
//!
//! # Overview
//!
//! The error system is built around the [`Diagnostic`] type, which represents
//! a single message with optional error code, source file, labeled source
//! locations, and help text. When a pipeline run fails, every collected
//! diagnostic is wrapped in a [`DiagnosticError`].
//!
//! # Example
//!
//! ```
//! # use viewpack_core::error::{Diagnostic, ErrorCode};
//! # use viewpack_core::Span;
//!
//! let diag = Diagnostic::error("unterminated `@(` expression")
//!     .with_code(ErrorCode::V101)
//!     .with_file("Views/Home/Index.tmpl")
//!     .with_label(Span::new(14..20), "expression starts here")
//!     .with_help("add a closing `)`");
//! ```

mod collector;
mod diagnostic;
mod diagnostic_error;
mod error_code;
mod label;
mod severity;

pub use collector::DiagnosticCollector;
pub use diagnostic::Diagnostic;
pub use diagnostic_error::DiagnosticError;
pub use error_code::ErrorCode;
pub use label::Label;
pub use severity::Severity;
