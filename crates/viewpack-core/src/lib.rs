//! viewpack core types and diagnostics.
//!
//! This crate provides the foundational types shared by the viewpack
//! precompiler and the backends plugged into it:
//!
//! - **Templates**: discovered template files and their logical paths ([`template`])
//! - **Views**: compiled view results and their registry ([`view`])
//! - **Identity**: application identity and signing options ([`identity`])
//! - **Diagnostics**: severities, codes and labeled spans ([`error`])

pub mod error;
pub mod identity;
pub mod template;
pub mod view;

mod span;

pub use span::Span;
