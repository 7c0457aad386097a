//! Reference backend.
//!
//! [`AtTemplateTranslator`] turns `@`-templates into view classes and
//! [`BundleCompiler`] checks the generated sources and packs them into a
//! [`BundleImage`]. Together they let the pipeline run end to end without an
//! external compiler.

mod compiler;
mod container;
mod lexer;
mod translator;

pub use compiler::BundleCompiler;
pub use container::{BundleImage, BundledUnit, ContainerError, MAGIC, SigningSection};
pub use translator::{AtTemplateTranslator, VIEW_BASE_TYPE, VIEW_NAMESPACE, view_type_name};
