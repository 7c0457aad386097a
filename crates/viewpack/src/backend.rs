//! Capabilities the pipeline consumes but does not implement.
//!
//! A [`TemplateTranslator`] turns one template into intermediate source
//! text; a [`SourceCompiler`] turns source units into a [`Compilation`] and
//! finally into a binary image. The [`bundle`](crate::bundle) module ships a
//! reference implementation of both.

use std::path::Path;

use viewpack_core::{error::Diagnostic, template::TemplateUnit};

use crate::compilation::{Compilation, CompilationOptions, SourceUnit};

/// Intermediate source produced from one template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslatedView {
    source: String,
    type_name: String,
    diagnostics: Vec<Diagnostic>,
}

impl TranslatedView {
    /// Create a translation result.
    ///
    /// `type_name` is the fully-qualified name of the type `source` declares.
    pub fn new(
        source: impl Into<String>,
        type_name: impl Into<String>,
        diagnostics: Vec<Diagnostic>,
    ) -> Self {
        Self {
            source: source.into(),
            type_name: type_name.into(),
            diagnostics,
        }
    }

    /// Generated source text.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Fully-qualified name of the generated view type.
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Diagnostics reported while translating.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Whether any diagnostic is an error.
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(|d| d.severity().is_error())
    }

    /// Split into source, type name and diagnostics.
    pub fn into_parts(self) -> (String, String, Vec<Diagnostic>) {
        (self.source, self.type_name, self.diagnostics)
    }
}

/// Converts one template file into intermediate source text.
pub trait TemplateTranslator {
    /// Translate `contents`, the text of `template`.
    ///
    /// Translation is best-effort: even when the returned diagnostics
    /// contain errors, the source text must still be usable as input to the
    /// compiler so that later templates and the compile step can report
    /// their own diagnostics.
    fn translate(&self, template: &TemplateUnit, contents: &str) -> TranslatedView;
}

/// Result of emitting a compilation.
#[derive(Debug, Clone, Default)]
pub struct EmitOutcome {
    image: Option<Vec<u8>>,
    diagnostics: Vec<Diagnostic>,
}

impl EmitOutcome {
    /// Create an emit outcome.
    ///
    /// A backend may return an image even when it reports errors; the
    /// pipeline never writes it in that case.
    pub fn new(image: Option<Vec<u8>>, diagnostics: Vec<Diagnostic>) -> Self {
        Self { image, diagnostics }
    }

    /// The emitted binary image.
    pub fn image(&self) -> Option<&[u8]> {
        self.image.as_deref()
    }

    /// Diagnostics reported by the compiler.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Split into image and diagnostics.
    pub fn into_parts(self) -> (Option<Vec<u8>>, Vec<Diagnostic>) {
        (self.image, self.diagnostics)
    }
}

/// Turns source units into a single binary image.
pub trait SourceCompiler {
    /// Create a source unit from text.
    fn create_source_unit(&self, text: &str, origin: Option<&Path>) -> SourceUnit {
        SourceUnit::new(text, origin.map(Path::to_path_buf))
    }

    /// Options every new compilation starts from.
    fn default_options(&self) -> CompilationOptions {
        CompilationOptions::default()
    }

    /// Build a compilation from source units.
    fn compile(&self, assembly_name: &str, units: Vec<SourceUnit>) -> Compilation {
        Compilation::new(assembly_name, self.default_options(), units)
    }

    /// Check the compilation and produce its binary image.
    fn emit(&self, compilation: &Compilation) -> EmitOutcome;
}
