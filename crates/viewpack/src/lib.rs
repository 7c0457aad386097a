//! Viewpack - ahead-of-time precompilation of template views.
//!
//! Discovers every template under a root directory, translates each one to
//! intermediate source, and compiles the result into a single binary unit
//! together with a generated view registry and assembly metadata. A runtime
//! host loads the unit and finds each view by its logical path without
//! translating templates at startup.

pub mod backend;
pub mod bundle;
pub mod compilation;
pub mod config;
pub mod discovery;
pub mod hook;
pub mod metadata;
pub mod registry;
pub mod snk;

mod error;

pub use viewpack_core::{error as diagnostics, identity, template, view};

pub use error::{ConfigError, ViewpackError};

use std::{
    fs,
    io::{self, Write as _},
    path::{Path, PathBuf},
};

use log::{debug, info, warn};
use tempfile::NamedTempFile;

use viewpack_core::{
    error::{Diagnostic, DiagnosticCollector, DiagnosticError, ErrorCode},
    template::TemplateUnit,
    view::{ViewCompilationResult, ViewRegistry},
};

use backend::{SourceCompiler, TemplateTranslator};
use bundle::{AtTemplateTranslator, BundleCompiler};
use compilation::SourceUnit;
use config::PipelineSettings;
use hook::HookRegistry;
use registry::ViewRegistryCodeGenerator;

/// Result of a successful precompilation run.
#[derive(Debug)]
pub struct PrecompileOutput {
    output_path: PathBuf,
    views: ViewRegistry,
    diagnostics: Vec<Diagnostic>,
    size: usize,
}

impl PrecompileOutput {
    /// Where the binary unit was written.
    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    /// Views listed in the generated registry, in registry order.
    pub fn views(&self) -> &ViewRegistry {
        &self.views
    }

    /// Warnings and informational diagnostics from the run.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Size of the written unit in bytes.
    pub fn size(&self) -> usize {
        self.size
    }
}

/// Orchestrates one precompilation run.
///
/// The translator and compiler are pluggable; [`Precompiler::bundle`]
/// wires in the reference backend.
///
/// # Examples
///
/// ```rust,no_run
/// use viewpack::{Precompiler, config::PipelineSettings, identity::ApplicationIdentity};
///
/// let settings = PipelineSettings::new("app/Views", ApplicationIdentity::new("Shop", "1.0.0.0"))
///     .with_output_path("out/Shop.PrecompiledViews.vpk");
///
/// let output = Precompiler::bundle(settings)
///     .run()
///     .expect("Failed to precompile views");
/// println!("{} views", output.views().len());
/// ```
pub struct Precompiler<T, C> {
    settings: PipelineSettings,
    translator: T,
    compiler: C,
    hooks: HookRegistry,
}

impl Precompiler<AtTemplateTranslator, BundleCompiler> {
    /// Create a precompiler using the `@`-template translator and the
    /// bundle compiler.
    pub fn bundle(settings: PipelineSettings) -> Self {
        Self::new(settings, AtTemplateTranslator::new(), BundleCompiler::new())
    }
}

impl<T: TemplateTranslator, C: SourceCompiler> Precompiler<T, C> {
    /// Create a precompiler with the given backend.
    ///
    /// # Arguments
    ///
    /// * `settings` - Validated run inputs
    /// * `translator` - Converts each template to source
    /// * `compiler` - Builds and emits the compilation
    pub fn new(settings: PipelineSettings, translator: T, compiler: C) -> Self {
        Self {
            settings,
            translator,
            compiler,
            hooks: HookRegistry::new(),
        }
    }

    /// Use `hooks` to look up the configure-compilation hook.
    pub fn with_hooks(mut self, hooks: HookRegistry) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    /// Run the pipeline and write the binary unit.
    ///
    /// Configuration and signing problems stop the run at once. Translation
    /// and compilation diagnostics are collected across every template; if
    /// any of them is an error nothing is written and all of them are
    /// returned.
    ///
    /// # Errors
    ///
    /// - [`ViewpackError::Config`] for bad settings, duplicate logical paths
    ///   or hook resolution failures
    /// - [`ViewpackError::Signing`] for a missing or invalid key file
    /// - [`ViewpackError::Compilation`] when any diagnostic is an error
    /// - [`ViewpackError::Io`] / [`ViewpackError::Output`] for file system
    ///   failures
    pub fn run(&self) -> Result<PrecompileOutput, ViewpackError> {
        let settings = &self.settings;
        settings.validate()?;

        let assembly_name = settings.identity().views_assembly_name();
        info!(
            root = settings.template_root().display().to_string(),
            assembly = assembly_name.as_str();
            "Precompiling views"
        );

        let hook = self.hooks.resolve(settings.hook())?;
        let templates =
            discovery::discover_templates(settings.template_root(), settings.suffixes())?;

        let mut collector = DiagnosticCollector::new();
        let mut views = ViewRegistry::new();
        let mut units = Vec::with_capacity(templates.len());
        for template in &templates {
            if let Some(unit) = self.translate(template, &mut collector, &mut views)? {
                units.push(unit);
            }
        }
        info!(templates = templates.len(), views = views.len(); "Translated templates");

        let compilation = self.compiler.compile(&assembly_name, units);
        let mut options = compilation
            .options()
            .clone()
            .with_optimization(settings.optimization());
        for symbol in settings.symbols() {
            options = options.with_symbol(symbol.as_str());
        }
        if let Some(hook) = &hook {
            options = hook.configure(options);
        }
        let compilation = compilation.with_options(options);

        let generator = ViewRegistryCodeGenerator::new(&self.compiler);
        let compilation = generator.add_view_registry(compilation, &views);
        let compilation = generator.add_assembly_metadata(
            compilation,
            settings.identity(),
            settings.signing(),
            settings.platform(),
        )?;

        let (image, emit_diagnostics) = self.compiler.emit(&compilation).into_parts();
        collector.extend(emit_diagnostics);

        let diagnostics = match collector.finish() {
            Ok(diagnostics) => diagnostics,
            Err(err) => {
                warn!(errors = err.error_count(); "Precompilation failed");
                return Err(err.into());
            }
        };
        let Some(image) = image else {
            let mut diagnostics = diagnostics;
            diagnostics.push(Diagnostic::error(format!(
                "compiler produced no output for `{assembly_name}`"
            )));
            return Err(DiagnosticError::new(diagnostics).into());
        };

        write_output(settings.output_path(), &image)?;
        info!(
            path = settings.output_path().display().to_string(),
            bytes = image.len();
            "Wrote precompiled views"
        );

        Ok(PrecompileOutput {
            output_path: settings.output_path().to_path_buf(),
            views,
            diagnostics,
            size: image.len(),
        })
    }

    /// Read and translate one template.
    ///
    /// Returns the source unit to compile, or `None` if the template could
    /// not be read. Only templates that translate without errors are added
    /// to `views`.
    fn translate(
        &self,
        template: &TemplateUnit,
        collector: &mut DiagnosticCollector,
        views: &mut ViewRegistry,
    ) -> Result<Option<SourceUnit>, ViewpackError> {
        let path = template.physical_path();
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(err) => {
                collector.emit(
                    Diagnostic::error(format!("cannot read template: {err}"))
                        .with_code(ErrorCode::V001)
                        .with_file(path),
                );
                return Ok(None);
            }
        };

        let translated = self.translator.translate(template, &contents);
        let succeeded = !translated.has_errors();
        let (source, type_name, diagnostics) = translated.into_parts();
        collector.extend(diagnostics.into_iter().map(|d| d.or_file(path)));

        if succeeded {
            views
                .insert(ViewCompilationResult::new(
                    template.logical_path().clone(),
                    type_name,
                ))
                .map_err(|err| ConfigError::Invalid(err.to_string()))?;
        } else {
            debug!(view = template.logical_path().as_str(); "Template has errors; not registered");
        }

        Ok(Some(self.compiler.create_source_unit(&source, Some(path))))
    }
}

/// Write `image` to `path` through a temporary file in the same directory,
/// so a partially written unit is never visible under the final name.
fn write_output(path: &Path, image: &[u8]) -> Result<(), ViewpackError> {
    let output_error = |source: io::Error| ViewpackError::Output {
        path: path.to_path_buf(),
        source,
    };

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir).map_err(output_error)?;

    let mut file = NamedTempFile::new_in(dir).map_err(output_error)?;
    file.write_all(image).map_err(output_error)?;
    file.persist(path).map_err(|err| output_error(err.error))?;
    Ok(())
}
