//! Viewpack CLI library
//!
//! This module contains the core CLI logic for the viewpack precompiler.

pub mod error_adapter;

mod args;
mod config;

pub use args::Args;

use log::info;

use viewpack::{
    PrecompileOutput, Precompiler, ViewpackError,
    compilation::{CompilationOptions, OptimizationLevel},
    config::PipelineSettings,
    hook::HookRegistry,
};

/// Hooks selectable with `--hook`.
///
/// They are only registered when a hook is named, so a plain run never
/// picks one implicitly.
fn builtin_hooks(requested: Option<&str>) -> HookRegistry {
    let mut hooks = HookRegistry::new();
    if requested.is_some_and(|name| !name.is_empty()) {
        hooks
            .register("debug", |options: CompilationOptions| {
                options
                    .with_optimization(OptimizationLevel::Debug)
                    .with_symbol("DEBUG")
            })
            .register("trace", |options: CompilationOptions| {
                options.with_symbol("TRACE")
            });
    }
    hooks
}

/// Run the viewpack CLI application
///
/// This function precompiles the template tree through the viewpack
/// pipeline and writes the resulting unit to the output file.
///
/// # Arguments
///
/// * `args` - Command-line arguments
///
/// # Errors
///
/// Returns `ViewpackError` for:
/// - File I/O errors
/// - Configuration loading errors
/// - Signing errors
/// - Template and compilation diagnostics
pub fn run(args: &Args) -> Result<PrecompileOutput, ViewpackError> {
    let app_config = config::load_config(args.config.as_ref())?;
    let app_config = config::apply_overrides(app_config, args);
    let settings = PipelineSettings::from_config(&app_config)?;

    info!(
        input_path = settings.template_root().display().to_string(),
        output_path = settings.output_path().display().to_string();
        "Precompiling template tree"
    );

    let hooks = builtin_hooks(settings.hook());
    let output = Precompiler::bundle(settings).with_hooks(hooks).run()?;

    info!(
        output_file = output.output_path().display().to_string(),
        views = output.views().len();
        "Views precompiled successfully"
    );

    Ok(output)
}
