use std::path::{Path, PathBuf};

use serde::Deserialize;

use viewpack_core::identity::{ApplicationIdentity, SigningOptions};

use crate::{compilation::OptimizationLevel, error::ConfigError, metadata::Platform};

/// Application configuration loaded from TOML file
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Template discovery section
    #[serde(default)]
    pub templates: TemplatesConfig,

    /// Application identity section
    #[serde(default)]
    pub application: ApplicationConfig,

    /// Output section
    #[serde(default)]
    pub output: OutputConfig,

    /// Strong-name signing section
    #[serde(default)]
    pub signing: SigningOptions,

    /// Compiler options section
    #[serde(default)]
    pub compilation: CompilationConfig,
}

/// Template discovery section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TemplatesConfig {
    /// Directory holding the template tree
    pub root: PathBuf,

    /// File suffixes recognized as templates, without the leading dot
    pub suffixes: Vec<String>,
}

impl Default for TemplatesConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("Views"),
            suffixes: vec!["tmpl".to_string()],
        }
    }
}

/// Application identity section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApplicationConfig {
    /// Application name; the output is named `<name>.PrecompiledViews`
    pub name: Option<String>,

    /// Version stamped into the output
    pub version: String,

    /// Name of the configure-compilation hook to run
    pub hook: Option<String>,
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            name: None,
            version: "1.0.0.0".to_string(),
            hook: None,
        }
    }
}

/// Output section
#[derive(Debug, Default, Clone, Deserialize)]
pub struct OutputConfig {
    /// Output file; defaults to `<name>.PrecompiledViews.vpk`
    #[serde(default)]
    pub path: Option<PathBuf>,
}

/// Compiler options section
#[derive(Debug, Default, Clone, Deserialize)]
pub struct CompilationConfig {
    #[serde(default)]
    pub optimization: OptimizationLevel,

    /// Conditional compilation symbols
    #[serde(default)]
    pub symbols: Vec<String>,
}

/// Validated inputs of one precompilation run.
///
/// Built from an [`AppConfig`] or directly through the builder methods.
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    template_root: PathBuf,
    suffixes: Vec<String>,
    identity: ApplicationIdentity,
    signing: SigningOptions,
    output_path: PathBuf,
    hook: Option<String>,
    optimization: OptimizationLevel,
    symbols: Vec<String>,
    platform: Platform,
}

impl PipelineSettings {
    /// Create settings with default suffixes, no signing and the output
    /// file named after the application in the working directory.
    pub fn new(template_root: impl Into<PathBuf>, identity: ApplicationIdentity) -> Self {
        let output_path = default_output_path(&identity);
        Self {
            template_root: template_root.into(),
            suffixes: TemplatesConfig::default().suffixes,
            identity,
            signing: SigningOptions::default(),
            output_path,
            hook: None,
            optimization: OptimizationLevel::default(),
            symbols: Vec::new(),
            platform: Platform::current(),
        }
    }

    /// Build settings from a loaded configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when the configuration fails
    /// [`validate`](Self::validate) or names no application.
    pub fn from_config(config: &AppConfig) -> Result<Self, ConfigError> {
        let name = config
            .application
            .name
            .clone()
            .ok_or_else(|| ConfigError::Invalid("application name is not set".to_string()))?;
        let identity = ApplicationIdentity::new(name, config.application.version.clone());
        let output_path = config
            .output
            .path
            .clone()
            .unwrap_or_else(|| default_output_path(&identity));

        let settings = Self {
            template_root: config.templates.root.clone(),
            suffixes: config.templates.suffixes.clone(),
            identity,
            signing: config.signing.clone(),
            output_path,
            hook: config.application.hook.clone(),
            optimization: config.compilation.optimization,
            symbols: config.compilation.symbols.clone(),
            platform: Platform::current(),
        };
        settings.validate()?;
        Ok(settings)
    }

    /// Check that the settings describe a runnable precompilation.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] for an empty application name or
    /// version, or when no template suffix is configured.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.identity.name().trim().is_empty() {
            return Err(ConfigError::Invalid("application name is empty".to_string()));
        }
        if self.identity.version().trim().is_empty() {
            return Err(ConfigError::Invalid("application version is empty".to_string()));
        }
        if self.suffixes.iter().all(|s| s.trim_start_matches('.').is_empty()) {
            return Err(ConfigError::Invalid(
                "at least one template suffix is required".to_string(),
            ));
        }
        Ok(())
    }

    pub fn template_root(&self) -> &Path {
        &self.template_root
    }

    pub fn suffixes(&self) -> &[String] {
        &self.suffixes
    }

    pub fn identity(&self) -> &ApplicationIdentity {
        &self.identity
    }

    pub fn signing(&self) -> &SigningOptions {
        &self.signing
    }

    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    /// Explicitly requested hook name.
    pub fn hook(&self) -> Option<&str> {
        self.hook.as_deref()
    }

    pub fn optimization(&self) -> OptimizationLevel {
        self.optimization
    }

    pub fn symbols(&self) -> &[String] {
        &self.symbols
    }

    /// Platform that selects the signing strategy.
    pub fn platform(&self) -> Platform {
        self.platform
    }

    pub fn with_suffixes(mut self, suffixes: Vec<String>) -> Self {
        self.suffixes = suffixes;
        self
    }

    pub fn with_signing(mut self, signing: SigningOptions) -> Self {
        self.signing = signing;
        self
    }

    pub fn with_output_path(mut self, output_path: impl Into<PathBuf>) -> Self {
        self.output_path = output_path.into();
        self
    }

    pub fn with_hook(mut self, hook: impl Into<String>) -> Self {
        self.hook = Some(hook.into());
        self
    }

    pub fn with_optimization(mut self, optimization: OptimizationLevel) -> Self {
        self.optimization = optimization;
        self
    }

    pub fn with_symbols(mut self, symbols: Vec<String>) -> Self {
        self.symbols = symbols;
        self
    }

    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }
}

fn default_output_path(identity: &ApplicationIdentity) -> PathBuf {
    PathBuf::from(format!("{}.vpk", identity.views_assembly_name()))
}
