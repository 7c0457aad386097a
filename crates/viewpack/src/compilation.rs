//! The compilation value threaded through the pipeline.
//!
//! A [`Compilation`] is the binary unit in progress: an assembly name,
//! [`CompilationOptions`] and an ordered list of [`SourceUnit`]s. It is
//! immutable by replacement. Every change consumes the value and returns a
//! new one, so each pipeline stage hands its successor a fresh compilation
//! and nothing is ever aliased.

use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

/// A unit of source text handed to the compiler.
///
/// Text is shared so that cloning a compilation stays cheap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceUnit {
    text: Arc<str>,
    origin: Option<PathBuf>,
}

impl SourceUnit {
    /// Create a source unit from text and the file it was generated from.
    pub fn new(text: impl Into<Arc<str>>, origin: Option<PathBuf>) -> Self {
        Self {
            text: text.into(),
            origin,
        }
    }

    /// Create a synthetic source unit with no originating file.
    pub fn synthetic(text: impl Into<Arc<str>>) -> Self {
        Self::new(text, None)
    }

    /// The source text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The template this unit was generated from, if any.
    pub fn origin(&self) -> Option<&Path> {
        self.origin.as_deref()
    }
}

/// Strong-name provider used when signing the output unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrongNameProvider {
    /// File-based provider that reads key containers from disk.
    Desktop,
}

/// Optimization level passed through to the compiler backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptimizationLevel {
    /// No optimization.
    Debug,
    /// Full optimization.
    #[default]
    Release,
}

/// Compilation options.
///
/// Every setter returns a new value. Signing sub-options are only ever set
/// by assembly metadata injection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompilationOptions {
    strong_name_provider: Option<StrongNameProvider>,
    crypto_key_file: Option<PathBuf>,
    crypto_public_key: Option<Vec<u8>>,
    delay_sign: Option<bool>,
    public_sign: bool,
    optimization: OptimizationLevel,
    symbols: Vec<String>,
}

impl CompilationOptions {
    /// The configured strong-name provider.
    pub fn strong_name_provider(&self) -> Option<StrongNameProvider> {
        self.strong_name_provider
    }

    /// Path to the full key container used for signing.
    pub fn crypto_key_file(&self) -> Option<&Path> {
        self.crypto_key_file.as_deref()
    }

    /// Public key blob used for public signing.
    pub fn crypto_public_key(&self) -> Option<&[u8]> {
        self.crypto_public_key.as_deref()
    }

    /// Delay-sign flag, `None` when never set.
    pub fn delay_sign(&self) -> Option<bool> {
        self.delay_sign
    }

    /// Whether the output is public-signed.
    pub fn public_sign(&self) -> bool {
        self.public_sign
    }

    /// Optimization level.
    pub fn optimization(&self) -> OptimizationLevel {
        self.optimization
    }

    /// Conditional compilation symbols.
    pub fn symbols(&self) -> &[String] {
        &self.symbols
    }

    pub fn with_strong_name_provider(mut self, provider: StrongNameProvider) -> Self {
        self.strong_name_provider = Some(provider);
        self
    }

    /// Sign with a full key container. Clears any public key.
    pub fn with_crypto_key_file(mut self, key_file: impl Into<PathBuf>) -> Self {
        self.crypto_key_file = Some(key_file.into());
        self.crypto_public_key = None;
        self
    }

    /// Sign with a public key blob only. Clears any key file.
    pub fn with_crypto_public_key(mut self, public_key: Vec<u8>) -> Self {
        self.crypto_public_key = Some(public_key);
        self.crypto_key_file = None;
        self
    }

    pub fn with_delay_sign(mut self, delay_sign: bool) -> Self {
        self.delay_sign = Some(delay_sign);
        self
    }

    pub fn with_public_sign(mut self, public_sign: bool) -> Self {
        self.public_sign = public_sign;
        self
    }

    pub fn with_optimization(mut self, optimization: OptimizationLevel) -> Self {
        self.optimization = optimization;
        self
    }

    /// Add a conditional compilation symbol; duplicates are ignored.
    pub fn with_symbol(mut self, symbol: impl Into<String>) -> Self {
        let symbol = symbol.into();
        if !self.symbols.contains(&symbol) {
            self.symbols.push(symbol);
        }
        self
    }
}

/// The binary unit in progress.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Compilation {
    assembly_name: String,
    options: CompilationOptions,
    units: Vec<SourceUnit>,
}

impl Compilation {
    /// Create a compilation from source units.
    pub fn new(
        assembly_name: impl Into<String>,
        options: CompilationOptions,
        units: Vec<SourceUnit>,
    ) -> Self {
        Self {
            assembly_name: assembly_name.into(),
            options,
            units,
        }
    }

    /// Name of the assembly being produced.
    pub fn assembly_name(&self) -> &str {
        &self.assembly_name
    }

    /// Current compilation options.
    pub fn options(&self) -> &CompilationOptions {
        &self.options
    }

    /// Source units in insertion order.
    pub fn units(&self) -> &[SourceUnit] {
        &self.units
    }

    /// Return a new compilation with `units` appended.
    #[must_use]
    pub fn add_source_units(mut self, units: impl IntoIterator<Item = SourceUnit>) -> Self {
        self.units.extend(units);
        self
    }

    /// Return a new compilation with its options replaced.
    #[must_use]
    pub fn with_options(mut self, options: CompilationOptions) -> Self {
        self.options = options;
        self
    }
}
