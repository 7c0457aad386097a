//! Application identity and signing options.

use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Name and version of the application whose views are precompiled.
///
/// The name determines the output assembly name; the version is emitted
/// verbatim into the assembly version attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplicationIdentity {
    name: String,
    version: String,
}

impl ApplicationIdentity {
    /// Create a new identity.
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
        }
    }

    /// Application name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Application version string.
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Name of the precompiled views assembly.
    pub fn views_assembly_name(&self) -> String {
        format!("{}.PrecompiledViews", self.name)
    }
}

/// Strong-name signing options.
///
/// Read once from configuration at pipeline start and never mutated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SigningOptions {
    /// Path to the key container (`.snk`).
    #[serde(default)]
    key_file: Option<PathBuf>,

    /// Reserve space for the signature without signing.
    #[serde(default)]
    delay_sign: bool,

    /// Sign with the public key only.
    #[serde(default)]
    public_sign: bool,
}

impl SigningOptions {
    /// Create signing options.
    pub fn new(key_file: Option<PathBuf>, delay_sign: bool, public_sign: bool) -> Self {
        Self {
            key_file,
            delay_sign,
            public_sign,
        }
    }

    /// Key file path, or `None` when absent or empty.
    pub fn key_file(&self) -> Option<&Path> {
        self.key_file
            .as_deref()
            .filter(|path| !path.as_os_str().is_empty())
    }

    /// Whether delay signing was requested.
    pub fn delay_sign(&self) -> bool {
        self.delay_sign
    }

    /// Whether public signing was requested.
    pub fn public_sign(&self) -> bool {
        self.public_sign
    }

    /// Return a copy with a different key file.
    pub fn with_key_file(mut self, key_file: impl Into<PathBuf>) -> Self {
        self.key_file = Some(key_file.into());
        self
    }

    /// Return a copy with the delay-sign flag set.
    pub fn with_delay_sign(mut self, delay_sign: bool) -> Self {
        self.delay_sign = delay_sign;
        self
    }

    /// Return a copy with the public-sign flag set.
    pub fn with_public_sign(mut self, public_sign: bool) -> Self {
        self.public_sign = public_sign;
        self
    }
}
