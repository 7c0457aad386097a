//! Error types for viewpack operations.
//!
//! This module provides the main error type [`ViewpackError`] which wraps
//! the fatal conditions that stop a precompilation run, and
//! [`ConfigError`] for invalid input configuration.

use std::{io, path::PathBuf};

use thiserror::Error;

use viewpack_core::{error::DiagnosticError, template::LogicalPath};

use crate::{hook::HookError, metadata::SigningError};

/// Configuration errors. Always fatal; reported before any output exists.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("template root `{}` does not exist", .0.display())]
    MissingTemplateRoot(PathBuf),

    #[error("template root `{}` is not a directory", .0.display())]
    TemplateRootNotDirectory(PathBuf),

    #[error(
        "templates `{}` and `{}` both map to view `{logical_path}`",
        first.display(),
        second.display()
    )]
    DuplicateLogicalPath {
        logical_path: LogicalPath,
        first: PathBuf,
        second: PathBuf,
    },

    #[error("template `{}` has a name that is not valid UTF-8", .0.display())]
    NonUnicodeTemplatePath(PathBuf),

    #[error(transparent)]
    Hook(#[from] HookError),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// The main error type for viewpack operations.
///
/// # Diagnostic Variants
///
/// The `Compilation` variant carries every diagnostic collected during the
/// run, including warnings from templates that translated cleanly, so the
/// full report survives the failure.
#[derive(Debug, Error)]
pub enum ViewpackError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("signing error: {0}")]
    Signing(#[from] SigningError),

    #[error("{0}")]
    Compilation(#[from] DiagnosticError),

    #[error("failed to write `{}`: {source}", path.display())]
    Output {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl From<HookError> for ViewpackError {
    fn from(err: HookError) -> Self {
        Self::Config(ConfigError::Hook(err))
    }
}
