//! Assembly metadata and strong-name signing.
//!
//! The metadata unit carries the application version as an assembly-level
//! attribute. When a key file is configured, the compilation's signing
//! options are rewritten according to a [`SigningStrategy`] chosen by the
//! pure [`derive_signing_strategy`] function.
//!
//! Signing with a private key is only available on Windows-like platforms.
//! Everywhere else, and whenever public signing is requested, the public key
//! is extracted from the key container and the output is public-signed so
//! that a later re-signing step can complete it.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use log::{debug, info};
use thiserror::Error;

use viewpack_core::identity::SigningOptions;

use crate::{
    compilation::{CompilationOptions, StrongNameProvider},
    registry::escape_string_literal,
    snk::{self, KeyBlobError},
};

/// Fully-qualified name of the version attribute.
pub const VERSION_ATTRIBUTE: &str = "System.Reflection.AssemblyVersionAttribute";

/// Errors raised while applying signing options.
#[derive(Debug, Error)]
pub enum SigningError {
    #[error("key file `{}` does not exist", path.display())]
    MissingKeyFile { path: PathBuf },

    #[error("failed to read key file `{}`: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("key file `{}` is not a valid key container: {source}", path.display())]
    InvalidKeyFile {
        path: PathBuf,
        #[source]
        source: KeyBlobError,
    },
}

/// Platform family, as far as signing is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    /// Windows-like platforms with private-key signing support.
    Windows,
    /// Every other platform.
    Unix,
}

impl Platform {
    /// The platform this binary runs on.
    pub fn current() -> Self {
        if cfg!(windows) {
            Platform::Windows
        } else {
            Platform::Unix
        }
    }
}

/// How the output unit is strong-name signed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SigningStrategy {
    /// Sign with the full key container.
    FullKey { key_file: PathBuf, delay_sign: bool },
    /// Sign with the public key extracted from the key container.
    PublicKeyOnly { key_file: PathBuf },
}

/// Choose a signing strategy.
///
/// Returns `None` when no key file is configured.
pub fn derive_signing_strategy(
    platform: Platform,
    options: &SigningOptions,
) -> Option<SigningStrategy> {
    let key_file = options.key_file()?.to_path_buf();

    if platform != Platform::Windows || options.public_sign() {
        Some(SigningStrategy::PublicKeyOnly { key_file })
    } else {
        Some(SigningStrategy::FullKey {
            key_file,
            delay_sign: options.delay_sign(),
        })
    }
}

impl SigningStrategy {
    /// Rewrite the signing sub-options of `options`.
    ///
    /// Only the strong-name provider, key file / public key and delay-sign
    /// flag are touched.
    ///
    /// # Errors
    ///
    /// Returns [`SigningError`] when the key file is missing, unreadable or
    /// not a valid key container.
    pub fn apply(&self, options: CompilationOptions) -> Result<CompilationOptions, SigningError> {
        let options = options.with_strong_name_provider(StrongNameProvider::Desktop);

        match self {
            SigningStrategy::PublicKeyOnly { key_file } => {
                let key_file = absolute_key_path(key_file)?;
                let bytes = read_key_file(&key_file)?;
                let public_key = snk::extract_public_key(&bytes).map_err(|source| {
                    SigningError::InvalidKeyFile {
                        path: key_file.clone(),
                        source,
                    }
                })?;

                info!(key_file = key_file.display().to_string(); "Public-signing precompiled views");
                Ok(options.with_crypto_public_key(public_key))
            }
            SigningStrategy::FullKey {
                key_file,
                delay_sign,
            } => {
                let key_file = absolute_key_path(key_file)?;
                let bytes = read_key_file(&key_file)?;
                snk::extract_public_key(&bytes).map_err(|source| SigningError::InvalidKeyFile {
                    path: key_file.clone(),
                    source,
                })?;

                info!(
                    key_file = key_file.display().to_string(),
                    delay_sign = *delay_sign;
                    "Signing precompiled views with key file"
                );
                Ok(options
                    .with_crypto_key_file(key_file)
                    .with_delay_sign(*delay_sign))
            }
        }
    }
}

/// Source text of the metadata unit for `version`.
pub fn version_attribute_source(version: &str) -> String {
    format!(
        "[assembly: global::{VERSION_ATTRIBUTE}(\"{}\")]\n",
        escape_string_literal(version)
    )
}

fn absolute_key_path(key_file: &Path) -> Result<PathBuf, SigningError> {
    std::path::absolute(key_file).map_err(|source| SigningError::Read {
        path: key_file.to_path_buf(),
        source,
    })
}

fn read_key_file(key_file: &Path) -> Result<Vec<u8>, SigningError> {
    if !key_file.is_file() {
        return Err(SigningError::MissingKeyFile {
            path: key_file.to_path_buf(),
        });
    }
    debug!(key_file = key_file.display().to_string(); "Reading key file");
    fs::read(key_file).map_err(|source| SigningError::Read {
        path: key_file.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use tempfile::NamedTempFile;

    use super::*;
    use crate::snk::tests::{private_key_blob, public_key_blob_for};

    fn key_file_with(bytes: &[u8]) -> NamedTempFile {
        let file = NamedTempFile::new().unwrap();
        fs::write(file.path(), bytes).unwrap();
        file
    }

    #[test]
    fn test_no_key_file_means_no_strategy() {
        assert_eq!(
            derive_signing_strategy(Platform::Windows, &SigningOptions::default()),
            None
        );
        let empty = SigningOptions::new(Some(PathBuf::new()), true, true);
        assert_eq!(derive_signing_strategy(Platform::Unix, &empty), None);
    }

    #[test]
    fn test_non_windows_uses_public_key() {
        let options = SigningOptions::default().with_key_file("key.snk");
        assert_eq!(
            derive_signing_strategy(Platform::Unix, &options),
            Some(SigningStrategy::PublicKeyOnly {
                key_file: PathBuf::from("key.snk")
            })
        );
    }

    #[test]
    fn test_public_sign_uses_public_key_on_windows() {
        let options = SigningOptions::default()
            .with_key_file("key.snk")
            .with_public_sign(true)
            .with_delay_sign(true);
        assert!(matches!(
            derive_signing_strategy(Platform::Windows, &options),
            Some(SigningStrategy::PublicKeyOnly { .. })
        ));
    }

    #[test]
    fn test_windows_uses_full_key_with_delay_sign() {
        let options = SigningOptions::default()
            .with_key_file("key.snk")
            .with_delay_sign(true);
        assert_eq!(
            derive_signing_strategy(Platform::Windows, &options),
            Some(SigningStrategy::FullKey {
                key_file: PathBuf::from("key.snk"),
                delay_sign: true,
            })
        );
    }

    #[test]
    fn test_version_attribute_source() {
        assert_eq!(
            version_attribute_source("2.1.0.0"),
            "[assembly: global::System.Reflection.AssemblyVersionAttribute(\"2.1.0.0\")]\n"
        );
        assert!(version_attribute_source("1\"0").contains("(\"1\\\"0\")"));
    }

    #[test]
    fn test_public_key_only_never_copies_private_material() {
        let blob = private_key_blob(1024);
        let file = key_file_with(&blob);
        let strategy = SigningStrategy::PublicKeyOnly {
            key_file: file.path().to_path_buf(),
        };

        let options = strategy.apply(CompilationOptions::default()).unwrap();

        assert_eq!(
            options.strong_name_provider(),
            Some(StrongNameProvider::Desktop)
        );
        assert!(options.crypto_key_file().is_none());
        assert!(options.delay_sign().is_none());
        let public_key = options.crypto_public_key().unwrap();
        assert_eq!(public_key, public_key_blob_for(&blob).as_slice());
        // Header + PUBLICKEYBLOB header + RSAPUBKEY + modulus, nothing more.
        assert_eq!(public_key.len(), 12 + 8 + 12 + 128);
    }

    #[test]
    fn test_full_key_sets_key_file_and_delay_sign() {
        let file = key_file_with(&private_key_blob(1024));
        let strategy = SigningStrategy::FullKey {
            key_file: file.path().to_path_buf(),
            delay_sign: true,
        };

        let options = strategy.apply(CompilationOptions::default()).unwrap();

        assert!(options.crypto_key_file().unwrap().is_absolute());
        assert_eq!(options.delay_sign(), Some(true));
        assert!(options.crypto_public_key().is_none());
    }

    #[test]
    fn test_missing_key_file_is_signing_error() {
        let strategy = SigningStrategy::PublicKeyOnly {
            key_file: PathBuf::from("definitely/not/here.snk"),
        };
        let err = strategy.apply(CompilationOptions::default()).unwrap_err();
        assert!(matches!(err, SigningError::MissingKeyFile { .. }));
    }

    #[test]
    fn test_invalid_key_file_is_signing_error() {
        let file = key_file_with(b"not a key");
        let strategy = SigningStrategy::FullKey {
            key_file: file.path().to_path_buf(),
            delay_sign: false,
        };
        let err = strategy.apply(CompilationOptions::default()).unwrap_err();
        assert!(matches!(err, SigningError::InvalidKeyFile { .. }));
    }
}
