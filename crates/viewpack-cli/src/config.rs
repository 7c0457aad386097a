//! Configuration file loading for the CLI
//!
//! This module handles finding and loading TOML configuration files
//! from various locations (explicit path, local directory, system directory)
//! and layering command-line overrides on top.

use std::{
    fs,
    path::{Path, PathBuf},
};

use directories::ProjectDirs;
use log::{debug, info};
use thiserror::Error;

use viewpack::{ViewpackError, config::AppConfig};

use crate::Args;

/// Configuration-related errors for CLI
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse TOML configuration: {0}")]
    Parse(String),

    #[error("Missing configuration file: {0}")]
    MissingFile(PathBuf),
}

impl From<ConfigError> for ViewpackError {
    fn from(err: ConfigError) -> Self {
        ViewpackError::Config(viewpack::ConfigError::Invalid(err.to_string()))
    }
}

/// Find and load configuration from various locations
///
/// Search order:
/// 1. Explicit path if provided
/// 2. Local project directory (viewpack/config.toml)
/// 3. Platform-specific config directory
/// 4. Default config if none found
///
/// # Errors
///
/// Returns error if:
/// - Explicit path is provided but file doesn't exist
/// - Config file exists but cannot be parsed
pub fn load_config(explicit_path: Option<impl AsRef<Path>>) -> Result<AppConfig, ViewpackError> {
    if let Some(path) = explicit_path {
        let path = path.as_ref();
        info!(path = path.display().to_string(); "Loading configuration from explicit path");
        return load_config_file(path);
    }

    let local_config = Path::new("viewpack/config.toml");
    if local_config.exists() {
        info!(path = local_config.display().to_string(); "Loading configuration from local path");
        return load_config_file(local_config);
    }

    if let Some(proj_dirs) = ProjectDirs::from("com", "viewpack", "viewpack") {
        let system_config = proj_dirs.config_dir().join("config.toml");

        if system_config.exists() {
            info!(path = system_config.display().to_string(); "Loading configuration from system path");
            return load_config_file(system_config);
        }

        debug!(path = system_config.display().to_string(); "System configuration file not found");
    } else {
        debug!("Could not determine platform-specific config directory");
    }

    debug!("No configuration file found, using default configuration");
    Ok(AppConfig::default())
}

/// Load configuration from a TOML file
fn load_config_file(path: impl AsRef<Path>) -> Result<AppConfig, ViewpackError> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(ConfigError::MissingFile(path.to_path_buf()).into());
    }

    let content = fs::read_to_string(path)?;
    let config: AppConfig =
        toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))?;

    Ok(config)
}

/// Apply command-line values on top of the loaded configuration.
pub fn apply_overrides(mut config: AppConfig, args: &Args) -> AppConfig {
    if let Some(input) = &args.input {
        config.templates.root = PathBuf::from(input);
    }
    if !args.suffixes.is_empty() {
        config.templates.suffixes = args.suffixes.clone();
    }
    if let Some(name) = &args.app_name {
        config.application.name = Some(name.clone());
    }
    if let Some(version) = &args.app_version {
        config.application.version = version.clone();
    }
    if let Some(hook) = &args.hook {
        config.application.hook = Some(hook.clone());
    }
    if let Some(output) = &args.output {
        config.output.path = Some(PathBuf::from(output));
    }

    let mut signing = config.signing;
    if let Some(key_file) = &args.key_file {
        signing = signing.with_key_file(key_file);
    }
    if args.delay_sign {
        signing = signing.with_delay_sign(true);
    }
    if args.public_sign {
        signing = signing.with_public_sign(true);
    }
    config.signing = signing;

    config
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;

    #[test]
    fn test_explicit_missing_file_is_an_error() {
        let dir = tempdir().unwrap();
        let err = load_config(Some(dir.path().join("missing.toml"))).unwrap_err();
        assert!(err.to_string().contains("Missing configuration file"));
    }

    #[test]
    fn test_invalid_toml_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[application\nname = 1").unwrap();

        let err = load_config(Some(&path)).unwrap_err();
        assert!(matches!(err, ViewpackError::Config(_)));
    }

    #[test]
    fn test_overrides_take_precedence() {
        let config: AppConfig = toml::from_str(
            r#"
            [application]
            name = "FromFile"
            version = "1.0.0.0"

            [signing]
            key_file = "file.snk"
            "#,
        )
        .unwrap();
        let args = Args {
            input: Some("other/Views".to_string()),
            app_name: Some("FromArgs".to_string()),
            public_sign: true,
            suffixes: vec!["view".to_string()],
            ..Args::default()
        };

        let config = apply_overrides(config, &args);
        assert_eq!(config.templates.root, PathBuf::from("other/Views"));
        assert_eq!(config.templates.suffixes, ["view"]);
        assert_eq!(config.application.name.as_deref(), Some("FromArgs"));
        assert_eq!(config.application.version, "1.0.0.0");
        assert_eq!(config.signing.key_file(), Some(Path::new("file.snk")));
        assert!(config.signing.public_sign());
    }
}
