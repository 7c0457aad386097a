//! Command-line argument definitions for the viewpack CLI.
//!
//! This module defines the [`Args`] structure parsed from the command line
//! using [`clap`]. Arguments select the template tree and output file, the
//! configuration file, the application identity, signing options and
//! logging verbosity. Every value given here overrides the configuration.

use clap::Parser;

/// Command-line arguments for the viewpack precompiler
#[derive(Parser, Debug, Default)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Directory holding the template tree
    #[arg(help = "Template root directory (defaults to the configured root)")]
    pub input: Option<String>,

    /// Path to the output unit
    #[arg(short, long)]
    pub output: Option<String>,

    /// Path to configuration file (TOML)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Application name; the output is named `<name>.PrecompiledViews`
    #[arg(long)]
    pub app_name: Option<String>,

    /// Version stamped into the output
    #[arg(long)]
    pub app_version: Option<String>,

    /// Strong-name key file (.snk)
    #[arg(long)]
    pub key_file: Option<String>,

    /// Delay-sign the output
    #[arg(long)]
    pub delay_sign: bool,

    /// Public-sign the output with the key file's public key
    #[arg(long)]
    pub public_sign: bool,

    /// Built-in configure-compilation hook to apply (debug, trace)
    #[arg(long)]
    pub hook: Option<String>,

    /// Template file suffix; may be repeated
    #[arg(long = "suffix")]
    pub suffixes: Vec<String>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    pub log_level: String,
}
