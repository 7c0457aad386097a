//! Viewpack CLI entry point.

use std::{process, str::FromStr};

use clap::Parser;
use log::{LevelFilter, debug, error, info, warn};

use viewpack_cli::{
    Args,
    error_adapter::{Reportable, diagnostic_reportables, to_reportables},
};
use viewpack_core::error::Severity;

/// Render each reportable independently at a log level matching its severity.
fn report(reportables: &[Reportable<'_>]) {
    let reporter = miette::GraphicalReportHandler::new();

    for reportable in reportables {
        let mut writer = String::new();
        reporter
            .render_report(&mut writer, reportable)
            .expect("Writing to String buffer is infallible");

        match reportable.severity_level() {
            Severity::Error => error!("{writer}"),
            Severity::Warning => warn!("{writer}"),
            Severity::Info => info!("{writer}"),
        }
    }
}

fn main() {
    // Install miette's pretty panic hook early for better panic reports
    miette::set_panic_hook();

    let args = Args::parse();

    // Initialize the logger with the specified log level
    let log_level = LevelFilter::from_str(&args.log_level).unwrap_or_else(|_| {
        eprintln!(
            "Invalid log level: {}. Using 'warn' instead.",
            args.log_level
        );
        LevelFilter::Warn
    });

    env_logger::Builder::from_env(env_logger::Env::default())
        .filter_level(log_level)
        .init();

    info!(log_level:?; "Starting viewpack");
    debug!(args:?; "Parsed arguments");

    match viewpack_cli::run(&args) {
        Ok(output) => {
            report(&diagnostic_reportables(output.diagnostics()));
            info!("Completed successfully");
        }
        Err(err) => {
            report(&to_reportables(&err));
            process::exit(1);
        }
    }
}
