//! filedup - find duplicate files across directory trees by content.
//!
//! Files are grouped by exact size first; only sizes shared by two or more
//! files are hashed, and files whose digests match are reported together.
//! Both phases run on a bounded rayon pool.
//!
//! The library entry point is [`duplicates::find_duplicates`]; the binary
//! wraps it with [`run_app`].

pub mod cli;
pub mod config;
pub mod duplicates;
pub mod error;
pub mod logging;
pub mod output;
pub mod progress;
pub mod scanner;
pub mod signal;

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::CommandFactory;

use crate::cli::{Cli, OutputFormat};
use crate::config::Config;
use crate::duplicates::DuplicateFinder;
use crate::error::{ExitCode, InputError};
use crate::output::{JsonOutput, TextOutput};
use crate::progress::Progress;

/// Run the application, writing results to stdout.
///
/// # Errors
///
/// Returns an error for invalid roots, bad configuration, an inaccessible
/// root, an interrupted run, or a strict-mode file error.
pub fn run_app(cli: Cli) -> Result<ExitCode> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    run_app_with_output(cli, &mut out)
}

/// Run the application, writing results to `out`.
///
/// # Errors
///
/// See [`run_app`].
pub fn run_app_with_output<W: Write>(cli: Cli, out: &mut W) -> Result<ExitCode> {
    if cli.dirs.is_empty() {
        let help = Cli::command().render_help();
        write!(out, "{}", help)?;
        return Ok(ExitCode::Success);
    }

    logging::init_logging(cli.verbose, cli.quiet);

    validate_roots(&cli.dirs)?;

    let mut config = Config::load(cli.config.as_deref())?;
    config.apply_cli(&cli);
    log::debug!("Effective configuration: {:?}", config);

    let handler = signal::install_handler()?;
    let flag = handler.get_flag();

    let progress = Arc::new(Progress::new(!config.show_progress()));
    let finder_config = config
        .finder_config()
        .with_shutdown_flag(flag.clone())
        .with_progress_callback(progress);
    let finder = DuplicateFinder::new(finder_config).with_hasher(config.algorithm.hasher(Some(flag)));

    log::info!("Start processing...");
    let start = Instant::now();

    let (duplicates, summary) = finder.find_duplicates(&cli.dirs)?;

    // Each skipped file was already logged where it failed.
    let exit_code = if summary.is_partial() {
        ExitCode::PartialSuccess
    } else {
        ExitCode::Success
    };

    match config.output {
        OutputFormat::Text => TextOutput::new(&duplicates)
            .write_to(out)
            .context("Failed to write results")?,
        OutputFormat::Json => JsonOutput::new(&duplicates, &summary, exit_code)
            .write_to(out, true)
            .context("Failed to write results")?,
    }

    log::info!(
        "{} groups, {} files skipped",
        duplicates.len(),
        summary.errors.len()
    );
    log::info!(
        "Processing done in {} (h:min:s)",
        logging::format_elapsed(start.elapsed())
    );

    Ok(exit_code)
}

/// Check that every root exists and is a directory.
///
/// # Errors
///
/// Returns the [`InputError`] for the first rejected root.
pub fn validate_roots(roots: &[PathBuf]) -> Result<(), InputError> {
    for root in roots {
        if !root.exists() {
            return Err(InputError::NotFound(root.clone()));
        }
        if !root.is_dir() {
            return Err(InputError::NotADirectory(root.clone()));
        }
    }
    Ok(())
}
