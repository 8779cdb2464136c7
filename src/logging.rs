//! Logging infrastructure for filedup.
//!
//! Structured logging goes through the `log` facade with an `env_logger`
//! backend. The level is chosen by, in priority order:
//!
//! 1. `RUST_LOG`, when present in the environment
//! 2. `-q` (errors only), `-v` (debug) or `-vv` (trace)
//! 3. `info` otherwise
//!
//! Debug builds prefix each line with a timestamp; release builds print the
//! level and message only.
//!
//! # Example
//!
//! ```rust,no_run
//! use filedup::logging::init_logging;
//!
//! init_logging(1, false); // debug
//! log::debug!("Debug info here");
//! ```

use env_logger::Builder;
use log::LevelFilter;
use std::env;
use std::io::Write;
use std::time::Duration;

/// Install the global logger for the given `-v` count and `-q` flag.
///
/// Safe to call more than once; later calls are ignored, which lets tests
/// drive `run_app` repeatedly in one process.
pub fn init_logging(verbose: u8, quiet: bool) {
    let use_env = env::var("RUST_LOG").is_ok();
    let mut builder = Builder::new();

    if use_env {
        builder.parse_default_env();
    } else {
        builder.filter_level(determine_level(verbose, quiet));
    }

    configure_format(&mut builder, verbose);

    if builder.try_init().is_ok() {
        log::debug!(
            "Logging initialized at level: {:?}{}",
            log::max_level(),
            if use_env { " (from RUST_LOG)" } else { "" }
        );
    }
}

/// Map the verbosity count and quiet flag to a level.
fn determine_level(verbose: u8, quiet: bool) -> LevelFilter {
    if quiet {
        LevelFilter::Error
    } else {
        match verbose {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }
}

fn configure_format(builder: &mut Builder, verbose: u8) {
    #[cfg(debug_assertions)]
    {
        builder.format(move |buf, record| {
            let timestamp = buf.timestamp_seconds();
            let level = record.level();
            let level_style = buf.default_level_style(level);

            if verbose >= 1 {
                writeln!(
                    buf,
                    "{} - {level_style}{:<5}{level_style:#} [{}] {}",
                    timestamp,
                    level,
                    record.module_path().unwrap_or("unknown"),
                    record.args()
                )
            } else {
                writeln!(
                    buf,
                    "{} - {level_style}{:<5}{level_style:#} {}",
                    timestamp,
                    level,
                    record.args()
                )
            }
        });
    }

    #[cfg(not(debug_assertions))]
    {
        let _ = verbose;
        builder.format(|buf, record| {
            let level = record.level();
            let level_style = buf.default_level_style(level);
            writeln!(
                buf,
                "{level_style}{:<5}{level_style:#} {}",
                level,
                record.args()
            )
        });
    }
}

/// Format an elapsed time as `HH:MM:SS`.
///
/// ```
/// use filedup::logging::format_elapsed;
/// use std::time::Duration;
///
/// assert_eq!(format_elapsed(Duration::from_secs(3725)), "01:02:05");
/// ```
#[must_use]
pub fn format_elapsed(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    format!("{:02}:{:02}:{:02}", secs / 3600, (secs % 3600) / 60, secs % 60)
}
