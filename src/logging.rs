//! Logging setup on the `log` facade with an `env_logger` backend.
//!
//! Logs go to stderr so they never mix with reports on stdout. The level is
//! taken from `RUST_LOG` when set, otherwise from the flags:
//!
//! | flags   | level |
//! |---------|-------|
//! | `-q`    | error |
//! | (none)  | info  |
//! | `-v`    | debug |
//! | `-vv`   | trace |
//!
//! ```rust,no_run
//! use sweeper::logging::init_logging;
//!
//! init_logging(1, false, false);
//! log::debug!("visible with -v");
//! ```

use env_logger::{Builder, WriteStyle};
use log::LevelFilter;
use std::env;
use std::io::Write;

/// Initialize logging from CLI verbosity flags.
///
/// Safe to call more than once; later calls are ignored (several `run_app`
/// calls share one process in tests).
///
/// # Arguments
///
/// * `verbose` - Verbosity count from CLI (0=info, 1=debug, 2+=trace)
/// * `quiet` - Errors only (overridden by `RUST_LOG`)
/// * `no_color` - Never emit ANSI styles
pub fn init_logging(verbose: u8, quiet: bool, no_color: bool) {
    let use_env = env::var("RUST_LOG").is_ok();

    let mut builder = Builder::new();
    if use_env {
        builder.parse_default_env();
    } else {
        builder.filter_level(determine_level(verbose, quiet));
    }
    if no_color {
        builder.write_style(WriteStyle::Never);
    }

    let with_module = verbose >= 1;
    builder.format(move |buf, record| {
        let level = record.level();
        let style = buf.default_level_style(level);
        if with_module {
            writeln!(
                buf,
                "{style}{:<5}{style:#} [{}] {}",
                level,
                record.module_path().unwrap_or("unknown"),
                record.args()
            )
        } else {
            writeln!(buf, "{style}{:<5}{style:#} {}", level, record.args())
        }
    });

    if builder.try_init().is_ok() {
        log::debug!("Logging initialized at level: {:?}", log::max_level());
    }
}

/// Determine the log level from CLI flags.
fn determine_level(verbose: u8, quiet: bool) -> LevelFilter {
    if quiet {
        return LevelFilter::Error;
    }
    match verbose {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}
