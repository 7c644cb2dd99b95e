//! sweeper - duplicate file finder
//!
//! Finds files with identical content under one or more directories by
//! fingerprinting their full content with one or more digest algorithms,
//! optionally confirming matches byte by byte, and then reports the
//! duplicate groups or removes or moves all but one copy of each.
//!
//! The library is usable on its own:
//!
//! ```no_run
//! use sweeper::duplicates::{DuplicateScanner, ScannerConfig};
//! use std::path::PathBuf;
//!
//! let scanner = DuplicateScanner::new(ScannerConfig::default().with_safe_mode(true));
//! for hit in scanner.scan_incremental(&[PathBuf::from(".")]).unwrap() {
//!     let hit = hit.unwrap();
//!     println!("{} duplicates {:?}", hit.path.display(), hit.members);
//! }
//! ```

pub mod actions;
pub mod cli;
pub mod config;
pub mod duplicates;
pub mod error;
pub mod logging;
pub mod output;
pub mod progress;
pub mod scanner;
pub mod signal;

use std::io::{self, Write};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use anyhow::{Context, Result};

use crate::actions::{
    move_duplicates, plan_all, prepare_destination, remove_duplicates, ActionConfig,
    ActionObserver, ActionReport,
};
use crate::cli::Cli;
use crate::config::{Action, Settings};
use crate::duplicates::{DuplicateScanner, ScannerConfig};
use crate::error::ExitCode;
use crate::output::{write_hit, ActionEcho, JsonOutput, TextOutput};
use crate::progress::Progress;

/// Run the command line application.
///
/// # Errors
///
/// Configuration errors, scan failures and aborted actions are returned for
/// the binary to map to an exit code with [`error::exit_code_for`].
pub fn run_app(cli: Cli) -> Result<ExitCode> {
    logging::init_logging(cli.verbose, cli.quiet, cli.no_color);

    let settings = Settings::from_cli(&cli)?;
    log::debug!("Settings: {:?}", settings);

    let handler = signal::install_handler()?;
    let stdout = io::stdout();
    let mut out = stdout.lock();
    run(&settings, handler.get_flag(), &mut out)
}

/// Scan and act according to resolved settings, writing reports to `out`.
///
/// # Errors
///
/// See [`run_app`].
pub fn run(settings: &Settings, shutdown: Arc<AtomicBool>, out: &mut dyn Write) -> Result<ExitCode> {
    if settings.action == Action::Move {
        prepare_destination(&settings.move_dir, settings.simulate).with_context(|| {
            format!("Cannot use {} as move destination", settings.move_dir.display())
        })?;
    }

    let mut config = ScannerConfig::default()
        .with_algorithms(settings.algorithms.clone())
        .with_block_size(settings.block_size)
        .with_safe_mode(settings.safe_mode)
        .with_strategy(settings.strategy())
        .with_shutdown_flag(shutdown);
    if settings.verbose > 0 && !settings.quiet {
        config = config.with_progress_callback(Arc::new(Progress::new(false)));
    }
    let scanner = DuplicateScanner::new(config);

    if settings.action == Action::Immediate {
        let mut found = 0usize;
        for hit in scanner.scan_incremental(&settings.roots)? {
            write_hit(out, &hit?)?;
            found += 1;
        }
        return Ok(if found == 0 {
            ExitCode::NoDuplicates
        } else {
            ExitCode::Success
        });
    }

    let (groups, _summary) = scanner.scan(&settings.roots)?;
    let found = if groups.is_empty() {
        ExitCode::NoDuplicates
    } else {
        ExitCode::Success
    };

    match settings.action {
        Action::Pprint => TextOutput::new(&groups).write_to(out)?,
        Action::Print => JsonOutput::new(&groups).write_to(out, true)?,
        Action::Remove | Action::Move => {
            let plans = plan_all(&groups, &settings.keep);
            let action_config = ActionConfig::default()
                .with_simulate(settings.simulate)
                .with_continue_on_error(settings.continue_on_error);

            let echo = settings.echo_actions().then(|| ActionEcho::new(&mut *out));
            let observer = echo.as_ref().map(|e| e as &dyn ActionObserver);
            let report = if settings.action == Action::Remove {
                remove_duplicates(&plans, &action_config, observer)
            } else {
                move_duplicates(&plans, &settings.move_dir, &action_config, observer)
            };
            return finish_action(report, found);
        }
        Action::Immediate => {}
    }
    out.flush()?;

    Ok(found)
}

fn finish_action(mut report: ActionReport, found: ExitCode) -> Result<ExitCode> {
    if report.all_succeeded() {
        return Ok(found);
    }
    let summary = report.summary();
    if report.aborted && !report.failures.is_empty() {
        let failure = report.failures.swap_remove(0);
        return Err(anyhow::Error::new(failure.error).context(summary));
    }
    log::warn!("{}", summary);
    Ok(ExitCode::PartialSuccess)
}
