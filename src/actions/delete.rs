//! Removing duplicate files, and the machinery shared with moving them.
//!
//! # Overview
//!
//! Actions consume [`ActionPlan`]s: every extra of every plan is removed (or
//! moved, see [`relocate`](super::relocate)) while the kept file is never
//! touched. In simulate mode the same operations are reported but the
//! filesystem is left alone.
//!
//! # Failure policy
//!
//! By default the first failing file aborts the rest of the run, and the
//! report comes back with [`ActionReport::aborted`] set. With
//! [`ActionConfig::continue_on_error`] each failure is recorded and the
//! remaining files are still processed.
//!
//! # Example
//!
//! ```no_run
//! use sweeper::actions::{plan_all, remove_duplicates, ActionConfig, KeepPolicy};
//! use sweeper::duplicates::DuplicateScanner;
//! use std::path::PathBuf;
//!
//! let (groups, _) = DuplicateScanner::with_defaults()
//!     .scan(&[PathBuf::from(".")])
//!     .unwrap();
//! let plans = plan_all(&groups, &KeepPolicy::default());
//!
//! let report = remove_duplicates(&plans, &ActionConfig::simulate(), None);
//! println!("{}", report.summary());
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use super::ActionPlan;

/// Error type for remove and move operations.
#[derive(Debug, Error)]
pub enum ActionError {
    /// File was not found (may have been deleted or moved already).
    #[error("file not found: {0}")]
    NotFound(PathBuf),

    /// Permission denied when removing or moving.
    #[error("permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// Move destination exists but is not a directory.
    #[error("{0} is not a directory")]
    DestinationNotADirectory(PathBuf),

    /// A file of the same name is already present in the move destination.
    #[error("cannot move {path}: {target} already exists")]
    TargetExists {
        /// File being moved
        path: PathBuf,
        /// Occupied target path
        target: PathBuf,
    },

    /// General I/O error.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: io::Error,
    },
}

impl ActionError {
    /// Classify an I/O error for `path`.
    #[must_use]
    pub fn from_io(path: &Path, err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => Self::NotFound(path.to_path_buf()),
            io::ErrorKind::PermissionDenied => Self::PermissionDenied(path.to_path_buf()),
            _ => Self::Io {
                path: path.to_path_buf(),
                source: err,
            },
        }
    }

    /// Get the path associated with this error.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::NotFound(p)
            | Self::PermissionDenied(p)
            | Self::DestinationNotADirectory(p)
            | Self::TargetExists { path: p, .. }
            | Self::Io { path: p, .. } => p,
        }
    }
}

/// Configuration for remove and move actions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ActionConfig {
    /// Report the operations without touching the filesystem.
    pub simulate: bool,
    /// Keep processing after a failing file instead of aborting.
    pub continue_on_error: bool,
}

impl ActionConfig {
    /// Config for a dry run.
    #[must_use]
    pub fn simulate() -> Self {
        Self {
            simulate: true,
            ..Self::default()
        }
    }

    /// Enable/disable simulate mode.
    #[must_use]
    pub fn with_simulate(mut self, simulate: bool) -> Self {
        self.simulate = simulate;
        self
    }

    /// Enable/disable continue on error.
    #[must_use]
    pub fn with_continue_on_error(mut self, continue_on_error: bool) -> Self {
        self.continue_on_error = continue_on_error;
        self
    }
}

/// A single file operation, performed or simulated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    /// Remove `path`.
    Remove {
        /// File removed
        path: PathBuf,
    },
    /// Move `path` to `target`.
    Move {
        /// File moved
        path: PathBuf,
        /// Destination directory
        dest: PathBuf,
        /// Full target path
        target: PathBuf,
    },
}

impl Operation {
    /// The extra file this operation acts on.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::Remove { path } | Self::Move { path, .. } => path,
        }
    }
}

/// A file that could not be removed or moved.
#[derive(Debug)]
pub struct ActionFailure {
    /// The extra file
    pub path: PathBuf,
    /// What went wrong
    pub error: ActionError,
}

/// Outcome of an action run.
#[derive(Debug, Default)]
pub struct ActionReport {
    /// Operations performed (or, when simulating, that would have been)
    pub operations: Vec<Operation>,
    /// Files that failed
    pub failures: Vec<ActionFailure>,
    /// Whether the run was a simulation
    pub simulated: bool,
    /// Whether the run stopped at its first failure
    pub aborted: bool,
}

impl ActionReport {
    /// Number of operations performed or simulated.
    #[must_use]
    pub fn success_count(&self) -> usize {
        self.operations.len()
    }

    /// Number of failed files.
    #[must_use]
    pub fn failure_count(&self) -> usize {
        self.failures.len()
    }

    /// Check if every file was handled.
    #[must_use]
    pub fn all_succeeded(&self) -> bool {
        self.failures.is_empty()
    }

    /// Human-readable summary of the run.
    #[must_use]
    pub fn summary(&self) -> String {
        let verb = if self.simulated { "Would process" } else { "Processed" };
        if self.all_succeeded() {
            format!("{verb} {} file(s)", self.success_count())
        } else {
            format!(
                "{verb} {} file(s), {} failed{}",
                self.success_count(),
                self.failure_count(),
                if self.aborted { " (aborted)" } else { "" }
            )
        }
    }
}

/// Callbacks fired while an action runs.
///
/// Used to echo the plan and each operation as it happens.
pub trait ActionObserver {
    /// Called before the extras of a group are processed.
    fn on_group(&self, _plan: &ActionPlan) {}

    /// Called before each operation is carried out.
    fn on_operation(&self, _operation: &Operation) {}

    /// Called after an operation failed.
    fn on_failure(&self, _path: &Path, _error: &ActionError) {}
}

/// Remove every extra file of every plan.
///
/// # Arguments
///
/// * `plans` - Plans from [`plan_all`](super::plan_all)
/// * `config` - Simulate and failure policy
/// * `observer` - Optional observer notified before each operation
#[must_use]
pub fn remove_duplicates(
    plans: &[ActionPlan],
    config: &ActionConfig,
    observer: Option<&dyn ActionObserver>,
) -> ActionReport {
    run_plans(
        plans,
        config,
        observer,
        |path| Ok(Operation::Remove {
            path: path.to_path_buf(),
        }),
        |op| match op {
            Operation::Remove { path } => remove_file(path),
            Operation::Move { .. } => Ok(()),
        },
    )
}

/// Remove a single file.
///
/// # Errors
///
/// - `NotFound` if the file is already gone
/// - `PermissionDenied` if removal is not allowed
/// - `Io` for any other failure
pub fn remove_file(path: &Path) -> Result<(), ActionError> {
    fs::remove_file(path).map_err(|e| {
        log::error!("Failed to remove {}: {}", path.display(), e);
        ActionError::from_io(path, e)
    })?;
    log::debug!("Removed {}", path.display());
    Ok(())
}

/// Drive an action over all plans.
///
/// `prepare` turns an extra into its operation (and may fail, e.g. an
/// occupied move target); `perform` carries it out unless simulating.
pub(crate) fn run_plans<P, X>(
    plans: &[ActionPlan],
    config: &ActionConfig,
    observer: Option<&dyn ActionObserver>,
    mut prepare: P,
    mut perform: X,
) -> ActionReport
where
    P: FnMut(&Path) -> Result<Operation, ActionError>,
    X: FnMut(&Operation) -> Result<(), ActionError>,
{
    let mut report = ActionReport {
        simulated: config.simulate,
        ..ActionReport::default()
    };

    'plans: for plan in plans {
        if let Some(obs) = observer {
            obs.on_group(plan);
        }

        for path in &plan.extras {
            let outcome = prepare(path).and_then(|op| {
                if let Some(obs) = observer {
                    obs.on_operation(&op);
                }
                if !config.simulate {
                    perform(&op)?;
                }
                Ok(op)
            });

            match outcome {
                Ok(op) => report.operations.push(op),
                Err(error) => {
                    log::warn!("Failed to process {}: {}", path.display(), error);
                    if let Some(obs) = observer {
                        obs.on_failure(path, &error);
                    }
                    report.failures.push(ActionFailure {
                        path: path.clone(),
                        error,
                    });

                    if !config.continue_on_error {
                        log::debug!("Stopping at first failure (continue_on_error=false)");
                        report.aborted = true;
                        break 'plans;
                    }
                }
            }
        }
    }

    log::debug!("{}", report.summary());
    report
}
