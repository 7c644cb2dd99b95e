//! File actions module.
//!
//! This module provides functionality for:
//! - Choosing the file to keep in each duplicate group ([`plan`])
//! - Removing the extras ([`delete`])
//! - Moving the extras into a destination directory ([`relocate`])
//!
//! Both actions support a simulate mode that reports every operation without
//! touching the filesystem.
//!
//! ```no_run
//! use sweeper::actions::{move_duplicates, plan_all, prepare_destination, ActionConfig, KeepPolicy};
//! use sweeper::duplicates::DuplicateScanner;
//! use std::path::{Path, PathBuf};
//!
//! let dest = Path::new("./dups");
//! prepare_destination(dest, false).unwrap();
//!
//! let (groups, _) = DuplicateScanner::with_defaults().scan(&[PathBuf::from(".")]).unwrap();
//! let plans = plan_all(&groups, &KeepPolicy::from_prefix(Some("/home/me/photos")));
//! let report = move_duplicates(&plans, dest, &ActionConfig::default(), None);
//! ```

pub mod delete;
pub mod plan;
pub mod relocate;

pub use delete::{
    remove_duplicates, remove_file, ActionConfig, ActionError, ActionFailure, ActionObserver,
    ActionReport, Operation,
};
pub use plan::{plan, plan_all, ActionPlan, KeepPolicy};
pub use relocate::{move_duplicates, move_file, prepare_destination};
