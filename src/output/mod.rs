//! Output formatters for duplicate scan results.
//!
//! This module provides the report formats:
//! - JSON mapping of fingerprint to paths (`print`), and JSON lines for
//!   incremental hits (`immediate`)
//! - Plain text path blocks (`pprint`) and remove/move echo lines
//!
//! # Example
//!
//! ```no_run
//! use sweeper::duplicates::DuplicateScanner;
//! use sweeper::output::TextOutput;
//! use std::path::PathBuf;
//!
//! let (groups, _) = DuplicateScanner::with_defaults().scan(&[PathBuf::from(".")]).unwrap();
//! print!("{}", TextOutput::new(&groups).render());
//! ```

pub mod json;
pub mod text;

// Re-export main types
pub use json::{write_hit, JsonHit, JsonOutput, JsonOutputError};
pub use text::{ActionEcho, TextOutput};
