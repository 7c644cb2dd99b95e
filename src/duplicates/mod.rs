//! Duplicate detection module.
//!
//! This module provides functionality for:
//! - Fingerprint-keyed grouping with optional byte verification
//! - Full and incremental (pull-based) scans over root directories
//! - Duplicate group management

pub mod finder;
pub mod groups;

pub use finder::{
    DuplicateHit, DuplicateScanner, FinderError, IncrementalScan, ScanSummary, ScannerConfig,
    PHASE_GATHERING, PHASE_HASHING,
};
pub use groups::{DuplicateGroup, DuplicateIndex, GroupState};
