//! Duplicate scanner driving enumeration, fingerprinting and grouping.
//!
//! # Overview
//!
//! For every path produced by the [`Walker`], in enumeration order:
//! 1. compute its [`Fingerprint`]
//! 2. insert it into the [`DuplicateIndex`]
//! 3. in safe mode, byte-compare it against the existing members of its
//!    fingerprint group before it is accepted
//!
//! [`DuplicateScanner::scan`] runs the whole walk and returns the final
//! groups. [`DuplicateScanner::scan_incremental`] returns a pull-based
//! iterator that yields a [`DuplicateHit`] every time a file is accepted as
//! the second or later member of a group, so a group can show up several
//! times with a growing member list.
//!
//! # Failures
//!
//! An I/O error while fingerprinting or comparing any file aborts the whole
//! scan; the file is not skipped. This is deliberately stricter than
//! enumeration, where unreadable directories are skipped because they
//! contribute no files. A fingerprint match without byte equality (safe mode)
//! is not an error: it is logged, counted in [`ScanSummary::collisions`] and
//! the file is left out of the group.
//!
//! # Example
//!
//! ```no_run
//! use sweeper::duplicates::{DuplicateScanner, ScannerConfig};
//! use sweeper::scanner::HashAlgorithm;
//! use std::path::PathBuf;
//!
//! let config = ScannerConfig::default()
//!     .with_algorithms(vec![HashAlgorithm::Md5])
//!     .with_safe_mode(true);
//! let scanner = DuplicateScanner::new(config);
//!
//! let (groups, summary) = scanner.scan(&[PathBuf::from(".")]).unwrap();
//! println!("{} groups, {} extra copies", groups.len(), summary.duplicate_files);
//! ```

use std::iter::FusedIterator;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Serialize;

use super::{DuplicateGroup, DuplicateIndex, GroupState};
use crate::progress::ProgressCallback;
use crate::scanner::{
    ByteComparator, EnumerationStrategy, FileIter, Fingerprint, Fingerprinter, HashAlgorithm,
    HashError, Hasher, ScanError, Walker, DEFAULT_BLOCK_SIZE,
};

/// Progress phase name while pre-gathering the file list.
pub const PHASE_GATHERING: &str = "gathering";
/// Progress phase name while fingerprinting files.
pub const PHASE_HASHING: &str = "hashing";

/// Configuration for the duplicate scanner.
#[derive(Clone)]
pub struct ScannerConfig {
    /// Digest algorithms, in fingerprint order.
    pub algorithms: Vec<HashAlgorithm>,
    /// Read block size for hashing and byte comparison.
    pub block_size: usize,
    /// Byte-compare files whose fingerprints match before grouping them.
    pub safe_mode: bool,
    /// Direct or pre-gathered enumeration.
    pub strategy: EnumerationStrategy,
    /// Optional shutdown flag for graceful termination.
    pub shutdown_flag: Option<Arc<AtomicBool>>,
    /// Optional progress callback.
    pub progress_callback: Option<Arc<dyn ProgressCallback>>,
}

impl std::fmt::Debug for ScannerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScannerConfig")
            .field("algorithms", &self.algorithms)
            .field("block_size", &self.block_size)
            .field("safe_mode", &self.safe_mode)
            .field("strategy", &self.strategy)
            .field("shutdown_flag", &self.shutdown_flag)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<callback>"),
            )
            .finish()
    }
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            algorithms: vec![HashAlgorithm::Md5],
            block_size: DEFAULT_BLOCK_SIZE,
            safe_mode: false,
            strategy: EnumerationStrategy::Direct,
            shutdown_flag: None,
            progress_callback: None,
        }
    }
}

impl ScannerConfig {
    /// Set the digest algorithms.
    #[must_use]
    pub fn with_algorithms(mut self, algorithms: Vec<HashAlgorithm>) -> Self {
        self.algorithms = algorithms;
        self
    }

    /// Set the read block size.
    #[must_use]
    pub fn with_block_size(mut self, block_size: usize) -> Self {
        self.block_size = block_size;
        self
    }

    /// Enable safe mode (byte-by-byte verification).
    #[must_use]
    pub fn with_safe_mode(mut self, enabled: bool) -> Self {
        self.safe_mode = enabled;
        self
    }

    /// Set the enumeration strategy.
    #[must_use]
    pub fn with_strategy(mut self, strategy: EnumerationStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Set the shutdown flag for graceful termination.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }

    /// Set the progress callback.
    #[must_use]
    pub fn with_progress_callback(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    /// Check the configuration before any file is touched.
    ///
    /// # Errors
    ///
    /// Returns `FinderError::InvalidConfig` for a zero block size or an empty
    /// or repeating algorithm list.
    pub fn validate(&self) -> Result<(), FinderError> {
        if self.block_size == 0 {
            return Err(FinderError::InvalidConfig(
                "block size must be a positive integer".to_string(),
            ));
        }
        if self.algorithms.is_empty() {
            return Err(FinderError::InvalidConfig(
                "at least one hash algorithm is required".to_string(),
            ));
        }
        for (i, alg) in self.algorithms.iter().enumerate() {
            if self.algorithms[..i].contains(alg) {
                return Err(FinderError::InvalidConfig(format!(
                    "hash algorithm '{alg}' specified more than once"
                )));
            }
        }
        Ok(())
    }

    /// Check if shutdown has been requested.
    fn is_shutdown_requested(&self) -> bool {
        self.shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }
}

/// Summary statistics from a duplicate scan.
#[derive(Debug, Clone, Default)]
pub struct ScanSummary {
    /// Number of paths taken from the walker and processed
    pub files_scanned: usize,
    /// Number of distinct fingerprints seen (singletons included)
    pub unique_fingerprints: usize,
    /// Number of confirmed duplicate groups
    pub duplicate_groups: usize,
    /// Total number of duplicate files (excluding one original per group)
    pub duplicate_files: usize,
    /// Paths reached more than once (symlinks, overlapping roots)
    pub already_indexed: usize,
    /// Files whose fingerprint matched a group but whose bytes matched no member
    pub collisions: Vec<PathBuf>,
    /// Duration of the entire scan
    pub scan_duration: Duration,
}

impl ScanSummary {
    fn record_groups(&mut self, groups: &[DuplicateGroup]) {
        self.duplicate_groups = groups.len();
        self.duplicate_files = groups.iter().map(DuplicateGroup::duplicate_count).sum();
    }
}

/// A file confirmed as a duplicate during an incremental scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DuplicateHit {
    /// The newly accepted file
    pub path: PathBuf,
    /// Fingerprint of its group
    pub fingerprint: Fingerprint,
    /// Group members so far, in discovery order, `path` last
    #[serde(rename = "files")]
    pub members: Vec<PathBuf>,
}

/// Errors that can occur during duplicate scanning.
#[derive(thiserror::Error, Debug)]
pub enum FinderError {
    /// The scan was interrupted by user (Ctrl+C or shutdown signal).
    #[error("Scan interrupted by user")]
    Interrupted,

    /// The scanner configuration is unusable.
    #[error("Invalid scanner configuration: {0}")]
    InvalidConfig(String),

    /// The provided root does not exist.
    #[error("Path not found: {0}")]
    PathNotFound(PathBuf),

    /// The provided root is not a directory.
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    /// A root could not be resolved.
    #[error("I/O error for {path}: {source}")]
    IoWithPath {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Reading a file for fingerprinting or comparison failed.
    #[error(transparent)]
    Hash(#[from] HashError),
}

impl From<ScanError> for FinderError {
    fn from(err: ScanError) -> Self {
        match err {
            ScanError::NotFound(path) => Self::PathNotFound(path),
            ScanError::NotADirectory(path) => Self::NotADirectory(path),
            ScanError::Io { path, source } => Self::IoWithPath { path, source },
        }
    }
}

/// Duplicate scanner over one or more root directories.
///
/// Generic over the [`Fingerprinter`] so the content fingerprint can be
/// swapped; [`Hasher`] is used unless told otherwise.
pub struct DuplicateScanner<F = Hasher> {
    config: ScannerConfig,
    fingerprinter: F,
    comparator: ByteComparator,
}

impl DuplicateScanner<Hasher> {
    /// Create a scanner hashing with the configured algorithms and block size.
    #[must_use]
    pub fn new(config: ScannerConfig) -> Self {
        let hasher = Hasher::new(config.algorithms.clone(), config.block_size);
        Self::with_fingerprinter(config, hasher)
    }

    /// Create a scanner with default configuration (md5, 4096-byte blocks).
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(ScannerConfig::default())
    }
}

impl<F> DuplicateScanner<F> {
    /// Scanner configuration.
    #[must_use]
    pub fn config(&self) -> &ScannerConfig {
        &self.config
    }

    fn end_progress(&self) {
        if let Some(ref callback) = self.config.progress_callback {
            callback.on_phase_end(PHASE_HASHING);
        }
    }
}

impl<F: Fingerprinter> DuplicateScanner<F> {
    /// Create a scanner using a custom fingerprinter.
    #[must_use]
    pub fn with_fingerprinter(config: ScannerConfig, fingerprinter: F) -> Self {
        let comparator = ByteComparator::new(config.block_size);
        Self {
            config,
            fingerprinter,
            comparator,
        }
    }

    /// Scan all roots and return the final duplicate groups.
    ///
    /// Groups come out in the order their first member was discovered, and
    /// members in discovery order. Only groups with two or more members are
    /// returned.
    ///
    /// # Errors
    ///
    /// - `InvalidConfig`, `PathNotFound`, `NotADirectory` before any file is read
    /// - `Hash` if any file cannot be fingerprinted or compared (scan aborted)
    /// - `Interrupted` if the shutdown flag is raised
    pub fn scan(
        &self,
        roots: &[PathBuf],
    ) -> Result<(Vec<DuplicateGroup>, ScanSummary), FinderError> {
        let start_time = Instant::now();
        let files = self.prepare(roots)?;

        let mut index = DuplicateIndex::new();
        let mut summary = ScanSummary::default();
        let walked: Result<(), FinderError> = files.into_iter().try_for_each(|path| {
            self.step(&mut index, path, &mut summary).map(|_| ())
        });
        self.end_progress();
        walked?;

        summary.unique_fingerprints = index.fingerprint_count();
        let groups = index.finalize();
        summary.record_groups(&groups);
        summary.scan_duration = start_time.elapsed();

        log::debug!(
            "Scan complete: {} files, {} duplicate groups, {} duplicate files in {:.2}s",
            summary.files_scanned,
            summary.duplicate_groups,
            summary.duplicate_files,
            summary.scan_duration.as_secs_f64()
        );
        if !summary.collisions.is_empty() {
            log::warn!(
                "{} file(s) matched a fingerprint but not its content and were left out",
                summary.collisions.len()
            );
        }

        Ok((groups, summary))
    }

    /// Start an incremental scan.
    ///
    /// Roots and configuration are checked up front; the walk itself only
    /// advances as the returned iterator is pulled. Dropping the iterator
    /// early stops the scan; no file handle outlives a single step.
    ///
    /// # Errors
    ///
    /// `InvalidConfig`, `PathNotFound` or `NotADirectory`.
    pub fn scan_incremental(&self, roots: &[PathBuf]) -> Result<IncrementalScan<'_, F>, FinderError> {
        let files = self.prepare(roots)?;
        Ok(IncrementalScan {
            scanner: self,
            files: Some(files),
            index: DuplicateIndex::new(),
            summary: ScanSummary::default(),
        })
    }

    /// Validate, resolve roots and start enumeration.
    fn prepare(&self, roots: &[PathBuf]) -> Result<FileIter, FinderError> {
        self.config.validate()?;
        let roots = Walker::resolve_roots(roots)?;

        if self.config.safe_mode {
            log::debug!("Safe mode is on: fingerprint matches are verified byte by byte");
        }
        log::debug!(
            "Scanning {} root(s) with [{}]",
            roots.len(),
            self.config
                .algorithms
                .iter()
                .map(|alg| alg.name())
                .collect::<Vec<_>>()
                .join(",")
        );

        let walker = Walker::new(roots, self.config.strategy);
        let callback = self.config.progress_callback.as_ref();

        if walker.strategy() == EnumerationStrategy::PreGathered {
            if let Some(cb) = callback {
                cb.on_phase_start(PHASE_GATHERING, 0);
            }
        }
        let files = walker.walk();
        if let Some(total) = files.total() {
            log::debug!("Gathered {} files", total);
            if let Some(cb) = callback {
                cb.on_phase_end(PHASE_GATHERING);
            }
        }
        if let Some(cb) = callback {
            cb.on_phase_start(PHASE_HASHING, files.total().unwrap_or(0));
        }

        Ok(files)
    }

    /// Process one path. Returns the fingerprint when the file joined a group
    /// as its second or later member.
    fn step(
        &self,
        index: &mut DuplicateIndex,
        path: PathBuf,
        summary: &mut ScanSummary,
    ) -> Result<Option<Fingerprint>, FinderError> {
        if self.config.is_shutdown_requested() {
            log::debug!("Scanner: Shutdown requested, stopping");
            return Err(FinderError::Interrupted);
        }

        summary.files_scanned += 1;
        if let Some(ref callback) = self.config.progress_callback {
            callback.on_progress(summary.files_scanned, path.to_string_lossy().as_ref());
        }

        let fingerprint = self.fingerprinter.fingerprint(&path)?;
        log::trace!("{} {}", fingerprint, path.display());

        let state = if self.config.safe_mode {
            if let Some(ref callback) = self.config.progress_callback {
                if index.members(&fingerprint).is_some() {
                    callback.on_message("byte cmp");
                }
            }
            index.insert_with(fingerprint.clone(), path.clone(), |member, candidate| {
                log::trace!("Comparing {} with {}", candidate.display(), member.display());
                self.comparator.equal(member, candidate)
            })?
        } else {
            index.insert(fingerprint.clone(), path.clone())
        };

        match state {
            GroupState::Created => Ok(None),
            GroupState::Joined { members } => {
                log::debug!("Duplicate ({} copies): {}", members, path.display());
                Ok(Some(fingerprint))
            }
            GroupState::AlreadyPresent => {
                log::debug!("Already indexed: {}", path.display());
                summary.already_indexed += 1;
                Ok(None)
            }
            GroupState::Collision => {
                log::warn!(
                    "Same fingerprint {} but not same bytes for {} with files {:?}",
                    fingerprint,
                    path.display(),
                    index.members(&fingerprint).unwrap_or_default()
                );
                summary.collisions.push(path);
                Ok(None)
            }
        }
    }
}

/// Pull-based duplicate discovery, see [`DuplicateScanner::scan_incremental`].
///
/// Yields `Err` at most once; the iterator is finished afterwards.
pub struct IncrementalScan<'a, F = Hasher> {
    scanner: &'a DuplicateScanner<F>,
    files: Option<FileIter>,
    index: DuplicateIndex,
    summary: ScanSummary,
}

impl<F> IncrementalScan<'_, F> {
    /// Statistics for the files processed so far.
    #[must_use]
    pub fn summary(&self) -> &ScanSummary {
        &self.summary
    }

    /// Stop the scan and return the groups confirmed so far.
    #[must_use]
    pub fn into_groups(mut self) -> Vec<DuplicateGroup> {
        self.stop();
        std::mem::take(&mut self.index).finalize()
    }

    fn stop(&mut self) {
        if self.files.take().is_some() {
            self.scanner.end_progress();
        }
    }
}

impl<F: Fingerprinter> Iterator for IncrementalScan<'_, F> {
    type Item = Result<DuplicateHit, FinderError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let Some(path) = self.files.as_mut()?.next() else {
                self.stop();
                return None;
            };

            match self.scanner.step(&mut self.index, path, &mut self.summary) {
                Ok(Some(fingerprint)) => {
                    let members = self
                        .index
                        .members(&fingerprint)
                        .map(<[PathBuf]>::to_vec)
                        .unwrap_or_default();
                    let path = members.last().cloned().unwrap_or_default();
                    return Some(Ok(DuplicateHit {
                        path,
                        fingerprint,
                        members,
                    }));
                }
                Ok(None) => {}
                Err(e) => {
                    self.stop();
                    return Some(Err(e));
                }
            }
        }
    }
}

impl<F: Fingerprinter> FusedIterator for IncrementalScan<'_, F> {}

impl<F> Drop for IncrementalScan<'_, F> {
    fn drop(&mut self) {
        self.stop();
    }
}
