//! Directory walker producing canonical file paths.
//!
//! # Overview
//!
//! This module provides the [`Walker`] struct, which walks every root
//! directory depth-first using [`walkdir`] and yields the canonical path of
//! each regular file it finds. Two strategies are available and look the same
//! to a consumer:
//!
//! - [`EnumerationStrategy::Direct`] walks and yields lazily (no total known)
//! - [`EnumerationStrategy::PreGathered`] walks everything first, so the total
//!   is known up front and progress can be reported as "X of N"
//!
//! # Symbolic links
//!
//! Symlinked directories are not descended into. A symlink that resolves to a
//! regular file yields the target's canonical path, so a file reachable
//! through several links is only ever reported under one name. Dangling links
//! and non-regular files are skipped.
//!
//! # Unreadable directories
//!
//! Directories that cannot be read are skipped (logged at debug level). They
//! contribute no files, so nothing is compared against them.
//!
//! # Example
//!
//! ```no_run
//! use sweeper::scanner::{EnumerationStrategy, Walker};
//! use std::path::PathBuf;
//!
//! let walker = Walker::new(vec![PathBuf::from("/home/user/Downloads")], EnumerationStrategy::PreGathered);
//! let files = walker.walk();
//! println!("{:?} files to process", files.total());
//! for path in files {
//!     println!("{}", path.display());
//! }
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use walkdir::{DirEntry, WalkDir};

use super::ScanError;

/// How the walker produces its path sequence.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EnumerationStrategy {
    /// Walk and yield without pre-counting (lower memory, no total).
    #[default]
    Direct,
    /// Walk once into a list, then yield from it (total known).
    PreGathered,
}

/// Directory walker over one or more roots.
#[derive(Debug, Clone)]
pub struct Walker {
    /// Root directories, walked in the given order
    roots: Vec<PathBuf>,
    /// Enumeration strategy
    strategy: EnumerationStrategy,
}

impl Walker {
    /// Create a new walker for the given roots.
    ///
    /// # Arguments
    ///
    /// * `roots` - Root directories to walk, in order
    /// * `strategy` - Direct or pre-gathered enumeration
    #[must_use]
    pub fn new(roots: Vec<PathBuf>, strategy: EnumerationStrategy) -> Self {
        Self { roots, strategy }
    }

    /// Root directories of this walker.
    #[must_use]
    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    /// Configured enumeration strategy.
    #[must_use]
    pub fn strategy(&self) -> EnumerationStrategy {
        self.strategy
    }

    /// Canonicalize root directories, rejecting missing paths and non-directories.
    ///
    /// # Errors
    ///
    /// - `ScanError::NotFound` if a root does not exist
    /// - `ScanError::NotADirectory` if a root is not a directory
    /// - `ScanError::Io` if a root cannot be resolved for another reason
    pub fn resolve_roots(roots: &[PathBuf]) -> Result<Vec<PathBuf>, ScanError> {
        roots
            .iter()
            .map(|root| {
                let canonical = fs::canonicalize(root).map_err(|e| match e.kind() {
                    std::io::ErrorKind::NotFound => ScanError::NotFound(root.clone()),
                    _ => ScanError::Io {
                        path: root.clone(),
                        source: e,
                    },
                })?;
                if !canonical.is_dir() {
                    return Err(ScanError::NotADirectory(root.clone()));
                }
                log::debug!("Resolved root {} -> {}", root.display(), canonical.display());
                Ok(canonical)
            })
            .collect()
    }

    /// Walk all roots, yielding canonical file paths.
    ///
    /// With [`EnumerationStrategy::PreGathered`] the whole tree is walked
    /// before this returns and [`FileIter::total`] is known.
    #[must_use]
    pub fn walk(&self) -> FileIter {
        match self.strategy {
            EnumerationStrategy::Direct => FileIter {
                total: None,
                inner: Source::Direct(DirectWalk::new(self.roots.clone())),
            },
            EnumerationStrategy::PreGathered => {
                let files = self.gather();
                FileIter {
                    total: Some(files.len()),
                    inner: Source::Gathered(files.into_iter()),
                }
            }
        }
    }

    /// Walk all roots eagerly and return every file path found.
    #[must_use]
    pub fn gather(&self) -> Vec<PathBuf> {
        let files: Vec<PathBuf> = DirectWalk::new(self.roots.clone()).collect();
        log::debug!(
            "Gathered {} files under {} root(s)",
            files.len(),
            self.roots.len()
        );
        files
    }
}

/// Lazy sequence of canonical file paths produced by [`Walker::walk`].
pub struct FileIter {
    total: Option<usize>,
    inner: Source,
}

enum Source {
    Direct(DirectWalk),
    Gathered(std::vec::IntoIter<PathBuf>),
}

impl FileIter {
    /// Number of files, when known in advance (pre-gathered strategy only).
    #[must_use]
    pub fn total(&self) -> Option<usize> {
        self.total
    }
}

impl Iterator for FileIter {
    type Item = PathBuf;

    fn next(&mut self) -> Option<PathBuf> {
        match &mut self.inner {
            Source::Direct(walk) => walk.next(),
            Source::Gathered(files) => files.next(),
        }
    }
}

impl std::fmt::Debug for FileIter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = match self.inner {
            Source::Direct(_) => "direct",
            Source::Gathered(_) => "pre-gathered",
        };
        f.debug_struct("FileIter")
            .field("strategy", &kind)
            .field("total", &self.total)
            .finish()
    }
}

/// Root-by-root depth-first walk.
struct DirectWalk {
    roots: std::vec::IntoIter<PathBuf>,
    current: Option<walkdir::IntoIter>,
}

impl DirectWalk {
    fn new(roots: Vec<PathBuf>) -> Self {
        Self {
            roots: roots.into_iter(),
            current: None,
        }
    }
}

impl Iterator for DirectWalk {
    type Item = PathBuf;

    fn next(&mut self) -> Option<PathBuf> {
        loop {
            let Some(entries) = self.current.as_mut() else {
                let root = self.roots.next()?;
                log::debug!("Walking {}", root.display());
                self.current = Some(
                    WalkDir::new(root)
                        .follow_links(false)
                        .sort_by_file_name()
                        .into_iter(),
                );
                continue;
            };

            match entries.next() {
                Some(Ok(entry)) => {
                    if let Some(path) = resolve_entry(entry) {
                        return Some(path);
                    }
                }
                Some(Err(e)) => {
                    let path = e.path().map(Path::to_path_buf).unwrap_or_default();
                    log::debug!("Skipping unreadable entry {}: {}", path.display(), e);
                }
                None => self.current = None,
            }
        }
    }
}

/// Map a walk entry to the canonical path of a regular file, if it is one.
fn resolve_entry(entry: DirEntry) -> Option<PathBuf> {
    let file_type = entry.file_type();

    if file_type.is_dir() {
        return None;
    }

    if file_type.is_file() {
        // Roots are canonical and links are not followed, so the path already is.
        return Some(entry.into_path());
    }

    if file_type.is_symlink() {
        return match fs::canonicalize(entry.path()) {
            Ok(target) if target.is_file() => {
                log::trace!(
                    "Resolved symlink {} -> {}",
                    entry.path().display(),
                    target.display()
                );
                Some(target)
            }
            Ok(target) => {
                log::trace!(
                    "Skipping symlink to non-file {} -> {}",
                    entry.path().display(),
                    target.display()
                );
                None
            }
            Err(e) => {
                log::debug!("Skipping dangling symlink {}: {}", entry.path().display(), e);
                None
            }
        };
    }

    log::debug!("Skipping special file {}", entry.path().display());
    None
}
