//! Scanner module for directory traversal, fingerprinting and byte comparison.
//!
//! This module provides functionality for:
//! - Lazy directory walking over several roots using walkdir
//! - Content fingerprints over one or more digest algorithms
//! - Byte-by-byte verification for safe mode
//!
//! # Architecture
//!
//! The scanner is divided into submodules:
//! - [`walker`]: Directory traversal and canonical file discovery
//! - [`hasher`]: Streaming fingerprints (md5, SHA-2, BLAKE3)
//! - [`compare`]: Chunked byte-for-byte comparison
//!
//! # Example
//!
//! ```no_run
//! use sweeper::scanner::{EnumerationStrategy, Fingerprinter, Hasher, HashAlgorithm, Walker};
//! use std::path::PathBuf;
//!
//! let walker = Walker::new(vec![PathBuf::from(".")], EnumerationStrategy::Direct);
//! let hasher = Hasher::new(vec![HashAlgorithm::Md5], 4096);
//! for path in walker.walk() {
//!     let fingerprint = hasher.fingerprint(&path).unwrap();
//!     println!("{}  {}", fingerprint, path.display());
//! }
//! ```

pub mod compare;
pub mod hasher;
pub mod walker;

use std::io;
use std::path::{Path, PathBuf};

// Re-export main types
pub use compare::{files_equal, ByteComparator};
pub use hasher::{
    Fingerprint, Fingerprinter, HashAlgorithm, Hasher, UnknownAlgorithm, DEFAULT_BLOCK_SIZE,
};
pub use walker::{EnumerationStrategy, FileIter, Walker};

/// Errors that can occur during directory scanning.
#[derive(thiserror::Error, Debug)]
pub enum ScanError {
    /// The specified path was not found.
    #[error("Path not found: {0}")]
    NotFound(PathBuf),

    /// The specified path is not a directory.
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    /// An I/O error occurred while resolving a path.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

/// Errors that can occur while hashing or comparing file content.
///
/// These are never swallowed by the hasher or comparator; the scanner decides
/// what a failure means for the scan as a whole.
#[derive(thiserror::Error, Debug)]
pub enum HashError {
    /// The specified file was not found.
    #[error("File not found: {0}")]
    NotFound(PathBuf),

    /// Permission was denied when reading the file.
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// An I/O error occurred while reading the file.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

impl HashError {
    /// Classify an I/O error raised while reading `path`.
    #[must_use]
    pub fn from_io(path: &Path, error: io::Error) -> Self {
        match error.kind() {
            io::ErrorKind::NotFound => Self::NotFound(path.to_path_buf()),
            io::ErrorKind::PermissionDenied => Self::PermissionDenied(path.to_path_buf()),
            _ => Self::Io {
                path: path.to_path_buf(),
                source: error,
            },
        }
    }

    /// Path of the file that failed.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::NotFound(p) | Self::PermissionDenied(p) | Self::Io { path: p, .. } => p,
        }
    }
}
