//! Byte-for-byte file comparison used by safe mode.
//!
//! Comparison is never the primary equality test; it only settles whether two
//! files that already share a fingerprint really have identical content.

use std::fs::{self, File};
use std::io::{self, Read};
use std::path::Path;

use super::{HashError, DEFAULT_BLOCK_SIZE};

/// Compares files in matched chunks of a fixed size.
#[derive(Debug, Clone, Copy)]
pub struct ByteComparator {
    chunk_size: usize,
}

impl ByteComparator {
    /// Create a comparator reading `chunk_size` bytes from each file per step.
    #[must_use]
    pub fn new(chunk_size: usize) -> Self {
        Self {
            chunk_size: chunk_size.max(1),
        }
    }

    /// Return `true` only if both files have the same length and bytes.
    ///
    /// # Errors
    ///
    /// Returns `HashError` if either file cannot be opened or read.
    pub fn equal(&self, a: &Path, b: &Path) -> Result<bool, HashError> {
        let len_a = fs::metadata(a).map_err(|e| HashError::from_io(a, e))?.len();
        let len_b = fs::metadata(b).map_err(|e| HashError::from_io(b, e))?.len();
        if len_a != len_b {
            log::trace!(
                "Length mismatch {} ({}) vs {} ({})",
                a.display(),
                len_a,
                b.display(),
                len_b
            );
            return Ok(false);
        }

        let mut file_a = File::open(a).map_err(|e| HashError::from_io(a, e))?;
        let mut file_b = File::open(b).map_err(|e| HashError::from_io(b, e))?;
        let mut buf_a = vec![0u8; self.chunk_size];
        let mut buf_b = vec![0u8; self.chunk_size];

        loop {
            let n_a = fill_chunk(&mut file_a, &mut buf_a).map_err(|e| HashError::from_io(a, e))?;
            let n_b = fill_chunk(&mut file_b, &mut buf_b).map_err(|e| HashError::from_io(b, e))?;

            if n_a != n_b || buf_a[..n_a] != buf_b[..n_b] {
                return Ok(false);
            }
            if n_a == 0 {
                return Ok(true);
            }
        }
    }
}

impl Default for ByteComparator {
    fn default() -> Self {
        Self::new(DEFAULT_BLOCK_SIZE)
    }
}

/// Compare two files byte-for-byte with the default chunk size.
///
/// # Errors
///
/// Returns `HashError` if either file cannot be opened or read.
pub fn files_equal(a: &Path, b: &Path) -> Result<bool, HashError> {
    ByteComparator::default().equal(a, b)
}

/// Read until `buf` is full or the reader is exhausted.
///
/// Keeps both sides of a comparison aligned even when the OS returns short
/// reads.
fn fill_chunk<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}
