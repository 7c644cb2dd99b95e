//! Streaming file fingerprints over one or more digest algorithms.
//!
//! # Overview
//!
//! A [`Fingerprint`] is the ordered list of hex digests of a file's full
//! content, one per configured [`HashAlgorithm`]. The file is read once, in
//! blocks of a caller-chosen size, and every block is fed to every running
//! digest state so all algorithms see the exact same byte stream.
//!
//! # Example
//!
//! ```no_run
//! use sweeper::scanner::{Fingerprinter, HashAlgorithm, Hasher};
//! use std::path::Path;
//!
//! let hasher = Hasher::new(vec![HashAlgorithm::Md5, HashAlgorithm::Sha256], 4096);
//! let fingerprint = hasher.fingerprint(Path::new("Cargo.toml")).unwrap();
//! assert_eq!(fingerprint.digests().len(), 2);
//! ```

use std::fmt;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;
use std::str::FromStr;

use serde::{Serialize, Serializer};
use sha2::Digest;

use super::HashError;

/// Default read block size in bytes.
pub const DEFAULT_BLOCK_SIZE: usize = 4096;

/// Digest algorithms a fingerprint can be built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HashAlgorithm {
    /// MD5 (default, fast, not collision resistant)
    Md5,
    /// SHA-1 (legacy, not collision resistant)
    Sha1,
    /// SHA-224
    Sha224,
    /// SHA-256
    Sha256,
    /// SHA-384
    Sha384,
    /// SHA-512
    Sha512,
    /// BLAKE3
    Blake3,
}

impl HashAlgorithm {
    /// Every supported algorithm.
    pub const ALL: [HashAlgorithm; 7] = [
        Self::Md5,
        Self::Sha1,
        Self::Sha224,
        Self::Sha256,
        Self::Sha384,
        Self::Sha512,
        Self::Blake3,
    ];

    /// Canonical lowercase name, as accepted on the command line.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Md5 => "md5",
            Self::Sha1 => "sha1",
            Self::Sha224 => "sha224",
            Self::Sha256 => "sha256",
            Self::Sha384 => "sha384",
            Self::Sha512 => "sha512",
            Self::Blake3 => "blake3",
        }
    }

    fn start(self) -> DigestState {
        match self {
            Self::Md5 => DigestState::Md5(md5::Context::new()),
            Self::Sha1 => DigestState::Sha1(sha1::Sha1::new()),
            Self::Sha224 => DigestState::Sha224(sha2::Sha224::new()),
            Self::Sha256 => DigestState::Sha256(sha2::Sha256::new()),
            Self::Sha384 => DigestState::Sha384(sha2::Sha384::new()),
            Self::Sha512 => DigestState::Sha512(sha2::Sha512::new()),
            Self::Blake3 => DigestState::Blake3(Box::new(blake3::Hasher::new())),
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// An algorithm name that is not supported.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown hash algorithm '{0}' (supported: md5, sha1, sha224, sha256, sha384, sha512, blake3)")]
pub struct UnknownAlgorithm(pub String);

impl FromStr for HashAlgorithm {
    type Err = UnknownAlgorithm;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|alg| alg.name() == wanted)
            .ok_or_else(|| UnknownAlgorithm(s.trim().to_string()))
    }
}

/// Running digest state for a single algorithm.
enum DigestState {
    Md5(md5::Context),
    Sha1(sha1::Sha1),
    Sha224(sha2::Sha224),
    Sha256(sha2::Sha256),
    Sha384(sha2::Sha384),
    Sha512(sha2::Sha512),
    Blake3(Box<blake3::Hasher>),
}

impl DigestState {
    fn update(&mut self, data: &[u8]) {
        match self {
            Self::Md5(ctx) => ctx.consume(data),
            Self::Sha1(h) => h.update(data),
            Self::Sha224(h) => h.update(data),
            Self::Sha256(h) => h.update(data),
            Self::Sha384(h) => h.update(data),
            Self::Sha512(h) => h.update(data),
            Self::Blake3(h) => {
                h.update(data);
            }
        }
    }

    fn finalize_hex(self) -> String {
        match self {
            Self::Md5(ctx) => format!("{:x}", ctx.compute()),
            Self::Sha1(h) => format!("{:x}", h.finalize()),
            Self::Sha224(h) => format!("{:x}", h.finalize()),
            Self::Sha256(h) => format!("{:x}", h.finalize()),
            Self::Sha384(h) => format!("{:x}", h.finalize()),
            Self::Sha512(h) => format!("{:x}", h.finalize()),
            Self::Blake3(h) => h.finalize().to_hex().to_string(),
        }
    }
}

/// Ordered digests of a file's content, one per configured algorithm.
///
/// Grouping compares the whole tuple; two fingerprints built from different
/// algorithm lists never compare equal unless their digests happen to match
/// position by position.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fingerprint(Vec<String>);

impl Fingerprint {
    /// Build a fingerprint from already computed hex digests.
    #[must_use]
    pub fn new(digests: Vec<String>) -> Self {
        Self(digests)
    }

    /// The digests in algorithm order.
    #[must_use]
    pub fn digests(&self) -> &[String] {
        &self.0
    }

    /// Single-string form used as a report key (digests joined by `,`).
    #[must_use]
    pub fn key(&self) -> String {
        self.0.join(",")
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key())
    }
}

impl Serialize for Fingerprint {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.key())
    }
}

/// Anything that can turn a file into a [`Fingerprint`].
///
/// The scanner only depends on this trait, so alternative fingerprinting
/// (or a deliberately colliding one in tests) can be plugged in.
pub trait Fingerprinter {
    /// Compute the fingerprint of the file at `path`.
    ///
    /// # Errors
    ///
    /// Returns `HashError` if the file cannot be opened or read.
    fn fingerprint(&self, path: &Path) -> Result<Fingerprint, HashError>;
}

/// Block-streaming hasher over an ordered list of algorithms.
#[derive(Debug, Clone)]
pub struct Hasher {
    algorithms: Vec<HashAlgorithm>,
    block_size: usize,
}

impl Hasher {
    /// Create a hasher.
    ///
    /// A zero `block_size` is bumped to 1; validation of user input happens
    /// in the configuration layer.
    ///
    /// # Arguments
    ///
    /// * `algorithms` - Digest algorithms, in output order
    /// * `block_size` - Number of bytes read per block
    #[must_use]
    pub fn new(algorithms: Vec<HashAlgorithm>, block_size: usize) -> Self {
        Self {
            algorithms,
            block_size: block_size.max(1),
        }
    }

    /// Algorithms in fingerprint order.
    #[must_use]
    pub fn algorithms(&self) -> &[HashAlgorithm] {
        &self.algorithms
    }

    /// Read block size in bytes.
    #[must_use]
    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// Fingerprint everything readable from `reader`.
    ///
    /// # Errors
    ///
    /// Propagates any read error other than `Interrupted`.
    pub fn fingerprint_reader<R: Read>(&self, mut reader: R) -> io::Result<Fingerprint> {
        let mut states: Vec<DigestState> =
            self.algorithms.iter().map(|alg| alg.start()).collect();
        let mut buffer = vec![0u8; self.block_size];

        loop {
            let bytes_read = match reader.read(&mut buffer) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            };
            for state in &mut states {
                state.update(&buffer[..bytes_read]);
            }
        }

        Ok(Fingerprint(
            states.into_iter().map(DigestState::finalize_hex).collect(),
        ))
    }
}

impl Default for Hasher {
    fn default() -> Self {
        Self::new(vec![HashAlgorithm::Md5], DEFAULT_BLOCK_SIZE)
    }
}

impl Fingerprinter for Hasher {
    fn fingerprint(&self, path: &Path) -> Result<Fingerprint, HashError> {
        log::trace!("Fingerprinting {}", path.display());
        let file = File::open(path).map_err(|e| HashError::from_io(path, e))?;
        self.fingerprint_reader(file)
            .map_err(|e| HashError::from_io(path, e))
    }
}
