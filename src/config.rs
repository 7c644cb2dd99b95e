//! Configuration: user defaults file and validated run settings.
//!
//! Every option comes from the first of these that sets it:
//!
//! 1. command-line flags ([`Cli`])
//! 2. a JSON defaults file (`--config <PATH>`, or `config.json` in the
//!    platform config directory)
//! 3. built-in defaults (block size 4096, md5, `./dups`)
//!
//! [`Settings::resolve`] performs all validation up front. Any
//! [`ConfigError`] is reported before a single file is read.
//!
//! ```json
//! {
//!     "block_size": 65536,
//!     "digest_algs": "md5,sha256",
//!     "move_dir": "/srv/dups",
//!     "safe_mode": true
//! }
//! ```

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::actions::KeepPolicy;
use crate::cli::Cli;
use crate::scanner::{EnumerationStrategy, HashAlgorithm, UnknownAlgorithm, DEFAULT_BLOCK_SIZE};

/// Default destination for the move action.
pub const DEFAULT_MOVE_DIR: &str = "./dups";

/// Errors in options, raised before any scanning.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Block size is not a positive integer.
    #[error("Invalid block size \"{0}\"")]
    InvalidBlockSize(String),

    /// The digest list is empty.
    #[error("No digest algorithm specified")]
    NoAlgorithms,

    /// The same algorithm is listed twice.
    #[error("Duplicate hash algorithms specified: {0}")]
    DuplicateAlgorithm(HashAlgorithm),

    /// An algorithm name is not supported.
    #[error(transparent)]
    UnknownAlgorithm(#[from] UnknownAlgorithm),

    /// The action name is not one of the supported actions.
    #[error("Invalid action \"{0}\" (expected pprint, print, remove, move or immediate)")]
    UnknownAction(String),

    /// The move destination exists and is not a directory.
    #[error("{0} is not a directory")]
    DestinationNotADirectory(PathBuf),

    /// The defaults file could not be read.
    #[error("Cannot read config file {path}: {source}")]
    File {
        /// Config file path
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The defaults file is not valid JSON for [`Config`].
    #[error("Invalid config file {path}: {source}")]
    Parse {
        /// Config file path
        path: PathBuf,
        /// The underlying parse error
        #[source]
        source: serde_json::Error,
    },
}

/// What to do with the duplicates found.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Action {
    /// Print groups as blocks of paths
    #[default]
    Pprint,
    /// Print a JSON mapping of fingerprint to paths
    Print,
    /// Remove every file but the kept one
    Remove,
    /// Move every file but the kept one
    Move,
    /// Print each duplicate as a JSON line as soon as it is found
    Immediate,
}

impl Action {
    /// Name as given on the command line.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Pprint => "pprint",
            Self::Print => "print",
            Self::Remove => "remove",
            Self::Move => "move",
            Self::Immediate => "immediate",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Action {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pprint" => Ok(Self::Pprint),
            "print" => Ok(Self::Print),
            "remove" => Ok(Self::Remove),
            "move" => Ok(Self::Move),
            "immediate" => Ok(Self::Immediate),
            _ => Err(ConfigError::UnknownAction(s.to_string())),
        }
    }
}

/// User defaults file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Read block size in bytes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_size: Option<usize>,
    /// Comma separated digest algorithms.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub digest_algs: Option<String>,
    /// Move destination.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub move_dir: Option<PathBuf>,
    /// Always verify byte by byte.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub safe_mode: Option<bool>,
}

impl Config {
    /// Load the defaults file from the platform-specific path.
    ///
    /// A missing or broken file falls back to built-in defaults.
    pub fn load() -> Self {
        let Some(path) = Self::config_path() else {
            return Self::default();
        };
        if !path.exists() {
            return Self::default();
        }
        match Self::load_from_path(&path) {
            Ok(config) => config,
            Err(e) => {
                log::warn!("Ignoring config file: {}", e);
                Self::default()
            }
        }
    }

    /// Load the defaults file from an explicit path.
    ///
    /// # Errors
    ///
    /// `ConfigError::File` if the file cannot be read, `ConfigError::Parse`
    /// if it is not valid JSON.
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::File {
            path: path.to_path_buf(),
            source,
        })?;
        let config = serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Default platform-specific configuration path.
    #[must_use]
    pub fn config_path() -> Option<PathBuf> {
        ProjectDirs::from("org", "sweeper", "sweeper")
            .map(|dirs| dirs.config_dir().join("config.json"))
    }
}

/// Validated options for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Root directories, as given
    pub roots: Vec<PathBuf>,
    /// Read block size
    pub block_size: usize,
    /// Digest algorithms in fingerprint order
    pub algorithms: Vec<HashAlgorithm>,
    /// Action to take
    pub action: Action,
    /// Move destination
    pub move_dir: PathBuf,
    /// Which copy to keep
    pub keep: KeepPolicy,
    /// Dry run for remove/move
    pub simulate: bool,
    /// Byte-compare fingerprint matches
    pub safe_mode: bool,
    /// Continue remove/move past failures
    pub continue_on_error: bool,
    /// Verbosity count
    pub verbose: u8,
    /// Errors only
    pub quiet: bool,
}

impl Settings {
    /// Load the defaults file for `cli` and resolve.
    ///
    /// An explicit `--config` file must be readable; the implicit user file
    /// is optional.
    ///
    /// # Errors
    ///
    /// Any [`ConfigError`].
    pub fn from_cli(cli: &Cli) -> Result<Self, ConfigError> {
        let file = match cli.config {
            Some(ref path) => Config::load_from_path(path)?,
            None => Config::load(),
        };
        Self::resolve(cli, &file)
    }

    /// Merge flags over the defaults file and validate the result.
    ///
    /// # Errors
    ///
    /// - `InvalidBlockSize` for a non-numeric or zero block size
    /// - `NoAlgorithms`, `DuplicateAlgorithm`, `UnknownAlgorithm` for a bad digest list
    /// - `UnknownAction` for an unrecognized action
    /// - `DestinationNotADirectory` when moving into an existing non-directory
    pub fn resolve(cli: &Cli, file: &Config) -> Result<Self, ConfigError> {
        let block_size = match cli.block_size {
            Some(ref raw) => parse_block_size(raw)?,
            None => match file.block_size {
                Some(0) => return Err(ConfigError::InvalidBlockSize("0".to_string())),
                Some(n) => n,
                None => DEFAULT_BLOCK_SIZE,
            },
        };

        let algorithms = match cli.digest_algs.as_deref().or(file.digest_algs.as_deref()) {
            Some(raw) => parse_algorithms(raw)?,
            None => vec![HashAlgorithm::Md5],
        };

        let action: Action = cli.action.parse()?;

        let move_dir = cli
            .move_dir
            .clone()
            .or_else(|| file.move_dir.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_MOVE_DIR));
        if action == Action::Move && move_dir.exists() && !move_dir.is_dir() {
            return Err(ConfigError::DestinationNotADirectory(move_dir));
        }

        let roots = if cli.directories.is_empty() {
            vec![PathBuf::from(".")]
        } else {
            cli.directories.clone()
        };

        Ok(Self {
            roots,
            block_size,
            algorithms,
            action,
            move_dir,
            keep: KeepPolicy::from_prefix(cli.keep.as_deref()),
            simulate: cli.simulate,
            safe_mode: cli.safe_mode || file.safe_mode.unwrap_or(false),
            continue_on_error: cli.keep_going,
            verbose: cli.verbose,
            quiet: cli.quiet,
        })
    }

    /// Enumeration strategy: verbose runs pre-gather to report totals.
    #[must_use]
    pub fn strategy(&self) -> EnumerationStrategy {
        if self.verbose > 0 && !self.quiet {
            EnumerationStrategy::PreGathered
        } else {
            EnumerationStrategy::Direct
        }
    }

    /// Whether remove/move should echo their operations.
    #[must_use]
    pub fn echo_actions(&self) -> bool {
        self.simulate || self.verbose > 0
    }
}

/// Parse a block size, rejecting non-numbers and zero.
///
/// # Errors
///
/// `ConfigError::InvalidBlockSize` with the raw value.
pub fn parse_block_size(raw: &str) -> Result<usize, ConfigError> {
    match raw.trim().parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(ConfigError::InvalidBlockSize(raw.to_string())),
    }
}

/// Parse a comma separated digest list, keeping its order.
///
/// # Errors
///
/// `NoAlgorithms` for an empty list, `UnknownAlgorithm` for an unsupported
/// name, `DuplicateAlgorithm` for a repeated one.
pub fn parse_algorithms(raw: &str) -> Result<Vec<HashAlgorithm>, ConfigError> {
    let mut algorithms = Vec::new();
    for name in raw.split(',').map(str::trim).filter(|n| !n.is_empty()) {
        let alg: HashAlgorithm = name.parse()?;
        if algorithms.contains(&alg) {
            return Err(ConfigError::DuplicateAlgorithm(alg));
        }
        algorithms.push(alg);
    }
    if algorithms.is_empty() {
        return Err(ConfigError::NoAlgorithms);
    }
    Ok(algorithms)
}
