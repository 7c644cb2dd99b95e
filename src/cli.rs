//! Command-line interface definitions for sweeper.
//!
//! Values that need validation (block size, digest list, action) are taken
//! as raw strings and checked by [`Settings::resolve`](crate::config::Settings::resolve),
//! so a bad value is reported as a configuration error with its own exit code
//! rather than as a usage error.
//!
//! # Example
//!
//! ```bash
//! # Print duplicate groups under the current directory
//! sweeper
//!
//! # JSON mapping over two directories, hashed with md5 and sha256
//! sweeper -a print -d md5,sha256 ~/photos /mnt/backup/photos
//!
//! # Show what would be removed, keeping copies under ~/photos
//! sweeper -a remove -k ~/photos -s ~/photos /mnt/backup/photos
//! ```

use clap::Parser;
use std::path::PathBuf;

/// Find duplicate files and report, remove or move them.
///
/// Files are compared by a digest of their full content; with --safe-mode,
/// files sharing a digest are also compared byte by byte.
#[derive(Debug, Parser)]
#[command(name = "sweeper")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Directories to scan for duplicate files
    #[arg(value_name = "DIRECTORY", default_value = ".")]
    pub directories: Vec<PathBuf>,

    /// Size of the block used when reading file content [default: 4096]
    #[arg(short, long, value_name = "BLOCKSIZE")]
    pub block_size: Option<String>,

    /// Comma separated list of digest algorithms [default: md5]
    ///
    /// Supported: md5, sha1, sha224, sha256, sha384, sha512, blake3.
    /// Each additional algorithm slows the scan down.
    #[arg(short, long, value_name = "HASHALGS")]
    pub digest_algs: Option<String>,

    /// Action on duplicate files: pprint, print, remove, move, immediate
    ///
    /// pprint prints groups of paths separated by a blank line; print prints a
    /// JSON mapping of digest to paths; remove and move act on every file but
    /// the kept one; immediate prints each duplicate as a JSON line as soon as
    /// it is found.
    #[arg(short, long, value_name = "ACTION", default_value = "pprint")]
    pub action: String,

    /// Destination directory for the move action [default: ./dups]
    #[arg(short, long = "move", value_name = "DIRECTORY")]
    pub move_dir: Option<PathBuf>,

    /// Path prefix of the copy to keep for remove and move
    #[arg(short, long, value_name = "DIRPREFIX")]
    pub keep: Option<String>,

    /// Only print what remove or move would do
    #[arg(short, long)]
    pub simulate: bool,

    /// Compare files with equal digests byte by byte as well
    #[arg(short = 'S', long)]
    pub safe_mode: bool,

    /// Keep removing or moving after a file fails instead of stopping
    #[arg(long)]
    pub keep_going: bool,

    /// Increase verbosity level (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all output except errors and results
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored log output
    #[arg(long, env = "NO_COLOR")]
    pub no_color: bool,

    /// Read defaults from this JSON file instead of the user config
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Report errors as JSON on stderr
    #[arg(long)]
    pub json_errors: bool,
}
