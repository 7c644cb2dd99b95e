//! JSON output for duplicate scan results.
//!
//! # Output Schema
//!
//! The `print` action writes one object mapping each fingerprint (digests
//! joined with `,`) to its member paths, groups in discovery order, indented
//! with four spaces:
//!
//! ```json
//! {
//!     "5d41402abc4b2a76b9719d911017c592": [
//!         "/a/x.txt",
//!         "/b/y.txt"
//!     ]
//! }
//! ```
//!
//! The `immediate` action writes one compact object per line as each
//! duplicate is found:
//!
//! ```json
//! {"path":"/b/y.txt","fingerprint":"5d41...","files":["/a/x.txt","/b/y.txt"]}
//! ```
//!
//! # Example
//!
//! ```no_run
//! use sweeper::duplicates::DuplicateScanner;
//! use sweeper::output::json::JsonOutput;
//! use std::path::PathBuf;
//!
//! let (groups, _) = DuplicateScanner::with_defaults().scan(&[PathBuf::from(".")]).unwrap();
//! println!("{}", JsonOutput::new(&groups).to_json_pretty().unwrap());
//! ```

use std::io::Write;
use std::path::Path;

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

use crate::duplicates::{DuplicateGroup, DuplicateHit};

/// Fingerprint-to-paths mapping over a set of groups.
#[derive(Debug, Clone, Copy)]
pub struct JsonOutput<'a> {
    groups: &'a [DuplicateGroup],
}

impl<'a> JsonOutput<'a> {
    /// Wrap finalized groups for serialization.
    #[must_use]
    pub fn new(groups: &'a [DuplicateGroup]) -> Self {
        Self { groups }
    }

    /// Serialize to compact JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails (unlikely for valid data).
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Serialize with four-space indentation.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails (unlikely for valid data).
    ///
    /// # Example
    ///
    /// ```
    /// use sweeper::output::json::JsonOutput;
    ///
    /// assert_eq!(JsonOutput::new(&[]).to_json_pretty().unwrap(), "{}");
    /// ```
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
        self.serialize(&mut ser)?;
        // serde_json only ever emits valid UTF-8.
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }

    /// Write the mapping to a writer.
    ///
    /// # Arguments
    ///
    /// * `writer` - The writer to output to (e.g., stdout)
    /// * `pretty` - Whether to pretty-print the output
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub fn write_to<W: Write + ?Sized>(
        &self,
        writer: &mut W,
        pretty: bool,
    ) -> Result<(), JsonOutputError> {
        let json = if pretty {
            self.to_json_pretty()?
        } else {
            self.to_json()?
        };
        writer.write_all(json.as_bytes())?;
        writer.write_all(b"\n")?;
        Ok(())
    }
}

impl Serialize for JsonOutput<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.groups.len()))?;
        for group in self.groups {
            let files: Vec<String> = group.files.iter().map(|p| path_string(p)).collect();
            map.serialize_entry(&group.fingerprint.key(), &files)?;
        }
        map.end()
    }
}

/// One incremental hit as a JSON line.
#[derive(Debug, Clone, Serialize)]
pub struct JsonHit {
    /// The newly confirmed duplicate
    pub path: String,
    /// Joined fingerprint
    pub fingerprint: String,
    /// Group members so far
    pub files: Vec<String>,
}

impl From<&DuplicateHit> for JsonHit {
    fn from(hit: &DuplicateHit) -> Self {
        Self {
            path: path_string(&hit.path),
            fingerprint: hit.fingerprint.key(),
            files: hit.members.iter().map(|p| path_string(p)).collect(),
        }
    }
}

/// Write a hit as a single compact JSON line.
///
/// # Errors
///
/// Returns an error if serialization or writing fails.
pub fn write_hit<W: Write + ?Sized>(
    writer: &mut W,
    hit: &DuplicateHit,
) -> Result<(), JsonOutputError> {
    serde_json::to_writer(&mut *writer, &JsonHit::from(hit))?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}

fn path_string(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

/// Errors that can occur during JSON output.
#[derive(thiserror::Error, Debug)]
pub enum JsonOutputError {
    /// JSON serialization error
    #[error("JSON serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error during writing
    #[error("I/O error during JSON generation: {0}")]
    Io(#[from] std::io::Error),
}
