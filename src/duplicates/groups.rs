//! Fingerprint grouping and duplicate group management.
//!
//! # Overview
//!
//! [`DuplicateIndex`] maps each [`Fingerprint`] to the ordered list of files
//! accepted under it during one scan. It owns the membership decision: a new
//! file joins a group only if the supplied confirmation (byte comparison in
//! safe mode, nothing otherwise) accepts it against one of the members.
//!
//! Singletons stay in the index while scanning so later files can still join
//! them; [`DuplicateIndex::finalize`] drops them.
//!
//! # Example
//!
//! ```
//! use sweeper::duplicates::{DuplicateIndex, GroupState};
//! use sweeper::scanner::Fingerprint;
//! use std::path::PathBuf;
//!
//! let fp = Fingerprint::new(vec!["5d41402abc4b2a76b9719d911017c592".to_string()]);
//! let mut index = DuplicateIndex::new();
//!
//! assert_eq!(index.insert(fp.clone(), PathBuf::from("/a/x.txt")), GroupState::Created);
//! assert_eq!(index.insert(fp.clone(), PathBuf::from("/b/y.txt")), GroupState::Joined { members: 2 });
//! assert_eq!(index.insert(fp, PathBuf::from("/b/y.txt")), GroupState::AlreadyPresent);
//!
//! let groups = index.finalize();
//! assert_eq!(groups.len(), 1);
//! assert_eq!(groups[0].files.len(), 2);
//! ```

use std::collections::HashMap;
use std::convert::Infallible;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::scanner::Fingerprint;

/// Outcome of inserting a file into the index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupState {
    /// The file is the first member of a new group.
    Created,
    /// The file joined an existing group, which now has `members` files.
    Joined {
        /// Group size after the insertion
        members: usize,
    },
    /// The path is already a member of this group; nothing was inserted.
    AlreadyPresent,
    /// Same fingerprint, but no member has identical content; nothing was inserted.
    Collision,
}

impl GroupState {
    /// Whether the file was added to a group.
    #[must_use]
    pub fn is_accepted(self) -> bool {
        matches!(self, Self::Created | Self::Joined { .. })
    }

    /// Whether the file was added as the second or later member of a group.
    #[must_use]
    pub fn is_duplicate(self) -> bool {
        matches!(self, Self::Joined { .. })
    }
}

/// Confirmed duplicate group of files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DuplicateGroup {
    /// Fingerprint shared by every member
    pub fingerprint: Fingerprint,
    /// Canonical member paths in discovery order
    pub files: Vec<PathBuf>,
}

impl DuplicateGroup {
    /// Create a new duplicate group.
    ///
    /// # Arguments
    ///
    /// * `fingerprint` - Content fingerprint
    /// * `files` - Member paths in discovery order
    #[must_use]
    pub fn new(fingerprint: Fingerprint, files: Vec<PathBuf>) -> Self {
        Self { fingerprint, files }
    }

    /// Number of files in this group.
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Check if this group is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Number of duplicate copies (total - 1 original).
    #[must_use]
    pub fn duplicate_count(&self) -> usize {
        self.files.len().saturating_sub(1)
    }

    /// Whether `path` is a member of this group.
    #[must_use]
    pub fn contains(&self, path: &Path) -> bool {
        self.files.iter().any(|f| f == path)
    }
}

/// Fingerprint -> ordered member list, for the lifetime of one scan.
///
/// Fingerprints iterate in the order they were first seen.
#[derive(Debug, Default)]
pub struct DuplicateIndex {
    slots: HashMap<Fingerprint, usize>,
    entries: Vec<(Fingerprint, Vec<PathBuf>)>,
    files: usize,
}

impl DuplicateIndex {
    /// Create an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a file, trusting fingerprint equality as content equality.
    pub fn insert(&mut self, fingerprint: Fingerprint, path: PathBuf) -> GroupState {
        self.insert_with(fingerprint, path, |_, _| Ok::<_, Infallible>(true))
            .unwrap_or_else(|never| match never {})
    }

    /// Insert a file, letting `confirm` decide whether it matches a member.
    ///
    /// `confirm(member, candidate)` is called for each existing member in
    /// order until it returns `true`. If no member is confirmed the file is
    /// not inserted and [`GroupState::Collision`] is returned. A path already
    /// in the group is never compared or inserted again.
    ///
    /// # Errors
    ///
    /// Returns the first error produced by `confirm`; the index is left
    /// unchanged in that case.
    pub fn insert_with<E, F>(
        &mut self,
        fingerprint: Fingerprint,
        path: PathBuf,
        mut confirm: F,
    ) -> Result<GroupState, E>
    where
        F: FnMut(&Path, &Path) -> Result<bool, E>,
    {
        let Some(&slot) = self.slots.get(&fingerprint) else {
            self.slots.insert(fingerprint.clone(), self.entries.len());
            self.entries.push((fingerprint, vec![path]));
            self.files += 1;
            return Ok(GroupState::Created);
        };

        let members = &mut self.entries[slot].1;
        if members.contains(&path) {
            return Ok(GroupState::AlreadyPresent);
        }

        let mut confirmed = false;
        for member in members.iter() {
            if confirm(member, &path)? {
                confirmed = true;
                break;
            }
        }
        if !confirmed {
            return Ok(GroupState::Collision);
        }

        members.push(path);
        self.files += 1;
        Ok(GroupState::Joined {
            members: members.len(),
        })
    }

    /// Current members for a fingerprint, in discovery order.
    #[must_use]
    pub fn members(&self, fingerprint: &Fingerprint) -> Option<&[PathBuf]> {
        self.slots
            .get(fingerprint)
            .map(|&slot| self.entries[slot].1.as_slice())
    }

    /// Number of files accepted into the index.
    #[must_use]
    pub fn len(&self) -> usize {
        self.files
    }

    /// Check if nothing has been inserted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files == 0
    }

    /// Number of distinct fingerprints seen, singletons included.
    #[must_use]
    pub fn fingerprint_count(&self) -> usize {
        self.entries.len()
    }

    /// Consume the index, keeping only groups with two or more members.
    #[must_use]
    pub fn finalize(self) -> Vec<DuplicateGroup> {
        let total = self.entries.len();
        let groups: Vec<DuplicateGroup> = self
            .entries
            .into_iter()
            .filter(|(_, files)| files.len() > 1)
            .map(|(fingerprint, files)| DuplicateGroup::new(fingerprint, files))
            .collect();
        log::debug!(
            "Finalized index: {} fingerprints, {} duplicate groups",
            total,
            groups.len()
        );
        groups
    }
}
