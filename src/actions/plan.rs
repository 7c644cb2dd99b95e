//! Choosing which member of a duplicate group survives.
//!
//! # Overview
//!
//! [`plan`] splits a finalized [`DuplicateGroup`] into the file to keep and
//! the extras an action will remove or move. Extras always keep the group's
//! discovery order, and exactly one file is kept per group.
//!
//! # Keep policy
//!
//! - [`KeepPolicy::FirstDiscovered`] keeps the first member found.
//! - [`KeepPolicy::PathPrefix`] keeps the first member whose canonical path
//!   string starts with the prefix, falling back to the first member when
//!   none does. The prefix is a plain string test, so `/data/a` also matches
//!   `/data/ab/file`.
//!
//! # Example
//!
//! ```
//! use sweeper::actions::{plan, KeepPolicy};
//! use sweeper::duplicates::DuplicateGroup;
//! use sweeper::scanner::Fingerprint;
//! use std::path::PathBuf;
//!
//! let group = DuplicateGroup::new(
//!     Fingerprint::new(vec!["5d41402abc4b2a76b9719d911017c592".to_string()]),
//!     vec![PathBuf::from("/a/x.txt"), PathBuf::from("/b/y.txt")],
//! );
//!
//! let plan = plan(&group, &KeepPolicy::PathPrefix("/b".to_string())).unwrap();
//! assert_eq!(plan.kept, PathBuf::from("/b/y.txt"));
//! assert_eq!(plan.extras, vec![PathBuf::from("/a/x.txt")]);
//! ```

use std::path::{Path, PathBuf};

use crate::duplicates::DuplicateGroup;

/// Which group member to keep.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum KeepPolicy {
    /// Keep the first member discovered.
    #[default]
    FirstDiscovered,
    /// Keep the first member whose path starts with this prefix.
    PathPrefix(String),
}

impl KeepPolicy {
    /// Build a policy from an optional `--keep` value.
    ///
    /// An empty prefix means no preference.
    #[must_use]
    pub fn from_prefix(prefix: Option<&str>) -> Self {
        match prefix {
            Some(p) if !p.is_empty() => Self::PathPrefix(p.to_string()),
            _ => Self::FirstDiscovered,
        }
    }

    fn prefers(&self, path: &Path) -> bool {
        match self {
            Self::FirstDiscovered => false,
            Self::PathPrefix(prefix) => path.to_string_lossy().starts_with(prefix.as_str()),
        }
    }
}

/// The kept file and the extras of one group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionPlan {
    /// File left in place
    pub kept: PathBuf,
    /// Every other member, in discovery order
    pub extras: Vec<PathBuf>,
    /// All members, in discovery order
    pub members: Vec<PathBuf>,
}

/// Split a group into the kept file and its extras.
///
/// Returns `None` for an empty group.
#[must_use]
pub fn plan(group: &DuplicateGroup, policy: &KeepPolicy) -> Option<ActionPlan> {
    let kept_index = group
        .files
        .iter()
        .position(|f| policy.prefers(f))
        .unwrap_or(0);
    let kept = group.files.get(kept_index)?.clone();

    let extras = group
        .files
        .iter()
        .enumerate()
        .filter(|&(i, _)| i != kept_index)
        .map(|(_, f)| f.clone())
        .collect();

    Some(ActionPlan {
        kept,
        extras,
        members: group.files.clone(),
    })
}

/// Plan every group, in order.
#[must_use]
pub fn plan_all(groups: &[DuplicateGroup], policy: &KeepPolicy) -> Vec<ActionPlan> {
    groups.iter().filter_map(|g| plan(g, policy)).collect()
}
