//! Moving duplicate files into a destination directory.
//!
//! Each extra is moved to `<dest>/<file name>`. An occupied target is a
//! failure for that file; nothing is ever overwritten. The target is created
//! with a hard link (or an exclusive create when linking is not possible),
//! so a file appearing at the target after the check is never replaced.
//! Two extras sharing a file name collide within one run, simulated or not:
//! the second one fails with [`ActionError::TargetExists`].

use std::collections::HashSet;
use std::fs::{self, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

use super::delete::{run_plans, ActionConfig, ActionError, ActionObserver, ActionReport, Operation};
use super::ActionPlan;

/// Check the move destination and create it when missing.
///
/// Nothing is created when `simulate` is set, but an existing
/// non-directory is still rejected.
///
/// # Errors
///
/// - `DestinationNotADirectory` if `dest` exists and is not a directory
/// - `Io` / `PermissionDenied` if it cannot be created
pub fn prepare_destination(dest: &Path, simulate: bool) -> Result<(), ActionError> {
    match fs::metadata(dest) {
        Ok(meta) if meta.is_dir() => Ok(()),
        Ok(_) => Err(ActionError::DestinationNotADirectory(dest.to_path_buf())),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            if simulate {
                log::debug!("Would create {}", dest.display());
                return Ok(());
            }
            fs::create_dir_all(dest).map_err(|e| ActionError::from_io(dest, e))?;
            log::debug!("Created move destination {}", dest.display());
            Ok(())
        }
        Err(e) => Err(ActionError::from_io(dest, e)),
    }
}

/// Move every extra file of every plan into `dest`.
///
/// `dest` should have gone through [`prepare_destination`] first.
#[must_use]
pub fn move_duplicates(
    plans: &[ActionPlan],
    dest: &Path,
    config: &ActionConfig,
    observer: Option<&dyn ActionObserver>,
) -> ActionReport {
    let mut claimed: HashSet<PathBuf> = HashSet::new();
    run_plans(
        plans,
        config,
        observer,
        |path| {
            let target = target_for(path, dest)?;
            if claimed.contains(&target) || fs::symlink_metadata(&target).is_ok() {
                return Err(ActionError::TargetExists {
                    path: path.to_path_buf(),
                    target,
                });
            }
            claimed.insert(target.clone());
            Ok(Operation::Move {
                path: path.to_path_buf(),
                dest: dest.to_path_buf(),
                target,
            })
        },
        |op| match op {
            Operation::Move { path, target, .. } => move_file(path, target),
            Operation::Remove { .. } => Ok(()),
        },
    )
}

/// Move one file without ever replacing `target`.
///
/// The file is hard-linked to `target` and then unlinked from `path`. When
/// linking is not possible (another filesystem, no link support) the content
/// is copied into a newly created `target` instead.
///
/// # Errors
///
/// - `TargetExists` if `target` is already present
/// - any other `ActionError` if linking, copying or removal fails
pub fn move_file(path: &Path, target: &Path) -> Result<(), ActionError> {
    match fs::hard_link(path, target) {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
            return Err(ActionError::TargetExists {
                path: path.to_path_buf(),
                target: target.to_path_buf(),
            });
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(ActionError::from_io(path, e));
        }
        Err(e) => {
            log::debug!(
                "Cannot link {} to {} ({}), copying",
                path.display(),
                target.display(),
                e
            );
            copy_new(path, target)?;
        }
    }

    if let Err(e) = fs::remove_file(path) {
        log::error!("Failed to move {}: {}", path.display(), e);
        let _ = fs::remove_file(target);
        return Err(ActionError::from_io(path, e));
    }
    log::debug!("Moved {} to {}", path.display(), target.display());
    Ok(())
}

/// Copy `path` into a `target` that must not exist yet.
fn copy_new(path: &Path, target: &Path) -> Result<(), ActionError> {
    let mut source = fs::File::open(path).map_err(|e| ActionError::from_io(path, e))?;
    let mut dest = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(target)
        .map_err(|e| match e.kind() {
            io::ErrorKind::AlreadyExists => ActionError::TargetExists {
                path: path.to_path_buf(),
                target: target.to_path_buf(),
            },
            _ => ActionError::from_io(target, e),
        })?;

    if let Err(e) = io::copy(&mut source, &mut dest) {
        drop(dest);
        let _ = fs::remove_file(target);
        return Err(ActionError::from_io(path, e));
    }
    Ok(())
}

fn target_for(path: &Path, dest: &Path) -> Result<PathBuf, ActionError> {
    path.file_name()
        .map(|name| dest.join(name))
        .ok_or_else(|| ActionError::Io {
            path: path.to_path_buf(),
            source: io::Error::new(io::ErrorKind::InvalidInput, "path has no file name"),
        })
}
