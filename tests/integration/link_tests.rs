#![cfg(unix)]

use std::fs;
use std::os::unix::fs::symlink;
use std::path::PathBuf;

use sweeper::duplicates::DuplicateScanner;
use tempfile::tempdir;

#[test]
fn test_symlink_resolves_to_target_once() {
    let dir = tempdir().unwrap();
    let target = dir.path().join("target.txt");
    fs::write(&target, b"linked").unwrap();
    symlink(&target, dir.path().join("link.txt")).unwrap();

    let (groups, summary) = DuplicateScanner::with_defaults()
        .scan(&[dir.path().to_path_buf()])
        .unwrap();

    // link.txt sorts first and resolves to target.txt, which is then seen again.
    assert!(groups.is_empty());
    assert_eq!(summary.files_scanned, 2);
    assert_eq!(summary.already_indexed, 1);
}

#[test]
fn test_dangling_symlink_skipped() {
    let dir = tempdir().unwrap();
    symlink(dir.path().join("nowhere"), dir.path().join("dangling")).unwrap();
    fs::write(dir.path().join("real.txt"), b"x").unwrap();

    let (groups, summary) = DuplicateScanner::with_defaults()
        .scan(&[dir.path().to_path_buf()])
        .unwrap();

    assert!(groups.is_empty());
    assert_eq!(summary.files_scanned, 1);
}

#[test]
fn test_symlinked_directory_not_followed() {
    let dir = tempdir().unwrap();
    let real = dir.path().join("real");
    fs::create_dir(&real).unwrap();
    fs::write(real.join("file.txt"), b"inside").unwrap();
    symlink(&real, dir.path().join("alias")).unwrap();

    let (groups, summary) = DuplicateScanner::with_defaults()
        .scan(&[dir.path().to_path_buf()])
        .unwrap();

    assert!(groups.is_empty());
    assert_eq!(summary.files_scanned, 1);
}

#[test]
fn test_hard_links_are_reported_as_duplicates() {
    let dir = tempdir().unwrap();
    let original = dir.path().join("a.txt");
    fs::write(&original, b"shared inode").unwrap();
    fs::hard_link(&original, dir.path().join("b.txt")).unwrap();

    let (groups, _) = DuplicateScanner::with_defaults()
        .scan(&[dir.path().to_path_buf()])
        .unwrap();

    assert_eq!(groups.len(), 1);
    let names: Vec<PathBuf> = groups[0]
        .files
        .iter()
        .map(|p| PathBuf::from(p.file_name().unwrap()))
        .collect();
    assert_eq!(names, vec![PathBuf::from("a.txt"), PathBuf::from("b.txt")]);
}

#[test]
fn test_symlinked_root_is_canonicalized() {
    let dir = tempdir().unwrap();
    let real = dir.path().join("real");
    fs::create_dir(&real).unwrap();
    fs::write(real.join("a"), b"dup").unwrap();
    fs::write(real.join("b"), b"dup").unwrap();
    let alias = dir.path().join("alias");
    symlink(&real, &alias).unwrap();

    let (groups, _) = DuplicateScanner::with_defaults().scan(&[alias]).unwrap();

    let canonical = fs::canonicalize(&real).unwrap();
    assert_eq!(groups.len(), 1);
    assert!(groups[0].files.iter().all(|p| p.starts_with(&canonical)));
}
