use std::fs::{self, File};
use std::io::Write;
use std::path::PathBuf;

use sweeper::duplicates::{DuplicateScanner, FinderError, ScannerConfig};
use sweeper::scanner::{EnumerationStrategy, HashAlgorithm};
use tempfile::tempdir;

fn write(path: &std::path::Path, content: &[u8]) -> PathBuf {
    File::create(path).unwrap().write_all(content).unwrap();
    fs::canonicalize(path).unwrap()
}

#[test]
fn test_scan_empty_directory() {
    let dir = tempdir().unwrap();
    let scanner = DuplicateScanner::with_defaults();

    let (groups, summary) = scanner.scan(&[dir.path().to_path_buf()]).unwrap();

    assert!(groups.is_empty());
    assert_eq!(summary.files_scanned, 0);
    assert_eq!(summary.duplicate_groups, 0);
}

#[test]
fn test_scan_unique_files() {
    let dir = tempdir().unwrap();
    write(&dir.path().join("a.txt"), b"content a");
    write(&dir.path().join("b.txt"), b"content b");
    write(&dir.path().join("c.txt"), b"content c");

    let (groups, summary) = DuplicateScanner::with_defaults()
        .scan(&[dir.path().to_path_buf()])
        .unwrap();

    assert!(groups.is_empty());
    assert_eq!(summary.files_scanned, 3);
    assert_eq!(summary.unique_fingerprints, 3);
}

#[test]
fn test_scan_duplicate_files() {
    let dir = tempdir().unwrap();
    let a = write(&dir.path().join("a.txt"), b"duplicate");
    let b = write(&dir.path().join("b.txt"), b"duplicate");
    write(&dir.path().join("c.txt"), b"unique");

    let (groups, summary) = DuplicateScanner::with_defaults()
        .scan(&[dir.path().to_path_buf()])
        .unwrap();

    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].files, vec![a, b]);
    assert_eq!(summary.files_scanned, 3);
    assert_eq!(summary.duplicate_groups, 1);
    assert_eq!(summary.duplicate_files, 1);
}

#[test]
fn test_scan_nested_directories() {
    let dir = tempdir().unwrap();
    let sub = dir.path().join("subdir");
    fs::create_dir(&sub).unwrap();
    let deep = sub.join("deeper");
    fs::create_dir(&deep).unwrap();

    write(&dir.path().join("a.txt"), b"nested");
    write(&sub.join("b.txt"), b"nested");
    write(&deep.join("c.txt"), b"nested");

    let (groups, _) = DuplicateScanner::with_defaults()
        .scan(&[dir.path().to_path_buf()])
        .unwrap();

    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].len(), 3);
}

#[test]
fn test_empty_files_group_together() {
    let dir = tempdir().unwrap();
    write(&dir.path().join("empty1"), b"");
    write(&dir.path().join("empty2"), b"");

    let (groups, _) = DuplicateScanner::with_defaults()
        .scan(&[dir.path().to_path_buf()])
        .unwrap();

    assert_eq!(groups.len(), 1);
    assert_eq!(
        groups[0].fingerprint.key(),
        "d41d8cd98f00b204e9800998ecf8427e"
    );
}

#[test]
fn test_multiple_algorithms_key() {
    let dir = tempdir().unwrap();
    write(&dir.path().join("a"), b"hello");
    write(&dir.path().join("b"), b"hello");

    let config = ScannerConfig::default()
        .with_algorithms(vec![HashAlgorithm::Md5, HashAlgorithm::Sha256]);
    let (groups, _) = DuplicateScanner::new(config)
        .scan(&[dir.path().to_path_buf()])
        .unwrap();

    assert_eq!(
        groups[0].fingerprint.key(),
        "5d41402abc4b2a76b9719d911017c592,\
         2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"
    );
}

#[test]
fn test_block_size_does_not_change_result() {
    let dir = tempdir().unwrap();
    let content: Vec<u8> = (0..10_000u32).map(|i| (i % 251) as u8).collect();
    write(&dir.path().join("a"), &content);
    write(&dir.path().join("b"), &content);

    let mut keys = Vec::new();
    for block_size in [1, 7, 4096, 1 << 20] {
        let config = ScannerConfig::default().with_block_size(block_size);
        let (groups, _) = DuplicateScanner::new(config)
            .scan(&[dir.path().to_path_buf()])
            .unwrap();
        assert_eq!(groups.len(), 1);
        keys.push(groups[0].fingerprint.clone());
    }
    assert!(keys.windows(2).all(|w| w[0] == w[1]));
}

#[test]
fn test_strategies_produce_same_groups() {
    let dir = tempdir().unwrap();
    for (name, content) in [("a", "x"), ("b", "y"), ("c", "x"), ("d", "y"), ("e", "z")] {
        write(&dir.path().join(name), content.as_bytes());
    }

    let roots = [dir.path().to_path_buf()];
    let (direct, _) = DuplicateScanner::new(
        ScannerConfig::default().with_strategy(EnumerationStrategy::Direct),
    )
    .scan(&roots)
    .unwrap();
    let (gathered, _) = DuplicateScanner::new(
        ScannerConfig::default().with_strategy(EnumerationStrategy::PreGathered),
    )
    .scan(&roots)
    .unwrap();

    assert_eq!(direct, gathered);
    assert_eq!(direct.len(), 2);
}

#[test]
fn test_missing_root_rejected_before_scanning() {
    let dir = tempdir().unwrap();
    let missing = dir.path().join("missing");

    let err = DuplicateScanner::with_defaults()
        .scan(&[dir.path().to_path_buf(), missing.clone()])
        .unwrap_err();
    assert!(matches!(err, FinderError::PathNotFound(p) if p == missing));
}

#[test]
fn test_file_root_rejected() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("file.txt");
    write(&file, b"x");

    let err = DuplicateScanner::with_defaults().scan(&[file]).unwrap_err();
    assert!(matches!(err, FinderError::NotADirectory(_)));
}

#[test]
fn test_invalid_config_rejected() {
    let dir = tempdir().unwrap();
    let config = ScannerConfig::default().with_algorithms(Vec::new());
    let err = DuplicateScanner::new(config)
        .scan(&[dir.path().to_path_buf()])
        .unwrap_err();
    assert!(matches!(err, FinderError::InvalidConfig(_)));
}

#[cfg(unix)]
#[test]
fn test_unreadable_file_aborts_scan() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempdir().unwrap();
    write(&dir.path().join("a.txt"), b"x");
    let locked = dir.path().join("b.txt");
    write(&locked, b"x");
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

    // Root can read anything; nothing to test there.
    if File::open(&locked).is_ok() {
        return;
    }

    let err = DuplicateScanner::with_defaults()
        .scan(&[dir.path().to_path_buf()])
        .unwrap_err();
    assert!(matches!(err, FinderError::Hash(_)));

    fs::set_permissions(&locked, fs::Permissions::from_mode(0o644)).unwrap();
}
