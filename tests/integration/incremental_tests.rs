use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use sweeper::duplicates::{DuplicateScanner, FinderError, ScannerConfig};
use sweeper::scanner::EnumerationStrategy;
use tempfile::tempdir;

fn write(dir: &std::path::Path, name: &str, content: &[u8]) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    fs::canonicalize(path).unwrap()
}

#[test]
fn test_no_hits_without_duplicates() {
    let dir = tempdir().unwrap();
    write(dir.path(), "a", b"1");
    write(dir.path(), "b", b"2");

    let scanner = DuplicateScanner::with_defaults();
    let mut scan = scanner.scan_incremental(&[dir.path().to_path_buf()]).unwrap();
    assert!(scan.next().is_none());
    assert!(scan.next().is_none());
    assert_eq!(scan.summary().files_scanned, 2);
}

#[test]
fn test_hits_match_final_groups() {
    let dir = tempdir().unwrap();
    let a = write(dir.path(), "a", b"same");
    write(dir.path(), "b", b"other");
    let c = write(dir.path(), "c", b"same");
    let d = write(dir.path(), "d", b"same");

    let scanner = DuplicateScanner::with_defaults();
    let hits: Vec<_> = scanner
        .scan_incremental(&[dir.path().to_path_buf()])
        .unwrap()
        .map(Result::unwrap)
        .collect();

    assert_eq!(hits.len(), 2);
    assert_eq!(hits[0].path, c);
    assert_eq!(hits[0].members, vec![a.clone(), c.clone()]);
    assert_eq!(hits[1].path, d);
    assert_eq!(hits[1].members, vec![a, c, d]);

    let (groups, _) = scanner.scan(&[dir.path().to_path_buf()]).unwrap();
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].files, hits[1].members);
    assert_eq!(groups[0].fingerprint, hits[1].fingerprint);
}

#[test]
fn test_every_hit_path_is_last_member() {
    let dir = tempdir().unwrap();
    for i in 0..6 {
        let content: &[u8] = if i % 2 == 0 { b"even" } else { b"odd" };
        write(dir.path(), &format!("f{i}"), content);
    }

    let scanner = DuplicateScanner::new(
        ScannerConfig::default().with_strategy(EnumerationStrategy::PreGathered),
    );
    for hit in scanner.scan_incremental(&[dir.path().to_path_buf()]).unwrap() {
        let hit = hit.unwrap();
        assert_eq!(hit.members.last(), Some(&hit.path));
        assert!(hit.members.len() >= 2);
    }
}

#[test]
fn test_interruption_yields_error_once() {
    let dir = tempdir().unwrap();
    write(dir.path(), "a", b"same");
    write(dir.path(), "b", b"same");
    write(dir.path(), "c", b"same");

    let flag = Arc::new(AtomicBool::new(false));
    let scanner =
        DuplicateScanner::new(ScannerConfig::default().with_shutdown_flag(Arc::clone(&flag)));
    let mut scan = scanner.scan_incremental(&[dir.path().to_path_buf()]).unwrap();

    assert!(scan.next().unwrap().is_ok());
    flag.store(true, Ordering::SeqCst);
    assert!(matches!(scan.next(), Some(Err(FinderError::Interrupted))));
    assert!(scan.next().is_none());
}

#[test]
fn test_dropping_scan_early_is_clean() {
    let dir = tempdir().unwrap();
    let a = write(dir.path(), "a", b"same");
    let b = write(dir.path(), "b", b"same");
    write(dir.path(), "c", b"same");

    let scanner = DuplicateScanner::with_defaults();
    {
        let mut scan = scanner.scan_incremental(&[dir.path().to_path_buf()]).unwrap();
        let first = scan.next().unwrap().unwrap();
        assert_eq!(first.members, vec![a.clone(), b.clone()]);
    }

    // No handle was left open: the files can be removed right away.
    fs::remove_file(&a).unwrap();
    fs::remove_file(&b).unwrap();
}

#[test]
fn test_bad_root_fails_before_iteration() {
    let dir = tempdir().unwrap();
    let scanner = DuplicateScanner::with_defaults();
    let result = scanner.scan_incremental(&[dir.path().join("missing")]);
    assert!(matches!(result, Err(FinderError::PathNotFound(_))));
}
