use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use clap::Parser;
use sweeper::actions::{
    move_duplicates, plan_all, remove_duplicates, ActionConfig, ActionError, KeepPolicy,
};
use sweeper::cli::Cli;
use sweeper::config::{Config, Settings};
use sweeper::duplicates::DuplicateScanner;
use sweeper::error::ExitCode;
use tempfile::{tempdir, TempDir};

/// a/x.txt and b/y.txt hold "hello", b/z.txt holds "world".
struct Fixture {
    _dir: TempDir,
    a: PathBuf,
    b: PathBuf,
    x: PathBuf,
    y: PathBuf,
    z: PathBuf,
}

fn fixture() -> Fixture {
    let dir = tempdir().unwrap();
    let root = fs::canonicalize(dir.path()).unwrap();
    let a = root.join("a");
    let b = root.join("b");
    fs::create_dir(&a).unwrap();
    fs::create_dir(&b).unwrap();
    fs::write(a.join("x.txt"), b"hello").unwrap();
    fs::write(b.join("y.txt"), b"hello").unwrap();
    fs::write(b.join("z.txt"), b"world").unwrap();
    Fixture {
        x: a.join("x.txt"),
        y: b.join("y.txt"),
        z: b.join("z.txt"),
        a,
        b,
        _dir: dir,
    }
}

fn settings(args: &[&str]) -> Settings {
    let cli = Cli::try_parse_from(std::iter::once("sweeper").chain(args.iter().copied())).unwrap();
    Settings::resolve(&cli, &Config::default()).unwrap()
}

fn run(args: &[&str]) -> (ExitCode, String) {
    let mut out = Vec::new();
    let code = sweeper::run(
        &settings(args),
        Arc::new(AtomicBool::new(false)),
        &mut out,
    )
    .unwrap();
    (code, String::from_utf8(out).unwrap())
}

fn s(path: &Path) -> &str {
    path.to_str().unwrap()
}

#[test]
fn test_keep_prefix_selects_kept_file() {
    let f = fixture();
    let (groups, _) = DuplicateScanner::with_defaults()
        .scan(&[f.a.clone(), f.b.clone()])
        .unwrap();

    let plans = plan_all(&groups, &KeepPolicy::from_prefix(Some(s(&f.b))));
    assert_eq!(plans.len(), 1);
    assert_eq!(plans[0].kept, f.y);
    assert_eq!(plans[0].extras, vec![f.x.clone()]);

    let report = remove_duplicates(&plans, &ActionConfig::simulate(), None);
    assert!(report.simulated);
    assert_eq!(report.success_count(), 1);
    assert!(f.x.exists());
}

#[test]
fn test_remove_keeps_first_discovered() {
    let f = fixture();
    let (groups, _) = DuplicateScanner::with_defaults()
        .scan(&[f.a.clone(), f.b.clone()])
        .unwrap();

    let plans = plan_all(&groups, &KeepPolicy::FirstDiscovered);
    let report = remove_duplicates(&plans, &ActionConfig::default(), None);

    assert!(report.all_succeeded());
    assert!(f.x.exists());
    assert!(!f.y.exists());
    assert!(f.z.exists());
}

#[test]
fn test_move_into_destination() {
    let f = fixture();
    let dest = f.a.parent().unwrap().join("dups");
    fs::create_dir(&dest).unwrap();
    let (groups, _) = DuplicateScanner::with_defaults()
        .scan(&[f.a.clone(), f.b.clone()])
        .unwrap();

    let plans = plan_all(&groups, &KeepPolicy::default());
    let report = move_duplicates(&plans, &dest, &ActionConfig::default(), None);

    assert!(report.all_succeeded());
    assert!(f.x.exists());
    assert!(!f.y.exists());
    assert_eq!(fs::read(dest.join("y.txt")).unwrap(), b"hello");
}

#[test]
fn test_move_never_overwrites() {
    let f = fixture();
    let dest = f.a.parent().unwrap().join("dups");
    fs::create_dir(&dest).unwrap();
    fs::write(dest.join("y.txt"), b"occupied").unwrap();
    let (groups, _) = DuplicateScanner::with_defaults()
        .scan(&[f.a.clone(), f.b.clone()])
        .unwrap();

    let plans = plan_all(&groups, &KeepPolicy::default());
    let report = move_duplicates(&plans, &dest, &ActionConfig::default(), None);

    assert!(report.aborted);
    assert!(matches!(
        report.failures[0].error,
        ActionError::TargetExists { .. }
    ));
    assert!(f.y.exists());
    assert_eq!(fs::read(dest.join("y.txt")).unwrap(), b"occupied");
}

#[test]
fn test_run_pprint() {
    let f = fixture();
    let (code, out) = run(&[s(&f.a), s(&f.b)]);

    assert_eq!(code, ExitCode::Success);
    assert_eq!(out, format!("{}\n{}\n\n", f.x.display(), f.y.display()));
}

#[test]
fn test_run_print_json() {
    let f = fixture();
    let (code, out) = run(&["-a", "print", s(&f.a), s(&f.b)]);

    assert_eq!(code, ExitCode::Success);
    let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(
        parsed["5d41402abc4b2a76b9719d911017c592"],
        serde_json::json!([s(&f.x), s(&f.y)])
    );
    assert!(out.contains("\n    \""));
}

#[test]
fn test_run_immediate_json_lines() {
    let f = fixture();
    let (code, out) = run(&["-a", "immediate", s(&f.a), s(&f.b)]);

    assert_eq!(code, ExitCode::Success);
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(lines.len(), 1);
    let hit: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
    assert_eq!(hit["path"], s(&f.y));
    assert_eq!(hit["files"], serde_json::json!([s(&f.x), s(&f.y)]));
}

#[test]
fn test_run_no_duplicates_exit_code() {
    let f = fixture();
    let (code, out) = run(&[s(&f.b)]);

    assert_eq!(code, ExitCode::NoDuplicates);
    assert!(out.is_empty());
}

#[test]
fn test_run_simulated_remove_echoes_and_keeps_files() {
    let f = fixture();
    let (code, out) = run(&["-a", "remove", "-s", "-k", s(&f.b), s(&f.a), s(&f.b)]);

    assert_eq!(code, ExitCode::Success);
    assert_eq!(
        out,
        format!(
            "found duplicates:\n    {}\n    {}\nrm {}\n",
            f.x.display(),
            f.y.display(),
            f.x.display()
        )
    );
    assert!(f.x.exists());
    assert!(f.y.exists());
}

#[test]
fn test_run_remove_is_silent_without_verbose() {
    let f = fixture();
    let (code, out) = run(&["-a", "remove", "-k", s(&f.b), s(&f.a), s(&f.b)]);

    assert_eq!(code, ExitCode::Success);
    assert!(out.is_empty());
    assert!(!f.x.exists());
    assert!(f.y.exists());
}

#[test]
fn test_run_simulated_move_creates_nothing() {
    let f = fixture();
    let dest = f.a.parent().unwrap().join("dups");
    let (code, out) = run(&["-a", "move", "-s", "-m", s(&dest), s(&f.a), s(&f.b)]);

    assert_eq!(code, ExitCode::Success);
    assert!(out.ends_with(&format!("mv {} to {}\n", f.y.display(), dest.display())));
    assert!(!dest.exists());
    assert!(f.y.exists());
}

#[test]
fn test_run_move_creates_destination() {
    let f = fixture();
    let dest = f.a.parent().unwrap().join("new").join("dups");
    let (code, _) = run(&["-a", "move", "-m", s(&dest), s(&f.a), s(&f.b)]);

    assert_eq!(code, ExitCode::Success);
    assert!(dest.join("y.txt").exists());
    assert!(!f.y.exists());
}

#[cfg(unix)]
#[test]
fn test_run_keep_going_reports_partial_success() {
    use std::os::unix::fs::PermissionsExt;

    let f = fixture();
    fs::write(f.b.join("w.txt"), b"world").unwrap();
    let c = f.a.parent().unwrap().join("c");
    fs::create_dir(&c).unwrap();
    fs::write(c.join("v.txt"), b"hello").unwrap();
    fs::set_permissions(&f.b, fs::Permissions::from_mode(0o555)).unwrap();

    // Root ignores directory permissions.
    let canary = f.b.join("canary");
    if fs::write(&canary, b"").is_ok() {
        fs::remove_file(&canary).unwrap();
        fs::set_permissions(&f.b, fs::Permissions::from_mode(0o755)).unwrap();
        return;
    }

    let (code, _) = run(&["-a", "remove", "--keep-going", s(&f.a), s(&f.b), s(&c)]);
    fs::set_permissions(&f.b, fs::Permissions::from_mode(0o755)).unwrap();

    assert_eq!(code, ExitCode::PartialSuccess);
    assert!(f.y.exists());
    assert!(!c.join("v.txt").exists());
}
