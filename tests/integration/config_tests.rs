use std::fs;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use clap::Parser;
use sweeper::cli::Cli;
use sweeper::config::{ConfigError, Settings};
use sweeper::error::{exit_code_for, ExitCode};
use sweeper::scanner::HashAlgorithm;
use tempfile::tempdir;

fn parse(args: &[&str]) -> Cli {
    Cli::try_parse_from(std::iter::once("sweeper").chain(args.iter().copied())).unwrap()
}

#[test]
fn test_explicit_config_file_supplies_defaults() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("sweeper.json");
    fs::write(
        &path,
        r#"{"block_size": 128, "digest_algs": "sha256,md5", "safe_mode": true}"#,
    )
    .unwrap();

    let settings = Settings::from_cli(&parse(&["--config", path.to_str().unwrap()])).unwrap();

    assert_eq!(settings.block_size, 128);
    assert_eq!(
        settings.algorithms,
        vec![HashAlgorithm::Sha256, HashAlgorithm::Md5]
    );
    assert!(settings.safe_mode);
}

#[test]
fn test_flags_beat_config_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("sweeper.json");
    fs::write(&path, r#"{"block_size": 128, "digest_algs": "sha256"}"#).unwrap();

    let settings = Settings::from_cli(&parse(&[
        "--config",
        path.to_str().unwrap(),
        "-b",
        "8192",
        "-d",
        "sha384",
    ]))
    .unwrap();

    assert_eq!(settings.block_size, 8192);
    assert_eq!(settings.algorithms, vec![HashAlgorithm::Sha384]);
}

#[test]
fn test_missing_explicit_config_file_is_an_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("absent.json");

    let err = Settings::from_cli(&parse(&["--config", path.to_str().unwrap()])).unwrap_err();
    assert!(matches!(err, ConfigError::File { .. }));
    assert_eq!(exit_code_for(&anyhow::Error::new(err)), ExitCode::InvalidConfig);
}

#[test]
fn test_invalid_options_map_to_config_exit_code() {
    for args in [
        &["-b", "zero"][..],
        &["-d", "md5,md5"][..],
        &["-d", "crc32"][..],
        &["-a", "delete"][..],
    ] {
        let err = Settings::from_cli(&parse(args)).unwrap_err();
        assert_eq!(
            exit_code_for(&anyhow::Error::new(err)),
            ExitCode::InvalidConfig,
            "args: {args:?}"
        );
    }
}

#[test]
fn test_missing_root_maps_to_config_exit_code() {
    let dir = tempdir().unwrap();
    let missing = dir.path().join("missing");
    let cli = parse(&[missing.to_str().unwrap()]);
    let settings = Settings::from_cli(&cli).unwrap();

    let mut out = Vec::new();
    let err = sweeper::run(&settings, Arc::new(AtomicBool::new(false)), &mut out).unwrap_err();

    assert_eq!(exit_code_for(&err), ExitCode::InvalidConfig);
    assert!(out.is_empty());
}

#[test]
fn test_raised_shutdown_flag_interrupts_run() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a"), b"x").unwrap();
    let cli = parse(&[dir.path().to_str().unwrap()]);
    let settings = Settings::from_cli(&cli).unwrap();

    let mut out = Vec::new();
    let err = sweeper::run(&settings, Arc::new(AtomicBool::new(true)), &mut out).unwrap_err();

    assert_eq!(exit_code_for(&err), ExitCode::Interrupted);
}
