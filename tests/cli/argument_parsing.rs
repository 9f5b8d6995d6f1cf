//! Argument parsing through the public `Args` type

use std::path::PathBuf;

use carbonpaper::app::cli::args::{Args, BackendKind, Command};
use carbonpaper::core::logging::LogFormat;
use clap::Parser;

#[test]
fn test_global_options() {
    let args = Args::try_parse_from([
        "carbonpaper",
        "--backend",
        "memory",
        "--device",
        "memory:flatbed0",
        "--log-level",
        "debug",
        "--log-format",
        "json",
        "--log-file",
        "scan.log",
        "caps",
    ])
    .unwrap();

    assert_eq!(args.command, Command::Caps);
    assert_eq!(args.backend, Some(BackendKind::Memory));
    assert_eq!(args.device.as_deref(), Some("memory:flatbed0"));
    assert_eq!(args.log_level.as_deref(), Some("debug"));
    assert_eq!(args.log_format, Some(LogFormat::Json));
    assert_eq!(args.log_file, Some(PathBuf::from("scan.log")));
}

#[test]
fn test_set_arguments() {
    let args = Args::try_parse_from([
        "carbonpaper",
        "set",
        "--from-x",
        "5",
        "--from-y",
        "7.5",
        "--to-x",
        "100",
        "--to-y",
        "150",
        "-r",
        "600",
        "-s",
        "ADF",
        "-m",
        "Gray",
    ])
    .unwrap();

    let Command::Set(settings) = args.command else {
        panic!("Expected set command");
    };
    let patch = settings.to_patch();
    assert_eq!(patch.from_x, Some(5.0));
    assert_eq!(patch.from_y, Some(7.5));
    assert_eq!(patch.to_x, Some(100.0));
    assert_eq!(patch.to_y, Some(150.0));
    assert_eq!(patch.resolution_in_dpi, Some(600));
    assert_eq!(patch.source.as_deref(), Some("ADF"));
    assert_eq!(patch.mode.as_deref(), Some("Gray"));
}

#[test]
fn test_invalid_log_level_is_rejected() {
    assert!(Args::try_parse_from(["carbonpaper", "list", "--log-level", "loud"]).is_err());
    assert!(Args::try_parse_from(["carbonpaper", "list", "--log-format", "xml"]).is_err());
}

#[test]
fn test_non_numeric_settings_are_rejected() {
    assert!(Args::try_parse_from(["carbonpaper", "set", "--resolution", "high"]).is_err());
    assert!(Args::try_parse_from(["carbonpaper", "set", "--to-y", "tall"]).is_err());
}
