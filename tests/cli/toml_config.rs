//! Configuration file loading and precedence

use std::path::PathBuf;

use carbonpaper::app::cli::args::{Args, BackendKind};
use carbonpaper::app::cli::config::{load, ConfigError, RunOptions};
use carbonpaper::core::logging::LogFormat;
use clap::Parser;

use crate::common::config_file;

#[test]
fn test_all_keys() {
    let (_dir, path) = config_file(
        r#"
backend = "memory"
device = "memory:flatbed0"
chunk-size = 65536
output = "scans/page.png"
log-level = "warn"
log-format = "ext"
log-file = "none"
color = false
"#,
    );

    let (loaded, config) = load(Some(&path)).unwrap().unwrap();
    assert_eq!(loaded, path);

    let args = Args::try_parse_from(["carbonpaper", "scan"]).unwrap();
    let options = RunOptions::resolve(&args, &config, true);
    assert_eq!(options.backend, BackendKind::Memory);
    assert_eq!(options.device.as_deref(), Some("memory:flatbed0"));
    assert_eq!(options.chunk_size, 65536);
    assert_eq!(options.output, PathBuf::from("scans/page.png"));
    assert_eq!(options.log_level.as_deref(), Some("warn"));
    assert_eq!(options.log_format, LogFormat::Ext);
    assert_eq!(options.log_file, None);
    assert!(!options.color);
}

#[test]
fn test_command_line_overrides_file() {
    let (_dir, path) = config_file("device = \"from-file\"\nchunk-size = 65536\n");
    let (_, config) = load(Some(&path)).unwrap().unwrap();

    let args = Args::try_parse_from([
        "carbonpaper",
        "config",
        "--device",
        "from-cli",
        "--chunk-size",
        "4096",
    ])
    .unwrap();
    let options = RunOptions::resolve(&args, &config, false);
    assert_eq!(options.device.as_deref(), Some("from-cli"));
    assert_eq!(options.chunk_size, 4096);
}

#[test]
fn test_unknown_key_is_reported_with_path() {
    let (_dir, path) = config_file("plugin-dir = \"/tmp\"\n");
    let error = load(Some(&path)).unwrap_err();
    assert!(matches!(error, ConfigError::Parse { .. }));
    assert!(error.to_string().contains("carbonpaper.toml"));
}
