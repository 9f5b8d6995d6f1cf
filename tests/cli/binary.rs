//! Running the executable against the simulated backend

use std::path::Path;
use std::process::{Command, Output};

use crate::common::config_file;

fn carbonpaper(config: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_carbonpaper"))
        .arg("--config-file")
        .arg(config)
        .args(["--backend", "memory", "--log-level", "off"])
        .args(args)
        .env("NO_COLOR", "1")
        .output()
        .expect("carbonpaper runs")
}

#[test]
fn test_list_prints_simulated_flatbed() {
    let (_dir, config) = config_file("");
    let output = carbonpaper(&config, &["list", "--json"]);

    assert!(output.status.success());
    let devices: Vec<String> = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(devices, vec!["memory:flatbed0 (Carbonpaper / Virtual Flatbed)"]);
}

#[test]
fn test_scan_writes_png() {
    let (dir, config) = config_file("");
    let page = dir.path().join("page.png");
    let output = carbonpaper(
        &config,
        &[
            "scan",
            "--output",
            page.to_str().unwrap(),
            "--to-x",
            "25.4",
            "--to-y",
            "50.8",
            "--resolution",
            "75",
            "--mode",
            "Gray",
        ],
    );

    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let decoded = image::open(&page).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (75, 150));
}

#[test]
fn test_unknown_device_fails() {
    let (_dir, config) = config_file("");
    let output = carbonpaper(&config, &["config", "--device", "Scanner 3000"]);

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Scanner 3000"));
}

#[test]
fn test_invalid_mode_fails_without_output() {
    let (_dir, config) = config_file("");
    let mode = "M".repeat(200);
    let output = carbonpaper(&config, &["set", "--mode", &mode]);

    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
}
