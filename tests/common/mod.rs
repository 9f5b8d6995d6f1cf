//! Common test utilities and helpers
//!
//! Shared fixtures for the integration test binaries.

#![allow(dead_code)]

use std::io::Write;
use std::path::PathBuf;

use carbonpaper::backend::{MemoryBackend, MemoryDevice};
use carbonpaper::host::ScannerHost;
use carbonpaper::scanner::{ConfigurationPatch, ScanService};

pub const FLATBED: &str = "memory:flatbed0";
pub const FLATBED_DESCRIPTOR: &str = "memory:flatbed0 (Carbonpaper / Virtual Flatbed)";
pub const SECOND_FLATBED: &str = "memory:flatbed1";
pub const SECOND_DESCRIPTOR: &str = "memory:flatbed1 (Carbonpaper / Virtual Flatbed)";

/// Two simulated flatbeds; the returned backend shares state with the host.
pub fn two_flatbed_host() -> (MemoryBackend, ScannerHost) {
    let backend = MemoryBackend::new()
        .with_device(MemoryDevice::flatbed(FLATBED))
        .with_device(MemoryDevice::flatbed(SECOND_FLATBED));
    let service = ScanService::new(backend.clone()).expect("memory backend initialises");
    (backend, ScannerHost::new(service))
}

/// One inch square at 75 dpi: a 75x75 frame.
pub fn small_area() -> ConfigurationPatch {
    ConfigurationPatch {
        from_x: Some(0.0),
        from_y: Some(0.0),
        to_x: Some(25.4),
        to_y: Some(25.4),
        resolution_in_dpi: Some(75),
        ..ConfigurationPatch::default()
    }
}

/// Configuration file in a temporary directory.
pub fn config_file(contents: &str) -> (tempfile::TempDir, PathBuf) {
    let dir = tempfile::tempdir().expect("temporary directory");
    let path = dir.path().join("carbonpaper.toml");
    let mut file = std::fs::File::create(&path).expect("config file");
    file.write_all(contents.as_bytes()).expect("config written");
    (dir, path)
}
