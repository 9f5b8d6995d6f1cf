//! Command line arguments
//!
//! Global options come first, then one subcommand. Values given here win
//! over the configuration file.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use serde::Deserialize;

use crate::core::logging::LogFormat;
use crate::core::validation::{validate_millimetres, validate_positive_int, validate_resolution};
use crate::scanner::ConfigurationPatch;

/// Native backend the front end drives
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Simulated flatbed, no hardware needed
    Memory,
    /// libsane (needs the `sane` feature)
    Sane,
}

impl Default for BackendKind {
    fn default() -> Self {
        if cfg!(feature = "sane") {
            BackendKind::Sane
        } else {
            BackendKind::Memory
        }
    }
}

#[derive(Parser, Debug, Clone)]
#[command(name = "carbonpaper")]
#[command(about = "Query, configure and scan with document scanners")]
#[command(version, long_version = crate::core::version::long_version())]
pub struct Args {
    /// Configuration file path
    #[arg(short = 'c', long = "config-file", value_name = "FILE", global = true)]
    pub config_file: Option<PathBuf>,

    /// Scanner backend
    #[arg(short = 'b', long = "backend", value_enum, global = true)]
    pub backend: Option<BackendKind>,

    /// Device to use (descriptor or backend name); defaults to the first scanner found
    #[arg(short = 'd', long = "device", value_name = "NAME", global = true)]
    pub device: Option<String>,

    /// Bytes requested per native read
    #[arg(long = "chunk-size", value_name = "BYTES", value_parser = validate_positive_int, global = true)]
    pub chunk_size: Option<usize>,

    /// Log level
    #[arg(short = 'l', long = "log-level", value_name = "LEVEL", value_parser = ["trace", "debug", "info", "warn", "error", "off"], global = true)]
    pub log_level: Option<String>,

    /// Log output format
    #[arg(short = 'o', long = "log-format", value_name = "FORMAT", value_enum, global = true)]
    pub log_format: Option<LogFormat>,

    /// Log file path (use 'none' to disable file logging)
    #[arg(short = 'f', long = "log-file", value_name = "FILE", global = true)]
    pub log_file: Option<PathBuf>,

    /// Force colored output (overrides TTY detection and NO_COLOR)
    #[arg(long = "color", conflicts_with = "no_color", global = true)]
    pub color: bool,

    /// Disable colored output
    #[arg(long = "no-color", global = true)]
    pub no_color: bool,

    /// Print results as JSON
    #[arg(long = "json", global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// List attached scanners
    List,
    /// Show the area, resolutions, sources and modes a scanner supports
    Caps,
    /// Show the current scanner configuration
    Config,
    /// Change scanner settings; settings not given keep their current value
    Set(SettingArgs),
    /// Scan one page to a PNG file
    Scan(ScanArgs),
}

/// Scanner settings; geometry in millimetres
#[derive(clap::Args, Debug, Clone, Default, PartialEq)]
pub struct SettingArgs {
    /// Left edge of the scan area
    #[arg(long = "from-x", value_name = "MM", value_parser = validate_millimetres)]
    pub from_x: Option<f64>,

    /// Top edge of the scan area
    #[arg(long = "from-y", value_name = "MM", value_parser = validate_millimetres)]
    pub from_y: Option<f64>,

    /// Right edge of the scan area
    #[arg(long = "to-x", value_name = "MM", value_parser = validate_millimetres)]
    pub to_x: Option<f64>,

    /// Bottom edge of the scan area
    #[arg(long = "to-y", value_name = "MM", value_parser = validate_millimetres)]
    pub to_y: Option<f64>,

    /// Resolution in dots per inch
    #[arg(short = 'r', long = "resolution", value_name = "DPI", value_parser = validate_resolution)]
    pub resolution: Option<i32>,

    /// Document source (e.g. Flatbed, ADF)
    #[arg(short = 's', long = "source", value_name = "SOURCE")]
    pub source: Option<String>,

    /// Scan mode (e.g. Color, Gray)
    #[arg(short = 'm', long = "mode", value_name = "MODE")]
    pub mode: Option<String>,
}

impl SettingArgs {
    pub fn to_patch(&self) -> ConfigurationPatch {
        ConfigurationPatch {
            from_x: self.from_x,
            from_y: self.from_y,
            to_x: self.to_x,
            to_y: self.to_y,
            resolution_in_dpi: self.resolution,
            source: self.source.clone(),
            mode: self.mode.clone(),
        }
    }
}

#[derive(clap::Args, Debug, Clone, Default, PartialEq)]
pub struct ScanArgs {
    /// PNG file to write (default: output.png)
    #[arg(short = 'O', long = "output", value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Settings applied before scanning
    #[command(flatten)]
    pub settings: SettingArgs,
}
