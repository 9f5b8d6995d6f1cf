//! Subcommand execution
//!
//! Each subcommand maps onto one host operation and produces a [`Report`];
//! printing is left to the caller.

use prettytable::Table;

use crate::app::cli::args::Command;
use crate::app::cli::config::RunOptions;
use crate::app::cli::display;
use crate::host::ScannerHost;
use crate::scanner::{ScanError, ScanResult};

/// Output of one subcommand
#[derive(Debug)]
pub enum Report {
    Table(Table),
    Text(String),
}

impl std::fmt::Display for Report {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Report::Table(table) => write!(f, "{}", table),
            Report::Text(text) => writeln!(f, "{}", text),
        }
    }
}

pub fn execute(
    command: &Command,
    host: &mut ScannerHost,
    options: &RunOptions,
) -> ScanResult<Report> {
    let device = options.device.as_deref();
    match command {
        Command::List => {
            let devices = host.get_scanners()?;
            if options.json {
                Ok(Report::Text(display::to_json(&devices)?))
            } else if devices.is_empty() {
                Ok(Report::Text("No scanners found.".to_string()))
            } else {
                Ok(Report::Table(display::device_table(&devices, options.color)))
            }
        }
        Command::Caps => {
            let capabilities = host.get_capabilities(device)?;
            if options.json {
                Ok(Report::Text(display::to_json(&capabilities)?))
            } else {
                Ok(Report::Table(display::capabilities_table(
                    &capabilities,
                    options.color,
                )))
            }
        }
        Command::Config => {
            let configuration = host.get_configuration(device)?;
            configuration_report(&configuration, options)
        }
        Command::Set(settings) => {
            let patch = settings.to_patch();
            if patch.is_empty() {
                return Err(ScanError::invalid_argument(
                    "Nothing to change: give at least one of --from-x, --from-y, --to-x, --to-y, --resolution, --source, --mode",
                ));
            }
            let configuration = host.set_configuration(device, &patch)?;
            configuration_report(&configuration, options)
        }
        Command::Scan(scan) => {
            let patch = scan.settings.to_patch();
            if !patch.is_empty() {
                host.set_configuration(device, &patch)?;
            }
            let written = host.scan_to_file(device, &options.output)?;
            if options.json {
                let summary = serde_json::json!({
                    "written": written,
                    "path": options.output.display().to_string(),
                });
                return Ok(Report::Text(display::to_json(&summary)?));
            }
            Ok(Report::Text(if written {
                format!("Scanned to {}", options.output.display())
            } else {
                "The scanner delivered no image; nothing was written.".to_string()
            }))
        }
    }
}

fn configuration_report(
    configuration: &crate::scanner::Configuration,
    options: &RunOptions,
) -> ScanResult<Report> {
    if options.json {
        Ok(Report::Text(display::to_json(configuration)?))
    } else {
        Ok(Report::Table(display::configuration_table(
            configuration,
            options.color,
        )))
    }
}
