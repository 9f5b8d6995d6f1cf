//! Application startup
//!
//! Parse the command line, merge the configuration file, start logging,
//! then run one subcommand against a freshly initialised backend. The
//! backend is shut down before the process exits, whatever the outcome.

use std::ffi::OsString;
use std::io::IsTerminal;

use clap::{CommandFactory, FromArgMatches};

use crate::app::cli::args::{Args, BackendKind};
use crate::app::cli::config::{self, RunOptions};
use crate::app::commands::{self, Report};
use crate::backend::{MemoryBackend, ScanBackend};
use crate::core::error_handling::{describe_error, log_error_with_context};
use crate::core::logging::init_logging;
use crate::core::styles::palette_to_clap;
use crate::host::ScannerHost;
use crate::scanner::{ScanResult, ScanService, ScanSettings};

pub const EXIT_FAILURE: i32 = 1;
pub const EXIT_USAGE: i32 = 2;

/// Run the program with the process arguments; returns the exit code.
pub fn startup() -> i32 {
    run_from(std::env::args_os())
}

/// Run the program with explicit arguments; returns the exit code.
pub fn run_from<I, T>(argv: I) -> i32
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let argv: Vec<OsString> = argv.into_iter().map(Into::into).collect();
    let color_hint = terminal_wants_color() && !argv.iter().any(|arg| arg == "--no-color");

    let args = match Args::command()
        .styles(palette_to_clap(color_hint))
        .try_get_matches_from(&argv)
        .and_then(|matches| Args::from_arg_matches(&matches))
    {
        Ok(args) => args,
        Err(e) => {
            // --help and --version land here too
            let _ = e.print();
            return if e.use_stderr() { EXIT_USAGE } else { 0 };
        }
    };

    let (config_path, file_config) = match config::load(args.config_file.as_deref()) {
        Ok(Some((path, file_config))) => (Some(path), file_config),
        Ok(None) => (None, config::FileConfig::default()),
        Err(e) => {
            eprintln!("Error: {}", describe_error(&e, "Loading configuration"));
            return EXIT_USAGE;
        }
    };
    let options = RunOptions::resolve(&args, &file_config, terminal_wants_color());

    if let Err(e) = init_logging(
        options.log_level.as_deref(),
        options.log_format,
        options.log_file.as_deref(),
        options.color,
    ) {
        eprintln!("Error: could not start logging: {}", e);
    }
    match &config_path {
        Some(path) => log::debug!("Loaded configuration from {}", path.display()),
        None => log::debug!("No configuration file loaded"),
    }
    log::debug!("Effective options: {:?}", options);

    match run(&args, &options) {
        Ok(report) => {
            print_report(&report, options.color);
            0
        }
        Err(e) => {
            log_error_with_context(&e, "Scanner command");
            eprintln!("Error: {}", describe_error(&e, "Scanner command"));
            EXIT_FAILURE
        }
    }
}

/// Run the parsed subcommand and shut the backend down afterwards.
pub fn run(args: &Args, options: &RunOptions) -> ScanResult<Report> {
    let backend = create_backend(options.backend)?;
    let settings = ScanSettings::default().with_chunk_size(options.chunk_size);
    let mut host = ScannerHost::new(ScanService::from_boxed(backend, settings)?);

    let result = commands::execute(&args.command, &mut host, options);
    let shutdown = host.shutdown();
    let report = result?;
    shutdown?;
    Ok(report)
}

pub fn create_backend(kind: BackendKind) -> ScanResult<Box<dyn ScanBackend>> {
    match kind {
        BackendKind::Memory => Ok(Box::new(MemoryBackend::simulated())),
        BackendKind::Sane => sane_backend(),
    }
}

#[cfg(feature = "sane")]
fn sane_backend() -> ScanResult<Box<dyn ScanBackend>> {
    Ok(Box::new(crate::backend::SaneBackend::new()))
}

#[cfg(not(feature = "sane"))]
fn sane_backend() -> ScanResult<Box<dyn ScanBackend>> {
    Err(crate::scanner::ScanError::invalid_argument(
        "This build has no SANE support; rebuild with `--features sane` or use `--backend memory`",
    ))
}

fn terminal_wants_color() -> bool {
    std::io::stdout().is_terminal() && std::env::var_os("NO_COLOR").is_none()
}

fn print_report(report: &Report, color: bool) {
    match report {
        Report::Table(table) if color => {
            if table.print_tty(true).is_err() {
                print!("{}", table);
            }
        }
        other => print!("{}", other),
    }
}
