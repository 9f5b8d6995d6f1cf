//! TOML configuration file loading
//!
//! An explicit `--config-file` must exist. Without one, the default
//! location (`<config dir>/Carbonpaper/carbonpaper.toml`) is read when
//! present and silently skipped otherwise.
//!
//! ```toml
//! backend = "sane"
//! device = "pixma:04A91912"
//! chunk-size = 1048576
//! output = "scans/latest.png"
//! log-level = "debug"
//! log-format = "ext"
//! log-file = "none"
//! color = false
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::app::cli::args::{Args, BackendKind, Command};
use crate::core::error_handling::ContextualError;
use crate::core::logging::LogFormat;
use crate::core::validation::validate_chunk_size;
use crate::scanner::api::DEFAULT_CHUNK_SIZE;

pub const DEFAULT_OUTPUT: &str = "output.png";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("The specified configuration file does not exist: {path}")]
    Missing { path: PathBuf },

    #[error("Error reading configuration file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Error parsing configuration file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Error in configuration file {path}: {message}")]
    Invalid { path: PathBuf, message: String },
}

impl ContextualError for ConfigError {
    fn is_user_actionable(&self) -> bool {
        true
    }

    fn user_message(&self) -> Option<String> {
        Some(self.to_string())
    }
}

/// Values read from the configuration file; keys are kebab-case.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FileConfig {
    pub backend: Option<BackendKind>,
    pub device: Option<String>,
    pub chunk_size: Option<usize>,
    pub output: Option<PathBuf>,
    pub log_level: Option<String>,
    pub log_format: Option<LogFormat>,
    pub log_file: Option<PathBuf>,
    pub color: Option<bool>,
}

pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("Carbonpaper").join("carbonpaper.toml"))
}

/// Read the configuration file, if there is one to read.
///
/// Returns the path that was loaded alongside its values.
pub fn load(config_file: Option<&Path>) -> Result<Option<(PathBuf, FileConfig)>, ConfigError> {
    let path = match config_file {
        Some(path) if !path.exists() => {
            return Err(ConfigError::Missing {
                path: path.to_path_buf(),
            })
        }
        Some(path) => path.to_path_buf(),
        None => match default_config_path() {
            Some(path) if path.exists() => path,
            _ => return Ok(None),
        },
    };

    let contents = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
        path: path.clone(),
        source,
    })?;
    let config = parse(&path, &contents)?;
    Ok(Some((path, config)))
}

/// Parse and check configuration file text.
pub fn parse(path: &Path, contents: &str) -> Result<FileConfig, ConfigError> {
    let config: FileConfig = toml::from_str(contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    let invalid = |message: String| ConfigError::Invalid {
        path: path.to_path_buf(),
        message,
    };
    if let Some(chunk_size) = config.chunk_size {
        validate_chunk_size(chunk_size).map_err(|e| invalid(format!("chunk-size: {}", e)))?;
    }
    if let Some(level) = &config.log_level {
        if !LOG_LEVELS.contains(&level.as_str()) {
            return Err(invalid(format!(
                "log-level '{}' is not one of {}",
                level,
                LOG_LEVELS.join(", ")
            )));
        }
    }
    Ok(config)
}

const LOG_LEVELS: [&str; 6] = ["trace", "debug", "info", "warn", "error", "off"];

/// Effective settings for one run: command line first, then the
/// configuration file, then built-in defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct RunOptions {
    pub backend: BackendKind,
    pub device: Option<String>,
    pub chunk_size: usize,
    pub output: PathBuf,
    pub log_level: Option<String>,
    pub log_format: LogFormat,
    pub log_file: Option<PathBuf>,
    pub color: bool,
    pub json: bool,
}

impl RunOptions {
    /// `color_default` applies when neither the flags nor the file decide
    /// (normally: stdout is a terminal and `NO_COLOR` is unset).
    pub fn resolve(args: &Args, file: &FileConfig, color_default: bool) -> Self {
        let color = if args.color {
            true
        } else if args.no_color {
            false
        } else {
            file.color.unwrap_or(color_default)
        };

        let scan_output = match &args.command {
            Command::Scan(scan) => scan.output.clone(),
            _ => None,
        };

        // "none" switches file logging off, whichever source set it
        let log_file = args
            .log_file
            .clone()
            .or_else(|| file.log_file.clone())
            .filter(|path| path.as_os_str() != "none");

        Self {
            backend: args.backend.or(file.backend).unwrap_or_default(),
            device: args.device.clone().or_else(|| file.device.clone()),
            chunk_size: args.chunk_size.or(file.chunk_size).unwrap_or(DEFAULT_CHUNK_SIZE),
            output: scan_output
                .or_else(|| file.output.clone())
                .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT)),
            log_level: args.log_level.clone().or_else(|| file.log_level.clone()),
            log_format: args.log_format.or(file.log_format).unwrap_or_default(),
            log_file,
            color,
            json: args.json,
        }
    }
}
