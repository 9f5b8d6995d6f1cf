//! CLI Integration Tests
//!
//! Tests are organized by functionality:
//! - `cli::argument_parsing` - global options and subcommand arguments
//! - `cli::toml_config` - configuration file loading and precedence
//! - `cli::binary` - running the built executable against the simulated backend

mod cli;
mod common;
