//! Argument parsing, configuration file and terminal output

pub mod args;
pub mod config;
pub mod display;
