//! Scanner Integration Test Modules

pub mod acquisition;
pub mod configuration;
pub mod host;
