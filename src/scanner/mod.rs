//! Scanner Component
//!
//! Device-facing core of the scanner service. Everything here talks to the
//! hardware through [`crate::backend::ScanBackend`] only.
//!
//! ## Components
//!
//! - **SessionManager**: one open native handle per device descriptor
//! - **OptionIndexCache**: per-device discovery of the option slots for
//!   geometry, resolution, source and mode
//! - **OptionCodec**: typed capabilities/configuration to and from native
//!   option values
//! - **ScanDriver**: start / read / cancel acquisition loop
//! - **ScanService**: façade with lazy device enumeration and the
//!   first-device fallback

pub mod api;
pub mod codec;
pub mod driver;
pub mod error;
pub mod options;
pub mod output;
pub mod service;
pub mod session;
pub mod settings;
pub mod types;

pub use error::{ScanError, ScanResult};
pub use service::{ScanService, ServiceState};
pub use settings::ScanSettings;
pub use types::{Capabilities, Configuration, ConfigurationPatch, DeviceDescriptor, RawImage};

#[cfg(test)]
mod tests;
